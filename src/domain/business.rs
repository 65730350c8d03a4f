use rust_decimal::Decimal;
use serde::Serialize;

use super::account::TransactionRules;
use super::error::{ensure_positive, in_range};
use super::{AccountError, InsufficientFunds, Money, TransactionKind, Violation};

/// Preferential rate credited to business accounts on each accrual (0.5%).
pub const BUSINESS_INTEREST_RATE: Money = Decimal::from_parts(5, 0, 0, false, 3);

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BusinessTerms {
    /// Legal form, e.g. "S.A." or "Ltda."
    business_type: String,
    tax_id: u64,
    daily_limit: Money,
    withdrawn_today: Money,
}

impl BusinessTerms {
    pub fn new(business_type: impl Into<String>, tax_id: u64, daily_limit: Money) -> Self {
        Self {
            business_type: business_type.into(),
            tax_id,
            daily_limit,
            withdrawn_today: Money::ZERO,
        }
    }

    pub fn business_type(&self) -> &str {
        &self.business_type
    }

    pub fn tax_id(&self) -> u64 {
        self.tax_id
    }

    pub fn daily_limit(&self) -> Money {
        self.daily_limit
    }

    pub fn withdrawn_today(&self) -> Money {
        self.withdrawn_today
    }

    pub fn available_today(&self) -> Money {
        self.daily_limit.saturating_sub(self.withdrawn_today)
    }

    pub(crate) fn reset_daily_limit(&mut self) {
        self.withdrawn_today = Money::ZERO;
    }
}

impl TransactionRules for BusinessTerms {
    fn withdraw(&mut self, balance: &mut Money, amount: Money) -> Result<Money, AccountError> {
        ensure_positive(TransactionKind::Withdrawal, amount)?;

        // A sum too large to represent is over any limit.
        let within_limit = self
            .withdrawn_today
            .checked_add(amount)
            .is_some_and(|total| total <= self.daily_limit);
        if !within_limit {
            return Err(AccountError::policy(
                Violation::DailyLimitExceeded {
                    limit: self.daily_limit,
                    withdrawn_today: self.withdrawn_today,
                    requested: amount,
                },
                InsufficientFunds::DailyAllowance {
                    remaining: self.available_today(),
                },
            ));
        }

        if *balance < amount {
            return Err(AccountError::shortfall(*balance, amount));
        }

        *balance -= amount;
        self.withdrawn_today += amount;
        Ok(amount)
    }

    fn accrue_interest(&mut self, balance: &mut Money) -> Result<Money, AccountError> {
        let interest = in_range(
            TransactionKind::Interest,
            balance.checked_mul(BUSINESS_INTEREST_RATE),
        )?;
        *balance = in_range(TransactionKind::Interest, balance.checked_add(interest))?;
        Ok(interest)
    }
}
