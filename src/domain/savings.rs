use serde::Serialize;

use super::account::TransactionRules;
use super::error::{ensure_positive, in_range};
use super::{AccountError, InsufficientFunds, Money, TransactionKind, Violation};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SavingsTerms {
    /// Fraction credited per accrual (0.02 = 2%)
    interest_rate: Money,
    /// Informational label such as "monthly" or "quarterly"
    interest_period: String,
    withdrawal_limit: u32,
    withdrawals_used: u32,
}

impl SavingsTerms {
    pub fn new(interest_rate: Money, interest_period: impl Into<String>, withdrawal_limit: u32) -> Self {
        Self {
            interest_rate,
            interest_period: interest_period.into(),
            withdrawal_limit,
            withdrawals_used: 0,
        }
    }

    pub fn interest_rate(&self) -> Money {
        self.interest_rate
    }

    pub fn interest_period(&self) -> &str {
        &self.interest_period
    }

    pub fn withdrawal_limit(&self) -> u32 {
        self.withdrawal_limit
    }

    pub fn withdrawals_used(&self) -> u32 {
        self.withdrawals_used
    }

    pub fn withdrawals_remaining(&self) -> u32 {
        self.withdrawal_limit.saturating_sub(self.withdrawals_used)
    }

    pub(crate) fn reset_withdrawals(&mut self) {
        self.withdrawals_used = 0;
    }
}

impl TransactionRules for SavingsTerms {
    fn withdraw(&mut self, balance: &mut Money, amount: Money) -> Result<Money, AccountError> {
        ensure_positive(TransactionKind::Withdrawal, amount)?;

        // An exhausted withdrawal count wins over a short balance.
        if self.withdrawals_used >= self.withdrawal_limit {
            return Err(AccountError::policy(
                Violation::WithdrawalLimitReached {
                    limit: self.withdrawal_limit,
                    used: self.withdrawals_used,
                },
                InsufficientFunds::NoWithdrawalsRemaining,
            ));
        }

        if *balance < amount {
            return Err(AccountError::shortfall(*balance, amount));
        }

        *balance -= amount;
        self.withdrawals_used += 1;
        Ok(amount)
    }

    fn accrue_interest(&mut self, balance: &mut Money) -> Result<Money, AccountError> {
        let interest = in_range(
            TransactionKind::Interest,
            balance.checked_mul(self.interest_rate),
        )?;
        *balance = in_range(TransactionKind::Interest, balance.checked_add(interest))?;
        Ok(interest)
    }
}
