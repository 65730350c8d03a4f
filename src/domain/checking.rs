use serde::Serialize;

use super::account::TransactionRules;
use super::error::{ensure_positive, in_range};
use super::{AccountError, InsufficientFunds, Money, TransactionKind, Violation};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckingTerms {
    /// Charged on every withdrawal, on top of the withdrawn amount
    fixed_fee: Money,
    /// How far below zero the balance may go
    overdraft_limit: Money,
    checkbook_number: u32,
}

impl CheckingTerms {
    pub fn new(fixed_fee: Money, overdraft_limit: Money, checkbook_number: u32) -> Self {
        assert!(
            overdraft_limit >= Money::ZERO,
            "Overdraft limit must not be negative"
        );
        Self {
            fixed_fee,
            overdraft_limit,
            checkbook_number,
        }
    }

    pub fn fixed_fee(&self) -> Money {
        self.fixed_fee
    }

    pub fn overdraft_limit(&self) -> Money {
        self.overdraft_limit
    }

    pub fn checkbook_number(&self) -> u32 {
        self.checkbook_number
    }
}

impl TransactionRules for CheckingTerms {
    fn withdraw(&mut self, balance: &mut Money, amount: Money) -> Result<Money, AccountError> {
        ensure_positive(TransactionKind::Withdrawal, amount)?;

        let total_debit = in_range(
            TransactionKind::Withdrawal,
            amount.checked_add(self.fixed_fee),
        )?;
        let projected = in_range(
            TransactionKind::Withdrawal,
            balance.checked_sub(total_debit),
        )?;

        if projected < -self.overdraft_limit {
            return Err(AccountError::policy(
                Violation::OverdraftLimitExceeded {
                    limit: self.overdraft_limit,
                },
                InsufficientFunds::Overdraft {
                    balance: *balance,
                    total_debit,
                    projected,
                },
            ));
        }

        // The fee is absorbed into the balance; callers only see the amount.
        *balance = projected;
        Ok(amount)
    }

    fn accrue_interest(&mut self, _balance: &mut Money) -> Result<Money, AccountError> {
        Ok(Money::ZERO)
    }
}
