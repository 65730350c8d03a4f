use thiserror::Error;

use crate::domain::{AccountError, AccountNumber, Money, format_money};

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Account not found: {0}")]
    AccountNotFound(AccountNumber),

    #[error("Account already exists: {0}")]
    DuplicateAccount(AccountNumber),

    #[error(
        "Account {number}: a {kind} account cannot open with a negative balance (${})",
        format_money(*balance)
    )]
    NegativeOpeningBalance {
        number: AccountNumber,
        kind: &'static str,
        balance: Money,
    },

    #[error("Account {number} does not support {operation}")]
    UnsupportedOperation {
        number: AccountNumber,
        operation: &'static str,
    },

    #[error(transparent)]
    Account(#[from] AccountError),

    #[error("Ledger error: {0}")]
    Ledger(#[from] anyhow::Error),
}

impl AppError {
    /// The rejected account operation, if that is what failed.
    pub fn account_error(&self) -> Option<&AccountError> {
        match self {
            AppError::Account(e) => Some(e),
            _ => None,
        }
    }
}
