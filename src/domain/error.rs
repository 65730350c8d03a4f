use thiserror::Error;

use super::{Money, TransactionKind, format_money};

/// Describes a capacity shortfall. Surfaced on its own when the balance is
/// simply too low, or as the cause of an [`AccountError::InvalidOperation`]
/// when a policy limit rejected the operation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InsufficientFunds {
    #[error(
        "insufficient balance: available ${}, requested ${}",
        format_money(*available),
        format_money(*requested)
    )]
    Balance { available: Money, requested: Money },

    #[error("no withdrawals remaining this period")]
    NoWithdrawalsRemaining,

    #[error(
        "current balance ${}, amount plus fee ${}, balance would be ${}",
        format_money(*balance),
        format_money(*total_debit),
        format_money(*projected)
    )]
    Overdraft {
        balance: Money,
        total_debit: Money,
        projected: Money,
    },

    #[error("available today: ${}", format_money(*remaining))]
    DailyAllowance { remaining: Money },
}

/// Why an operation was refused before touching the balance.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Violation {
    #[error(
        "{} amount must be greater than zero, got ${}",
        kind.as_str().to_lowercase(),
        format_money(*amount)
    )]
    NonPositiveAmount { kind: TransactionKind, amount: Money },

    #[error("withdrawal limit reached: {used} of {limit} used this period")]
    WithdrawalLimitReached { limit: u32, used: u32 },

    #[error("operation exceeds the overdraft limit of ${}", format_money(*limit))]
    OverdraftLimitExceeded { limit: Money },

    #[error(
        "daily limit exceeded: limit ${}, withdrawn today ${}, requested ${}",
        format_money(*limit),
        format_money(*withdrawn_today),
        format_money(*requested)
    )]
    DailyLimitExceeded {
        limit: Money,
        withdrawn_today: Money,
        requested: Money,
    },

    #[error("{} would take the balance out of the representable range", kind.as_str().to_lowercase())]
    AmountOutOfRange { kind: TransactionKind },
}

/// Failure of a single account operation.
///
/// A policy rejection (withdrawal count, overdraft ceiling, daily cap) is an
/// `InvalidOperation` whose `cause` explains the shortfall. A plain lack of
/// balance is `InsufficientFunds` with no cause.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AccountError {
    #[error("{violation}")]
    InvalidOperation {
        violation: Violation,
        #[source]
        cause: Option<InsufficientFunds>,
    },

    #[error(transparent)]
    InsufficientFunds(InsufficientFunds),
}

impl AccountError {
    pub fn invalid(violation: Violation) -> Self {
        AccountError::InvalidOperation {
            violation,
            cause: None,
        }
    }

    pub fn policy(violation: Violation, cause: InsufficientFunds) -> Self {
        AccountError::InvalidOperation {
            violation,
            cause: Some(cause),
        }
    }

    pub fn shortfall(available: Money, requested: Money) -> Self {
        AccountError::InsufficientFunds(InsufficientFunds::Balance {
            available,
            requested,
        })
    }

    /// The chained shortfall, if a policy limit caused the rejection.
    pub fn cause(&self) -> Option<&InsufficientFunds> {
        match self {
            AccountError::InvalidOperation { cause, .. } => cause.as_ref(),
            AccountError::InsufficientFunds(_) => None,
        }
    }

    pub fn is_policy_violation(&self) -> bool {
        self.cause().is_some()
    }
}

/// Rejects zero and negative amounts for any kind of operation.
pub(crate) fn ensure_positive(kind: TransactionKind, amount: Money) -> Result<(), AccountError> {
    if amount <= Money::ZERO {
        return Err(AccountError::invalid(Violation::NonPositiveAmount { kind, amount }));
    }
    Ok(())
}

/// Unwraps the result of a checked `Decimal` operation, treating overflow as
/// an invalid operation.
pub(crate) fn in_range(kind: TransactionKind, value: Option<Money>) -> Result<Money, AccountError> {
    value.ok_or_else(|| AccountError::invalid(Violation::AmountOutOfRange { kind }))
}
