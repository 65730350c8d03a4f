use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{AccountNumber, Money};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionKind {
    Deposit,
    Withdrawal,
    Interest,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Deposit => "DEPOSIT",
            TransactionKind::Withdrawal => "WITHDRAWAL",
            TransactionKind::Interest => "INTEREST",
        }
    }

    /// Label used by the original text log.
    pub fn legacy_label(&self) -> &'static str {
        match self {
            TransactionKind::Deposit => "DEPOSITO",
            TransactionKind::Withdrawal => "RETIRO",
            TransactionKind::Interest => "INTERESES",
        }
    }

    /// Accepts both the current and the legacy labels, case-insensitively.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_uppercase().as_str() {
            "DEPOSIT" | "DEPOSITO" => Some(TransactionKind::Deposit),
            "WITHDRAWAL" | "RETIRO" => Some(TransactionKind::Withdrawal),
            "INTEREST" | "INTERESES" => Some(TransactionKind::Interest),
            _ => None,
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_label(s).ok_or_else(|| format!("unknown transaction kind: {}", s))
    }
}

/// One successful account operation, as written to the ledger.
/// Records are immutable once created; the only way to remove them is to
/// clear the whole ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub timestamp: DateTime<Utc>,
    /// Account the operation was applied to (by value, no back-reference)
    pub account_number: AccountNumber,
    pub kind: TransactionKind,
    /// Amount moved: the deposit, the withdrawal (fee excluded) or the interest
    pub amount: Money,
    /// Account balance right after the operation
    pub resulting_balance: Money,
}

impl TransactionRecord {
    pub fn new(
        account_number: AccountNumber,
        kind: TransactionKind,
        amount: Money,
        resulting_balance: Money,
    ) -> Self {
        Self::at(Utc::now(), account_number, kind, amount, resulting_balance)
    }

    pub fn at(
        timestamp: DateTime<Utc>,
        account_number: AccountNumber,
        kind: TransactionKind,
        amount: Money,
        resulting_balance: Money,
    ) -> Self {
        Self {
            timestamp,
            account_number,
            kind,
            amount,
            resulting_balance,
        }
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    #[test]
    fn test_kind_labels() {
        for kind in [
            TransactionKind::Deposit,
            TransactionKind::Withdrawal,
            TransactionKind::Interest,
        ] {
            assert_eq!(TransactionKind::from_label(kind.as_str()), Some(kind));
            assert_eq!(TransactionKind::from_label(kind.legacy_label()), Some(kind));
        }
        assert_eq!(TransactionKind::from_label("retiro"), Some(TransactionKind::Withdrawal));
        assert!("TRANSFER".parse::<TransactionKind>().is_err());
    }

    #[test]
    fn test_kind_serializes_uppercase() {
        let json = serde_json::to_string(&TransactionKind::Withdrawal).unwrap();
        assert_eq!(json, "\"WITHDRAWAL\"");
    }

    #[test]
    fn test_record_json_keeps_decimal_amounts_exact() {
        let record = TransactionRecord::new(
            7,
            TransactionKind::Interest,
            Decimal::new(166665, 5),
            Decimal::new(33499665, 5),
        );
        let json = serde_json::to_string(&record).unwrap();
        let parsed: TransactionRecord = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed, record);
        assert!(json.contains("\"amount\":\"1.66665\""));
    }
}
