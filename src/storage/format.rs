use std::fmt;
use std::str::FromStr;

use anyhow::{Context, Result, anyhow};
use chrono::{Local, NaiveDateTime, Utc};

use crate::domain::{AccountNumber, TransactionKind, TransactionRecord, format_money, parse_money};

const JSON_HEADER: &str = "{\"ledger\":\"bankbook\",\"version\":1}\n";

const LEGACY_HEADER: &str = "\
====================================================================
        REGISTRO DE TRANSACCIONES - SISTEMA BANCARIO
====================================================================
Formato: Fecha-Hora | Número Cuenta | Tipo | Monto | Saldo Final
====================================================================

";

/// Legacy timestamps are local wall-clock time, like the log they sit beside.
const LEGACY_TIMESTAMP: &str = "%Y-%m-%d %H:%M:%S";

/// How records are laid out in the ledger file, one record per line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LedgerFormat {
    /// One JSON object per line
    #[default]
    Json,
    /// `<timestamp> | Cuenta: <n> | <KIND> | Monto: $<x> | Saldo Final: $<y>`,
    /// readable alongside logs written by the older text-based system
    Legacy,
}

impl LedgerFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            LedgerFormat::Json => "json",
            LedgerFormat::Legacy => "legacy",
        }
    }

    /// Fixed block written once when the ledger file is created.
    pub fn header(&self) -> &'static str {
        match self {
            LedgerFormat::Json => JSON_HEADER,
            LedgerFormat::Legacy => LEGACY_HEADER,
        }
    }

    /// Recognize the format of an existing ledger from its first non-blank
    /// line, which is either its header or, for a headerless file, a record.
    pub fn detect(line: &str) -> Option<LedgerFormat> {
        let line = line.trim_start();
        if line.starts_with('{') {
            Some(LedgerFormat::Json)
        } else if line.starts_with('=') || line.contains(" | Cuenta: ") {
            Some(LedgerFormat::Legacy)
        } else {
            None
        }
    }

    /// Header, separator and blank lines carry no record.
    pub fn is_decoration(&self, line: &str) -> bool {
        if line.trim().is_empty() {
            return true;
        }
        match self {
            LedgerFormat::Json => line.trim_start().starts_with("{\"ledger\""),
            LedgerFormat::Legacy => {
                line.starts_with('=') || line.contains("REGISTRO DE") || line.contains("Formato:")
            }
        }
    }

    pub fn encode(&self, record: &TransactionRecord) -> Result<String> {
        match self {
            LedgerFormat::Json => {
                serde_json::to_string(record).context("Failed to serialize transaction record")
            }
            LedgerFormat::Legacy => Ok(format!(
                "{} | Cuenta: {} | {} | Monto: ${} | Saldo Final: ${}",
                record.timestamp.with_timezone(&Local).format(LEGACY_TIMESTAMP),
                record.account_number,
                record.kind.legacy_label(),
                format_money(record.amount),
                format_money(record.resulting_balance),
            )),
        }
    }

    pub fn decode(&self, line: &str) -> Result<TransactionRecord> {
        match self {
            LedgerFormat::Json => serde_json::from_str(line.trim())
                .with_context(|| format!("Invalid ledger line: {}", line)),
            LedgerFormat::Legacy => decode_legacy(line),
        }
    }
}

fn decode_legacy(line: &str) -> Result<TransactionRecord> {
    let fields: Vec<&str> = line.trim_end().split(" | ").collect();
    let [timestamp, account, kind, amount, balance] = fields.as_slice() else {
        return Err(anyhow!("Invalid ledger line: expected 5 fields in {:?}", line));
    };

    let timestamp = NaiveDateTime::parse_from_str(timestamp.trim(), LEGACY_TIMESTAMP)
        .with_context(|| format!("Invalid timestamp: {}", timestamp))?
        .and_local_timezone(Local)
        .earliest()
        .ok_or_else(|| anyhow!("Nonexistent local time: {}", timestamp))?
        .with_timezone(&Utc);

    let account_number = field(account, "Cuenta: ")?
        .parse::<AccountNumber>()
        .with_context(|| format!("Invalid account number: {}", account))?;

    let kind = TransactionKind::from_label(kind)
        .ok_or_else(|| anyhow!("Invalid transaction kind: {}", kind))?;

    let amount = parse_money(field(amount, "Monto: $")?)
        .with_context(|| format!("Invalid amount: {}", amount))?;

    let resulting_balance = parse_money(field(balance, "Saldo Final: $")?)
        .with_context(|| format!("Invalid balance: {}", balance))?;

    Ok(TransactionRecord::at(
        timestamp,
        account_number,
        kind,
        amount,
        resulting_balance,
    ))
}

fn field<'a>(raw: &'a str, label: &str) -> Result<&'a str> {
    raw.trim()
        .strip_prefix(label)
        .ok_or_else(|| anyhow!("Expected '{}' in field {:?}", label, raw))
}

impl fmt::Display for LedgerFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LedgerFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" | "jsonl" => Ok(LedgerFormat::Json),
            "legacy" | "text" => Ok(LedgerFormat::Legacy),
            _ => Err(format!("unknown ledger format '{}' (expected json or legacy)", s)),
        }
    }
}
