mod format;
mod ledger;

pub use format::*;
pub use ledger::*;

/// Ledger file used when no path is configured.
pub const DEFAULT_LEDGER_PATH: &str = "transactions.jsonl";
