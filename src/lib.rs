pub mod application;
pub mod cli;
pub mod domain;
pub mod storage;

pub use application::BankingService;
pub use domain::*;
pub use storage::{LedgerConfig, LedgerFormat, TransactionLedger};
