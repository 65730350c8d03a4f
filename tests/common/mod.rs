// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use anyhow::Result;
use bankbook::application::BankingService;
use bankbook::domain::{
    Account, AccountNumber, BusinessTerms, CheckingTerms, Money, SavingsTerms,
};
use bankbook::storage::{LedgerConfig, LedgerFormat};
use rust_decimal::Decimal;
use tempfile::TempDir;

pub const SAVINGS: AccountNumber = 100;
pub const CHECKING: AccountNumber = 200;
pub const BUSINESS: AccountNumber = 300;

/// Helper to create a test service with a ledger in a temporary directory
pub fn test_service() -> Result<(BankingService, TempDir)> {
    test_service_with_format(LedgerFormat::Json)
}

pub fn test_service_with_format(format: LedgerFormat) -> Result<(BankingService, TempDir)> {
    let temp_dir = TempDir::new()?;
    let config = LedgerConfig {
        path: temp_dir.path().join("transactions.log"),
        format,
    };
    let service = BankingService::open(&config)?;
    Ok((service, temp_dir))
}

pub fn money(amount: i64) -> Money {
    Decimal::from(amount)
}

/// Test fixture: one account of each kind
pub struct StandardAccounts;

impl StandardAccounts {
    /// Savings 100 (balance 1000, 2%, 2 withdrawals),
    /// Checking 200 (balance 100, fee 5, overdraft 50),
    /// Business 300 (balance 5000, daily limit 1000)
    pub fn create(service: &mut BankingService) -> Result<()> {
        service.open_account(Account::savings(
            SAVINGS,
            "Ana Vargas",
            money(1000),
            SavingsTerms::new(Decimal::new(2, 2), "monthly", 2),
        ))?;
        service.open_account(Account::checking(
            CHECKING,
            "Luis Pardo",
            money(100),
            CheckingTerms::new(money(5), money(50), 4411),
        ))?;
        service.open_account(Account::business(
            BUSINESS,
            "Acme Ltda.",
            money(5000),
            BusinessTerms::new("Ltda.", 900_123_456, money(1000)),
        ))?;
        Ok(())
    }
}
