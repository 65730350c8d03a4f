use crate::domain::{
    Account, AccountNumber, AccountRegistry, AccountSnapshot, DuplicateAccount, Money,
    TransactionKind, TransactionRecord,
};
use crate::storage::{LedgerConfig, TransactionLedger};

use super::AppError;

/// Application service providing the banking use cases.
/// This is the single context object a client (CLI, tests, another host)
/// constructs once and routes every operation through.
pub struct BankingService {
    registry: AccountRegistry,
    ledger: TransactionLedger,
}

/// Result of a deposit, withdrawal or interest accrual
#[derive(Debug, Clone)]
pub struct TransactionReceipt {
    pub record: TransactionRecord,
    /// False when the ledger write failed. The balance change still stands.
    pub persisted: bool,
}

/// Result of accruing interest on one account
#[derive(Debug, Clone)]
pub struct InterestOutcome {
    pub account_number: AccountNumber,
    /// Zero when the account does not accrue interest
    pub interest: Money,
    pub balance: Money,
    /// Present only when interest was credited
    pub receipt: Option<TransactionReceipt>,
}

impl BankingService {
    /// Create a service over an existing ledger without touching the file.
    pub fn new(ledger: TransactionLedger) -> Self {
        Self {
            registry: AccountRegistry::new(),
            ledger,
        }
    }

    /// Create a service and make sure its ledger file exists.
    pub fn open(config: &LedgerConfig) -> Result<Self, AppError> {
        let ledger = TransactionLedger::from_config(config);
        ledger.initialize()?;
        Ok(Self::new(ledger))
    }

    pub fn ledger(&self) -> &TransactionLedger {
        &self.ledger
    }

    pub fn registry(&self) -> &AccountRegistry {
        &self.registry
    }

    // ========================
    // Account operations
    // ========================

    /// Register a new account. Fails if the number is already taken, or if a
    /// kind that cannot go negative is opened below zero.
    pub fn open_account(&mut self, account: Account) -> Result<AccountSnapshot, AppError> {
        if account.is_overdrawn() && !account.kind().allows_negative_balance() {
            return Err(AppError::NegativeOpeningBalance {
                number: account.number(),
                kind: account.kind().as_str(),
                balance: account.balance(),
            });
        }

        match self.registry.register(account) {
            Ok(account) => {
                tracing::info!(
                    account = account.number(),
                    kind = %account.kind(),
                    "opened account"
                );
                Ok(account.snapshot())
            }
            Err(DuplicateAccount(account)) => Err(AppError::DuplicateAccount(account.number())),
        }
    }

    pub fn describe_account(&self, number: AccountNumber) -> Result<AccountSnapshot, AppError> {
        self.registry
            .find(number)
            .map(Account::snapshot)
            .ok_or(AppError::AccountNotFound(number))
    }

    /// All accounts in the order they were opened.
    pub fn list_accounts(&self) -> Vec<AccountSnapshot> {
        self.registry.all().map(Account::snapshot).collect()
    }

    pub fn account_count(&self) -> usize {
        self.registry.count()
    }

    // ========================
    // Transaction operations
    // ========================

    pub fn deposit(
        &mut self,
        number: AccountNumber,
        amount: Money,
    ) -> Result<TransactionReceipt, AppError> {
        let account = self.account_mut(number)?;
        let deposited = account
            .deposit(amount)
            .inspect_err(|e| tracing::debug!(account = number, error = %e, "deposit rejected"))?;
        let balance = account.balance();

        Ok(self.record(number, TransactionKind::Deposit, deposited, balance))
    }

    pub fn withdraw(
        &mut self,
        number: AccountNumber,
        amount: Money,
    ) -> Result<TransactionReceipt, AppError> {
        let account = self.account_mut(number)?;
        let withdrawn = account
            .withdraw(amount)
            .inspect_err(|e| tracing::debug!(account = number, error = %e, "withdrawal rejected"))?;
        let balance = account.balance();

        Ok(self.record(number, TransactionKind::Withdrawal, withdrawn, balance))
    }

    /// Credit interest. Only a positive credit produces a ledger record.
    pub fn accrue_interest(&mut self, number: AccountNumber) -> Result<InterestOutcome, AppError> {
        let account = self.account_mut(number)?;
        let interest = account
            .accrue_interest()
            .inspect_err(|e| tracing::debug!(account = number, error = %e, "interest rejected"))?;
        let balance = account.balance();

        let receipt = (interest > Money::ZERO)
            .then(|| self.record(number, TransactionKind::Interest, interest, balance));

        Ok(InterestOutcome {
            account_number: number,
            interest,
            balance,
            receipt,
        })
    }

    // ========================
    // Period counters
    // ========================

    /// Give a savings account its full withdrawal allowance back.
    pub fn reset_withdrawals(&mut self, number: AccountNumber) -> Result<(), AppError> {
        if !self.account_mut(number)?.reset_withdrawals() {
            return Err(AppError::UnsupportedOperation {
                number,
                operation: "withdrawal limit reset",
            });
        }
        tracing::info!(account = number, "reset withdrawal count");
        Ok(())
    }

    /// Give a business account its full daily allowance back.
    pub fn reset_daily_limit(&mut self, number: AccountNumber) -> Result<(), AppError> {
        if !self.account_mut(number)?.reset_daily_limit() {
            return Err(AppError::UnsupportedOperation {
                number,
                operation: "daily limit reset",
            });
        }
        tracing::info!(account = number, "reset daily limit");
        Ok(())
    }

    /// Reset the daily allowance of every business account.
    /// Returns how many accounts were reset.
    pub fn start_new_day(&mut self) -> usize {
        let reset = self
            .registry
            .all_mut()
            .map(|account| account.reset_daily_limit())
            .filter(|&reset| reset)
            .count();
        tracing::info!(accounts = reset, "started new day");
        reset
    }

    // ========================
    // History
    // ========================

    /// Ledger records for one account, oldest first.
    pub fn history(&self, number: AccountNumber) -> Result<Vec<TransactionRecord>, AppError> {
        Ok(self
            .ledger
            .query_by_account(number)?
            .collect::<anyhow::Result<Vec<_>>>()?)
    }

    /// Every ledger record, oldest first.
    pub fn all_history(&self) -> Result<Vec<TransactionRecord>, AppError> {
        Ok(self.ledger.query_all()?.collect::<anyhow::Result<Vec<_>>>()?)
    }

    /// Erase the whole ledger. Irreversible.
    pub fn clear_history(&self) -> Result<(), AppError> {
        Ok(self.ledger.clear()?)
    }

    fn account_mut(&mut self, number: AccountNumber) -> Result<&mut Account, AppError> {
        self.registry
            .find_mut(number)
            .ok_or(AppError::AccountNotFound(number))
    }

    /// Append the record for an operation that already changed the balance.
    /// A write failure is logged and reported, never rolled back.
    fn record(
        &self,
        number: AccountNumber,
        kind: TransactionKind,
        amount: Money,
        balance: Money,
    ) -> TransactionReceipt {
        let record = TransactionRecord::new(number, kind, amount, balance);
        let persisted = match self.ledger.append(&record) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(
                    account = number,
                    kind = %kind,
                    error = %format!("{:#}", e),
                    "ledger append failed, balance change is not durable"
                );
                false
            }
        };
        TransactionReceipt { record, persisted }
    }
}
