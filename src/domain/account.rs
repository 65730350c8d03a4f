use chrono::{DateTime, Utc};
use serde::Serialize;

use super::error::{ensure_positive, in_range};
use super::{AccountError, BusinessTerms, CheckingTerms, Money, SavingsTerms, TransactionKind};

pub type AccountNumber = u32;

/// The operations every account kind supports. Each kind decides its own
/// validation order and which failures get wrapped as policy violations.
///
/// Implementors receive the balance by mutable reference so that only the
/// owning [`Account`] ever hands it out.
pub(crate) trait TransactionRules {
    /// Shared by every current kind. A kind may override it if its deposit
    /// rules ever diverge.
    fn deposit(&mut self, balance: &mut Money, amount: Money) -> Result<Money, AccountError> {
        ensure_positive(TransactionKind::Deposit, amount)?;
        *balance = in_range(TransactionKind::Deposit, balance.checked_add(amount))?;
        Ok(amount)
    }

    /// Returns the withdrawn amount. Must leave `balance` and any counters
    /// untouched on failure.
    fn withdraw(&mut self, balance: &mut Money, amount: Money) -> Result<Money, AccountError>;

    /// Returns the interest credited; zero means the kind does not accrue.
    /// Must leave `balance` untouched on failure.
    fn accrue_interest(&mut self, balance: &mut Money) -> Result<Money, AccountError>;
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum AccountKind {
    /// Earns interest, limited number of withdrawals per period
    Savings(SavingsTerms),
    /// Per-withdrawal fee, may go negative down to the overdraft limit
    Checking(CheckingTerms),
    /// Daily withdrawal cap, preferential interest rate
    Business(BusinessTerms),
}

impl AccountKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountKind::Savings(_) => "savings",
            AccountKind::Checking(_) => "checking",
            AccountKind::Business(_) => "business",
        }
    }

    /// Only checking accounts may hold a negative balance.
    pub fn allows_negative_balance(&self) -> bool {
        matches!(self, AccountKind::Checking(_))
    }
}

impl std::fmt::Display for AccountKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<SavingsTerms> for AccountKind {
    fn from(terms: SavingsTerms) -> Self {
        AccountKind::Savings(terms)
    }
}

impl From<CheckingTerms> for AccountKind {
    fn from(terms: CheckingTerms) -> Self {
        AccountKind::Checking(terms)
    }
}

impl From<BusinessTerms> for AccountKind {
    fn from(terms: BusinessTerms) -> Self {
        AccountKind::Business(terms)
    }
}

/// A bank account. The balance is private: it changes only through
/// [`deposit`](Account::deposit), [`withdraw`](Account::withdraw) and
/// [`accrue_interest`](Account::accrue_interest).
#[derive(Debug, Clone)]
pub struct Account {
    number: AccountNumber,
    holder: String,
    balance: Money,
    kind: AccountKind,
    opened_at: DateTime<Utc>,
}

impl Account {
    pub fn new(
        number: AccountNumber,
        holder: impl Into<String>,
        opening_balance: Money,
        kind: impl Into<AccountKind>,
    ) -> Self {
        Self {
            number,
            holder: holder.into(),
            balance: opening_balance,
            kind: kind.into(),
            opened_at: Utc::now(),
        }
    }

    pub fn savings(
        number: AccountNumber,
        holder: impl Into<String>,
        opening_balance: Money,
        terms: SavingsTerms,
    ) -> Self {
        Self::new(number, holder, opening_balance, terms)
    }

    pub fn checking(
        number: AccountNumber,
        holder: impl Into<String>,
        opening_balance: Money,
        terms: CheckingTerms,
    ) -> Self {
        Self::new(number, holder, opening_balance, terms)
    }

    pub fn business(
        number: AccountNumber,
        holder: impl Into<String>,
        opening_balance: Money,
        terms: BusinessTerms,
    ) -> Self {
        Self::new(number, holder, opening_balance, terms)
    }

    pub fn number(&self) -> AccountNumber {
        self.number
    }

    pub fn holder(&self) -> &str {
        &self.holder
    }

    pub fn balance(&self) -> Money {
        self.balance
    }

    pub fn kind(&self) -> &AccountKind {
        &self.kind
    }

    pub fn opened_at(&self) -> DateTime<Utc> {
        self.opened_at
    }

    pub fn is_overdrawn(&self) -> bool {
        self.balance < Money::ZERO
    }

    pub fn deposit(&mut self, amount: Money) -> Result<Money, AccountError> {
        let (rules, balance) = self.rules_mut();
        rules.deposit(balance, amount)
    }

    pub fn withdraw(&mut self, amount: Money) -> Result<Money, AccountError> {
        let (rules, balance) = self.rules_mut();
        rules.withdraw(balance, amount)
    }

    pub fn accrue_interest(&mut self) -> Result<Money, AccountError> {
        let (rules, balance) = self.rules_mut();
        rules.accrue_interest(balance)
    }

    /// Start a new withdrawal period. Returns false for kinds without a
    /// withdrawal counter.
    pub fn reset_withdrawals(&mut self) -> bool {
        match &mut self.kind {
            AccountKind::Savings(terms) => {
                terms.reset_withdrawals();
                true
            }
            _ => false,
        }
    }

    /// Start a new day. Returns false for kinds without a daily cap.
    pub fn reset_daily_limit(&mut self) -> bool {
        match &mut self.kind {
            AccountKind::Business(terms) => {
                terms.reset_daily_limit();
                true
            }
            _ => false,
        }
    }

    pub fn snapshot(&self) -> AccountSnapshot {
        AccountSnapshot {
            number: self.number,
            holder: self.holder.clone(),
            balance: self.balance,
            opened_at: self.opened_at,
            kind: self.kind.clone(),
        }
    }

    fn rules_mut(&mut self) -> (&mut dyn TransactionRules, &mut Money) {
        let rules: &mut dyn TransactionRules = match &mut self.kind {
            AccountKind::Savings(terms) => terms,
            AccountKind::Checking(terms) => terms,
            AccountKind::Business(terms) => terms,
        };
        (rules, &mut self.balance)
    }
}

/// Owned copy of an account's state, detached from the registry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccountSnapshot {
    pub number: AccountNumber,
    pub holder: String,
    pub balance: Money,
    pub opened_at: DateTime<Utc>,
    pub kind: AccountKind,
}

impl AccountSnapshot {
    pub fn is_overdrawn(&self) -> bool {
        self.balance < Money::ZERO
    }
}

impl From<&Account> for AccountSnapshot {
    fn from(account: &Account) -> Self {
        account.snapshot()
    }
}
