use std::collections::HashMap;

use thiserror::Error;

use super::{Account, AccountNumber};

/// In-memory set of accounts, unique by number, enumerated in registration
/// order. The registry owns its accounts for the lifetime of the process.
#[derive(Debug, Default)]
pub struct AccountRegistry {
    accounts: Vec<Account>,
    index: HashMap<AccountNumber, usize>,
}

/// Registration was refused because the number is taken. The rejected
/// account is handed back untouched.
#[derive(Error, Debug)]
#[error("account {} already exists", .0.number())]
pub struct DuplicateAccount(pub Account);

impl AccountRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, account: Account) -> Result<&mut Account, DuplicateAccount> {
        let number = account.number();
        if self.index.contains_key(&number) {
            return Err(DuplicateAccount(account));
        }

        let position = self.accounts.len();
        self.accounts.push(account);
        self.index.insert(number, position);
        Ok(&mut self.accounts[position])
    }

    pub fn find(&self, number: AccountNumber) -> Option<&Account> {
        self.index.get(&number).map(|&i| &self.accounts[i])
    }

    pub fn find_mut(&mut self, number: AccountNumber) -> Option<&mut Account> {
        let position = *self.index.get(&number)?;
        self.accounts.get_mut(position)
    }

    pub fn contains(&self, number: AccountNumber) -> bool {
        self.index.contains_key(&number)
    }

    pub fn count(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    pub fn all(&self) -> impl Iterator<Item = &Account> {
        self.accounts.iter()
    }

    pub fn all_mut(&mut self) -> impl Iterator<Item = &mut Account> {
        self.accounts.iter_mut()
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;
    use crate::domain::{BusinessTerms, CheckingTerms, SavingsTerms};

    fn savings(number: AccountNumber, holder: &str) -> Account {
        Account::savings(number, holder, Decimal::from(100), SavingsTerms::new(Decimal::new(2, 2), "monthly", 3))
    }

    #[test]
    fn test_register_and_find() {
        let mut registry = AccountRegistry::new();
        assert!(registry.is_empty());

        registry.register(savings(1, "Ana")).unwrap();
        registry
            .register(Account::checking(2, "Luis", Decimal::ZERO, CheckingTerms::new(Decimal::ONE, Decimal::TEN, 1)))
            .unwrap();

        assert_eq!(registry.count(), 2);
        assert_eq!(registry.find(1).map(|a| a.holder()), Some("Ana"));
        assert_eq!(registry.find(2).map(|a| a.holder()), Some("Luis"));
        assert!(registry.find(3).is_none());
        assert!(registry.contains(2));
    }

    #[test]
    fn test_duplicate_number_is_rejected() {
        let mut registry = AccountRegistry::new();
        registry.register(savings(7, "Ana")).unwrap();

        let err = registry.register(savings(7, "Impostor")).unwrap_err();
        assert_eq!(err.0.holder(), "Impostor");
        assert_eq!(err.to_string(), "account 7 already exists");
        assert_eq!(registry.count(), 1);
        assert_eq!(registry.find(7).unwrap().holder(), "Ana");
    }

    #[test]
    fn test_all_preserves_registration_order() {
        let mut registry = AccountRegistry::new();
        for number in [30, 10, 20] {
            registry.register(savings(number, "Holder")).unwrap();
        }

        let numbers: Vec<_> = registry.all().map(|a| a.number()).collect();
        assert_eq!(numbers, vec![30, 10, 20]);
    }

    #[test]
    fn test_mutation_through_registry_is_visible() {
        let mut registry = AccountRegistry::new();
        registry
            .register(Account::business(5, "Acme", Decimal::from(500), BusinessTerms::new("Ltda.", 1, Decimal::from(100))))
            .unwrap();

        registry.find_mut(5).unwrap().deposit(Decimal::from(50)).unwrap();
        for account in registry.all_mut() {
            account.accrue_interest().unwrap();
        }

        assert_eq!(registry.find(5).unwrap().balance(), Decimal::new(552750, 3));
    }
}
