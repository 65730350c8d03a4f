mod common;

use anyhow::Result;
use bankbook::application::AppError;
use bankbook::domain::{AccountError, AccountKind, InsufficientFunds, TransactionKind, Violation};
use common::{BUSINESS, CHECKING, SAVINGS, StandardAccounts, money, test_service};
use rust_decimal::Decimal;

#[test]
fn test_every_success_writes_one_matching_record() -> Result<()> {
    let (mut service, _temp) = test_service()?;
    StandardAccounts::create(&mut service)?;

    let receipts = vec![
        service.deposit(SAVINGS, money(250))?,
        service.withdraw(CHECKING, money(140))?,
        service.withdraw(BUSINESS, money(800))?,
    ];

    let history = service.all_history()?;
    assert_eq!(history.len(), 3);
    for (receipt, record) in receipts.iter().zip(&history) {
        assert!(receipt.persisted);
        assert_eq!(&receipt.record, record);
    }

    assert_eq!(history[0].resulting_balance, money(1250));
    assert_eq!(history[1].resulting_balance, money(-45));
    assert_eq!(history[1].amount, money(140), "fee is not part of the amount");
    assert_eq!(history[2].kind, TransactionKind::Withdrawal);

    for (number, record) in [(SAVINGS, &history[0]), (CHECKING, &history[1]), (BUSINESS, &history[2])] {
        assert_eq!(service.describe_account(number)?.balance, record.resulting_balance);
    }

    Ok(())
}

#[test]
fn test_failures_write_nothing() -> Result<()> {
    let (mut service, _temp) = test_service()?;
    StandardAccounts::create(&mut service)?;

    assert!(service.deposit(SAVINGS, money(0)).is_err());
    assert!(service.deposit(CHECKING, money(-5)).is_err());
    assert!(service.withdraw(SAVINGS, money(5000)).is_err());
    assert!(service.withdraw(CHECKING, money(146)).is_err());
    assert!(service.withdraw(BUSINESS, money(1001)).is_err());
    assert!(service.deposit(999, money(10)).is_err());

    assert!(service.all_history()?.is_empty());
    assert_eq!(service.describe_account(SAVINGS)?.balance, money(1000));
    assert_eq!(service.describe_account(CHECKING)?.balance, money(100));
    assert_eq!(service.describe_account(BUSINESS)?.balance, money(5000));

    Ok(())
}

#[test]
fn test_savings_withdrawal_limit_is_chained() -> Result<()> {
    let (mut service, _temp) = test_service()?;
    StandardAccounts::create(&mut service)?;

    service.withdraw(SAVINGS, money(10))?;
    service.withdraw(SAVINGS, money(10))?;

    let err = service.withdraw(SAVINGS, money(1)).unwrap_err();
    let account_err = err.account_error().expect("account rule rejection");
    assert!(account_err.is_policy_violation());
    assert_eq!(
        account_err.cause(),
        Some(&InsufficientFunds::NoWithdrawalsRemaining)
    );

    // The source chain is what the shell prints as the cause
    let source = std::error::Error::source(&err).expect("chained cause");
    assert_eq!(source.to_string(), "no withdrawals remaining this period");

    assert_eq!(service.history(SAVINGS)?.len(), 2);
    Ok(())
}

#[test]
fn test_savings_plain_shortfall_is_unchained() -> Result<()> {
    let (mut service, _temp) = test_service()?;
    StandardAccounts::create(&mut service)?;

    let err = service.withdraw(SAVINGS, money(1500)).unwrap_err();
    assert!(matches!(
        err,
        AppError::Account(AccountError::InsufficientFunds(InsufficientFunds::Balance { .. }))
    ));
    assert!(std::error::Error::source(&err).is_none());

    Ok(())
}

#[test]
fn test_checking_overdraft_boundary() -> Result<()> {
    let (mut service, _temp) = test_service()?;
    StandardAccounts::create(&mut service)?;

    let err = service.withdraw(CHECKING, money(146)).unwrap_err();
    assert!(matches!(
        err,
        AppError::Account(AccountError::InvalidOperation {
            violation: Violation::OverdraftLimitExceeded { .. },
            cause: Some(InsufficientFunds::Overdraft { .. }),
        })
    ));

    let receipt = service.withdraw(CHECKING, money(140))?;
    assert_eq!(receipt.record.resulting_balance, money(-45));
    assert!(service.describe_account(CHECKING)?.is_overdrawn());

    Ok(())
}

#[test]
fn test_business_daily_limit() -> Result<()> {
    let (mut service, _temp) = test_service()?;
    StandardAccounts::create(&mut service)?;

    service.withdraw(BUSINESS, money(800))?;

    let err = service.withdraw(BUSINESS, money(250)).unwrap_err();
    assert_eq!(
        err.account_error().and_then(|e| e.cause()),
        Some(&InsufficientFunds::DailyAllowance {
            remaining: money(200)
        })
    );

    service.withdraw(BUSINESS, money(150))?;
    match service.describe_account(BUSINESS)?.kind {
        AccountKind::Business(terms) => assert_eq!(terms.withdrawn_today(), money(950)),
        other => panic!("expected business account, got {}", other),
    }

    Ok(())
}

#[test]
fn test_interest_records_only_when_credited() -> Result<()> {
    let (mut service, _temp) = test_service()?;
    StandardAccounts::create(&mut service)?;

    let savings = service.accrue_interest(SAVINGS)?;
    assert_eq!(savings.interest, money(20));
    assert_eq!(savings.balance, money(1020));
    let receipt = savings.receipt.expect("savings accrues");
    assert_eq!(receipt.record.kind, TransactionKind::Interest);
    assert_eq!(receipt.record.resulting_balance, money(1020));

    let checking = service.accrue_interest(CHECKING)?;
    assert_eq!(checking.interest, Decimal::ZERO);
    assert!(checking.receipt.is_none());
    assert_eq!(service.describe_account(CHECKING)?.balance, money(100));

    let business = service.accrue_interest(BUSINESS)?;
    assert_eq!(business.interest, money(25));

    assert_eq!(service.all_history()?.len(), 2);
    assert!(service.history(CHECKING)?.is_empty());

    Ok(())
}

#[test]
fn test_business_daily_limit_precedes_balance() -> Result<()> {
    let (mut service, _temp) = test_service()?;
    service.open_account(bankbook::domain::Account::business(
        7,
        "Small Co",
        money(1000),
        bankbook::domain::BusinessTerms::new("S.A.S.", 42, money(1000)),
    ))?;
    service.withdraw(7, money(900))?;

    let err = service.withdraw(7, money(200)).unwrap_err();
    let account_err = err.account_error().expect("account rule rejection");
    assert!(matches!(
        account_err,
        AccountError::InvalidOperation {
            violation: Violation::DailyLimitExceeded { .. },
            ..
        }
    ));
    assert_eq!(
        account_err.cause(),
        Some(&InsufficientFunds::DailyAllowance {
            remaining: money(100)
        })
    );
    assert_eq!(service.history(7)?.len(), 1);

    Ok(())
}

#[test]
fn test_interest_on_unknown_account() -> Result<()> {
    let (mut service, _temp) = test_service()?;

    let err = service.accrue_interest(42).unwrap_err();
    assert!(matches!(err, AppError::AccountNotFound(42)));
    assert_eq!(err.to_string(), "Account not found: 42");

    Ok(())
}

#[test]
fn test_reset_operations() -> Result<()> {
    let (mut service, _temp) = test_service()?;
    StandardAccounts::create(&mut service)?;

    service.withdraw(SAVINGS, money(1))?;
    service.withdraw(SAVINGS, money(1))?;
    assert!(service.withdraw(SAVINGS, money(1)).is_err());
    service.reset_withdrawals(SAVINGS)?;
    service.withdraw(SAVINGS, money(1))?;

    service.withdraw(BUSINESS, money(1000))?;
    assert!(service.withdraw(BUSINESS, money(1)).is_err());
    assert_eq!(service.start_new_day(), 1);
    service.withdraw(BUSINESS, money(1))?;
    service.reset_daily_limit(BUSINESS)?;

    assert!(matches!(
        service.reset_withdrawals(CHECKING),
        Err(AppError::UnsupportedOperation { number: CHECKING, .. })
    ));
    assert!(matches!(
        service.reset_daily_limit(SAVINGS),
        Err(AppError::UnsupportedOperation { number: SAVINGS, .. })
    ));
    assert!(matches!(
        service.reset_daily_limit(999),
        Err(AppError::AccountNotFound(999))
    ));

    Ok(())
}
