mod common;

use commerce_core::domain::account::{Account, TransactionKind, TransactionStatus};
use commerce_core::domain::ports::CommerceStore;
use commerce_core::error::CommerceError;
use uuid::Uuid;

#[tokio::test]
async fn test_deposit_creates_one_success_row() {
    let ctx = common::context();
    let account = ctx.ledger.create_account(Uuid::new_v4()).await.unwrap();

    let record = ctx
        .ledger
        .deposit(account.id, 500, "initial top up")
        .await
        .unwrap();
    assert_eq!(record.status, TransactionStatus::Success);
    assert_eq!(record.amount, 500);
    assert_eq!(record.kind, TransactionKind::Deposit);

    let balance = ctx.ledger.get_account(account.id).await.unwrap().balance;
    assert_eq!(balance, 500);

    let records = ctx.store.get_money_transactions(account.id).await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].id, record.id);
    assert_eq!(records[0].status, TransactionStatus::Success);
}

#[tokio::test]
async fn test_balance_is_cumulative_across_kinds() {
    let ctx = common::context();
    let account = ctx.ledger.create_account(Uuid::new_v4()).await.unwrap();

    ctx.ledger.deposit(account.id, 1000, "pay in").await.unwrap();
    ctx.ledger.withdraw(account.id, 300, "pay out").await.unwrap();
    ctx.ledger.deposit(account.id, 50, "refund").await.unwrap();

    assert_eq!(ctx.ledger.get_account(account.id).await.unwrap().balance, 750);

    let records = ctx.store.get_money_transactions(account.id).await.unwrap();
    assert_eq!(records.len(), 3);
    assert!(records
        .iter()
        .all(|record| record.status == TransactionStatus::Success));
}

#[tokio::test]
async fn test_overdraw_fails_and_preserves_balance() {
    let ctx = common::context();
    let account = ctx.ledger.create_account(Uuid::new_v4()).await.unwrap();
    ctx.ledger.deposit(account.id, 200, "seed").await.unwrap();

    let err = ctx
        .ledger
        .withdraw(account.id, 201, "overdraw")
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        CommerceError::InsufficientBalance {
            available: 200,
            requested: 201,
        }
    ));
    assert_eq!(ctx.ledger.get_account(account.id).await.unwrap().balance, 200);

    // The failed attempt is still recorded as an audit artifact.
    let records = ctx.store.get_money_transactions(account.id).await.unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[1].status, TransactionStatus::Failed);
    assert_eq!(records[1].amount, 201);
}

#[tokio::test]
async fn test_withdraw_exact_balance_allowed() {
    let ctx = common::context();
    let account = ctx.ledger.create_account(Uuid::new_v4()).await.unwrap();
    ctx.ledger.deposit(account.id, 75, "seed").await.unwrap();

    ctx.ledger.withdraw(account.id, 75, "drain").await.unwrap();
    assert_eq!(ctx.ledger.get_account(account.id).await.unwrap().balance, 0);
}

#[tokio::test]
async fn test_validation_failures_touch_nothing() {
    let ctx = common::context();
    let account = ctx.ledger.create_account(Uuid::new_v4()).await.unwrap();

    assert!(matches!(
        ctx.ledger.deposit(account.id, 0, "zero").await.unwrap_err(),
        CommerceError::InvalidAmount
    ));
    assert!(matches!(
        ctx.ledger.withdraw(account.id, -4, "negative").await.unwrap_err(),
        CommerceError::InvalidAmount
    ));

    assert_eq!(ctx.ledger.get_account(account.id).await.unwrap().balance, 0);
    assert!(ctx
        .store
        .get_money_transactions(account.id)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_deposit_overflow_commits_failed_row() {
    let ctx = common::context();
    let mut account = Account::new(Uuid::new_v4());
    account.balance = i64::MAX - 5;
    ctx.store.insert_account(account.clone()).await.unwrap();

    let err = ctx
        .ledger
        .deposit(account.id, 10, "tips over")
        .await
        .unwrap_err();
    assert!(matches!(err, CommerceError::Storage(_)));

    // The balance never wraps, and the attempt is on record.
    assert_eq!(
        ctx.ledger.get_account(account.id).await.unwrap().balance,
        i64::MAX - 5
    );
    let records = ctx.store.get_money_transactions(account.id).await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].status, TransactionStatus::Failed);
    assert_eq!(records[0].kind, TransactionKind::Deposit);
    assert_eq!(records[0].amount, 10);
}

#[tokio::test]
async fn test_unknown_account_rejected() {
    let ctx = common::context();
    let err = ctx
        .ledger
        .deposit(Uuid::new_v4(), 10, "ghost")
        .await
        .unwrap_err();
    assert!(matches!(err, CommerceError::AccountNotFound));
}
