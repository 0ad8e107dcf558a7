mod common;

use std::sync::Arc;

use common::make_user;
use questbot_common::models::points::TransactionType;
use questbot_common::Error;
use questbot_core::services::PointsLedger;
use questbot_core::test_utils::InMemoryStore;

#[tokio::test]
async fn credits_and_debits_conserve_the_balance() {
    let store = Arc::new(InMemoryStore::new());
    let ledger = PointsLedger::new(store.clone());
    let user = make_user(2001, None);
    store.add_user(&user);

    let balance = ledger
        .credit(user.user_id, 100, TransactionType::Earned, None, None)
        .await
        .unwrap();
    assert_eq!(balance.points, 100);
    assert_eq!(balance.total_earned_points, 100);

    let balance = ledger
        .debit(user.user_id, 30, TransactionType::Spent, None, None)
        .await
        .unwrap()
        .expect("sufficient balance");
    assert_eq!(balance.points, 70);
    // Spending never shrinks the lifetime counter.
    assert_eq!(balance.total_earned_points, 100);

    let history = ledger.history(user.user_id).await.unwrap();
    let sum: i64 = history.iter().map(|t| t.amount).sum();
    assert_eq!(sum, store.user(user.user_id).unwrap().points);
}

#[tokio::test]
async fn debit_beyond_the_balance_writes_nothing() {
    let store = Arc::new(InMemoryStore::new());
    let ledger = PointsLedger::new(store.clone());
    let user = make_user(2002, None);
    store.add_user(&user);

    ledger
        .credit(user.user_id, 20, TransactionType::Earned, None, None)
        .await
        .unwrap();
    assert_eq!(store.transaction_count(), 1);

    let refused = ledger
        .debit(user.user_id, 21, TransactionType::Spent, None, None)
        .await
        .unwrap();
    assert!(refused.is_none());
    assert_eq!(store.transaction_count(), 1);
    assert_eq!(store.user(user.user_id).unwrap().points, 20);
}

#[tokio::test]
async fn negative_amounts_are_rejected() {
    let store = Arc::new(InMemoryStore::new());
    let ledger = PointsLedger::new(store.clone());
    let user = make_user(2003, None);
    store.add_user(&user);

    let err = ledger
        .credit(user.user_id, -5, TransactionType::Earned, None, None)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Validation(_)));

    let err = ledger
        .debit(user.user_id, -5, TransactionType::Spent, None, None)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
    assert_eq!(store.transaction_count(), 0);
}

#[tokio::test]
async fn total_distributed_counts_only_earning_credits() {
    let store = Arc::new(InMemoryStore::new());
    let ledger = PointsLedger::new(store.clone());
    let user = make_user(2004, None);
    store.add_user(&user);

    ledger
        .credit(user.user_id, 100, TransactionType::Earned, None, None)
        .await
        .unwrap();
    ledger
        .credit(user.user_id, 50, TransactionType::Bonus, None, None)
        .await
        .unwrap();
    ledger
        .debit(user.user_id, 40, TransactionType::Spent, None, None)
        .await
        .unwrap();

    assert_eq!(ledger.total_points_distributed().await.unwrap(), 150);
}
