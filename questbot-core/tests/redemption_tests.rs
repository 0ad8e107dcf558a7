mod common;

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use common::make_user;
use questbot_common::models::reward::Reward;
use questbot_common::models::verification::FailureReason;
use questbot_core::services::{PointsLedger, RedemptionOutcome, RedemptionService};
use questbot_core::test_utils::InMemoryStore;

fn make_reward(cost: i64, quantity: Option<i64>, prefix: Option<&str>) -> Reward {
    let now = Utc::now();
    Reward {
        reward_id: Uuid::new_v4(),
        title: "Sticker pack".to_string(),
        description: None,
        reward_type: "digital".to_string(),
        points_cost: cost,
        quantity_available: quantity,
        quantity_claimed: 0,
        is_active: true,
        image_url: None,
        code_prefix: prefix.map(String::from),
        created_at: now,
        updated_at: now,
    }
}

fn service(store: &Arc<InMemoryStore>) -> RedemptionService {
    RedemptionService::new(
        store.clone(),
        store.clone(),
        store.clone(),
        PointsLedger::new(store.clone()),
    )
}

#[tokio::test]
async fn redeeming_debits_points_and_mints_a_code() {
    let store = Arc::new(InMemoryStore::new());
    let svc = service(&store);
    let mut user = make_user(3001, None);
    user.points = 500;
    store.add_user(&user);
    let reward = make_reward(200, Some(10), Some("GIFT"));
    store.add_reward(&reward);

    let outcome = svc.redeem(&user, reward.reward_id).await.unwrap();
    let RedemptionOutcome::Redeemed {
        user_reward,
        balance,
    } = outcome
    else {
        panic!("expected redemption to succeed");
    };
    assert_eq!(balance.points, 300);
    assert!(user_reward.redemption_code.starts_with("GIFT-"));
    assert_eq!(user_reward.redemption_code.len(), "GIFT-".len() + 8);

    assert_eq!(store.reward(reward.reward_id).unwrap().quantity_claimed, 1);
    assert_eq!(store.user_rewards_for(user.user_id).len(), 1);
    assert_eq!(store.notification_count(), 1);
}

#[tokio::test]
async fn stock_is_never_oversold() {
    let store = Arc::new(InMemoryStore::new());
    let svc = service(&store);
    let reward = make_reward(10, Some(1), None);
    store.add_reward(&reward);

    let mut first = make_user(3002, None);
    first.points = 100;
    store.add_user(&first);
    let mut second = make_user(3003, None);
    second.points = 100;
    store.add_user(&second);

    assert!(matches!(
        svc.redeem(&first, reward.reward_id).await.unwrap(),
        RedemptionOutcome::Redeemed { .. }
    ));
    match svc.redeem(&second, reward.reward_id).await.unwrap() {
        RedemptionOutcome::Refused { reason, .. } => {
            assert_eq!(reason, FailureReason::RewardNotAvailable)
        }
        RedemptionOutcome::Redeemed { .. } => panic!("oversold the reward"),
    }
    assert_eq!(store.reward(reward.reward_id).unwrap().quantity_claimed, 1);
}

#[tokio::test]
async fn insufficient_points_release_the_claimed_stock() {
    let store = Arc::new(InMemoryStore::new());
    let svc = service(&store);
    let mut user = make_user(3004, None);
    user.points = 10;
    store.add_user(&user);
    let reward = make_reward(100, Some(5), None);
    store.add_reward(&reward);

    match svc.redeem(&user, reward.reward_id).await.unwrap() {
        RedemptionOutcome::Refused { reason, .. } => {
            assert_eq!(reason, FailureReason::InsufficientPoints)
        }
        RedemptionOutcome::Redeemed { .. } => panic!("redeemed without points"),
    }
    // Compensation put the claimed unit back.
    assert_eq!(store.reward(reward.reward_id).unwrap().quantity_claimed, 0);
    assert_eq!(store.user(user.user_id).unwrap().points, 10);
    assert_eq!(store.user_rewards_for(user.user_id).len(), 0);
}

#[tokio::test]
async fn inactive_rewards_are_refused() {
    let store = Arc::new(InMemoryStore::new());
    let svc = service(&store);
    let mut user = make_user(3005, None);
    user.points = 1000;
    store.add_user(&user);
    let mut reward = make_reward(100, None, None);
    reward.is_active = false;
    store.add_reward(&reward);

    match svc.redeem(&user, reward.reward_id).await.unwrap() {
        RedemptionOutcome::Refused { reason, .. } => {
            assert_eq!(reason, FailureReason::RewardNotAvailable)
        }
        RedemptionOutcome::Redeemed { .. } => panic!("redeemed an inactive reward"),
    }
    assert_eq!(store.reward(reward.reward_id).unwrap().quantity_claimed, 0);
}
