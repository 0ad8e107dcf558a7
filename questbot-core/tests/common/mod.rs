#![allow(dead_code)]

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use questbot_common::models::task::Task;
use questbot_common::models::user::User;
use questbot_common::models::verification::{FailureReason, VerificationOutcome};
use questbot_core::platforms::telegram::TelegramApi;
use questbot_core::platforms::twitter::TwitterApi;
use questbot_core::services::verification::{
    DailyCheckinQuest, TelegramQuest, TwitterQuest, VerificationEngine, YouTubeQuest,
};
use questbot_core::services::{CompletionRecorder, PointsLedger};
use questbot_core::test_utils::InMemoryStore;

pub struct Harness {
    pub store: Arc<InMemoryStore>,
    pub engine: VerificationEngine,
}

pub fn harness(
    twitter_api: Arc<dyn TwitterApi + Send + Sync>,
    telegram_api: Arc<dyn TelegramApi + Send + Sync>,
) -> Harness {
    let store = Arc::new(InMemoryStore::new());
    let ledger = PointsLedger::new(store.clone());
    let recorder = CompletionRecorder::new(store.clone(), store.clone(), ledger);
    let engine = VerificationEngine::new(
        store.clone(),
        recorder,
        TwitterQuest::new(twitter_api, store.clone(), store.clone()),
        TelegramQuest::new(telegram_api),
        YouTubeQuest::new(store.clone()),
        DailyCheckinQuest::new(store.clone()),
    );
    Harness { store, engine }
}

pub fn make_user(telegram_id: i64, username: Option<&str>) -> User {
    User::new(telegram_id, username, Some("Test"), None)
}

pub fn make_task(task_type: &str, points: i64, data: Option<serde_json::Value>) -> Task {
    let now = Utc::now();
    Task {
        task_id: Uuid::new_v4(),
        title: format!("{task_type} quest"),
        description: None,
        task_type: task_type.to_string(),
        platform: None,
        url: None,
        points_reward: points,
        is_bonus: false,
        is_active: true,
        verification_required: true,
        verification_data: data,
        created_at: now,
        updated_at: now,
    }
}

pub fn failure_reason(outcome: &VerificationOutcome) -> Option<FailureReason> {
    match outcome {
        VerificationOutcome::Failure { reason, .. } => Some(*reason),
        _ => None,
    }
}
