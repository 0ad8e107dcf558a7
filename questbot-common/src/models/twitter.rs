use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A cached positive Twitter check for a (user, task) pair.
///
/// The read API is severely rate-limited, so a confirmed action is
/// remembered for 24 hours and re-verification short-circuits on it.
#[derive(Debug, Serialize, Deserialize, Clone, sqlx::FromRow)]
pub struct TwitterVerification {
    pub twitter_verification_id: Uuid,
    pub user_id: Uuid,
    pub task_id: Uuid,
    pub action: String,
    pub twitter_username: String,
    pub verified_at: DateTime<Utc>,
}

impl TwitterVerification {
    pub const TTL_HOURS: i64 = 24;

    pub fn new(user_id: Uuid, task_id: Uuid, action: &str, twitter_username: &str) -> Self {
        Self {
            twitter_verification_id: Uuid::new_v4(),
            user_id,
            task_id,
            action: action.to_string(),
            twitter_username: twitter_username.to_string(),
            verified_at: Utc::now(),
        }
    }

    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now - self.verified_at < Duration::hours(Self::TTL_HOURS)
    }
}
