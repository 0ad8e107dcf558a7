use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A quest: a unit of user-completable work with a points reward.
///
/// `task_type` is the strategy discriminator (`twitter_follow`,
/// `telegram_join_group`, `youtube_watch`, `daily_checkin`,
/// `manual_review`, ...). Strategy-specific parameters live in
/// `verification_data`; each strategy deserializes its own typed
/// config out of it, and admin task creation validates the config
/// up front. Deletion is soft (`is_active = false`).
#[derive(Debug, Serialize, Deserialize, Clone, sqlx::FromRow)]
pub struct Task {
    pub task_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub task_type: String,
    pub platform: Option<String>,
    pub url: Option<String>,
    pub points_reward: i64,
    pub is_bonus: bool,
    pub is_active: bool,
    pub verification_required: bool,
    pub verification_data: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// The `method` field inside `verification_data`, if any.
    pub fn verification_method(&self) -> Option<&str> {
        self.verification_data
            .as_ref()
            .and_then(|v| v.get("method"))
            .and_then(|m| m.as_str())
    }

    pub fn platform_is(&self, name: &str) -> bool {
        self.platform
            .as_deref()
            .map(|p| p.eq_ignore_ascii_case(name))
            .unwrap_or(false)
    }
}
