use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A platform user, anchored on their Telegram numeric id.
///
/// `points` is the spendable balance; `total_earned_points` only ever grows.
/// Users are never hard-deleted, `is_banned` is the kill switch.
#[derive(Debug, Serialize, Deserialize, Clone, sqlx::FromRow)]
pub struct User {
    pub user_id: Uuid,
    pub telegram_id: i64,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub points: i64,
    pub total_earned_points: i64,
    pub is_active: bool,
    pub is_banned: bool,
    pub twitter_username: Option<String>,
    pub twitter_verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(
        telegram_id: i64,
        username: Option<&str>,
        first_name: Option<&str>,
        last_name: Option<&str>,
    ) -> Self {
        let now = Utc::now();
        Self {
            user_id: Uuid::new_v4(),
            telegram_id,
            username: username.map(String::from),
            first_name: first_name.map(String::from),
            last_name: last_name.map(String::from),
            points: 0,
            total_earned_points: 0,
            is_active: true,
            is_banned: false,
            twitter_username: None,
            twitter_verified: false,
            created_at: now,
            updated_at: now,
        }
    }
}
