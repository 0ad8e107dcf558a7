use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A redeemable reward. `quantity_available = None` means unlimited stock;
/// when set, `quantity_claimed` must never exceed it.
#[derive(Debug, Serialize, Deserialize, Clone, sqlx::FromRow)]
pub struct Reward {
    pub reward_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub reward_type: String,
    pub points_cost: i64,
    pub quantity_available: Option<i64>,
    pub quantity_claimed: i64,
    pub is_active: bool,
    pub image_url: Option<String>,
    pub code_prefix: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRewardStatus {
    Pending,
    Delivered,
    Used,
    Expired,
}

impl UserRewardStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRewardStatus::Pending => "pending",
            UserRewardStatus::Delivered => "delivered",
            UserRewardStatus::Used => "used",
            UserRewardStatus::Expired => "expired",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "delivered" => UserRewardStatus::Delivered,
            "used" => UserRewardStatus::Used,
            "expired" => UserRewardStatus::Expired,
            _ => UserRewardStatus::Pending,
        }
    }
}

/// Minted on redemption with a unique `redemption_code`.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct UserReward {
    pub user_reward_id: Uuid,
    pub user_id: Uuid,
    pub reward_id: Uuid,
    pub redemption_code: String,
    pub status: UserRewardStatus,
    pub redeemed_at: DateTime<Utc>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub used_at: Option<DateTime<Utc>>,
}

impl UserReward {
    pub fn new(user_id: Uuid, reward_id: Uuid, redemption_code: String) -> Self {
        Self {
            user_reward_id: Uuid::new_v4(),
            user_id,
            reward_id,
            redemption_code,
            status: UserRewardStatus::Pending,
            redeemed_at: Utc::now(),
            delivered_at: None,
            used_at: None,
        }
    }
}
