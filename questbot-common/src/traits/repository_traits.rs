use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::Error;
use crate::models::notification::Notification;
use crate::models::points::{PointsBalance, PointsTransaction, TransactionType};
use crate::models::reward::{Reward, UserReward};
use crate::models::task::Task;
use crate::models::twitter::TwitterVerification;
use crate::models::user::User;
use crate::models::user_task::{UserTask, UserTaskStatus};
use crate::models::video_view::{VideoView, VideoViewStatus};
use crate::models::admin::AdminUser;

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, user: &User) -> Result<(), Error>;
    async fn get(&self, user_id: Uuid) -> Result<Option<User>, Error>;
    async fn get_by_telegram_id(&self, telegram_id: i64) -> Result<Option<User>, Error>;
    async fn update(&self, user: &User) -> Result<(), Error>;
    async fn list(&self, offset: i64, limit: i64) -> Result<Vec<User>, Error>;
    /// Top non-banned users ordered by spendable points.
    async fn leaderboard(&self, limit: i64) -> Result<Vec<User>, Error>;
    async fn set_banned(&self, user_id: Uuid, banned: bool) -> Result<(), Error>;
    async fn list_active_ids(&self) -> Result<Vec<Uuid>, Error>;
    async fn count(&self) -> Result<i64, Error>;
}

#[async_trait]
pub trait TaskRepository: Send + Sync {
    async fn create(&self, task: &Task) -> Result<(), Error>;
    async fn get(&self, task_id: Uuid) -> Result<Option<Task>, Error>;
    async fn update(&self, task: &Task) -> Result<(), Error>;
    async fn list(&self, active_only: bool) -> Result<Vec<Task>, Error>;
    async fn soft_delete(&self, task_id: Uuid) -> Result<(), Error>;
    async fn count_active(&self) -> Result<i64, Error>;
}

#[async_trait]
pub trait UserTaskRepository: Send + Sync {
    async fn get(&self, user_task_id: Uuid) -> Result<Option<UserTask>, Error>;
    async fn get_for_pair(&self, user_id: Uuid, task_id: Uuid) -> Result<Option<UserTask>, Error>;
    /// Inserts the record, or updates the existing row for the same
    /// (user, task) pair in place. At most one row per pair, ever.
    async fn upsert(&self, record: &UserTask) -> Result<UserTask, Error>;
    async fn update(&self, record: &UserTask) -> Result<(), Error>;
    async fn list_by_status(
        &self,
        status: Option<UserTaskStatus>,
        limit: i64,
    ) -> Result<Vec<UserTask>, Error>;
    async fn count_by_status(&self, status: UserTaskStatus) -> Result<i64, Error>;
}

#[async_trait]
pub trait LedgerRepository: Send + Sync {
    /// Atomically applies a signed amount to the user's balance and appends
    /// the transaction row. Returns `None` when a debit would take the
    /// balance below zero (nothing is written in that case). Positive
    /// amounts of earning types also grow `total_earned_points`.
    async fn apply(
        &self,
        user_id: Uuid,
        amount: i64,
        transaction_type: TransactionType,
        reference_id: Option<Uuid>,
        description: Option<&str>,
    ) -> Result<Option<PointsBalance>, Error>;
    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<PointsTransaction>, Error>;
    /// Sum of all positive `earned` amounts, for admin stats.
    async fn total_points_distributed(&self) -> Result<i64, Error>;
}

#[async_trait]
pub trait RewardRepository: Send + Sync {
    async fn create(&self, reward: &Reward) -> Result<(), Error>;
    async fn get(&self, reward_id: Uuid) -> Result<Option<Reward>, Error>;
    async fn update(&self, reward: &Reward) -> Result<(), Error>;
    async fn list(&self, active_only: bool) -> Result<Vec<Reward>, Error>;
    /// Atomically bumps `quantity_claimed`, refusing when stock is set and
    /// exhausted. Returns whether the claim succeeded.
    async fn claim_stock(&self, reward_id: Uuid) -> Result<bool, Error>;
    /// Compensation for a claim whose follow-up step failed.
    async fn release_stock(&self, reward_id: Uuid) -> Result<(), Error>;
}

#[async_trait]
pub trait UserRewardRepository: Send + Sync {
    async fn insert(&self, user_reward: &UserReward) -> Result<(), Error>;
    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<UserReward>, Error>;
    async fn count(&self) -> Result<i64, Error>;
}

#[async_trait]
pub trait VideoViewRepository: Send + Sync {
    async fn insert(&self, view: &VideoView) -> Result<(), Error>;
    /// The latest non-terminal (`watching`) session for the pair, if any.
    async fn get_open(&self, user_id: Uuid, task_id: Uuid) -> Result<Option<VideoView>, Error>;
    /// Most recent session regardless of status.
    async fn get_latest(&self, user_id: Uuid, task_id: Uuid) -> Result<Option<VideoView>, Error>;
    /// Atomically increments the attempt counter; returns the new count.
    async fn increment_attempts(&self, video_view_id: Uuid) -> Result<i32, Error>;
    async fn set_status(
        &self,
        video_view_id: Uuid,
        status: VideoViewStatus,
        completed_at: Option<DateTime<Utc>>,
    ) -> Result<(), Error>;
}

#[async_trait]
pub trait TwitterVerificationRepository: Send + Sync {
    async fn get_for_pair(
        &self,
        user_id: Uuid,
        task_id: Uuid,
    ) -> Result<Option<TwitterVerification>, Error>;
    async fn upsert(&self, verification: &TwitterVerification) -> Result<(), Error>;
}

#[async_trait]
pub trait NotificationRepository: Send + Sync {
    async fn insert(&self, notification: &Notification) -> Result<(), Error>;
    async fn list_for_user(
        &self,
        user_id: Uuid,
        unread_only: bool,
    ) -> Result<Vec<Notification>, Error>;
}

#[async_trait]
pub trait AdminUserRepository: Send + Sync {
    async fn create(&self, admin: &AdminUser) -> Result<(), Error>;
    async fn get_by_username(&self, username: &str) -> Result<Option<AdminUser>, Error>;
    async fn touch_last_login(&self, admin_user_id: Uuid) -> Result<(), Error>;
}
