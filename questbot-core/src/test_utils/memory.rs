// questbot-core/src/test_utils/memory.rs

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use questbot_common::models::admin::AdminUser;
use questbot_common::models::notification::Notification;
use questbot_common::models::points::{PointsBalance, PointsTransaction, TransactionType};
use questbot_common::models::reward::{Reward, UserReward};
use questbot_common::models::task::Task;
use questbot_common::models::twitter::TwitterVerification;
use questbot_common::models::user::User;
use questbot_common::models::user_task::{UserTask, UserTaskStatus};
use questbot_common::models::video_view::{VideoView, VideoViewStatus};
use questbot_common::traits::repository_traits::{
    AdminUserRepository, LedgerRepository, NotificationRepository, RewardRepository,
    TaskRepository, TwitterVerificationRepository, UserRepository, UserRewardRepository,
    UserTaskRepository, VideoViewRepository,
};
use questbot_common::Error;

#[derive(Default)]
struct State {
    users: HashMap<Uuid, User>,
    tasks: HashMap<Uuid, Task>,
    user_tasks: Vec<UserTask>,
    transactions: Vec<PointsTransaction>,
    rewards: HashMap<Uuid, Reward>,
    user_rewards: Vec<UserReward>,
    video_views: Vec<VideoView>,
    twitter_verifications: Vec<TwitterVerification>,
    notifications: Vec<Notification>,
    admins: HashMap<Uuid, AdminUser>,
}

#[derive(Default)]
pub struct InMemoryStore {
    state: Mutex<State>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().expect("store mutex poisoned")
    }

    pub fn transaction_count(&self) -> usize {
        self.lock().transactions.len()
    }

    pub fn notification_count(&self) -> usize {
        self.lock().notifications.len()
    }

    // Inherent seeding/peeking helpers. Several repository traits share
    // method names (`create`, `get`, `insert`), so tests use these to
    // stay unambiguous.

    pub fn add_user(&self, user: &User) {
        self.lock().users.insert(user.user_id, user.clone());
    }

    pub fn add_task(&self, task: &Task) {
        self.lock().tasks.insert(task.task_id, task.clone());
    }

    pub fn add_reward(&self, reward: &Reward) {
        self.lock().rewards.insert(reward.reward_id, reward.clone());
    }

    pub fn user(&self, user_id: Uuid) -> Option<User> {
        self.lock().users.get(&user_id).cloned()
    }

    pub fn reward(&self, reward_id: Uuid) -> Option<Reward> {
        self.lock().rewards.get(&reward_id).cloned()
    }

    pub fn user_task_for(&self, user_id: Uuid, task_id: Uuid) -> Option<UserTask> {
        self.lock()
            .user_tasks
            .iter()
            .find(|r| r.user_id == user_id && r.task_id == task_id)
            .cloned()
    }

    pub fn put_user_task(&self, record: &UserTask) {
        let mut state = self.lock();
        if let Some(existing) = state
            .user_tasks
            .iter_mut()
            .find(|r| r.user_task_id == record.user_task_id)
        {
            *existing = record.clone();
        } else {
            state.user_tasks.push(record.clone());
        }
    }

    pub fn add_video_view(&self, view: &VideoView) {
        self.lock().video_views.push(view.clone());
    }

    pub fn latest_view(&self, user_id: Uuid, task_id: Uuid) -> Option<VideoView> {
        self.lock()
            .video_views
            .iter()
            .filter(|v| v.user_id == user_id && v.task_id == task_id)
            .max_by_key(|v| v.started_at)
            .cloned()
    }

    pub fn user_rewards_for(&self, user_id: Uuid) -> Vec<UserReward> {
        self.lock()
            .user_rewards
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn create(&self, user: &User) -> Result<(), Error> {
        self.lock().users.insert(user.user_id, user.clone());
        Ok(())
    }

    async fn get(&self, user_id: Uuid) -> Result<Option<User>, Error> {
        Ok(self.lock().users.get(&user_id).cloned())
    }

    async fn get_by_telegram_id(&self, telegram_id: i64) -> Result<Option<User>, Error> {
        Ok(self
            .lock()
            .users
            .values()
            .find(|u| u.telegram_id == telegram_id)
            .cloned())
    }

    async fn update(&self, user: &User) -> Result<(), Error> {
        self.lock().users.insert(user.user_id, user.clone());
        Ok(())
    }

    async fn list(&self, offset: i64, limit: i64) -> Result<Vec<User>, Error> {
        let mut users: Vec<User> = self.lock().users.values().cloned().collect();
        users.sort_by_key(|u| u.created_at);
        Ok(users
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect())
    }

    async fn leaderboard(&self, limit: i64) -> Result<Vec<User>, Error> {
        let mut users: Vec<User> = self
            .lock()
            .users
            .values()
            .filter(|u| !u.is_banned)
            .cloned()
            .collect();
        users.sort_by(|a, b| b.points.cmp(&a.points));
        users.truncate(limit.max(0) as usize);
        Ok(users)
    }

    async fn set_banned(&self, user_id: Uuid, banned: bool) -> Result<(), Error> {
        let mut state = self.lock();
        let user = state
            .users
            .get_mut(&user_id)
            .ok_or_else(|| Error::NotFound(format!("user {user_id} not found")))?;
        user.is_banned = banned;
        Ok(())
    }

    async fn list_active_ids(&self) -> Result<Vec<Uuid>, Error> {
        Ok(self
            .lock()
            .users
            .values()
            .filter(|u| u.is_active && !u.is_banned)
            .map(|u| u.user_id)
            .collect())
    }

    async fn count(&self) -> Result<i64, Error> {
        Ok(self.lock().users.len() as i64)
    }
}

#[async_trait]
impl TaskRepository for InMemoryStore {
    async fn create(&self, task: &Task) -> Result<(), Error> {
        self.lock().tasks.insert(task.task_id, task.clone());
        Ok(())
    }

    async fn get(&self, task_id: Uuid) -> Result<Option<Task>, Error> {
        Ok(self.lock().tasks.get(&task_id).cloned())
    }

    async fn update(&self, task: &Task) -> Result<(), Error> {
        self.lock().tasks.insert(task.task_id, task.clone());
        Ok(())
    }

    async fn list(&self, active_only: bool) -> Result<Vec<Task>, Error> {
        let mut tasks: Vec<Task> = self
            .lock()
            .tasks
            .values()
            .filter(|t| !active_only || t.is_active)
            .cloned()
            .collect();
        tasks.sort_by_key(|t| t.created_at);
        Ok(tasks)
    }

    async fn soft_delete(&self, task_id: Uuid) -> Result<(), Error> {
        let mut state = self.lock();
        let task = state
            .tasks
            .get_mut(&task_id)
            .ok_or_else(|| Error::NotFound(format!("task {task_id} not found")))?;
        task.is_active = false;
        Ok(())
    }

    async fn count_active(&self) -> Result<i64, Error> {
        Ok(self.lock().tasks.values().filter(|t| t.is_active).count() as i64)
    }
}

#[async_trait]
impl UserTaskRepository for InMemoryStore {
    async fn get(&self, user_task_id: Uuid) -> Result<Option<UserTask>, Error> {
        Ok(self
            .lock()
            .user_tasks
            .iter()
            .find(|r| r.user_task_id == user_task_id)
            .cloned())
    }

    async fn get_for_pair(&self, user_id: Uuid, task_id: Uuid) -> Result<Option<UserTask>, Error> {
        Ok(self
            .lock()
            .user_tasks
            .iter()
            .find(|r| r.user_id == user_id && r.task_id == task_id)
            .cloned())
    }

    async fn upsert(&self, record: &UserTask) -> Result<UserTask, Error> {
        let mut state = self.lock();
        if let Some(existing) = state
            .user_tasks
            .iter_mut()
            .find(|r| r.user_id == record.user_id && r.task_id == record.task_id)
        {
            existing.status = record.status;
            existing.points_earned = record.points_earned;
            if record.proof_url.is_some() {
                existing.proof_url = record.proof_url.clone();
            }
            if record.submission_text.is_some() {
                existing.submission_text = record.submission_text.clone();
            }
            existing.verified_by = record.verified_by;
            existing.verified_at = record.verified_at;
            existing.completed_at = record.completed_at;
            existing.updated_at = Utc::now();
            return Ok(existing.clone());
        }
        state.user_tasks.push(record.clone());
        Ok(record.clone())
    }

    async fn update(&self, record: &UserTask) -> Result<(), Error> {
        let mut state = self.lock();
        if let Some(existing) = state
            .user_tasks
            .iter_mut()
            .find(|r| r.user_task_id == record.user_task_id)
        {
            *existing = record.clone();
        }
        Ok(())
    }

    async fn list_by_status(
        &self,
        status: Option<UserTaskStatus>,
        limit: i64,
    ) -> Result<Vec<UserTask>, Error> {
        Ok(self
            .lock()
            .user_tasks
            .iter()
            .filter(|r| status.map(|s| r.status == s).unwrap_or(true))
            .take(limit.max(0) as usize)
            .cloned()
            .collect())
    }

    async fn count_by_status(&self, status: UserTaskStatus) -> Result<i64, Error> {
        Ok(self
            .lock()
            .user_tasks
            .iter()
            .filter(|r| r.status == status)
            .count() as i64)
    }
}

#[async_trait]
impl LedgerRepository for InMemoryStore {
    async fn apply(
        &self,
        user_id: Uuid,
        amount: i64,
        transaction_type: TransactionType,
        reference_id: Option<Uuid>,
        description: Option<&str>,
    ) -> Result<Option<PointsBalance>, Error> {
        let mut state = self.lock();
        let Some(user) = state.users.get_mut(&user_id) else {
            return Ok(None);
        };
        if user.points + amount < 0 {
            return Ok(None);
        }
        user.points += amount;
        if amount > 0 && transaction_type.counts_as_earned() {
            user.total_earned_points += amount;
        }
        let balance = PointsBalance {
            points: user.points,
            total_earned_points: user.total_earned_points,
        };
        state.transactions.push(PointsTransaction {
            transaction_id: Uuid::new_v4(),
            user_id,
            amount,
            transaction_type,
            reference_id,
            description: description.map(String::from),
            created_at: Utc::now(),
        });
        Ok(Some(balance))
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<PointsTransaction>, Error> {
        Ok(self
            .lock()
            .transactions
            .iter()
            .filter(|t| t.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn total_points_distributed(&self) -> Result<i64, Error> {
        Ok(self
            .lock()
            .transactions
            .iter()
            .filter(|t| t.amount > 0 && t.transaction_type.counts_as_earned())
            .map(|t| t.amount)
            .sum())
    }
}

#[async_trait]
impl RewardRepository for InMemoryStore {
    async fn create(&self, reward: &Reward) -> Result<(), Error> {
        self.lock().rewards.insert(reward.reward_id, reward.clone());
        Ok(())
    }

    async fn get(&self, reward_id: Uuid) -> Result<Option<Reward>, Error> {
        Ok(self.lock().rewards.get(&reward_id).cloned())
    }

    async fn update(&self, reward: &Reward) -> Result<(), Error> {
        self.lock().rewards.insert(reward.reward_id, reward.clone());
        Ok(())
    }

    async fn list(&self, active_only: bool) -> Result<Vec<Reward>, Error> {
        let mut rewards: Vec<Reward> = self
            .lock()
            .rewards
            .values()
            .filter(|r| !active_only || r.is_active)
            .cloned()
            .collect();
        rewards.sort_by_key(|r| r.created_at);
        Ok(rewards)
    }

    async fn claim_stock(&self, reward_id: Uuid) -> Result<bool, Error> {
        let mut state = self.lock();
        let reward = state
            .rewards
            .get_mut(&reward_id)
            .ok_or_else(|| Error::NotFound(format!("reward {reward_id} not found")))?;
        if let Some(available) = reward.quantity_available {
            if reward.quantity_claimed >= available {
                return Ok(false);
            }
        }
        reward.quantity_claimed += 1;
        Ok(true)
    }

    async fn release_stock(&self, reward_id: Uuid) -> Result<(), Error> {
        let mut state = self.lock();
        if let Some(reward) = state.rewards.get_mut(&reward_id) {
            if reward.quantity_claimed > 0 {
                reward.quantity_claimed -= 1;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl UserRewardRepository for InMemoryStore {
    async fn insert(&self, user_reward: &UserReward) -> Result<(), Error> {
        self.lock().user_rewards.push(user_reward.clone());
        Ok(())
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<UserReward>, Error> {
        Ok(self
            .lock()
            .user_rewards
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn count(&self) -> Result<i64, Error> {
        Ok(self.lock().user_rewards.len() as i64)
    }
}

#[async_trait]
impl VideoViewRepository for InMemoryStore {
    async fn insert(&self, view: &VideoView) -> Result<(), Error> {
        self.lock().video_views.push(view.clone());
        Ok(())
    }

    async fn get_open(&self, user_id: Uuid, task_id: Uuid) -> Result<Option<VideoView>, Error> {
        Ok(self
            .lock()
            .video_views
            .iter()
            .filter(|v| {
                v.user_id == user_id
                    && v.task_id == task_id
                    && v.status == VideoViewStatus::Watching
            })
            .max_by_key(|v| v.started_at)
            .cloned())
    }

    async fn get_latest(&self, user_id: Uuid, task_id: Uuid) -> Result<Option<VideoView>, Error> {
        Ok(self
            .lock()
            .video_views
            .iter()
            .filter(|v| v.user_id == user_id && v.task_id == task_id)
            .max_by_key(|v| v.started_at)
            .cloned())
    }

    async fn increment_attempts(&self, video_view_id: Uuid) -> Result<i32, Error> {
        let mut state = self.lock();
        let view = state
            .video_views
            .iter_mut()
            .find(|v| v.video_view_id == video_view_id)
            .ok_or_else(|| Error::NotFound(format!("video view {video_view_id} not found")))?;
        view.code_attempts += 1;
        Ok(view.code_attempts)
    }

    async fn set_status(
        &self,
        video_view_id: Uuid,
        status: VideoViewStatus,
        completed_at: Option<DateTime<Utc>>,
    ) -> Result<(), Error> {
        let mut state = self.lock();
        if let Some(view) = state
            .video_views
            .iter_mut()
            .find(|v| v.video_view_id == video_view_id)
        {
            view.status = status;
            view.completed_at = completed_at;
        }
        Ok(())
    }
}

#[async_trait]
impl TwitterVerificationRepository for InMemoryStore {
    async fn get_for_pair(
        &self,
        user_id: Uuid,
        task_id: Uuid,
    ) -> Result<Option<TwitterVerification>, Error> {
        Ok(self
            .lock()
            .twitter_verifications
            .iter()
            .find(|v| v.user_id == user_id && v.task_id == task_id)
            .cloned())
    }

    async fn upsert(&self, verification: &TwitterVerification) -> Result<(), Error> {
        let mut state = self.lock();
        state
            .twitter_verifications
            .retain(|v| !(v.user_id == verification.user_id && v.task_id == verification.task_id));
        state.twitter_verifications.push(verification.clone());
        Ok(())
    }
}

#[async_trait]
impl NotificationRepository for InMemoryStore {
    async fn insert(&self, notification: &Notification) -> Result<(), Error> {
        self.lock().notifications.push(notification.clone());
        Ok(())
    }

    async fn list_for_user(
        &self,
        user_id: Uuid,
        unread_only: bool,
    ) -> Result<Vec<Notification>, Error> {
        Ok(self
            .lock()
            .notifications
            .iter()
            .filter(|n| n.user_id == user_id && (!unread_only || !n.is_read))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl AdminUserRepository for InMemoryStore {
    async fn create(&self, admin: &AdminUser) -> Result<(), Error> {
        self.lock().admins.insert(admin.admin_user_id, admin.clone());
        Ok(())
    }

    async fn get_by_username(&self, username: &str) -> Result<Option<AdminUser>, Error> {
        Ok(self
            .lock()
            .admins
            .values()
            .find(|a| a.username == username)
            .cloned())
    }

    async fn touch_last_login(&self, admin_user_id: Uuid) -> Result<(), Error> {
        let mut state = self.lock();
        if let Some(admin) = state.admins.get_mut(&admin_user_id) {
            admin.last_login = Some(Utc::now());
        }
        Ok(())
    }
}
