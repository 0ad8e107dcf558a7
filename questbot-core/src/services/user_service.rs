// questbot-core/src/services/user_service.rs

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use questbot_common::models::user::User;
use questbot_common::traits::repository_traits::UserRepository;
use questbot_common::Error;

pub struct UserService {
    user_repo: Arc<dyn UserRepository + Send + Sync>,
}

impl UserService {
    pub fn new(user_repo: Arc<dyn UserRepository + Send + Sync>) -> Self {
        Self { user_repo }
    }

    /// Registration is idempotent: the bot calls this on every /start.
    /// Profile fields are refreshed when Telegram reports new values.
    pub async fn get_or_create(
        &self,
        telegram_id: i64,
        username: Option<&str>,
        first_name: Option<&str>,
        last_name: Option<&str>,
    ) -> Result<User, Error> {
        if let Some(mut existing) = self.user_repo.get_by_telegram_id(telegram_id).await? {
            let incoming_username = username.map(String::from);
            let incoming_first = first_name.map(String::from);
            let incoming_last = last_name.map(String::from);
            let changed = (incoming_username.is_some() && existing.username != incoming_username)
                || (incoming_first.is_some() && existing.first_name != incoming_first)
                || (incoming_last.is_some() && existing.last_name != incoming_last);
            if changed {
                existing.username = incoming_username.or(existing.username);
                existing.first_name = incoming_first.or(existing.first_name);
                existing.last_name = incoming_last.or(existing.last_name);
                self.user_repo.update(&existing).await?;
            }
            return Ok(existing);
        }

        let user = User::new(telegram_id, username, first_name, last_name);
        self.user_repo.create(&user).await?;
        info!("Registered user {} (telegram_id {})", user.user_id, telegram_id);
        Ok(user)
    }

    pub async fn get_by_telegram_id(&self, telegram_id: i64) -> Result<Option<User>, Error> {
        self.user_repo.get_by_telegram_id(telegram_id).await
    }

    pub async fn get(&self, user_id: Uuid) -> Result<Option<User>, Error> {
        self.user_repo.get(user_id).await
    }

    pub async fn list(&self, offset: i64, limit: i64) -> Result<Vec<User>, Error> {
        self.user_repo.list(offset, limit).await
    }

    pub async fn leaderboard(&self, limit: i64) -> Result<Vec<User>, Error> {
        self.user_repo.leaderboard(limit).await
    }

    pub async fn set_banned(&self, user_id: Uuid, banned: bool) -> Result<(), Error> {
        info!("Setting banned = {banned} for user {user_id}");
        self.user_repo.set_banned(user_id, banned).await
    }
}
