//! questbot-server/src/context.rs
//!
//! The global server context: database, repositories, platform clients
//! and the services the routes call into. Built once at startup; no
//! mutable feature flags, capabilities are fixed at wiring time.

use std::env;
use std::sync::Arc;

use tracing::{info, warn};

use questbot_common::traits::repository_traits::{
    AdminUserRepository, NotificationRepository, RewardRepository, TaskRepository,
    UserRepository, UserRewardRepository, UserTaskRepository,
};
use questbot_core::db::Database;
use questbot_core::platforms::telegram::TelegramBotClient;
use questbot_core::platforms::twitter::TwitterApiClient;
use questbot_core::repositories::postgres::{
    PostgresAdminUserRepository, PostgresLedgerRepository, PostgresNotificationRepository,
    PostgresRewardRepository, PostgresTaskRepository, PostgresTwitterVerificationRepository,
    PostgresUserRepository, PostgresUserRewardRepository, PostgresUserTaskRepository,
    PostgresVideoViewRepository,
};
use questbot_core::services::verification::{
    DailyCheckinQuest, TelegramQuest, TwitterQuest, VerificationEngine, YouTubeQuest,
};
use questbot_core::services::{
    CompletionRecorder, PointsLedger, RedemptionService, UserService,
};
use questbot_core::Error;

use crate::auth::AuthKeys;
use crate::Args;

const DEFAULT_TWITTER_MONTHLY_LIMIT: u32 = 100;

pub struct ServerContext {
    pub db: Database,
    pub auth_keys: AuthKeys,

    pub user_service: UserService,
    pub engine: VerificationEngine,
    pub redemption: RedemptionService,
    pub ledger: PointsLedger,

    // Raw repository handles for routes that read/write directly.
    pub user_repo: Arc<dyn UserRepository + Send + Sync>,
    pub task_repo: Arc<dyn TaskRepository + Send + Sync>,
    pub user_task_repo: Arc<dyn UserTaskRepository + Send + Sync>,
    pub reward_repo: Arc<dyn RewardRepository + Send + Sync>,
    pub user_reward_repo: Arc<dyn UserRewardRepository + Send + Sync>,
    pub notification_repo: Arc<dyn NotificationRepository + Send + Sync>,
    pub admin_repo: Arc<dyn AdminUserRepository + Send + Sync>,
}

impl ServerContext {
    pub async fn new(args: &Args) -> Result<Self, Error> {
        let db_url = args
            .database_url
            .clone()
            .or_else(|| env::var("DATABASE_URL").ok())
            .ok_or_else(|| {
                Error::Validation("DATABASE_URL is not set and --database-url missing".to_string())
            })?;

        let db = Database::new(&db_url).await?;
        if args.no_migrate {
            warn!("Skipping migrations (--no-migrate)");
        } else {
            db.migrate().await?;
        }

        let jwt_secret = env::var("QUESTBOT_JWT_SECRET")
            .map_err(|_| Error::Auth("QUESTBOT_JWT_SECRET is not set".to_string()))?;
        let auth_keys = AuthKeys::new(&jwt_secret);

        let telegram_token = env::var("TELEGRAM_BOT_TOKEN")
            .map_err(|_| Error::Platform("TELEGRAM_BOT_TOKEN is not set".to_string()))?;
        let twitter_bearer = env::var("TWITTER_BEARER_TOKEN").unwrap_or_default();
        let twitter_account_id = env::var("TWITTER_ACCOUNT_ID").unwrap_or_default();
        let twitter_limit = env::var("TWITTER_MONTHLY_LIMIT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_TWITTER_MONTHLY_LIMIT);
        if twitter_bearer.is_empty() {
            warn!("TWITTER_BEARER_TOKEN is empty; Twitter quests will fall back to manual review");
        }

        let telegram_client = Arc::new(TelegramBotClient::new(&telegram_token)?);
        let twitter_client = Arc::new(TwitterApiClient::new(
            &twitter_bearer,
            &twitter_account_id,
            twitter_limit,
        )?);

        let pool = db.pool().clone();
        let user_repo: Arc<dyn UserRepository + Send + Sync> =
            Arc::new(PostgresUserRepository::new(pool.clone()));
        let task_repo: Arc<dyn TaskRepository + Send + Sync> =
            Arc::new(PostgresTaskRepository::new(pool.clone()));
        let user_task_repo: Arc<dyn UserTaskRepository + Send + Sync> =
            Arc::new(PostgresUserTaskRepository::new(pool.clone()));
        let reward_repo: Arc<dyn RewardRepository + Send + Sync> =
            Arc::new(PostgresRewardRepository::new(pool.clone()));
        let user_reward_repo: Arc<dyn UserRewardRepository + Send + Sync> =
            Arc::new(PostgresUserRewardRepository::new(pool.clone()));
        let notification_repo: Arc<dyn NotificationRepository + Send + Sync> =
            Arc::new(PostgresNotificationRepository::new(pool.clone()));
        let admin_repo: Arc<dyn AdminUserRepository + Send + Sync> =
            Arc::new(PostgresAdminUserRepository::new(pool.clone()));
        let ledger_repo = Arc::new(PostgresLedgerRepository::new(pool.clone()));
        let video_view_repo = Arc::new(PostgresVideoViewRepository::new(pool.clone()));
        let twitter_cache_repo = Arc::new(PostgresTwitterVerificationRepository::new(pool.clone()));

        let ledger = PointsLedger::new(ledger_repo);
        let recorder = CompletionRecorder::new(
            user_task_repo.clone(),
            notification_repo.clone(),
            ledger.clone(),
        );
        let engine = VerificationEngine::new(
            user_task_repo.clone(),
            recorder,
            TwitterQuest::new(twitter_client, twitter_cache_repo, user_repo.clone()),
            TelegramQuest::new(telegram_client),
            YouTubeQuest::new(video_view_repo),
            DailyCheckinQuest::new(user_task_repo.clone()),
        );
        let redemption = RedemptionService::new(
            reward_repo.clone(),
            user_reward_repo.clone(),
            notification_repo.clone(),
            ledger.clone(),
        );
        let user_service = UserService::new(user_repo.clone());

        info!("Server context ready");
        Ok(Self {
            db,
            auth_keys,
            user_service,
            engine,
            redemption,
            ledger,
            user_repo,
            task_repo,
            user_task_repo,
            reward_repo,
            user_reward_repo,
            notification_repo,
            admin_repo,
        })
    }
}
