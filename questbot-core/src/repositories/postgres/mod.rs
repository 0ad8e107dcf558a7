// questbot-core/src/repositories/postgres/mod.rs

pub mod user;
pub mod task;
pub mod user_task;
pub mod ledger;
pub mod reward;
pub mod user_reward;
pub mod video_view;
pub mod twitter_verification;
pub mod notification;
pub mod admin_user;

pub use user::PostgresUserRepository;
pub use task::PostgresTaskRepository;
pub use user_task::PostgresUserTaskRepository;
pub use ledger::PostgresLedgerRepository;
pub use reward::PostgresRewardRepository;
pub use user_reward::PostgresUserRewardRepository;
pub use video_view::PostgresVideoViewRepository;
pub use twitter_verification::PostgresTwitterVerificationRepository;
pub use notification::PostgresNotificationRepository;
pub use admin_user::PostgresAdminUserRepository;
