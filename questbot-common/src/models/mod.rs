// File: questbot-common/src/models/mod.rs
pub mod user;
pub mod task;
pub mod user_task;
pub mod points;
pub mod reward;
pub mod video_view;
pub mod twitter;
pub mod notification;
pub mod admin;
pub mod verification;

pub use user::User;
pub use task::Task;
pub use user_task::{UserTask, UserTaskStatus};
pub use points::{PointsBalance, PointsTransaction, TransactionType};
pub use reward::{Reward, UserReward, UserRewardStatus};
pub use video_view::{VideoView, VideoViewStatus};
pub use twitter::TwitterVerification;
pub use notification::Notification;
pub use admin::AdminUser;
pub use verification::{
    FailureReason, FollowupAction, QuestEvidence, TelegramConfig, TimeDelayCodeConfig,
    TwitterAction, TwitterConfig, VerificationOutcome, YouTubeCodeConfig,
};
