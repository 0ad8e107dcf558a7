// questbot-core/src/services/verification/mod.rs
//
// The verification engine: guards, strategy dispatch, side effects.
// Expected failures come back as `VerificationOutcome::Failure` values;
// `Err` is reserved for infrastructure faults (database, bugs).

pub mod daily;
pub mod dispatch;
pub mod manual;
pub mod telegram;
pub mod twitter;
pub mod youtube;

use std::sync::Arc;

use tracing::info;

use questbot_common::models::points::PointsBalance;
use questbot_common::models::task::Task;
use questbot_common::models::user::User;
use questbot_common::models::verification::{FailureReason, QuestEvidence, VerificationOutcome};
use questbot_common::traits::repository_traits::UserTaskRepository;
use questbot_common::Error;

use crate::services::completion::CompletionRecorder;

pub use daily::DailyCheckinQuest;
pub use dispatch::{resolve, validate_config, StrategyKind};
pub use manual::ManualReviewQuest;
pub use telegram::TelegramQuest;
pub use twitter::TwitterQuest;
pub use youtube::{WatchSession, YouTubeQuest};

pub struct VerificationEngine {
    user_task_repo: Arc<dyn UserTaskRepository + Send + Sync>,
    recorder: CompletionRecorder,
    twitter: TwitterQuest,
    telegram: TelegramQuest,
    youtube: YouTubeQuest,
    daily: DailyCheckinQuest,
    manual: ManualReviewQuest,
}

impl VerificationEngine {
    pub fn new(
        user_task_repo: Arc<dyn UserTaskRepository + Send + Sync>,
        recorder: CompletionRecorder,
        twitter: TwitterQuest,
        telegram: TelegramQuest,
        youtube: YouTubeQuest,
        daily: DailyCheckinQuest,
    ) -> Self {
        Self {
            user_task_repo,
            recorder,
            twitter,
            telegram,
            youtube,
            daily,
            manual: ManualReviewQuest,
        }
    }

    /// Verifies one completion claim and, when it sticks, records the
    /// completion and credits points. Returns the outcome plus the new
    /// balance when points moved.
    pub async fn verify(
        &self,
        user: &User,
        task: &Task,
        evidence: &QuestEvidence,
    ) -> Result<(VerificationOutcome, Option<PointsBalance>), Error> {
        if user.is_banned {
            return Ok((
                VerificationOutcome::failure(
                    FailureReason::UserBanned,
                    "This account is not allowed to complete quests.",
                ),
                None,
            ));
        }
        if !task.is_active {
            return Ok((
                VerificationOutcome::failure(
                    FailureReason::TaskInactive,
                    "This quest is no longer available.",
                ),
                None,
            ));
        }

        let kind = resolve(task);

        // One payout per pair. Daily check-in manages its own calendar
        // window, so the blanket guard does not apply to it.
        if kind != StrategyKind::DailyCheckin {
            if let Some(prior) = self
                .user_task_repo
                .get_for_pair(user.user_id, task.task_id)
                .await?
            {
                if prior.status.is_resolved_success() {
                    return Ok((
                        VerificationOutcome::failure(
                            FailureReason::AlreadyCompleted,
                            "You already completed this quest.",
                        ),
                        None,
                    ));
                }
            }
        }

        info!(
            "Verifying task '{}' ({:?}) for user {}",
            task.title, kind, user.user_id
        );

        let outcome = match kind {
            StrategyKind::Twitter => self.twitter.verify(user, task, evidence).await?,
            StrategyKind::Telegram => self.telegram.verify(user, task).await?,
            StrategyKind::YouTubeCode => self.youtube.verify_instant_code(task, evidence).await?,
            StrategyKind::TimeDelayCode => {
                self.youtube.verify_timed_code(user, task, evidence).await?
            }
            StrategyKind::DailyCheckin => self.daily.verify(user, task).await?,
            StrategyKind::ManualReview => self.manual.verify(task, evidence).await?,
            StrategyKind::Generic => {
                VerificationOutcome::success("Quest completed!", task.points_reward)
            }
        };

        let balance = if outcome.is_failure() {
            None
        } else {
            self.recorder.record(user, task, evidence, &outcome).await?
        };

        Ok((outcome, balance))
    }

    /// Starts (or resumes) a watch session for a timed video quest.
    pub async fn start_video_session(
        &self,
        user: &User,
        task: &Task,
    ) -> Result<WatchSession, Error> {
        self.youtube.start_session(user.user_id, task.task_id).await
    }
}
