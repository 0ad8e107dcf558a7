// questbot-core/src/services/verification/youtube.rs
//
// Code-in-video quests, two flavors:
//  - instant (`video_code` / `youtube_code`): the code alone is proof;
//  - timed (`time_delay_code`): the user starts a watch session first
//    and the code is only accepted after `min_watch_time_seconds`, with
//    a hard cap on attempts per session.

use std::sync::Arc;

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use questbot_common::models::task::Task;
use questbot_common::models::user::User;
use questbot_common::models::verification::{
    parse_config, FailureReason, QuestEvidence, TimeDelayCodeConfig, VerificationOutcome,
    YouTubeCodeConfig,
};
use questbot_common::models::video_view::{VideoView, VideoViewStatus};
use questbot_common::traits::repository_traits::VideoViewRepository;
use questbot_common::Error;

/// Outcome of asking to (re)start a timed watch session.
pub enum WatchSession {
    /// An open session, freshly created or reused.
    Open(VideoView),
    /// The previous session burned through all attempts.
    Exhausted,
}

pub struct YouTubeQuest {
    view_repo: Arc<dyn VideoViewRepository + Send + Sync>,
}

impl YouTubeQuest {
    pub fn new(view_repo: Arc<dyn VideoViewRepository + Send + Sync>) -> Self {
        Self { view_repo }
    }

    /// Phase 1 of a timed quest. Restarting while a session is open
    /// reuses it, so mashing the start button does not reset the clock.
    pub async fn start_session(&self, user_id: Uuid, task_id: Uuid) -> Result<WatchSession, Error> {
        if let Some(open) = self.view_repo.get_open(user_id, task_id).await? {
            return Ok(WatchSession::Open(open));
        }
        if let Some(latest) = self.view_repo.get_latest(user_id, task_id).await? {
            if latest.status == VideoViewStatus::Failed {
                return Ok(WatchSession::Exhausted);
            }
        }
        let view = VideoView::start(user_id, task_id);
        self.view_repo.insert(&view).await?;
        info!("Started watch session {} for task {}", view.video_view_id, task_id);
        Ok(WatchSession::Open(view))
    }

    /// Instant code check, no session involved.
    pub async fn verify_instant_code(
        &self,
        task: &Task,
        evidence: &QuestEvidence,
    ) -> Result<VerificationOutcome, Error> {
        let config: YouTubeCodeConfig = match parse_config(task) {
            Ok(c) => c,
            Err(_) => {
                return Ok(VerificationOutcome::failure(
                    FailureReason::InvalidQuestConfig,
                    "This quest is missing its verification code. Please contact an admin.",
                ))
            }
        };
        let Some(code) = submitted_code(evidence) else {
            return Ok(VerificationOutcome::failure(
                FailureReason::CodeRequired,
                "Please send the code shown in the video.",
            ));
        };
        if !code.eq_ignore_ascii_case(config.verification_code.trim()) {
            return Ok(VerificationOutcome::failure(
                FailureReason::WrongCode,
                "That code isn't right. Watch the video again and retry.",
            ));
        }
        Ok(VerificationOutcome::success(
            "Code accepted!",
            task.points_reward,
        ))
    }

    /// Phase 2 of a timed quest. Every submission costs an attempt,
    /// including ones rejected for being too early.
    pub async fn verify_timed_code(
        &self,
        user: &User,
        task: &Task,
        evidence: &QuestEvidence,
    ) -> Result<VerificationOutcome, Error> {
        let config: TimeDelayCodeConfig = match parse_config(task) {
            Ok(c) => c,
            Err(_) => {
                return Ok(VerificationOutcome::failure(
                    FailureReason::InvalidQuestConfig,
                    "This quest is missing its verification code. Please contact an admin.",
                ))
            }
        };
        let Some(code) = submitted_code(evidence) else {
            return Ok(VerificationOutcome::failure(
                FailureReason::CodeRequired,
                "Please send the code shown in the video.",
            ));
        };

        let session = match self.view_repo.get_open(user.user_id, task.task_id).await? {
            Some(s) => s,
            None => {
                let latest = self.view_repo.get_latest(user.user_id, task.task_id).await?;
                return Ok(match latest {
                    Some(v) if v.status == VideoViewStatus::Failed => VerificationOutcome::failure(
                        FailureReason::MaxAttempts,
                        "You've used all attempts for this video.",
                    ),
                    _ => VerificationOutcome::failure(
                        FailureReason::NoActiveSession,
                        "Start watching the video first, then send the code.",
                    ),
                });
            }
        };

        let attempts = self
            .view_repo
            .increment_attempts(session.video_view_id)
            .await?;
        // Backstop for racing submissions that both got past the guard.
        if attempts > config.max_attempts {
            return self.exhaust_session(session.video_view_id).await;
        }

        let watched = session.seconds_watched(Utc::now());
        if watched < config.min_watch_time_seconds {
            // The rejected attempt still counted; the last one kills
            // the session.
            if attempts >= config.max_attempts {
                return self.exhaust_session(session.video_view_id).await;
            }
            let remaining = config.min_watch_time_seconds - watched;
            return Ok(VerificationOutcome::failure(
                FailureReason::TooSoon,
                format!("Keep watching! The code unlocks in {remaining} more seconds."),
            ));
        }

        if !code.eq_ignore_ascii_case(config.verification_code.trim()) {
            if attempts >= config.max_attempts {
                return self.exhaust_session(session.video_view_id).await;
            }
            let left = config.max_attempts - attempts;
            return Ok(VerificationOutcome::failure(
                FailureReason::WrongCode,
                format!("That code isn't right. {left} attempts left."),
            ));
        }

        self.view_repo
            .set_status(
                session.video_view_id,
                VideoViewStatus::Completed,
                Some(Utc::now()),
            )
            .await?;
        Ok(VerificationOutcome::success(
            "Code accepted!",
            task.points_reward,
        ))
    }

    async fn exhaust_session(&self, video_view_id: Uuid) -> Result<VerificationOutcome, Error> {
        self.view_repo
            .set_status(video_view_id, VideoViewStatus::Failed, None)
            .await?;
        Ok(VerificationOutcome::failure(
            FailureReason::MaxAttempts,
            "You've used all attempts for this video.",
        ))
    }
}

fn submitted_code(evidence: &QuestEvidence) -> Option<&str> {
    evidence
        .code
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
}
