use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::models::task::Task;
use crate::models::user_task::UserTaskStatus;

/// What the user handed in alongside a completion claim. Which fields
/// matter depends on the quest type.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuestEvidence {
    pub twitter_username: Option<String>,
    pub code: Option<String>,
    pub proof_url: Option<String>,
    pub submission_text: Option<String>,
}

/// Closed set of user-displayable failure reasons. Expected verification
/// failures are values of this enum, never errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    AlreadyCompleted,
    AlreadyCheckedInToday,
    UserBanned,
    TaskInactive,
    TwitterUsernameRequired,
    TwitterUserNotFound,
    NotFollowing,
    NotLiked,
    NotRetweeted,
    UsernameMismatch,
    NotAMember,
    CodeRequired,
    WrongCode,
    TooSoon,
    MaxAttempts,
    NoActiveSession,
    ProofRequired,
    InsufficientPoints,
    RewardNotAvailable,
    InvalidQuestConfig,
    ExternalApiError,
}

impl FailureReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureReason::AlreadyCompleted => "already_completed",
            FailureReason::AlreadyCheckedInToday => "already_checked_in_today",
            FailureReason::UserBanned => "user_banned",
            FailureReason::TaskInactive => "task_inactive",
            FailureReason::TwitterUsernameRequired => "twitter_username_required",
            FailureReason::TwitterUserNotFound => "twitter_user_not_found",
            FailureReason::NotFollowing => "not_following",
            FailureReason::NotLiked => "not_liked",
            FailureReason::NotRetweeted => "not_retweeted",
            FailureReason::UsernameMismatch => "username_mismatch",
            FailureReason::NotAMember => "not_a_member",
            FailureReason::CodeRequired => "code_required",
            FailureReason::WrongCode => "wrong_code",
            FailureReason::TooSoon => "too_soon",
            FailureReason::MaxAttempts => "max_attempts",
            FailureReason::NoActiveSession => "no_active_session",
            FailureReason::ProofRequired => "proof_required",
            FailureReason::InsufficientPoints => "insufficient_points",
            FailureReason::RewardNotAvailable => "reward_not_available",
            FailureReason::InvalidQuestConfig => "invalid_quest_config",
            FailureReason::ExternalApiError => "external_api_error",
        }
    }
}

/// Who has to act before a `Pending` outcome can resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FollowupAction {
    ManualReview,
    AdminApproval,
}

impl FollowupAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            FollowupAction::ManualReview => "manual_review",
            FollowupAction::AdminApproval => "admin_approval",
        }
    }
}

/// The tri-state result of a verification attempt.
///
/// `Success` means points get credited now; `Pending` means the record is
/// parked for a human; `Failure` is user-displayable and has no side
/// effects. Strategies never surface expected failures as `Err`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum VerificationOutcome {
    Success {
        message: String,
        points_awarded: i64,
        status: UserTaskStatus,
    },
    Pending {
        message: String,
        status: UserTaskStatus,
        requires_followup: FollowupAction,
    },
    Failure {
        message: String,
        reason: FailureReason,
    },
}

impl VerificationOutcome {
    pub fn success(message: impl Into<String>, points_awarded: i64) -> Self {
        VerificationOutcome::Success {
            message: message.into(),
            points_awarded,
            status: UserTaskStatus::Completed,
        }
    }

    pub fn pending(message: impl Into<String>, requires_followup: FollowupAction) -> Self {
        VerificationOutcome::Pending {
            message: message.into(),
            status: UserTaskStatus::Submitted,
            requires_followup,
        }
    }

    pub fn failure(reason: FailureReason, message: impl Into<String>) -> Self {
        VerificationOutcome::Failure {
            message: message.into(),
            reason,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, VerificationOutcome::Failure { .. })
    }
}

/// Which Twitter action a quest asks for, derived from the task_type suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TwitterAction {
    Follow,
    Like,
    Retweet,
}

impl TwitterAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            TwitterAction::Follow => "follow",
            TwitterAction::Like => "like",
            TwitterAction::Retweet => "retweet",
        }
    }

    /// `twitter_like` -> Like, `twitter_retweet` -> Retweet, anything
    /// else under the `twitter_` prefix defaults to Follow.
    pub fn from_task_type(task_type: &str) -> Self {
        match task_type {
            "twitter_like" => TwitterAction::Like,
            "twitter_retweet" => TwitterAction::Retweet,
            _ => TwitterAction::Follow,
        }
    }
}

/// Typed per-strategy slices of `Task::verification_data`. Parsed (and
/// validated at quest creation) instead of probing the JSON at runtime.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TwitterConfig {
    pub target_username: Option<String>,
    pub tweet_id: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TelegramConfig {
    /// Either a numeric chat id ("-100123...") or a public @username.
    pub chat_id: Option<String>,
    pub channel_username: Option<String>,
    /// "join_group" triggers the in-group announcement; anything else does not.
    pub chat_type: Option<String>,
}

impl TelegramConfig {
    /// The chat identifier to hand to the Bot API, if configured.
    pub fn chat_ref(&self) -> Option<String> {
        if let Some(id) = self.chat_id.as_deref() {
            if !id.is_empty() {
                return Some(id.to_string());
            }
        }
        self.channel_username
            .as_deref()
            .filter(|u| !u.is_empty())
            .map(|u| format!("@{}", u.trim_start_matches('@')))
    }

    pub fn announces_on_join(&self) -> bool {
        self.chat_type
            .as_deref()
            .map(|t| t.eq_ignore_ascii_case("join_group"))
            .unwrap_or(false)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YouTubeCodeConfig {
    pub verification_code: String,
}

fn default_min_watch_time() -> i64 {
    120
}

fn default_max_attempts() -> i32 {
    3
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeDelayCodeConfig {
    pub verification_code: String,
    #[serde(default = "default_min_watch_time")]
    pub min_watch_time_seconds: i64,
    #[serde(default = "default_max_attempts")]
    pub max_attempts: i32,
}

/// Deserializes a strategy config out of a task's `verification_data`.
/// A missing or malformed document is a quest-authoring error.
pub fn parse_config<T: serde::de::DeserializeOwned>(task: &Task) -> Result<T, Error> {
    let value = task
        .verification_data
        .clone()
        .ok_or_else(|| Error::Validation(format!("task '{}' has no verification_data", task.title)))?;
    serde_json::from_value(value)
        .map_err(|e| Error::Validation(format!("task '{}': bad verification_data: {}", task.title, e)))
}
