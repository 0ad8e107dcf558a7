use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle of one user's attempt at one quest.
///
/// There is at most one row per (user, task) pair. `Completed` and
/// `Verified` mean points were credited exactly once; `Rejected` means
/// an admin turned the submission down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserTaskStatus {
    Pending,
    Submitted,
    Verified,
    Completed,
    Rejected,
}

impl UserTaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserTaskStatus::Pending => "pending",
            UserTaskStatus::Submitted => "submitted",
            UserTaskStatus::Verified => "verified",
            UserTaskStatus::Completed => "completed",
            UserTaskStatus::Rejected => "rejected",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "submitted" => UserTaskStatus::Submitted,
            "verified" => UserTaskStatus::Verified,
            "completed" => UserTaskStatus::Completed,
            "rejected" => UserTaskStatus::Rejected,
            _ => UserTaskStatus::Pending,
        }
    }

    /// The pair is done and points (if any) have been credited.
    pub fn is_resolved_success(&self) -> bool {
        matches!(self, UserTaskStatus::Completed | UserTaskStatus::Verified)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct UserTask {
    pub user_task_id: Uuid,
    pub user_id: Uuid,
    pub task_id: Uuid,
    pub status: UserTaskStatus,
    pub points_earned: i64,
    pub proof_url: Option<String>,
    pub submission_text: Option<String>,
    pub verified_by: Option<Uuid>,
    pub verified_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserTask {
    pub fn new(user_id: Uuid, task_id: Uuid, status: UserTaskStatus) -> Self {
        let now = Utc::now();
        Self {
            user_task_id: Uuid::new_v4(),
            user_id,
            task_id,
            status,
            points_earned: 0,
            proof_url: None,
            submission_text: None,
            verified_by: None,
            verified_at: None,
            completed_at: None,
            created_at: now,
            updated_at: now,
        }
    }
}
