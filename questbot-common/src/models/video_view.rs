use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VideoViewStatus {
    Watching,
    Completed,
    Failed,
}

impl VideoViewStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VideoViewStatus::Watching => "watching",
            VideoViewStatus::Completed => "completed",
            VideoViewStatus::Failed => "failed",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "completed" => VideoViewStatus::Completed,
            "failed" => VideoViewStatus::Failed,
            _ => VideoViewStatus::Watching,
        }
    }
}

/// A timed watch-session for code-in-video quests.
///
/// Created when the user starts watching, mutated on each code attempt,
/// terminal at `completed` or `failed` (attempt exhaustion).
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct VideoView {
    pub video_view_id: Uuid,
    pub user_id: Uuid,
    pub task_id: Uuid,
    pub status: VideoViewStatus,
    pub started_at: DateTime<Utc>,
    pub code_attempts: i32,
    pub completed_at: Option<DateTime<Utc>>,
}

impl VideoView {
    pub fn start(user_id: Uuid, task_id: Uuid) -> Self {
        Self {
            video_view_id: Uuid::new_v4(),
            user_id,
            task_id,
            status: VideoViewStatus::Watching,
            started_at: Utc::now(),
            code_attempts: 0,
            completed_at: None,
        }
    }

    /// Seconds elapsed since the session started, clamped at zero.
    pub fn seconds_watched(&self, now: DateTime<Utc>) -> i64 {
        (now - self.started_at).num_seconds().max(0)
    }
}
