// questbot-core/src/services/verification/daily.rs
//
// Daily check-in: one success per UTC calendar date, not per 24h
// window. A check-in at 23:59 UTC followed by one at 00:01 is two days.

use std::sync::Arc;

use chrono::Utc;

use questbot_common::models::task::Task;
use questbot_common::models::user::User;
use questbot_common::models::verification::{FailureReason, VerificationOutcome};
use questbot_common::traits::repository_traits::UserTaskRepository;
use questbot_common::Error;

pub struct DailyCheckinQuest {
    user_task_repo: Arc<dyn UserTaskRepository + Send + Sync>,
}

impl DailyCheckinQuest {
    pub fn new(user_task_repo: Arc<dyn UserTaskRepository + Send + Sync>) -> Self {
        Self { user_task_repo }
    }

    pub async fn verify(&self, user: &User, task: &Task) -> Result<VerificationOutcome, Error> {
        let previous = self
            .user_task_repo
            .get_for_pair(user.user_id, task.task_id)
            .await?;

        if let Some(record) = previous {
            if record.status.is_resolved_success() {
                if let Some(completed_at) = record.completed_at {
                    if completed_at.date_naive() == Utc::now().date_naive() {
                        return Ok(VerificationOutcome::failure(
                            FailureReason::AlreadyCheckedInToday,
                            "You already checked in today. Come back tomorrow!",
                        ));
                    }
                }
            }
        }

        Ok(VerificationOutcome::success(
            "Checked in! See you tomorrow.",
            task.points_reward,
        ))
    }
}
