// questbot-core/src/services/completion.rs
//
// Side effects of a non-failure verification outcome: the UserTask row,
// the points credit, and the user notification. Points are credited
// exactly once per (user, task) pair because the engine short-circuits
// on a terminal-success row before any strategy runs.

use std::sync::Arc;

use chrono::Utc;
use tracing::warn;

use questbot_common::models::notification::Notification;
use questbot_common::models::points::{PointsBalance, TransactionType};
use questbot_common::models::task::Task;
use questbot_common::models::user::User;
use questbot_common::models::user_task::UserTask;
use questbot_common::models::verification::{QuestEvidence, VerificationOutcome};
use questbot_common::traits::repository_traits::{NotificationRepository, UserTaskRepository};
use questbot_common::Error;

use crate::services::ledger::PointsLedger;
use crate::utils::extract_url;

#[derive(Clone)]
pub struct CompletionRecorder {
    user_task_repo: Arc<dyn UserTaskRepository + Send + Sync>,
    notification_repo: Arc<dyn NotificationRepository + Send + Sync>,
    ledger: PointsLedger,
}

impl CompletionRecorder {
    pub fn new(
        user_task_repo: Arc<dyn UserTaskRepository + Send + Sync>,
        notification_repo: Arc<dyn NotificationRepository + Send + Sync>,
        ledger: PointsLedger,
    ) -> Self {
        Self {
            user_task_repo,
            notification_repo,
            ledger,
        }
    }

    /// Persists a `Success` or `Pending` outcome. Returns the new balance
    /// when points were credited. `Failure` outcomes record nothing.
    pub async fn record(
        &self,
        user: &User,
        task: &Task,
        evidence: &QuestEvidence,
        outcome: &VerificationOutcome,
    ) -> Result<Option<PointsBalance>, Error> {
        let (status, points_awarded) = match outcome {
            VerificationOutcome::Success {
                status,
                points_awarded,
                ..
            } => (*status, Some(*points_awarded)),
            VerificationOutcome::Pending { status, .. } => (*status, None),
            VerificationOutcome::Failure { .. } => return Ok(None),
        };

        let mut record = UserTask::new(user.user_id, task.task_id, status);
        record.submission_text = evidence.submission_text.clone();
        record.proof_url = evidence.proof_url.clone().or_else(|| {
            evidence
                .submission_text
                .as_deref()
                .and_then(extract_url)
        });

        let mut balance = None;
        if let Some(points) = points_awarded {
            record.points_earned = points;
            record.completed_at = Some(Utc::now());
        }
        let record = self.user_task_repo.upsert(&record).await?;

        if let Some(points) = points_awarded {
            let transaction_type = if task.is_bonus {
                TransactionType::Bonus
            } else {
                TransactionType::Earned
            };
            balance = Some(
                self.ledger
                    .credit(
                        user.user_id,
                        points,
                        transaction_type,
                        Some(record.user_task_id),
                        Some(&format!("Completed: {}", task.title)),
                    )
                    .await?,
            );
        }

        let (title, body) = match points_awarded {
            Some(points) => (
                "Quest completed",
                format!("You earned {} points for '{}'.", points, task.title),
            ),
            None => (
                "Submission received",
                format!("Your submission for '{}' is awaiting review.", task.title),
            ),
        };
        let notification = Notification::new(user.user_id, title, &body, "task_completion");
        if let Err(e) = self.notification_repo.insert(&notification).await {
            warn!("Failed to insert completion notification: {e}");
        }

        Ok(balance)
    }
}
