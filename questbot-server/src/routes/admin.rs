// questbot-server/src/routes/admin.rs

use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use questbot_common::models::notification::Notification;
use questbot_common::models::points::TransactionType;
use questbot_common::models::user_task::{UserTask, UserTaskStatus};
use questbot_common::traits::repository_traits::{
    NotificationRepository, TaskRepository, UserRepository, UserRewardRepository,
    UserTaskRepository,
};
use questbot_core::Error;

use crate::auth::AdminClaims;
use crate::routes::{ApiError, AppState};

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub total_users: i64,
    pub active_tasks: i64,
    pub completed_tasks: i64,
    pub pending_review: i64,
    pub total_points_distributed: i64,
    pub rewards_redeemed: i64,
}

pub async fn stats(
    _claims: AdminClaims,
    State(ctx): State<AppState>,
) -> Result<Json<StatsResponse>, ApiError> {
    let completed = ctx
        .user_task_repo
        .count_by_status(UserTaskStatus::Completed)
        .await?
        + ctx
            .user_task_repo
            .count_by_status(UserTaskStatus::Verified)
            .await?;
    Ok(Json(StatsResponse {
        total_users: ctx.user_repo.count().await?,
        active_tasks: ctx.task_repo.count_active().await?,
        completed_tasks: completed,
        pending_review: ctx
            .user_task_repo
            .count_by_status(UserTaskStatus::Submitted)
            .await?,
        total_points_distributed: ctx.ledger.total_points_distributed().await?,
        rewards_redeemed: ctx.user_reward_repo.count().await?,
    }))
}

#[derive(Debug, Deserialize)]
pub struct UserTasksQuery {
    pub status: Option<String>,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    50
}

pub async fn list_user_tasks(
    _claims: AdminClaims,
    State(ctx): State<AppState>,
    Query(q): Query<UserTasksQuery>,
) -> Result<Json<Vec<UserTask>>, ApiError> {
    let status = q.status.as_deref().map(UserTaskStatus::parse);
    Ok(Json(ctx.user_task_repo.list_by_status(status, q.limit).await?))
}

#[derive(Debug, Deserialize)]
pub struct ReviewQuery {
    pub approved: bool,
}

#[derive(Debug, Serialize)]
pub struct ReviewResponse {
    pub success: bool,
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub points_awarded: Option<i64>,
}

/// Resolves a submission that is parked for human review. Approval
/// credits the task's reward through the ledger; rejection credits
/// nothing and leaves the pair re-verifiable.
pub async fn review_user_task(
    claims: AdminClaims,
    State(ctx): State<AppState>,
    Path(user_task_id): Path<Uuid>,
    Query(q): Query<ReviewQuery>,
) -> Result<Json<ReviewResponse>, ApiError> {
    let mut record = ctx
        .user_task_repo
        .get(user_task_id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("user task {user_task_id}")))?;
    if record.status != UserTaskStatus::Submitted {
        return Err(ApiError(Error::Validation(format!(
            "user task {user_task_id} is '{}', not awaiting review",
            record.status.as_str()
        ))));
    }
    let task = ctx
        .task_repo
        .get(record.task_id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("task {}", record.task_id)))?;

    let admin_id = Uuid::parse_str(&claims.sub).map_err(Error::from)?;
    let now = Utc::now();
    record.verified_by = Some(admin_id);
    record.verified_at = Some(now);

    let response = if q.approved {
        record.status = UserTaskStatus::Verified;
        record.completed_at = Some(now);
        record.points_earned = task.points_reward;
        ctx.user_task_repo.update(&record).await?;

        let transaction_type = if task.is_bonus {
            TransactionType::Bonus
        } else {
            TransactionType::Earned
        };
        ctx.ledger
            .credit(
                record.user_id,
                task.points_reward,
                transaction_type,
                Some(record.user_task_id),
                Some(&format!("Approved: {}", task.title)),
            )
            .await?;

        notify(
            &ctx,
            record.user_id,
            "Submission approved",
            &format!(
                "Your submission for '{}' was approved. You earned {} points!",
                task.title, task.points_reward
            ),
        )
        .await;
        info!(
            "Admin '{}' approved user task {user_task_id} (+{} points)",
            claims.username, task.points_reward
        );
        ReviewResponse {
            success: true,
            status: UserTaskStatus::Verified.as_str(),
            points_awarded: Some(task.points_reward),
        }
    } else {
        record.status = UserTaskStatus::Rejected;
        ctx.user_task_repo.update(&record).await?;

        notify(
            &ctx,
            record.user_id,
            "Submission rejected",
            &format!(
                "Your submission for '{}' was not accepted. You can try again.",
                task.title
            ),
        )
        .await;
        info!(
            "Admin '{}' rejected user task {user_task_id}",
            claims.username
        );
        ReviewResponse {
            success: true,
            status: UserTaskStatus::Rejected.as_str(),
            points_awarded: None,
        }
    };
    Ok(Json(response))
}

async fn notify(ctx: &AppState, user_id: Uuid, title: &str, body: &str) {
    let n = Notification::new(user_id, title, body, "admin_review");
    if let Err(e) = ctx.notification_repo.insert(&n).await {
        warn!("Failed to insert review notification: {e}");
    }
}

#[derive(Debug, Serialize)]
pub struct BanResponse {
    pub user_id: Uuid,
    pub is_banned: bool,
}

pub async fn toggle_ban(
    claims: AdminClaims,
    State(ctx): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<BanResponse>, ApiError> {
    let user = ctx
        .user_service
        .get(user_id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("user {user_id}")))?;
    let banned = !user.is_banned;
    ctx.user_service.set_banned(user_id, banned).await?;
    info!(
        "Admin '{}' set banned={banned} for user {user_id}",
        claims.username
    );
    Ok(Json(BanResponse {
        user_id,
        is_banned: banned,
    }))
}
