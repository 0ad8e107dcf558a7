// questbot-server/src/routes/tasks.rs

use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use tracing::{info, warn};
use uuid::Uuid;

use questbot_common::models::notification::Notification;
use questbot_common::models::task::Task;
use questbot_common::traits::repository_traits::{
    NotificationRepository, TaskRepository, UserRepository,
};
use questbot_core::services::verification::validate_config;
use questbot_core::Error;

use crate::auth::AdminClaims;
use crate::routes::{ApiError, AppState};

#[derive(Debug, Deserialize)]
pub struct TasksQuery {
    #[serde(default = "default_active_only")]
    pub active_only: bool,
}

fn default_active_only() -> bool {
    true
}

pub async fn list_tasks(
    State(ctx): State<AppState>,
    Query(q): Query<TasksQuery>,
) -> Result<Json<Vec<Task>>, ApiError> {
    Ok(Json(ctx.task_repo.list(q.active_only).await?))
}

pub async fn get_task(
    State(ctx): State<AppState>,
    Path(task_id): Path<Uuid>,
) -> Result<Json<Task>, ApiError> {
    let task = ctx
        .task_repo
        .get(task_id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("task {task_id}")))?;
    Ok(Json(task))
}

#[derive(Debug, Deserialize)]
pub struct TaskCreate {
    pub title: String,
    pub description: Option<String>,
    pub task_type: String,
    pub platform: Option<String>,
    pub url: Option<String>,
    pub points_reward: i64,
    #[serde(default)]
    pub is_bonus: bool,
    #[serde(default = "default_verification_required")]
    pub verification_required: bool,
    pub verification_data: Option<serde_json::Value>,
}

fn default_verification_required() -> bool {
    true
}

pub async fn create_task(
    claims: AdminClaims,
    State(ctx): State<AppState>,
    Json(req): Json<TaskCreate>,
) -> Result<Json<Task>, ApiError> {
    if req.points_reward < 0 {
        return Err(ApiError(Error::Validation(
            "points_reward must be non-negative".to_string(),
        )));
    }

    let now = Utc::now();
    let task = Task {
        task_id: Uuid::new_v4(),
        title: req.title,
        description: req.description,
        task_type: req.task_type,
        platform: req.platform,
        url: req.url,
        points_reward: req.points_reward,
        is_bonus: req.is_bonus,
        is_active: true,
        verification_required: req.verification_required,
        verification_data: req.verification_data,
        created_at: now,
        updated_at: now,
    };
    // Broken configs are refused here, not discovered by users.
    validate_config(&task)?;

    ctx.task_repo.create(&task).await?;
    info!("Admin '{}' created task '{}'", claims.username, task.title);

    announce_new_task(&ctx, &task).await;
    Ok(Json(task))
}

/// Best-effort "new quest" fanout to every active user.
async fn announce_new_task(ctx: &AppState, task: &Task) {
    let user_ids = match ctx.user_repo.list_active_ids().await {
        Ok(ids) => ids,
        Err(e) => {
            warn!("Skipping new-task fanout, could not list users: {e}");
            return;
        }
    };
    let body = format!(
        "New quest '{}' is live: earn {} points!",
        task.title, task.points_reward
    );
    for user_id in user_ids {
        let n = Notification::new(user_id, "New quest available", &body, "new_task");
        if let Err(e) = ctx.notification_repo.insert(&n).await {
            warn!("Failed to notify user {user_id} about new task: {e}");
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct TaskUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
    pub points_reward: Option<i64>,
    pub is_bonus: Option<bool>,
    pub is_active: Option<bool>,
    pub verification_required: Option<bool>,
    pub verification_data: Option<serde_json::Value>,
}

pub async fn update_task(
    claims: AdminClaims,
    State(ctx): State<AppState>,
    Path(task_id): Path<Uuid>,
    Json(req): Json<TaskUpdate>,
) -> Result<Json<Task>, ApiError> {
    let mut task = ctx
        .task_repo
        .get(task_id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("task {task_id}")))?;

    if let Some(title) = req.title {
        task.title = title;
    }
    if let Some(description) = req.description {
        task.description = Some(description);
    }
    if let Some(url) = req.url {
        task.url = Some(url);
    }
    if let Some(points) = req.points_reward {
        if points < 0 {
            return Err(ApiError(Error::Validation(
                "points_reward must be non-negative".to_string(),
            )));
        }
        task.points_reward = points;
    }
    if let Some(is_bonus) = req.is_bonus {
        task.is_bonus = is_bonus;
    }
    if let Some(is_active) = req.is_active {
        task.is_active = is_active;
    }
    if let Some(required) = req.verification_required {
        task.verification_required = required;
    }
    if let Some(data) = req.verification_data {
        task.verification_data = Some(data);
    }
    task.updated_at = Utc::now();

    validate_config(&task)?;
    ctx.task_repo.update(&task).await?;
    info!("Admin '{}' updated task '{}'", claims.username, task.title);
    Ok(Json(task))
}

pub async fn delete_task(
    claims: AdminClaims,
    State(ctx): State<AppState>,
    Path(task_id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    ctx.task_repo
        .get(task_id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("task {task_id}")))?;
    ctx.task_repo.soft_delete(task_id).await?;
    info!("Admin '{}' deactivated task {task_id}", claims.username);
    Ok(Json(serde_json::json!({ "success": true })))
}
