// questbot-server/src/routes/users.rs

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;

use questbot_common::models::notification::Notification;
use questbot_common::models::user::User;
use questbot_common::traits::repository_traits::NotificationRepository;
use questbot_core::Error;

use crate::auth::AdminClaims;
use crate::routes::{ApiError, AppState};

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub telegram_id: i64,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

pub async fn register(
    State(ctx): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<User>, ApiError> {
    let user = ctx
        .user_service
        .get_or_create(
            req.telegram_id,
            req.username.as_deref(),
            req.first_name.as_deref(),
            req.last_name.as_deref(),
        )
        .await?;
    Ok(Json(user))
}

pub async fn get_user(
    State(ctx): State<AppState>,
    Path(telegram_id): Path<i64>,
) -> Result<Json<User>, ApiError> {
    let user = ctx
        .user_service
        .get_by_telegram_id(telegram_id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("user with telegram_id {telegram_id}")))?;
    Ok(Json(user))
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub offset: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    50
}

pub async fn list_users(
    _claims: AdminClaims,
    State(ctx): State<AppState>,
    Query(q): Query<ListQuery>,
) -> Result<Json<Vec<User>>, ApiError> {
    Ok(Json(ctx.user_service.list(q.offset, q.limit).await?))
}

#[derive(Debug, Deserialize)]
pub struct LeaderboardQuery {
    #[serde(default = "default_leaderboard_limit")]
    pub limit: i64,
}

fn default_leaderboard_limit() -> i64 {
    10
}

pub async fn leaderboard(
    State(ctx): State<AppState>,
    Query(q): Query<LeaderboardQuery>,
) -> Result<Json<Vec<User>>, ApiError> {
    Ok(Json(ctx.user_service.leaderboard(q.limit).await?))
}

#[derive(Debug, Deserialize)]
pub struct NotificationsQuery {
    #[serde(default)]
    pub unread_only: bool,
}

pub async fn notifications(
    State(ctx): State<AppState>,
    Path(telegram_id): Path<i64>,
    Query(q): Query<NotificationsQuery>,
) -> Result<Json<Vec<Notification>>, ApiError> {
    let user = ctx
        .user_service
        .get_by_telegram_id(telegram_id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("user with telegram_id {telegram_id}")))?;
    let list = ctx
        .notification_repo
        .list_for_user(user.user_id, q.unread_only)
        .await?;
    Ok(Json(list))
}
