//! questbot-server/src/routes/mod.rs
//!
//! HTTP surface. Verification outcomes always come back HTTP 200 with
//! a payload the bot can show the user; 400/401/404/500 are reserved
//! for malformed requests, missing auth, missing entities and faults.

pub mod admin;
pub mod auth;
pub mod rewards;
pub mod tasks;
pub mod users;
pub mod verify;

use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::error;

use questbot_core::Error;

use crate::auth::AdminClaims;
use crate::context::ServerContext;

pub type AppState = Arc<ServerContext>;

pub fn router(ctx: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/api/auth/login", post(auth::login))
        .route("/api/users", get(users::list_users))
        .route("/api/users/register", post(users::register))
        .route("/api/users/{telegram_id}", get(users::get_user))
        .route(
            "/api/users/{telegram_id}/notifications",
            get(users::notifications),
        )
        .route("/api/leaderboard", get(users::leaderboard))
        .route("/api/tasks", get(tasks::list_tasks).post(tasks::create_task))
        .route(
            "/api/tasks/{task_id}",
            get(tasks::get_task)
                .put(tasks::update_task)
                .delete(tasks::delete_task),
        )
        .route(
            "/api/rewards",
            get(rewards::list_rewards).post(rewards::create_reward),
        )
        .route("/api/rewards/{reward_id}", put(rewards::update_reward))
        .route("/api/rewards/{reward_id}/redeem", post(rewards::redeem))
        .route("/api/verify", post(verify::verify_task))
        .route("/api/video-views/start", post(verify::start_video_view))
        .route("/api/video-views/verify", post(verify::verify_video_code))
        .route("/api/twitter/verify", post(verify::verify_twitter))
        .route("/api/admin/stats", get(admin::stats))
        .route("/api/admin/user-tasks", get(admin::list_user_tasks))
        .route(
            "/api/admin/user-tasks/{user_task_id}/verify",
            put(admin::review_user_task),
        )
        .route("/api/admin/users/{user_id}/ban", put(admin::toggle_ban))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(ctx)
}

async fn root() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "name": "questbot", "status": "ok" }))
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "healthy" }))
}

/// Wraps the core error for axum. Expected verification failures never
/// travel this path; they are 200 payloads.
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        ApiError(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match &self.0 {
            Error::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            Error::Auth(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            Error::Validation(msg) | Error::Parse(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            Error::Json(e) => (StatusCode::BAD_REQUEST, e.to_string()),
            other => {
                error!("Internal error serving request: {other}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };
        (status, Json(serde_json::json!({ "detail": detail }))).into_response()
    }
}

/// Bearer-token extractor for admin routes.
impl FromRequestParts<AppState> for AdminClaims {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ApiError(Error::Auth("Missing Authorization header".to_string())))?;
        let token = header
            .strip_prefix("Bearer ")
            .ok_or_else(|| ApiError(Error::Auth("Expected a bearer token".to_string())))?;
        Ok(state.auth_keys.verify(token)?)
    }
}
