// questbot-server/src/routes/verify.rs
//
// Verification endpoints. Every outcome (success, pending, expected
// failure) is an HTTP 200 payload the Telegram bot relays to the user.

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use questbot_common::models::points::PointsBalance;
use questbot_common::models::task::Task;
use questbot_common::models::user::User;
use questbot_common::models::verification::{
    parse_config, QuestEvidence, TimeDelayCodeConfig, VerificationOutcome,
};
use questbot_common::traits::repository_traits::TaskRepository;
use questbot_core::services::verification::WatchSession;
use questbot_core::Error;

use crate::routes::{ApiError, AppState};

#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
    pub telegram_id: i64,
    pub task_id: Uuid,
    pub twitter_username: Option<String>,
    pub code: Option<String>,
    pub proof_url: Option<String>,
    pub submission_text: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct VerifyResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub points_earned: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_total: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pending_review: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<&'static str>,
}

fn to_response(outcome: VerificationOutcome, balance: Option<PointsBalance>) -> VerifyResponse {
    match outcome {
        VerificationOutcome::Success {
            message,
            points_awarded,
            status,
        } => VerifyResponse {
            success: true,
            message,
            points_earned: Some(points_awarded),
            new_total: balance.map(|b| b.points),
            status: Some(status.as_str()),
            pending_review: None,
            reason: None,
        },
        VerificationOutcome::Pending {
            message, status, ..
        } => VerifyResponse {
            success: false,
            message,
            points_earned: None,
            new_total: None,
            status: Some(status.as_str()),
            pending_review: Some(true),
            reason: None,
        },
        VerificationOutcome::Failure { message, reason } => VerifyResponse {
            success: false,
            message,
            points_earned: None,
            new_total: None,
            status: None,
            pending_review: None,
            reason: Some(reason.as_str()),
        },
    }
}

async fn lookup(ctx: &AppState, telegram_id: i64, task_id: Uuid) -> Result<(User, Task), Error> {
    let user = ctx
        .user_service
        .get_by_telegram_id(telegram_id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("user with telegram_id {telegram_id}")))?;
    let task = ctx
        .task_repo
        .get(task_id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("task {task_id}")))?;
    Ok((user, task))
}

pub async fn verify_task(
    State(ctx): State<AppState>,
    Json(req): Json<VerifyRequest>,
) -> Result<Json<VerifyResponse>, ApiError> {
    let (user, task) = lookup(&ctx, req.telegram_id, req.task_id).await?;
    let evidence = QuestEvidence {
        twitter_username: req.twitter_username,
        code: req.code,
        proof_url: req.proof_url,
        submission_text: req.submission_text,
    };
    let (outcome, balance) = ctx.engine.verify(&user, &task, &evidence).await?;
    Ok(Json(to_response(outcome, balance)))
}

#[derive(Debug, Deserialize)]
pub struct StartViewRequest {
    pub telegram_id: i64,
    pub task_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct StartViewResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_watch_time_seconds: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<&'static str>,
}

pub async fn start_video_view(
    State(ctx): State<AppState>,
    Json(req): Json<StartViewRequest>,
) -> Result<Json<StartViewResponse>, ApiError> {
    let (user, task) = lookup(&ctx, req.telegram_id, req.task_id).await?;
    let min_watch = parse_config::<TimeDelayCodeConfig>(&task)
        .ok()
        .map(|c| c.min_watch_time_seconds);

    let response = match ctx.engine.start_video_session(&user, &task).await? {
        WatchSession::Open(_) => StartViewResponse {
            success: true,
            message: "Watch session started. Send the code from the video when you have it."
                .to_string(),
            min_watch_time_seconds: min_watch,
            reason: None,
        },
        WatchSession::Exhausted => StartViewResponse {
            success: false,
            message: "You've used all attempts for this video.".to_string(),
            min_watch_time_seconds: None,
            reason: Some("max_attempts"),
        },
    };
    Ok(Json(response))
}

#[derive(Debug, Deserialize)]
pub struct VideoCodeRequest {
    pub telegram_id: i64,
    pub task_id: Uuid,
    pub code: String,
}

pub async fn verify_video_code(
    State(ctx): State<AppState>,
    Json(req): Json<VideoCodeRequest>,
) -> Result<Json<VerifyResponse>, ApiError> {
    let (user, task) = lookup(&ctx, req.telegram_id, req.task_id).await?;
    let evidence = QuestEvidence {
        code: Some(req.code),
        ..Default::default()
    };
    let (outcome, balance) = ctx.engine.verify(&user, &task, &evidence).await?;
    Ok(Json(to_response(outcome, balance)))
}

#[derive(Debug, Deserialize)]
pub struct TwitterVerifyRequest {
    pub telegram_id: i64,
    pub task_id: Uuid,
    pub twitter_username: String,
}

pub async fn verify_twitter(
    State(ctx): State<AppState>,
    Json(req): Json<TwitterVerifyRequest>,
) -> Result<Json<VerifyResponse>, ApiError> {
    let (user, task) = lookup(&ctx, req.telegram_id, req.task_id).await?;
    let evidence = QuestEvidence {
        twitter_username: Some(req.twitter_username),
        ..Default::default()
    };
    let (outcome, balance) = ctx.engine.verify(&user, &task, &evidence).await?;
    Ok(Json(to_response(outcome, balance)))
}
