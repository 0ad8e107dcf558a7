// questbot-server/src/routes/rewards.rs

use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use questbot_common::models::reward::Reward;
use questbot_common::traits::repository_traits::RewardRepository;
use questbot_core::services::RedemptionOutcome;
use questbot_core::Error;

use crate::auth::AdminClaims;
use crate::routes::{ApiError, AppState};

#[derive(Debug, Deserialize)]
pub struct RewardsQuery {
    #[serde(default = "default_active_only")]
    pub active_only: bool,
}

fn default_active_only() -> bool {
    true
}

pub async fn list_rewards(
    State(ctx): State<AppState>,
    Query(q): Query<RewardsQuery>,
) -> Result<Json<Vec<Reward>>, ApiError> {
    Ok(Json(ctx.reward_repo.list(q.active_only).await?))
}

#[derive(Debug, Deserialize)]
pub struct RewardCreate {
    pub title: String,
    pub description: Option<String>,
    pub reward_type: String,
    pub points_cost: i64,
    pub quantity_available: Option<i64>,
    pub image_url: Option<String>,
    pub code_prefix: Option<String>,
}

pub async fn create_reward(
    claims: AdminClaims,
    State(ctx): State<AppState>,
    Json(req): Json<RewardCreate>,
) -> Result<Json<Reward>, ApiError> {
    if req.points_cost <= 0 {
        return Err(ApiError(Error::Validation(
            "points_cost must be positive".to_string(),
        )));
    }
    if matches!(req.quantity_available, Some(q) if q < 0) {
        return Err(ApiError(Error::Validation(
            "quantity_available must be non-negative".to_string(),
        )));
    }

    let now = Utc::now();
    let reward = Reward {
        reward_id: Uuid::new_v4(),
        title: req.title,
        description: req.description,
        reward_type: req.reward_type,
        points_cost: req.points_cost,
        quantity_available: req.quantity_available,
        quantity_claimed: 0,
        is_active: true,
        image_url: req.image_url,
        code_prefix: req.code_prefix,
        created_at: now,
        updated_at: now,
    };
    ctx.reward_repo.create(&reward).await?;
    info!("Admin '{}' created reward '{}'", claims.username, reward.title);
    Ok(Json(reward))
}

#[derive(Debug, Deserialize)]
pub struct RewardUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub points_cost: Option<i64>,
    pub quantity_available: Option<i64>,
    pub is_active: Option<bool>,
    pub image_url: Option<String>,
    pub code_prefix: Option<String>,
}

pub async fn update_reward(
    claims: AdminClaims,
    State(ctx): State<AppState>,
    Path(reward_id): Path<Uuid>,
    Json(req): Json<RewardUpdate>,
) -> Result<Json<Reward>, ApiError> {
    let mut reward = ctx
        .reward_repo
        .get(reward_id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("reward {reward_id}")))?;

    if let Some(title) = req.title {
        reward.title = title;
    }
    if let Some(description) = req.description {
        reward.description = Some(description);
    }
    if let Some(cost) = req.points_cost {
        if cost <= 0 {
            return Err(ApiError(Error::Validation(
                "points_cost must be positive".to_string(),
            )));
        }
        reward.points_cost = cost;
    }
    if let Some(quantity) = req.quantity_available {
        if quantity < reward.quantity_claimed {
            return Err(ApiError(Error::Validation(format!(
                "quantity_available ({quantity}) cannot be below quantity_claimed ({})",
                reward.quantity_claimed
            ))));
        }
        reward.quantity_available = Some(quantity);
    }
    if let Some(is_active) = req.is_active {
        reward.is_active = is_active;
    }
    if let Some(image_url) = req.image_url {
        reward.image_url = Some(image_url);
    }
    if let Some(prefix) = req.code_prefix {
        reward.code_prefix = Some(prefix);
    }
    reward.updated_at = Utc::now();

    ctx.reward_repo.update(&reward).await?;
    info!("Admin '{}' updated reward '{}'", claims.username, reward.title);
    Ok(Json(reward))
}

#[derive(Debug, Deserialize)]
pub struct RedeemRequest {
    pub telegram_id: i64,
}

#[derive(Debug, Serialize)]
pub struct RedeemResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redemption_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_total: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<&'static str>,
}

/// Refusals (out of stock, not enough points) are HTTP 200 payloads the
/// bot relays to the user, same contract as /api/verify.
pub async fn redeem(
    State(ctx): State<AppState>,
    Path(reward_id): Path<Uuid>,
    Json(req): Json<RedeemRequest>,
) -> Result<Json<RedeemResponse>, ApiError> {
    let user = ctx
        .user_service
        .get_by_telegram_id(req.telegram_id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("user with telegram_id {}", req.telegram_id)))?;

    let response = match ctx.redemption.redeem(&user, reward_id).await? {
        RedemptionOutcome::Redeemed {
            user_reward,
            balance,
        } => RedeemResponse {
            success: true,
            message: format!("Redeemed! Your code: {}", user_reward.redemption_code),
            redemption_code: Some(user_reward.redemption_code),
            new_total: Some(balance.points),
            reason: None,
        },
        RedemptionOutcome::Refused { reason, message } => RedeemResponse {
            success: false,
            message,
            redemption_code: None,
            new_total: None,
            reason: Some(reason.as_str()),
        },
    };
    Ok(Json(response))
}
