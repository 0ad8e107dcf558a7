// questbot-server/src/routes/auth.rs

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use questbot_common::traits::repository_traits::AdminUserRepository;
use questbot_core::Error;

use crate::auth::verify_password;
use crate::routes::{ApiError, AppState};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: &'static str,
}

pub async fn login(
    State(ctx): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let admin = ctx
        .admin_repo
        .get_by_username(&req.username)
        .await?
        .filter(|a| a.is_active);

    // One failure message for both unknown user and bad password.
    let Some(admin) = admin else {
        warn!("Login failed for '{}'", req.username);
        return Err(ApiError(Error::Auth(
            "Invalid username or password".to_string(),
        )));
    };
    if !verify_password(&req.password, &admin.password_hash) {
        warn!("Login failed for '{}'", req.username);
        return Err(ApiError(Error::Auth(
            "Invalid username or password".to_string(),
        )));
    }

    let token = ctx.auth_keys.issue(&admin)?;
    ctx.admin_repo.touch_last_login(admin.admin_user_id).await?;
    info!("Admin '{}' logged in", admin.username);

    Ok(Json(LoginResponse {
        access_token: token,
        token_type: "bearer",
    }))
}
