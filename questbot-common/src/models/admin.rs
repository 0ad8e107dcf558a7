use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Back-office login. Passwords are argon2 hashes; auth is a single
/// bearer-token (JWT) issued at login.
#[derive(Debug, Serialize, Deserialize, Clone, sqlx::FromRow)]
pub struct AdminUser {
    pub admin_user_id: Uuid,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub email: Option<String>,
    pub role: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}
