//! questbot-server/src/auth.rs
//!
//! Admin login tokens. Passwords are argon2 hashes stored on the
//! admin_users row; a successful login mints an HS256 JWT that the
//! admin routes require as a bearer token.

use argon2::password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use questbot_common::models::admin::AdminUser;
use questbot_core::Error;

const TOKEN_TTL_HOURS: i64 = 24;

#[derive(Debug, Serialize, Deserialize)]
pub struct AdminClaims {
    /// admin_user_id as a string.
    pub sub: String,
    pub username: String,
    pub role: String,
    pub exp: i64,
    pub iat: i64,
}

pub struct AuthKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl AuthKeys {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    pub fn issue(&self, admin: &AdminUser) -> Result<String, Error> {
        let now = Utc::now();
        let claims = AdminClaims {
            sub: admin.admin_user_id.to_string(),
            username: admin.username.clone(),
            role: admin.role.clone(),
            exp: (now + Duration::hours(TOKEN_TTL_HOURS)).timestamp(),
            iat: now.timestamp(),
        };
        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| Error::Auth(format!("Failed to issue token: {e}")))
    }

    pub fn verify(&self, token: &str) -> Result<AdminClaims, Error> {
        decode::<AdminClaims>(token, &self.decoding, &Validation::default())
            .map(|data| data.claims)
            .map_err(|_| Error::Auth("Invalid or expired token".to_string()))
    }
}

pub fn hash_password(password: &str) -> Result<String, Error> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| Error::Auth(format!("Failed to hash password: {e}")))
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn admin() -> AdminUser {
        AdminUser {
            admin_user_id: Uuid::new_v4(),
            username: "root".to_string(),
            password_hash: String::new(),
            email: None,
            role: "admin".to_string(),
            is_active: true,
            created_at: Utc::now(),
            last_login: None,
        }
    }

    #[test]
    fn issued_tokens_verify_and_carry_the_admin() {
        let keys = AuthKeys::new("test-secret");
        let admin = admin();
        let token = keys.issue(&admin).unwrap();
        let claims = keys.verify(&token).unwrap();
        assert_eq!(claims.sub, admin.admin_user_id.to_string());
        assert_eq!(claims.username, "root");
        assert_eq!(claims.role, "admin");
    }

    #[test]
    fn tokens_from_another_secret_are_rejected() {
        let keys = AuthKeys::new("test-secret");
        let other = AuthKeys::new("other-secret");
        let token = other.issue(&admin()).unwrap();
        assert!(keys.verify(&token).is_err());
    }

    #[test]
    fn password_hashing_round_trips() {
        let hash = hash_password("hunter2").unwrap();
        assert!(verify_password("hunter2", &hash));
        assert!(!verify_password("hunter3", &hash));
        assert!(!verify_password("hunter2", "not-a-phc-string"));
    }
}
