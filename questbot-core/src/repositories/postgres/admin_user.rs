// File: questbot-core/src/repositories/postgres/admin_user.rs

use async_trait::async_trait;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use questbot_common::error::Error;
use questbot_common::models::admin::AdminUser;
use questbot_common::traits::repository_traits::AdminUserRepository;

pub struct PostgresAdminUserRepository {
    pub pool: Pool<Postgres>,
}

impl PostgresAdminUserRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AdminUserRepository for PostgresAdminUserRepository {
    async fn create(&self, admin: &AdminUser) -> Result<(), Error> {
        sqlx::query(
            r#"
            INSERT INTO admin_users (
                admin_user_id, username, password_hash, email,
                role, is_active, created_at, last_login
            )
            VALUES ($1,$2,$3,$4,$5,$6,$7,$8)
            "#,
        )
        .bind(admin.admin_user_id)
        .bind(&admin.username)
        .bind(&admin.password_hash)
        .bind(&admin.email)
        .bind(&admin.role)
        .bind(admin.is_active)
        .bind(admin.created_at)
        .bind(admin.last_login)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_by_username(&self, username: &str) -> Result<Option<AdminUser>, Error> {
        let row = sqlx::query_as::<_, AdminUser>(
            r#"
            SELECT admin_user_id, username, password_hash, email,
                   role, is_active, created_at, last_login
            FROM admin_users
            WHERE username = $1 AND is_active = TRUE
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn touch_last_login(&self, admin_user_id: Uuid) -> Result<(), Error> {
        sqlx::query("UPDATE admin_users SET last_login = now() WHERE admin_user_id = $1")
            .bind(admin_user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
