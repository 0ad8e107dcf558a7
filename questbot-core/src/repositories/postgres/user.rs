// File: questbot-core/src/repositories/postgres/user.rs

use async_trait::async_trait;
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use questbot_common::error::Error;
use questbot_common::models::user::User;
use questbot_common::traits::repository_traits::UserRepository;

pub struct PostgresUserRepository {
    pub pool: Pool<Postgres>,
}

impl PostgresUserRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

const USER_COLUMNS: &str = r#"
    user_id,
    telegram_id,
    username,
    first_name,
    last_name,
    points,
    total_earned_points,
    is_active,
    is_banned,
    twitter_username,
    twitter_verified,
    created_at,
    updated_at
"#;

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn create(&self, user: &User) -> Result<(), Error> {
        sqlx::query(
            r#"
            INSERT INTO users (
                user_id, telegram_id, username, first_name, last_name,
                points, total_earned_points, is_active, is_banned,
                twitter_username, twitter_verified, created_at, updated_at
            )
            VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11,$12,$13)
            "#,
        )
        .bind(user.user_id)
        .bind(user.telegram_id)
        .bind(&user.username)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(user.points)
        .bind(user.total_earned_points)
        .bind(user.is_active)
        .bind(user.is_banned)
        .bind(&user.twitter_username)
        .bind(user.twitter_verified)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get(&self, user_id: Uuid) -> Result<Option<User>, Error> {
        let row = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE user_id = $1"
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn get_by_telegram_id(&self, telegram_id: i64) -> Result<Option<User>, Error> {
        let row = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE telegram_id = $1"
        ))
        .bind(telegram_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn update(&self, user: &User) -> Result<(), Error> {
        sqlx::query(
            r#"
            UPDATE users
            SET username = $1,
                first_name = $2,
                last_name = $3,
                is_active = $4,
                is_banned = $5,
                twitter_username = $6,
                twitter_verified = $7,
                updated_at = now()
            WHERE user_id = $8
            "#,
        )
        .bind(&user.username)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(user.is_active)
        .bind(user.is_banned)
        .bind(&user.twitter_username)
        .bind(user.twitter_verified)
        .bind(user.user_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list(&self, offset: i64, limit: i64) -> Result<Vec<User>, Error> {
        let rows = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY created_at ASC OFFSET $1 LIMIT $2"
        ))
        .bind(offset)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn leaderboard(&self, limit: i64) -> Result<Vec<User>, Error> {
        let rows = sqlx::query_as::<_, User>(&format!(
            r#"
            SELECT {USER_COLUMNS} FROM users
            WHERE is_active = TRUE AND is_banned = FALSE
            ORDER BY points DESC
            LIMIT $1
            "#
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn set_banned(&self, user_id: Uuid, banned: bool) -> Result<(), Error> {
        sqlx::query("UPDATE users SET is_banned = $1, updated_at = now() WHERE user_id = $2")
            .bind(banned)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn list_active_ids(&self) -> Result<Vec<Uuid>, Error> {
        let rows = sqlx::query("SELECT user_id FROM users WHERE is_active = TRUE AND is_banned = FALSE")
            .fetch_all(&self.pool)
            .await?;
        let mut ids = Vec::with_capacity(rows.len());
        for r in rows {
            ids.push(r.try_get("user_id")?);
        }
        Ok(ids)
    }

    async fn count(&self) -> Result<i64, Error> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM users")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.try_get("n")?)
    }
}
