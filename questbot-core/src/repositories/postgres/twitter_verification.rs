// File: questbot-core/src/repositories/postgres/twitter_verification.rs

use async_trait::async_trait;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use questbot_common::error::Error;
use questbot_common::models::twitter::TwitterVerification;
use questbot_common::traits::repository_traits::TwitterVerificationRepository;

pub struct PostgresTwitterVerificationRepository {
    pub pool: Pool<Postgres>,
}

impl PostgresTwitterVerificationRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TwitterVerificationRepository for PostgresTwitterVerificationRepository {
    async fn get_for_pair(
        &self,
        user_id: Uuid,
        task_id: Uuid,
    ) -> Result<Option<TwitterVerification>, Error> {
        let row = sqlx::query_as::<_, TwitterVerification>(
            r#"
            SELECT twitter_verification_id, user_id, task_id, action,
                   twitter_username, verified_at
            FROM twitter_verifications
            WHERE user_id = $1 AND task_id = $2
            "#,
        )
        .bind(user_id)
        .bind(task_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn upsert(&self, verification: &TwitterVerification) -> Result<(), Error> {
        sqlx::query(
            r#"
            INSERT INTO twitter_verifications (
                twitter_verification_id, user_id, task_id, action,
                twitter_username, verified_at
            )
            VALUES ($1,$2,$3,$4,$5,$6)
            ON CONFLICT (user_id, task_id) DO UPDATE
            SET action = EXCLUDED.action,
                twitter_username = EXCLUDED.twitter_username,
                verified_at = EXCLUDED.verified_at
            "#,
        )
        .bind(verification.twitter_verification_id)
        .bind(verification.user_id)
        .bind(verification.task_id)
        .bind(&verification.action)
        .bind(&verification.twitter_username)
        .bind(verification.verified_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
