// File: questbot-core/src/repositories/postgres/reward.rs

use async_trait::async_trait;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use questbot_common::error::Error;
use questbot_common::models::reward::Reward;
use questbot_common::traits::repository_traits::RewardRepository;

pub struct PostgresRewardRepository {
    pub pool: Pool<Postgres>,
}

impl PostgresRewardRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

const REWARD_COLUMNS: &str = r#"
    reward_id,
    title,
    description,
    reward_type,
    points_cost,
    quantity_available,
    quantity_claimed,
    is_active,
    image_url,
    code_prefix,
    created_at,
    updated_at
"#;

#[async_trait]
impl RewardRepository for PostgresRewardRepository {
    async fn create(&self, reward: &Reward) -> Result<(), Error> {
        sqlx::query(
            r#"
            INSERT INTO rewards (
                reward_id, title, description, reward_type, points_cost,
                quantity_available, quantity_claimed, is_active,
                image_url, code_prefix, created_at, updated_at
            )
            VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11,$12)
            "#,
        )
        .bind(reward.reward_id)
        .bind(&reward.title)
        .bind(&reward.description)
        .bind(&reward.reward_type)
        .bind(reward.points_cost)
        .bind(reward.quantity_available)
        .bind(reward.quantity_claimed)
        .bind(reward.is_active)
        .bind(&reward.image_url)
        .bind(&reward.code_prefix)
        .bind(reward.created_at)
        .bind(reward.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get(&self, reward_id: Uuid) -> Result<Option<Reward>, Error> {
        let row = sqlx::query_as::<_, Reward>(&format!(
            "SELECT {REWARD_COLUMNS} FROM rewards WHERE reward_id = $1"
        ))
        .bind(reward_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn update(&self, reward: &Reward) -> Result<(), Error> {
        sqlx::query(
            r#"
            UPDATE rewards
            SET title = $1,
                description = $2,
                reward_type = $3,
                points_cost = $4,
                quantity_available = $5,
                is_active = $6,
                image_url = $7,
                code_prefix = $8,
                updated_at = now()
            WHERE reward_id = $9
            "#,
        )
        .bind(&reward.title)
        .bind(&reward.description)
        .bind(&reward.reward_type)
        .bind(reward.points_cost)
        .bind(reward.quantity_available)
        .bind(reward.is_active)
        .bind(&reward.image_url)
        .bind(&reward.code_prefix)
        .bind(reward.reward_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list(&self, active_only: bool) -> Result<Vec<Reward>, Error> {
        let sql = if active_only {
            format!("SELECT {REWARD_COLUMNS} FROM rewards WHERE is_active = TRUE ORDER BY points_cost ASC")
        } else {
            format!("SELECT {REWARD_COLUMNS} FROM rewards ORDER BY points_cost ASC")
        };
        let rows = sqlx::query_as::<_, Reward>(&sql).fetch_all(&self.pool).await?;
        Ok(rows)
    }

    async fn claim_stock(&self, reward_id: Uuid) -> Result<bool, Error> {
        // Guarded increment: refuses once stock is exhausted.
        let result = sqlx::query(
            r#"
            UPDATE rewards
            SET quantity_claimed = quantity_claimed + 1,
                updated_at = now()
            WHERE reward_id = $1
              AND (quantity_available IS NULL OR quantity_claimed < quantity_available)
            "#,
        )
        .bind(reward_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn release_stock(&self, reward_id: Uuid) -> Result<(), Error> {
        sqlx::query(
            r#"
            UPDATE rewards
            SET quantity_claimed = quantity_claimed - 1,
                updated_at = now()
            WHERE reward_id = $1 AND quantity_claimed > 0
            "#,
        )
        .bind(reward_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
