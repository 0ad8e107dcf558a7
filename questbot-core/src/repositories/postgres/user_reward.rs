// File: questbot-core/src/repositories/postgres/user_reward.rs

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use questbot_common::error::Error;
use questbot_common::models::reward::{UserReward, UserRewardStatus};
use questbot_common::traits::repository_traits::UserRewardRepository;

pub struct PostgresUserRewardRepository {
    pub pool: Pool<Postgres>,
}

impl PostgresUserRewardRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

fn row_to_user_reward(r: &PgRow) -> Result<UserReward, Error> {
    let status: String = r.try_get("status")?;
    Ok(UserReward {
        user_reward_id: r.try_get("user_reward_id")?,
        user_id: r.try_get("user_id")?,
        reward_id: r.try_get("reward_id")?,
        redemption_code: r.try_get("redemption_code")?,
        status: UserRewardStatus::parse(&status),
        redeemed_at: r.try_get("redeemed_at")?,
        delivered_at: r.try_get("delivered_at")?,
        used_at: r.try_get("used_at")?,
    })
}

#[async_trait]
impl UserRewardRepository for PostgresUserRewardRepository {
    async fn insert(&self, user_reward: &UserReward) -> Result<(), Error> {
        sqlx::query(
            r#"
            INSERT INTO user_rewards (
                user_reward_id, user_id, reward_id, redemption_code,
                status, redeemed_at, delivered_at, used_at
            )
            VALUES ($1,$2,$3,$4,$5,$6,$7,$8)
            "#,
        )
        .bind(user_reward.user_reward_id)
        .bind(user_reward.user_id)
        .bind(user_reward.reward_id)
        .bind(&user_reward.redemption_code)
        .bind(user_reward.status.as_str())
        .bind(user_reward.redeemed_at)
        .bind(user_reward.delivered_at)
        .bind(user_reward.used_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<UserReward>, Error> {
        let rows = sqlx::query(
            r#"
            SELECT user_reward_id, user_id, reward_id, redemption_code,
                   status, redeemed_at, delivered_at, used_at
            FROM user_rewards
            WHERE user_id = $1
            ORDER BY redeemed_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        let mut list = Vec::with_capacity(rows.len());
        for r in &rows {
            list.push(row_to_user_reward(r)?);
        }
        Ok(list)
    }

    async fn count(&self) -> Result<i64, Error> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM user_rewards")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.try_get("n")?)
    }
}
