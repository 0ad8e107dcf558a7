// File: questbot-core/src/repositories/postgres/ledger.rs

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use questbot_common::error::Error;
use questbot_common::models::points::{PointsBalance, PointsTransaction, TransactionType};
use questbot_common::traits::repository_traits::LedgerRepository;

/// The balance update and the transaction append happen inside one
/// database transaction, with the debit guard expressed in the UPDATE
/// itself so concurrent appliers cannot lose an update.
pub struct PostgresLedgerRepository {
    pub pool: Pool<Postgres>,
}

impl PostgresLedgerRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LedgerRepository for PostgresLedgerRepository {
    async fn apply(
        &self,
        user_id: Uuid,
        amount: i64,
        transaction_type: TransactionType,
        reference_id: Option<Uuid>,
        description: Option<&str>,
    ) -> Result<Option<PointsBalance>, Error> {
        let earned_bump = if amount > 0 && transaction_type.counts_as_earned() {
            amount
        } else {
            0
        };

        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(
            r#"
            UPDATE users
            SET points = points + $1,
                total_earned_points = total_earned_points + $2,
                updated_at = now()
            WHERE user_id = $3
              AND points + $1 >= 0
            RETURNING points, total_earned_points
            "#,
        )
        .bind(amount)
        .bind(earned_bump)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(row) = row else {
            // Either the user does not exist or the debit would go negative;
            // nothing was written.
            tx.rollback().await?;
            return Ok(None);
        };

        sqlx::query(
            r#"
            INSERT INTO points_transactions (
                transaction_id, user_id, amount, transaction_type,
                reference_id, description, created_at
            )
            VALUES ($1,$2,$3,$4,$5,$6,$7)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(amount)
        .bind(transaction_type.as_str())
        .bind(reference_id)
        .bind(description)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(Some(PointsBalance {
            points: row.try_get("points")?,
            total_earned_points: row.try_get("total_earned_points")?,
        }))
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<PointsTransaction>, Error> {
        let rows = sqlx::query(
            r#"
            SELECT transaction_id, user_id, amount, transaction_type,
                   reference_id, description, created_at
            FROM points_transactions
            WHERE user_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        let mut list = Vec::with_capacity(rows.len());
        for r in rows {
            let tx_type: String = r.try_get("transaction_type")?;
            list.push(PointsTransaction {
                transaction_id: r.try_get("transaction_id")?,
                user_id: r.try_get("user_id")?,
                amount: r.try_get("amount")?,
                transaction_type: TransactionType::parse(&tx_type),
                reference_id: r.try_get("reference_id")?,
                description: r.try_get("description")?,
                created_at: r.try_get("created_at")?,
            });
        }
        Ok(list)
    }

    async fn total_points_distributed(&self) -> Result<i64, Error> {
        let row = sqlx::query(
            r#"
            SELECT COALESCE(SUM(amount), 0) AS total
            FROM points_transactions
            WHERE transaction_type = 'earned' AND amount > 0
            "#,
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(row.try_get("total")?)
    }
}
