// File: questbot-core/src/repositories/postgres/user_task.rs

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use questbot_common::error::Error;
use questbot_common::models::user_task::{UserTask, UserTaskStatus};
use questbot_common::traits::repository_traits::UserTaskRepository;

pub struct PostgresUserTaskRepository {
    pub pool: Pool<Postgres>,
}

impl PostgresUserTaskRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

const USER_TASK_COLUMNS: &str = r#"
    user_task_id,
    user_id,
    task_id,
    status,
    points_earned,
    proof_url,
    submission_text,
    verified_by,
    verified_at,
    completed_at,
    created_at,
    updated_at
"#;

fn row_to_user_task(r: &PgRow) -> Result<UserTask, Error> {
    let status: String = r.try_get("status")?;
    Ok(UserTask {
        user_task_id: r.try_get("user_task_id")?,
        user_id: r.try_get("user_id")?,
        task_id: r.try_get("task_id")?,
        status: UserTaskStatus::parse(&status),
        points_earned: r.try_get("points_earned")?,
        proof_url: r.try_get("proof_url")?,
        submission_text: r.try_get("submission_text")?,
        verified_by: r.try_get("verified_by")?,
        verified_at: r.try_get("verified_at")?,
        completed_at: r.try_get("completed_at")?,
        created_at: r.try_get("created_at")?,
        updated_at: r.try_get("updated_at")?,
    })
}

#[async_trait]
impl UserTaskRepository for PostgresUserTaskRepository {
    async fn get(&self, user_task_id: Uuid) -> Result<Option<UserTask>, Error> {
        let row = sqlx::query(&format!(
            "SELECT {USER_TASK_COLUMNS} FROM user_tasks WHERE user_task_id = $1"
        ))
        .bind(user_task_id)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(row_to_user_task).transpose()
    }

    async fn get_for_pair(&self, user_id: Uuid, task_id: Uuid) -> Result<Option<UserTask>, Error> {
        let row = sqlx::query(&format!(
            "SELECT {USER_TASK_COLUMNS} FROM user_tasks WHERE user_id = $1 AND task_id = $2"
        ))
        .bind(user_id)
        .bind(task_id)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(row_to_user_task).transpose()
    }

    async fn upsert(&self, record: &UserTask) -> Result<UserTask, Error> {
        // UNIQUE (user_id, task_id) keeps this to one row per pair.
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO user_tasks (
                user_task_id, user_id, task_id, status, points_earned,
                proof_url, submission_text, verified_by, verified_at,
                completed_at, created_at, updated_at
            )
            VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11,$12)
            ON CONFLICT (user_id, task_id) DO UPDATE
            SET status = EXCLUDED.status,
                points_earned = EXCLUDED.points_earned,
                proof_url = COALESCE(EXCLUDED.proof_url, user_tasks.proof_url),
                submission_text = COALESCE(EXCLUDED.submission_text, user_tasks.submission_text),
                verified_by = EXCLUDED.verified_by,
                verified_at = EXCLUDED.verified_at,
                completed_at = EXCLUDED.completed_at,
                updated_at = now()
            RETURNING {USER_TASK_COLUMNS}
            "#
        ))
        .bind(record.user_task_id)
        .bind(record.user_id)
        .bind(record.task_id)
        .bind(record.status.as_str())
        .bind(record.points_earned)
        .bind(&record.proof_url)
        .bind(&record.submission_text)
        .bind(record.verified_by)
        .bind(record.verified_at)
        .bind(record.completed_at)
        .bind(record.created_at)
        .bind(record.updated_at)
        .fetch_one(&self.pool)
        .await?;
        row_to_user_task(&row)
    }

    async fn update(&self, record: &UserTask) -> Result<(), Error> {
        sqlx::query(
            r#"
            UPDATE user_tasks
            SET status = $1,
                points_earned = $2,
                proof_url = $3,
                submission_text = $4,
                verified_by = $5,
                verified_at = $6,
                completed_at = $7,
                updated_at = now()
            WHERE user_task_id = $8
            "#,
        )
        .bind(record.status.as_str())
        .bind(record.points_earned)
        .bind(&record.proof_url)
        .bind(&record.submission_text)
        .bind(record.verified_by)
        .bind(record.verified_at)
        .bind(record.completed_at)
        .bind(record.user_task_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list_by_status(
        &self,
        status: Option<UserTaskStatus>,
        limit: i64,
    ) -> Result<Vec<UserTask>, Error> {
        let rows = match status {
            Some(s) => {
                sqlx::query(&format!(
                    r#"
                    SELECT {USER_TASK_COLUMNS} FROM user_tasks
                    WHERE status = $1
                    ORDER BY created_at DESC
                    LIMIT $2
                    "#
                ))
                .bind(s.as_str())
                .bind(limit)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query(&format!(
                    r#"
                    SELECT {USER_TASK_COLUMNS} FROM user_tasks
                    ORDER BY created_at DESC
                    LIMIT $1
                    "#
                ))
                .bind(limit)
                .fetch_all(&self.pool)
                .await?
            }
        };

        let mut list = Vec::with_capacity(rows.len());
        for r in &rows {
            list.push(row_to_user_task(r)?);
        }
        Ok(list)
    }

    async fn count_by_status(&self, status: UserTaskStatus) -> Result<i64, Error> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM user_tasks WHERE status = $1")
            .bind(status.as_str())
            .fetch_one(&self.pool)
            .await?;
        Ok(row.try_get("n")?)
    }
}
