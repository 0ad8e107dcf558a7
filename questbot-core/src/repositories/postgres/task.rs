// File: questbot-core/src/repositories/postgres/task.rs

use async_trait::async_trait;
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use questbot_common::error::Error;
use questbot_common::models::task::Task;
use questbot_common::traits::repository_traits::TaskRepository;

pub struct PostgresTaskRepository {
    pub pool: Pool<Postgres>,
}

impl PostgresTaskRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

const TASK_COLUMNS: &str = r#"
    task_id,
    title,
    description,
    task_type,
    platform,
    url,
    points_reward,
    is_bonus,
    is_active,
    verification_required,
    verification_data,
    created_at,
    updated_at
"#;

#[async_trait]
impl TaskRepository for PostgresTaskRepository {
    async fn create(&self, task: &Task) -> Result<(), Error> {
        sqlx::query(
            r#"
            INSERT INTO tasks (
                task_id, title, description, task_type, platform, url,
                points_reward, is_bonus, is_active, verification_required,
                verification_data, created_at, updated_at
            )
            VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11,$12,$13)
            "#,
        )
        .bind(task.task_id)
        .bind(&task.title)
        .bind(&task.description)
        .bind(&task.task_type)
        .bind(&task.platform)
        .bind(&task.url)
        .bind(task.points_reward)
        .bind(task.is_bonus)
        .bind(task.is_active)
        .bind(task.verification_required)
        .bind(&task.verification_data)
        .bind(task.created_at)
        .bind(task.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get(&self, task_id: Uuid) -> Result<Option<Task>, Error> {
        let row = sqlx::query_as::<_, Task>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE task_id = $1"
        ))
        .bind(task_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn update(&self, task: &Task) -> Result<(), Error> {
        sqlx::query(
            r#"
            UPDATE tasks
            SET title = $1,
                description = $2,
                task_type = $3,
                platform = $4,
                url = $5,
                points_reward = $6,
                is_bonus = $7,
                is_active = $8,
                verification_required = $9,
                verification_data = $10,
                updated_at = now()
            WHERE task_id = $11
            "#,
        )
        .bind(&task.title)
        .bind(&task.description)
        .bind(&task.task_type)
        .bind(&task.platform)
        .bind(&task.url)
        .bind(task.points_reward)
        .bind(task.is_bonus)
        .bind(task.is_active)
        .bind(task.verification_required)
        .bind(&task.verification_data)
        .bind(task.task_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list(&self, active_only: bool) -> Result<Vec<Task>, Error> {
        let sql = if active_only {
            format!("SELECT {TASK_COLUMNS} FROM tasks WHERE is_active = TRUE ORDER BY created_at ASC")
        } else {
            format!("SELECT {TASK_COLUMNS} FROM tasks ORDER BY created_at ASC")
        };
        let rows = sqlx::query_as::<_, Task>(&sql).fetch_all(&self.pool).await?;
        Ok(rows)
    }

    async fn soft_delete(&self, task_id: Uuid) -> Result<(), Error> {
        sqlx::query("UPDATE tasks SET is_active = FALSE, updated_at = now() WHERE task_id = $1")
            .bind(task_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn count_active(&self) -> Result<i64, Error> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM tasks WHERE is_active = TRUE")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.try_get("n")?)
    }
}
