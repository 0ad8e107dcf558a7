// File: questbot-core/src/repositories/postgres/video_view.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use questbot_common::error::Error;
use questbot_common::models::video_view::{VideoView, VideoViewStatus};
use questbot_common::traits::repository_traits::VideoViewRepository;

pub struct PostgresVideoViewRepository {
    pub pool: Pool<Postgres>,
}

impl PostgresVideoViewRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

fn row_to_view(r: &PgRow) -> Result<VideoView, Error> {
    let status: String = r.try_get("status")?;
    Ok(VideoView {
        video_view_id: r.try_get("video_view_id")?,
        user_id: r.try_get("user_id")?,
        task_id: r.try_get("task_id")?,
        status: VideoViewStatus::parse(&status),
        started_at: r.try_get("started_at")?,
        code_attempts: r.try_get("code_attempts")?,
        completed_at: r.try_get("completed_at")?,
    })
}

const VIEW_COLUMNS: &str =
    "video_view_id, user_id, task_id, status, started_at, code_attempts, completed_at";

#[async_trait]
impl VideoViewRepository for PostgresVideoViewRepository {
    async fn insert(&self, view: &VideoView) -> Result<(), Error> {
        sqlx::query(
            r#"
            INSERT INTO video_views (
                video_view_id, user_id, task_id, status,
                started_at, code_attempts, completed_at
            )
            VALUES ($1,$2,$3,$4,$5,$6,$7)
            "#,
        )
        .bind(view.video_view_id)
        .bind(view.user_id)
        .bind(view.task_id)
        .bind(view.status.as_str())
        .bind(view.started_at)
        .bind(view.code_attempts)
        .bind(view.completed_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_open(&self, user_id: Uuid, task_id: Uuid) -> Result<Option<VideoView>, Error> {
        let row = sqlx::query(&format!(
            r#"
            SELECT {VIEW_COLUMNS} FROM video_views
            WHERE user_id = $1 AND task_id = $2 AND status = 'watching'
            ORDER BY started_at DESC
            LIMIT 1
            "#
        ))
        .bind(user_id)
        .bind(task_id)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(row_to_view).transpose()
    }

    async fn get_latest(&self, user_id: Uuid, task_id: Uuid) -> Result<Option<VideoView>, Error> {
        let row = sqlx::query(&format!(
            r#"
            SELECT {VIEW_COLUMNS} FROM video_views
            WHERE user_id = $1 AND task_id = $2
            ORDER BY started_at DESC
            LIMIT 1
            "#
        ))
        .bind(user_id)
        .bind(task_id)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(row_to_view).transpose()
    }

    async fn increment_attempts(&self, video_view_id: Uuid) -> Result<i32, Error> {
        let row = sqlx::query(
            r#"
            UPDATE video_views
            SET code_attempts = code_attempts + 1
            WHERE video_view_id = $1
            RETURNING code_attempts
            "#,
        )
        .bind(video_view_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.try_get("code_attempts")?)
    }

    async fn set_status(
        &self,
        video_view_id: Uuid,
        status: VideoViewStatus,
        completed_at: Option<DateTime<Utc>>,
    ) -> Result<(), Error> {
        sqlx::query(
            r#"
            UPDATE video_views
            SET status = $1, completed_at = $2
            WHERE video_view_id = $3
            "#,
        )
        .bind(status.as_str())
        .bind(completed_at)
        .bind(video_view_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
