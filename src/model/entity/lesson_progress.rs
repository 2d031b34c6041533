use crate::model::repo::ResourceTyped;
use crate::model::{ModelManager, error::DatabaseResult};
use crate::web::AuthenticatedUser;
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;

/// Per (enrollment, lesson) playback/completion record. Rows are created
/// lazily on first interaction and upserted on the unique pair after that;
/// there is never more than one row per pair.
#[derive(Debug, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct LessonProgress {
    id: Uuid,
    enrollment_id: Uuid,
    lesson_id: Uuid,
    is_completed: bool,
    last_position: i32,
    watch_time: i32,
}

impl ResourceTyped for LessonProgress {
    fn get_resource_type() -> crate::model::ResourceType {
        crate::model::ResourceType::LessonProgress
    }
}

impl LessonProgress {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn enrollment_id(&self) -> Uuid {
        self.enrollment_id
    }

    pub fn lesson_id(&self) -> Uuid {
        self.lesson_id
    }

    pub fn is_completed(&self) -> bool {
        self.is_completed
    }

    pub fn last_position(&self) -> i32 {
        self.last_position
    }

    pub fn watch_time(&self) -> i32 {
        self.watch_time
    }
}

impl LessonProgress {
    pub async fn find_by_pair(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        enrollment_id: Uuid,
        lesson_id: Uuid,
    ) -> DatabaseResult<Option<Self>> {
        let result = sqlx::query_as(
            "SELECT * FROM lesson_progress WHERE enrollment_id = $1 AND lesson_id = $2",
        )
        .bind(enrollment_id)
        .bind(lesson_id)
        .fetch_optional(mm.executor())
        .await?;
        Ok(result)
    }

    pub async fn all_by_enrollment(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        enrollment_id: Uuid,
    ) -> DatabaseResult<Vec<Self>> {
        let result = sqlx::query_as("SELECT * FROM lesson_progress WHERE enrollment_id = $1")
            .bind(enrollment_id)
            .fetch_all(mm.executor())
            .await?;
        Ok(result)
    }

    /// NotStarted -> InProgress on the first player report; later reports
    /// only move the resume position and accumulate watch time.
    pub async fn record_playback(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        enrollment_id: Uuid,
        lesson_id: Uuid,
        position_seconds: i32,
        watched_delta_seconds: i32,
    ) -> DatabaseResult<Self> {
        let result = sqlx::query_as(
            r#"
            INSERT INTO lesson_progress (id, enrollment_id, lesson_id, is_completed, last_position, watch_time)
            VALUES ($1, $2, $3, FALSE, $4, $5)
            ON CONFLICT (enrollment_id, lesson_id) DO UPDATE
                SET last_position = EXCLUDED.last_position,
                    watch_time = lesson_progress.watch_time + EXCLUDED.watch_time
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(enrollment_id)
        .bind(lesson_id)
        .bind(position_seconds.max(0))
        .bind(watched_delta_seconds.max(0))
        .fetch_one(mm.executor())
        .await?;

        Ok(result)
    }

    pub async fn count_completed(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        enrollment_id: Uuid,
    ) -> DatabaseResult<i64> {
        let result: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM lesson_progress WHERE enrollment_id = $1 AND is_completed",
        )
        .bind(enrollment_id)
        .fetch_one(mm.executor())
        .await?;
        Ok(result)
    }
}
