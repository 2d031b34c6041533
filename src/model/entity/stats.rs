//! Read-side reporting rows for the staff dashboard. Recomputed from the
//! stored rows on every request; there is no cache to invalidate.
//!
//! Every query takes `scope_owner`: `None` for the admin view over
//! everything, `Some(instructor_id)` to restrict to that instructor's
//! courses.

use crate::model::{ModelManager, error::DatabaseResult};
use crate::web::AuthenticatedUser;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct EnrollmentTotalsRow {
    pub total: i64,
    pub active: i64,
    pub completed: i64,
    pub cancelled: i64,
}

impl EnrollmentTotalsRow {
    pub async fn fetch(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        scope_owner: Option<Uuid>,
    ) -> DatabaseResult<Self> {
        let row = sqlx::query_as(
            r#"
            SELECT
                COUNT(*) AS total,
                COUNT(*) FILTER (WHERE e.status = 'active') AS active,
                COUNT(*) FILTER (WHERE e.status = 'completed') AS completed,
                COUNT(*) FILTER (WHERE e.status = 'cancelled') AS cancelled
            FROM enrollments e
            JOIN courses c ON c.id = e.course_id
            WHERE ($1::uuid IS NULL OR c.created_by = $1)
            "#,
        )
        .bind(scope_owner)
        .fetch_one(mm.executor())
        .await?;

        Ok(row)
    }
}

#[derive(Debug, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct CoursePerformanceRow {
    pub course_id: Uuid,
    pub title: String,
    pub enrollments: i64,
    pub avg_progress: f64,
}

impl CoursePerformanceRow {
    pub async fn fetch_all(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        scope_owner: Option<Uuid>,
    ) -> DatabaseResult<Vec<Self>> {
        let rows = sqlx::query_as(
            r#"
            SELECT
                c.id AS course_id,
                c.title,
                COUNT(e.id) AS enrollments,
                COALESCE(AVG(e.progress), 0)::float8 AS avg_progress
            FROM courses c
            LEFT JOIN enrollments e ON e.course_id = c.id
            WHERE ($1::uuid IS NULL OR c.created_by = $1)
            GROUP BY c.id, c.title
            ORDER BY c.title
            "#,
        )
        .bind(scope_owner)
        .fetch_all(mm.executor())
        .await?;

        Ok(rows)
    }
}

#[derive(Debug, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct DailyEnrollmentRow {
    pub day: NaiveDate,
    pub enrollments: i64,
}

impl DailyEnrollmentRow {
    /// Signup histogram over the trailing `days` window.
    pub async fn fetch_window(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        scope_owner: Option<Uuid>,
        days: i32,
    ) -> DatabaseResult<Vec<Self>> {
        let rows = sqlx::query_as(
            r#"
            SELECT
                date_trunc('day', e.enrolled_at)::date AS day,
                COUNT(*) AS enrollments
            FROM enrollments e
            JOIN courses c ON c.id = e.course_id
            WHERE e.enrolled_at >= now() - make_interval(days => $2)
              AND ($1::uuid IS NULL OR c.created_by = $1)
            GROUP BY day
            ORDER BY day
            "#,
        )
        .bind(scope_owner)
        .bind(days)
        .fetch_all(mm.executor())
        .await?;

        Ok(rows)
    }
}

pub async fn total_watch_time_seconds(
    mm: &ModelManager,
    _actor: &AuthenticatedUser,
    scope_owner: Option<Uuid>,
) -> DatabaseResult<i64> {
    let total: i64 = sqlx::query_scalar(
        r#"
        SELECT COALESCE(SUM(lp.watch_time), 0)::int8
        FROM lesson_progress lp
        JOIN enrollments e ON e.id = lp.enrollment_id
        JOIN courses c ON c.id = e.course_id
        WHERE ($1::uuid IS NULL OR c.created_by = $1)
        "#,
    )
    .bind(scope_owner)
    .fetch_one(mm.executor())
    .await?;

    Ok(total)
}
