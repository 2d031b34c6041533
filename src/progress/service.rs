use uuid::Uuid;

use crate::{
    auth::generate_certificate_number,
    model::{
        DatabaseError, ModelManager, check_access,
        entity::{Certificate, Enrollment, EnrollmentStatus, LessonProgress},
    },
    progress::{CourseOutline, completion_percent},
    web::AuthenticatedUser,
};

use super::error::{ProgressError, ProgressResult};

/// Result of a completion-toggle transition, after the enrollment percent
/// has been recomputed and persisted.
#[derive(Debug)]
pub struct CompletionUpdate {
    pub enrollment_id: Uuid,
    pub progress: i32,
    pub status: EnrollmentStatus,
    pub newly_completed: bool,
    pub certificate: Option<Certificate>,
}

/// Loads the enrollment and runs every boundary check the toggle operations
/// share: the enrollment exists, the actor owns it, it is not cancelled, and
/// the lesson is actually part of the enrolled course.
async fn load_checked(
    mm: &ModelManager,
    actor: &AuthenticatedUser,
    enrollment_id: Uuid,
    lesson_id: Uuid,
) -> ProgressResult<(Enrollment, CourseOutline)> {
    let enrollment = Enrollment::find_by_id(mm, actor, enrollment_id)
        .await?
        .ok_or(ProgressError::EnrollmentNotFound)?;

    check_access(mm, actor, &enrollment, actor.user_id())
        .await
        .map_err(|e| match e {
            DatabaseError::Forbidden => ProgressError::NotEnrollmentOwner,
            other => ProgressError::Database(other),
        })?;

    if enrollment.status() == EnrollmentStatus::Cancelled {
        return Err(ProgressError::EnrollmentCancelled);
    }

    let outline = CourseOutline::load(mm, actor, enrollment.course_id()).await?;
    if !outline.contains(lesson_id) {
        return Err(ProgressError::LessonNotInCourse);
    }

    Ok((enrollment, outline))
}

/// Marks a lesson complete and recomputes the enrollment percent inside one
/// transaction. When the percent reaches 100 for the first time the
/// enrollment flips to `completed` and a certificate is issued; the
/// `status <> 'completed'` guard and the UNIQUE(enrollment_id) upsert make
/// both idempotent under duplicate submits.
#[tracing::instrument(skip(mm, actor))]
pub async fn mark_lesson_complete(
    mm: &ModelManager,
    actor: &AuthenticatedUser,
    enrollment_id: Uuid,
    lesson_id: Uuid,
) -> ProgressResult<CompletionUpdate> {
    let (enrollment, outline) = load_checked(mm, actor, enrollment_id, lesson_id).await?;

    let mut tx = mm.executor().begin().await?;

    sqlx::query(
        r#"
        INSERT INTO lesson_progress (id, enrollment_id, lesson_id, is_completed, last_position, watch_time)
        VALUES ($1, $2, $3, TRUE, 0, 0)
        ON CONFLICT (enrollment_id, lesson_id) DO UPDATE SET is_completed = TRUE
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(enrollment_id)
    .bind(lesson_id)
    .execute(&mut *tx)
    .await?;

    let completed: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM lesson_progress WHERE enrollment_id = $1 AND is_completed",
    )
    .bind(enrollment_id)
    .fetch_one(&mut *tx)
    .await?;

    let percent = completion_percent(completed, outline.total_lessons() as i64);

    sqlx::query("UPDATE enrollments SET progress = $1 WHERE id = $2")
        .bind(percent)
        .bind(enrollment_id)
        .execute(&mut *tx)
        .await?;

    let mut newly_completed = false;
    let mut certificate = None;

    if percent == 100 {
        let transitioned: Option<Uuid> = sqlx::query_scalar(
            r#"
            UPDATE enrollments
            SET status = 'completed', completed_at = now()
            WHERE id = $1 AND status <> 'completed'
            RETURNING id
            "#,
        )
        .bind(enrollment_id)
        .fetch_optional(&mut *tx)
        .await?;

        newly_completed = transitioned.is_some();
        if newly_completed {
            tracing::info!(%enrollment_id, "enrollment completed, issuing certificate");

            certificate = sqlx::query_as(
                r#"
                INSERT INTO certificates (id, enrollment_id, certificate_number)
                VALUES ($1, $2, $3)
                ON CONFLICT (enrollment_id) DO NOTHING
                RETURNING *
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(enrollment_id)
            .bind(generate_certificate_number())
            .fetch_optional(&mut *tx)
            .await?;

            // lost the insert race: the concurrent submit already issued it
            if certificate.is_none() {
                certificate = sqlx::query_as("SELECT * FROM certificates WHERE enrollment_id = $1")
                    .bind(enrollment_id)
                    .fetch_optional(&mut *tx)
                    .await?;
            }
        }
    }

    tx.commit().await?;

    let status = if percent == 100 || enrollment.status() == EnrollmentStatus::Completed {
        EnrollmentStatus::Completed
    } else {
        enrollment.status()
    };

    Ok(CompletionUpdate {
        enrollment_id,
        progress: percent,
        status,
        newly_completed,
        certificate,
    })
}

/// Unmarks a lesson. Enrollment status, completed_at and certificates are
/// monotonic: once completed, dropping below 100% only lowers the stored
/// percent, it never reverts the status or revokes the certificate.
#[tracing::instrument(skip(mm, actor))]
pub async fn mark_lesson_incomplete(
    mm: &ModelManager,
    actor: &AuthenticatedUser,
    enrollment_id: Uuid,
    lesson_id: Uuid,
) -> ProgressResult<CompletionUpdate> {
    let (enrollment, outline) = load_checked(mm, actor, enrollment_id, lesson_id).await?;

    let mut tx = mm.executor().begin().await?;

    sqlx::query(
        "UPDATE lesson_progress SET is_completed = FALSE WHERE enrollment_id = $1 AND lesson_id = $2",
    )
    .bind(enrollment_id)
    .bind(lesson_id)
    .execute(&mut *tx)
    .await?;

    let completed: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM lesson_progress WHERE enrollment_id = $1 AND is_completed",
    )
    .bind(enrollment_id)
    .fetch_one(&mut *tx)
    .await?;

    let percent = completion_percent(completed, outline.total_lessons() as i64);

    sqlx::query("UPDATE enrollments SET progress = $1 WHERE id = $2")
        .bind(percent)
        .bind(enrollment_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    Ok(CompletionUpdate {
        enrollment_id,
        progress: percent,
        status: enrollment.status(),
        newly_completed: false,
        certificate: None,
    })
}

/// Stores the player position for a lesson, creating the in-progress row on
/// the first report. Not a completion transition, so the percent is
/// untouched.
#[tracing::instrument(skip(mm, actor))]
pub async fn record_playback(
    mm: &ModelManager,
    actor: &AuthenticatedUser,
    enrollment_id: Uuid,
    lesson_id: Uuid,
    position_seconds: i32,
    watched_delta_seconds: i32,
) -> ProgressResult<LessonProgress> {
    let (_, _) = load_checked(mm, actor, enrollment_id, lesson_id).await?;

    let row = LessonProgress::record_playback(
        mm,
        actor,
        enrollment_id,
        lesson_id,
        position_seconds,
        watched_delta_seconds,
    )
    .await?;

    Ok(row)
}
