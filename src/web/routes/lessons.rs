use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{
    Json, Router,
    extract::{Path, State},
    middleware,
    response::IntoResponse,
};
use uuid::Uuid;

use crate::model::entity::{Enrollment, Lesson, LessonCreate, LessonProgress, Module};
use crate::model::{CrudRepository, DatabaseError, ResourceTyped, check_access};
use crate::progress::{self, CourseOutline};
use crate::web::dto::lessons::{
    CompletionResponse, LessonViewResponse, PlaybackUpdateBody,
};
use crate::web::error::ErrorResponse;
use crate::web::{AppState, AuthenticatedUser, RequestContext, WebError, WebResult, middlewares};

pub fn routes<S>(state: AppState) -> Router<S> {
    Router::new()
        .route("/", post(lessons_create_handler))
        .route(
            "/{id}",
            get(lessons_get_handler)
                .put(lessons_update_handler)
                .delete(lessons_delete_handler),
        )
        .route("/{id}/complete", post(lessons_mark_complete_handler))
        .route("/{id}/incomplete", post(lessons_mark_incomplete_handler))
        .route("/{id}/position", post(lessons_playback_handler))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            middlewares::extract_context_fn,
        ))
        .with_state(state)
}

/// Resolves the lesson and the acting student's enrollment in the course
/// that owns it. 404 when the lesson does not exist, 403 when the student
/// is not enrolled.
async fn resolve_enrolled_lesson(
    state: &AppState,
    user: &AuthenticatedUser,
    lesson_id: Uuid,
) -> WebResult<(Lesson, Enrollment)> {
    let lesson = Lesson::find_by_id(state.mm(), user, lesson_id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Lesson::get_resource_type(), e))?;

    let Some(lesson) = lesson else {
        return Err(WebError::resource_not_found(Lesson::get_resource_type()));
    };

    let course_id = Lesson::course_id(state.mm(), user, lesson_id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Lesson::get_resource_type(), e))?
        .ok_or_else(|| WebError::resource_not_found(Lesson::get_resource_type()))?;

    let enrollment = Enrollment::find_by_student_course(state.mm(), user, user.user_id(), course_id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Enrollment::get_resource_type(), e))?;

    let Some(enrollment) = enrollment else {
        return Err(WebError::resource_forbidden(Enrollment::get_resource_type()));
    };

    Ok((lesson, enrollment))
}

#[utoipa::path(
    get,
    path = "/api/v1/lessons/{lesson_id}",
    description = "Lesson page for an enrolled student: content, prev/next navigation and own progress state",
    params(
        ("lesson_id" = Uuid, Path, description = "ID of the lesson to get")
    ),
    responses(
        (status = 200, description = "Lesson found", body = LessonViewResponse),
        (status = 404, description = "Lesson not found", body = ErrorResponse),
        (status = 403, description = "You're not enrolled in this course", body = ErrorResponse),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    security(
        ("cookie" = [])
    ),
    tag = "lessons"
)]
pub(crate) async fn lessons_get_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ctx: RequestContext,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    let (lesson, enrollment) = resolve_enrolled_lesson(&state, user, id).await?;

    let outline = CourseOutline::load(state.mm(), user, enrollment.course_id())
        .await
        .map_err(|e| WebError::resource_fetch_error(Lesson::get_resource_type(), e))?;

    let Some(position) = progress::locate(&outline, id) else {
        // the lesson moved out of this course between the two reads
        return Err(WebError::resource_not_found(Lesson::get_resource_type()));
    };

    let progress_row = LessonProgress::find_by_pair(state.mm(), user, enrollment.id(), id)
        .await
        .map_err(|e| WebError::resource_fetch_error(LessonProgress::get_resource_type(), e))?;

    let view = LessonViewResponse::new(lesson, enrollment.id(), &position, progress_row.as_ref());

    Ok((StatusCode::OK, Json(view)))
}

#[utoipa::path(
    post,
    path = "/api/v1/lessons/{lesson_id}/complete",
    description = "Mark lesson as completed. Idempotent; flips the enrollment to completed and issues the certificate when the last lesson is done",
    params(
        ("lesson_id" = Uuid, Path, description = "ID of the lesson to mark")
    ),
    responses(
        (status = 200, description = "Lesson marked", body = CompletionResponse),
        (status = 404, description = "Lesson not found", body = ErrorResponse),
        (status = 403, description = "You're not enrolled in this course", body = ErrorResponse),
        (status = 401, description = "You're not allowed to do this", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    security(
        ("cookie" = [])
    ),
    tag = "lessons"
)]
pub(crate) async fn lessons_mark_complete_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ctx: RequestContext,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    let (_, enrollment) = resolve_enrolled_lesson(&state, user, id).await?;

    let update = progress::mark_lesson_complete(state.mm(), user, enrollment.id(), id).await?;

    Ok((StatusCode::OK, Json(CompletionResponse::from(update))))
}

#[utoipa::path(
    post,
    path = "/api/v1/lessons/{lesson_id}/incomplete",
    description = "Unmark a completed lesson. The stored percent drops; a completed enrollment and its certificate are left untouched",
    params(
        ("lesson_id" = Uuid, Path, description = "ID of the lesson to unmark")
    ),
    responses(
        (status = 200, description = "Lesson unmarked", body = CompletionResponse),
        (status = 404, description = "Lesson not found", body = ErrorResponse),
        (status = 403, description = "You're not enrolled in this course", body = ErrorResponse),
        (status = 401, description = "You're not allowed to do this", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    security(
        ("cookie" = [])
    ),
    tag = "lessons"
)]
pub(crate) async fn lessons_mark_incomplete_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ctx: RequestContext,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    let (_, enrollment) = resolve_enrolled_lesson(&state, user, id).await?;

    let update = progress::mark_lesson_incomplete(state.mm(), user, enrollment.id(), id).await?;

    Ok((StatusCode::OK, Json(CompletionResponse::from(update))))
}

#[utoipa::path(
    post,
    path = "/api/v1/lessons/{lesson_id}/position",
    description = "Player position report; stores the resume position and accumulates watch time",
    request_body = PlaybackUpdateBody,
    params(
        ("lesson_id" = Uuid, Path, description = "ID of the lesson being watched")
    ),
    responses(
        (status = 200, description = "Position stored", body = LessonProgress),
        (status = 404, description = "Lesson not found", body = ErrorResponse),
        (status = 403, description = "You're not enrolled in this course", body = ErrorResponse),
        (status = 401, description = "You're not allowed to do this", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    security(
        ("cookie" = [])
    ),
    tag = "lessons"
)]
pub(crate) async fn lessons_playback_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ctx: RequestContext,
    Json(payload): Json<PlaybackUpdateBody>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    let (_, enrollment) = resolve_enrolled_lesson(&state, user, id).await?;

    let row = progress::record_playback(
        state.mm(),
        user,
        enrollment.id(),
        id,
        payload.position_seconds,
        payload.watched_delta_seconds,
    )
    .await?;

    Ok((StatusCode::OK, Json(row)))
}

#[utoipa::path(
    post,
    path = "/api/v1/lessons/",
    description = "Add a lesson to a module (course owner or admin)",
    request_body = LessonCreate,
    responses(
        (status = 200, description = "Lesson created", body = Lesson),
        (status = 404, description = "Module not found", body = ErrorResponse),
        (status = 403, description = "You're not allowed to do this", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    security(
        ("cookie" = [])
    ),
    tag = "lessons"
)]
pub(crate) async fn lessons_create_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Json(payload): Json<LessonCreate>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;

    let module = Module::find_by_id(state.mm(), user, payload.module_id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Module::get_resource_type(), e))?;

    let Some(module) = module else {
        return Err(WebError::resource_not_found(Module::get_resource_type()));
    };

    check_access(state.mm(), user, &module, user.user_id())
        .await
        .map_err(|e| {
            if let DatabaseError::Forbidden = e {
                WebError::resource_forbidden(Lesson::get_resource_type())
            } else {
                WebError::resource_fetch_error(Lesson::get_resource_type(), e)
            }
        })?;

    let created = Lesson::create(state.mm(), user, payload)
        .await
        .map_err(|e| WebError::resource_fetch_error(Lesson::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(created)))
}

#[utoipa::path(
    put,
    path = "/api/v1/lessons/{lesson_id}",
    description = "Update a lesson (course owner or admin)",
    request_body = LessonCreate,
    params(
        ("lesson_id" = Uuid, Path, description = "ID of the lesson to update")
    ),
    responses(
        (status = 200, description = "Lesson updated", body = Lesson),
        (status = 404, description = "Lesson not found", body = ErrorResponse),
        (status = 403, description = "You're not allowed to do this", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    security(
        ("cookie" = [])
    ),
    tag = "lessons"
)]
pub(crate) async fn lessons_update_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<LessonCreate>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;

    let lesson = Lesson::find_by_id(state.mm(), user, id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Lesson::get_resource_type(), e))?;

    let Some(lesson) = lesson else {
        return Err(WebError::resource_not_found(Lesson::get_resource_type()));
    };

    check_access(state.mm(), user, &lesson, user.user_id())
        .await
        .map_err(|e| {
            if let DatabaseError::Forbidden = e {
                WebError::resource_forbidden(Lesson::get_resource_type())
            } else {
                WebError::resource_fetch_error(Lesson::get_resource_type(), e)
            }
        })?;

    let updated = lesson
        .update(state.mm(), user, payload)
        .await
        .map_err(|e| WebError::resource_fetch_error(Lesson::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(updated)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/lessons/{lesson_id}",
    description = "Delete a lesson (course owner or admin). Progress rows cascade; enrollment percentages are not rewritten retroactively",
    params(
        ("lesson_id" = Uuid, Path, description = "ID of the lesson to delete")
    ),
    responses(
        (status = 200, description = "Lesson deleted"),
        (status = 404, description = "Lesson not found", body = ErrorResponse),
        (status = 403, description = "You're not allowed to do this", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    security(
        ("cookie" = [])
    ),
    tag = "lessons"
)]
pub(crate) async fn lessons_delete_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;

    let lesson = Lesson::find_by_id(state.mm(), user, id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Lesson::get_resource_type(), e))?;

    let Some(lesson) = lesson else {
        return Err(WebError::resource_not_found(Lesson::get_resource_type()));
    };

    check_access(state.mm(), user, &lesson, user.user_id())
        .await
        .map_err(|e| {
            if let DatabaseError::Forbidden = e {
                WebError::resource_forbidden(Lesson::get_resource_type())
            } else {
                WebError::resource_fetch_error(Lesson::get_resource_type(), e)
            }
        })?;

    lesson
        .delete(state.mm(), user)
        .await
        .map_err(|e| WebError::resource_fetch_error(Lesson::get_resource_type(), e))?;

    Ok(StatusCode::OK)
}
