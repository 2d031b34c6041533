use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::get,
};
use uuid::Uuid;

use crate::{
    model::{
        CrudRepository, DatabaseError, ResourceTyped, check_access,
        entity::{Course, Enrollment, EnrollmentStatus, EnrollmentWithCourseRow, LessonProgress},
    },
    progress::CourseOutline,
    web::{
        AppState, RequestContext, UserRole, WebError, WebResult,
        dto::enrollments::{EnrollBody, EnrollmentDetailResponse},
        error::ErrorResponse,
        middlewares,
    },
};

pub fn routes<S>(state: AppState) -> Router<S> {
    Router::new()
        .route("/", get(enrollments_list_handler).post(enrollments_create_handler))
        .route(
            "/{id}",
            get(enrollments_get_handler).delete(enrollments_cancel_handler),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            middlewares::extract_context_fn,
        ))
        .with_state(state)
}

#[utoipa::path(
    post,
    path = "/api/v1/enrollments/",
    description = "Enroll the acting user into a published course",
    request_body = EnrollBody,
    responses(
        (status = 200, description = "Enrollment created", body = Enrollment),
        (status = 404, description = "Course not found", body = ErrorResponse),
        (status = 409, description = "Already enrolled", body = ErrorResponse),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    security(
        ("cookie" = [])
    ),
    tag = "enrollments"
)]
pub(crate) async fn enrollments_create_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Json(payload): Json<EnrollBody>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;

    let course = Course::find_by_id(state.mm(), user, payload.course_id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Course::get_resource_type(), e))?;

    let Some(course) = course else {
        return Err(WebError::resource_not_found(Course::get_resource_type()));
    };

    // unpublished courses don't exist as far as students are concerned
    if !course.published() && user.user_role() != UserRole::Admin {
        return Err(WebError::resource_not_found(Course::get_resource_type()));
    }

    let existing =
        Enrollment::find_by_student_course(state.mm(), user, user.user_id(), course.id())
            .await
            .map_err(|e| WebError::resource_fetch_error(Enrollment::get_resource_type(), e))?;

    if existing.is_some() {
        return Err(WebError::resource_conflict(Enrollment::get_resource_type()));
    }

    let created = Enrollment::create(state.mm(), user, user.user_id(), course.id())
        .await
        .map_err(|e| WebError::resource_fetch_error(Enrollment::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(created)))
}

#[utoipa::path(
    get,
    path = "/api/v1/enrollments/",
    description = "The acting user's enrollments with course titles and progress",
    responses(
        (status = 200, description = "Enrollments collected", body = Vec<EnrollmentWithCourseRow>),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    security(
        ("cookie" = [])
    ),
    tag = "enrollments"
)]
pub(crate) async fn enrollments_list_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;

    let rows = EnrollmentWithCourseRow::all_by_student(state.mm(), user)
        .await
        .map_err(|e| WebError::resource_fetch_error(Enrollment::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(rows)))
}

#[utoipa::path(
    get,
    path = "/api/v1/enrollments/{enrollment_id}",
    description = "One enrollment unfolded over the course outline with per-lesson state",
    params(
        ("enrollment_id" = Uuid, Path, description = "ID of the enrollment to get")
    ),
    responses(
        (status = 200, description = "Enrollment found", body = EnrollmentDetailResponse),
        (status = 404, description = "Enrollment not found", body = ErrorResponse),
        (status = 403, description = "Enrollment belongs to another student", body = ErrorResponse),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    security(
        ("cookie" = [])
    ),
    tag = "enrollments"
)]
pub(crate) async fn enrollments_get_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;

    let enrollment = Enrollment::find_by_id(state.mm(), user, id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Enrollment::get_resource_type(), e))?;

    let Some(enrollment) = enrollment else {
        return Err(WebError::resource_not_found(Enrollment::get_resource_type()));
    };

    check_access(state.mm(), user, &enrollment, user.user_id())
        .await
        .map_err(|e| {
            if let DatabaseError::Forbidden = e {
                WebError::resource_forbidden(Enrollment::get_resource_type())
            } else {
                WebError::resource_fetch_error(Enrollment::get_resource_type(), e)
            }
        })?;

    let outline = CourseOutline::load(state.mm(), user, enrollment.course_id())
        .await
        .map_err(|e| WebError::resource_fetch_error(Enrollment::get_resource_type(), e))?;

    let progress_rows = LessonProgress::all_by_enrollment(state.mm(), user, enrollment.id())
        .await
        .map_err(|e| WebError::resource_fetch_error(LessonProgress::get_resource_type(), e))?;

    let detail = EnrollmentDetailResponse::new(&enrollment, outline, progress_rows);

    Ok((StatusCode::OK, Json(detail)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/enrollments/{enrollment_id}",
    description = "Cancel an active enrollment. Completed and cancelled enrollments cannot be cancelled",
    params(
        ("enrollment_id" = Uuid, Path, description = "ID of the enrollment to cancel")
    ),
    responses(
        (status = 200, description = "Enrollment cancelled", body = Enrollment),
        (status = 404, description = "Enrollment not found", body = ErrorResponse),
        (status = 403, description = "Enrollment belongs to another student", body = ErrorResponse),
        (status = 400, description = "Enrollment is not active", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    security(
        ("cookie" = [])
    ),
    tag = "enrollments"
)]
pub(crate) async fn enrollments_cancel_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;

    let enrollment = Enrollment::find_by_id(state.mm(), user, id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Enrollment::get_resource_type(), e))?;

    let Some(enrollment) = enrollment else {
        return Err(WebError::resource_not_found(Enrollment::get_resource_type()));
    };

    check_access(state.mm(), user, &enrollment, user.user_id())
        .await
        .map_err(|e| {
            if let DatabaseError::Forbidden = e {
                WebError::resource_forbidden(Enrollment::get_resource_type())
            } else {
                WebError::resource_fetch_error(Enrollment::get_resource_type(), e)
            }
        })?;

    if enrollment.status() != EnrollmentStatus::Active {
        return Err(WebError::resource_bad_request(Enrollment::get_resource_type()));
    }

    let cancelled = enrollment
        .cancel(state.mm(), user)
        .await
        .map_err(|e| WebError::resource_fetch_error(Enrollment::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(cancelled)))
}
