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
    model::{ResourceTyped, entity::Certificate},
    web::{
        AppState, RequestContext, UserRole, WebError, WebResult, error::ErrorResponse, middlewares,
    },
};

pub fn routes<S>(state: AppState) -> Router<S> {
    Router::new()
        .route("/", get(certificates_list_handler))
        .route("/{id}", get(certificates_get_handler))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            middlewares::extract_context_fn,
        ))
        .with_state(state)
}

#[utoipa::path(
    get,
    path = "/api/v1/certificates/",
    description = "Certificates earned by the acting user",
    responses(
        (status = 200, description = "Certificates collected", body = Vec<Certificate>),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    security(
        ("cookie" = [])
    ),
    tag = "certificates"
)]
pub(crate) async fn certificates_list_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;

    let certificates = Certificate::all_by_student(state.mm(), user)
        .await
        .map_err(|e| WebError::resource_fetch_error(Certificate::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(certificates)))
}

#[utoipa::path(
    get,
    path = "/api/v1/certificates/{certificate_id}",
    description = "One certificate (owner or admin)",
    params(
        ("certificate_id" = Uuid, Path, description = "ID of the certificate to get")
    ),
    responses(
        (status = 200, description = "Certificate found", body = Certificate),
        (status = 404, description = "Certificate not found", body = ErrorResponse),
        (status = 403, description = "Certificate belongs to another student", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    security(
        ("cookie" = [])
    ),
    tag = "certificates"
)]
pub(crate) async fn certificates_get_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;

    let certificate = Certificate::find_by_id(state.mm(), user, id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Certificate::get_resource_type(), e))?;

    let Some(certificate) = certificate else {
        return Err(WebError::resource_not_found(Certificate::get_resource_type()));
    };

    let owner = certificate
        .student_id(state.mm(), user)
        .await
        .map_err(|e| WebError::resource_fetch_error(Certificate::get_resource_type(), e))?;

    if owner != user.user_id() && user.user_role() != UserRole::Admin {
        return Err(WebError::resource_forbidden(Certificate::get_resource_type()));
    }

    Ok((StatusCode::OK, Json(certificate)))
}
