use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{post, put},
};
use uuid::Uuid;

use crate::{
    model::{
        CrudRepository, DatabaseError, ResourceTyped, check_access,
        entity::{Course, Module, ModuleCreate},
    },
    web::{AppState, RequestContext, WebError, WebResult, error::ErrorResponse, middlewares},
};

pub fn routes<S>(state: AppState) -> Router<S> {
    Router::new()
        .route("/", post(modules_create_handler))
        .route(
            "/{id}",
            put(modules_update_handler).delete(modules_delete_handler),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            middlewares::extract_context_fn,
        ))
        .with_state(state)
}

#[utoipa::path(
    post,
    path = "/api/v1/modules/",
    description = "Add a module to a course (course owner or admin)",
    request_body = ModuleCreate,
    responses(
        (status = 200, description = "Module created", body = Module),
        (status = 404, description = "Course not found", body = ErrorResponse),
        (status = 403, description = "You're not allowed to do this", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    security(
        ("cookie" = [])
    ),
    tag = "modules"
)]
pub(crate) async fn modules_create_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Json(payload): Json<ModuleCreate>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;

    let course = Course::find_by_id(state.mm(), user, payload.course_id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Course::get_resource_type(), e))?;

    let Some(course) = course else {
        return Err(WebError::resource_not_found(Course::get_resource_type()));
    };

    check_access(state.mm(), user, &course, user.user_id())
        .await
        .map_err(|e| {
            if let DatabaseError::Forbidden = e {
                WebError::resource_forbidden(Module::get_resource_type())
            } else {
                WebError::resource_fetch_error(Module::get_resource_type(), e)
            }
        })?;

    let created = Module::create(state.mm(), user, payload)
        .await
        .map_err(|e| WebError::resource_fetch_error(Module::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(created)))
}

#[utoipa::path(
    put,
    path = "/api/v1/modules/{module_id}",
    description = "Update a module (course owner or admin)",
    request_body = ModuleCreate,
    params(
        ("module_id" = Uuid, Path, description = "ID of the module to update")
    ),
    responses(
        (status = 200, description = "Module updated", body = Module),
        (status = 404, description = "Module not found", body = ErrorResponse),
        (status = 403, description = "You're not allowed to do this", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    security(
        ("cookie" = [])
    ),
    tag = "modules"
)]
pub(crate) async fn modules_update_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ModuleCreate>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;

    let module = Module::find_by_id(state.mm(), user, id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Module::get_resource_type(), e))?;

    let Some(module) = module else {
        return Err(WebError::resource_not_found(Module::get_resource_type()));
    };

    check_access(state.mm(), user, &module, user.user_id())
        .await
        .map_err(|e| {
            if let DatabaseError::Forbidden = e {
                WebError::resource_forbidden(Module::get_resource_type())
            } else {
                WebError::resource_fetch_error(Module::get_resource_type(), e)
            }
        })?;

    let updated = module
        .update(state.mm(), user, payload)
        .await
        .map_err(|e| WebError::resource_fetch_error(Module::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(updated)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/modules/{module_id}",
    description = "Delete a module and its lessons (course owner or admin)",
    params(
        ("module_id" = Uuid, Path, description = "ID of the module to delete")
    ),
    responses(
        (status = 200, description = "Module deleted"),
        (status = 404, description = "Module not found", body = ErrorResponse),
        (status = 403, description = "You're not allowed to do this", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    security(
        ("cookie" = [])
    ),
    tag = "modules"
)]
pub(crate) async fn modules_delete_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;

    let module = Module::find_by_id(state.mm(), user, id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Module::get_resource_type(), e))?;

    let Some(module) = module else {
        return Err(WebError::resource_not_found(Module::get_resource_type()));
    };

    check_access(state.mm(), user, &module, user.user_id())
        .await
        .map_err(|e| {
            if let DatabaseError::Forbidden = e {
                WebError::resource_forbidden(Module::get_resource_type())
            } else {
                WebError::resource_fetch_error(Module::get_resource_type(), e)
            }
        })?;

    module
        .delete(state.mm(), user)
        .await
        .map_err(|e| WebError::resource_fetch_error(Module::get_resource_type(), e))?;

    Ok(StatusCode::OK)
}
