use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::get,
};
use serde::Deserialize;

use crate::{
    model::{
        ResourceTyped,
        entity::{
            CoursePerformanceRow, DailyEnrollmentRow, Enrollment, EnrollmentTotalsRow,
            total_watch_time_seconds,
        },
    },
    web::{
        AppState, RequestContext, UserRole, WebError, WebResult, dto::stats::DashboardResponse,
        error::ErrorResponse, middlewares,
    },
};

const DEFAULT_WINDOW_DAYS: i32 = 30;

pub fn routes<S>(state: AppState) -> Router<S> {
    Router::new()
        .route("/dashboard", get(stats_dashboard_handler))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            middlewares::extract_context_fn,
        ))
        .with_state(state)
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct DashboardQuery {
    /// Trailing window for the signup histogram, in days.
    pub days: Option<i32>,
}

#[utoipa::path(
    get,
    path = "/api/v1/stats/dashboard",
    description = "Enrollment/progress aggregates for staff dashboards. Admins see everything, instructors their own courses. Recomputed on every request",
    params(
        ("days" = Option<i32>, Query, description = "Signup histogram window, default 30 days")
    ),
    responses(
        (status = 200, description = "Dashboard computed", body = DashboardResponse),
        (status = 403, description = "Students cannot access the dashboard", body = ErrorResponse),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    security(
        ("cookie" = [])
    ),
    tag = "stats"
)]
pub(crate) async fn stats_dashboard_handler(
    ctx: RequestContext,
    Query(query): Query<DashboardQuery>,
    State(state): State<AppState>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    if !user.is_staff() {
        return Err(WebError::resource_forbidden(Enrollment::get_resource_type()));
    }

    let scope_owner = match user.user_role() {
        UserRole::Admin => None,
        _ => Some(user.user_id()),
    };

    let days = query.days.unwrap_or(DEFAULT_WINDOW_DAYS).clamp(1, 365);

    let (totals, courses, watch_time, daily) = tokio::try_join!(
        EnrollmentTotalsRow::fetch(state.mm(), user, scope_owner),
        CoursePerformanceRow::fetch_all(state.mm(), user, scope_owner),
        total_watch_time_seconds(state.mm(), user, scope_owner),
        DailyEnrollmentRow::fetch_window(state.mm(), user, scope_owner, days),
    )
    .map_err(|e| WebError::resource_fetch_error(Enrollment::get_resource_type(), e))?;

    let res = DashboardResponse::new(totals, courses, watch_time, daily);

    Ok((StatusCode::OK, Json(res)))
}
