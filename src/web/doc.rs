use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

pub struct CookieAuthModifier;

impl Modify for CookieAuthModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(schema) = openapi.components.as_mut() {
            schema.add_security_scheme(
                "cookie",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                    "SID",
                    "JWT token for current user",
                ))),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::web::routes::user::user_signup_handler,
        crate::web::routes::user::user_signin_handler,
        crate::web::routes::user::user_list_handler,
        crate::web::routes::user::user_update_handler,
        crate::web::routes::user::user_delete_handler,
        crate::web::routes::courses::courses_list_handler,
        crate::web::routes::courses::courses_create_handler,
        crate::web::routes::courses::courses_get_handler,
        crate::web::routes::courses::courses_update_handler,
        crate::web::routes::courses::courses_delete_handler,
        crate::web::routes::modules::modules_create_handler,
        crate::web::routes::modules::modules_update_handler,
        crate::web::routes::modules::modules_delete_handler,
        crate::web::routes::lessons::lessons_create_handler,
        crate::web::routes::lessons::lessons_get_handler,
        crate::web::routes::lessons::lessons_update_handler,
        crate::web::routes::lessons::lessons_delete_handler,
        crate::web::routes::lessons::lessons_mark_complete_handler,
        crate::web::routes::lessons::lessons_mark_incomplete_handler,
        crate::web::routes::lessons::lessons_playback_handler,
        crate::web::routes::enrollments::enrollments_create_handler,
        crate::web::routes::enrollments::enrollments_list_handler,
        crate::web::routes::enrollments::enrollments_get_handler,
        crate::web::routes::enrollments::enrollments_cancel_handler,
        crate::web::routes::certificates::certificates_list_handler,
        crate::web::routes::certificates::certificates_get_handler,
        crate::web::routes::stats::stats_dashboard_handler,
    ),
    modifiers(&CookieAuthModifier),
)]
pub struct ApiDoc;
