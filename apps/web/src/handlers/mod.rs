//! HTTP handlers and route configuration.

pub mod accounts;
pub mod editor;
pub mod health;
pub mod posts;

use actix_web::{HttpResponse, error, web};

use crate::middleware::error::AppError;
use crate::upload::MAX_UPLOAD_BYTES;

/// Fallback for unmatched routes.
pub async fn not_found() -> HttpResponse {
    error::ResponseError::error_response(&AppError::NotFound("no matching route".to_string()))
}

/// Configure all application routes.
///
/// Fixed prefixes are registered before the `/{username}/...` patterns so a
/// username can never shadow them.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::PathConfig::default()
            .error_handler(|err, _req| AppError::NotFound(err.to_string()).into()),
    )
    .app_data(web::PayloadConfig::new(MAX_UPLOAD_BYTES))
    .app_data(
        web::FormConfig::default()
            .limit(MAX_UPLOAD_BYTES)
            .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into()),
    )
    .route("/api/health", web::get().to(health::health_check))
    .service(
        web::scope("/auth")
            .service(
                web::resource("/signup/")
                    .route(web::get().to(accounts::signup_form))
                    .route(web::post().to(accounts::signup)),
            )
            .service(
                web::resource("/login/")
                    .route(web::get().to(accounts::login_form))
                    .route(web::post().to(accounts::login)),
            )
            .route("/logout/", web::get().to(accounts::logout)),
    )
    .route("/", web::get().to(posts::index))
    .service(
        web::resource("/new/")
            .route(web::get().to(editor::new_post_form))
            .route(web::post().to(editor::new_post)),
    )
    .route("/group/{slug}/", web::get().to(posts::group_posts))
    .service(
        web::resource("/{username}/{post_id}/edit/")
            .route(web::get().to(editor::edit_post_form))
            .route(web::post().to(editor::edit_post)),
    )
    .route(
        "/{username}/{post_id}/comment/",
        web::post().to(editor::add_comment),
    )
    .route("/{username}/{post_id}/", web::get().to(posts::post_view))
    .route("/{username}/", web::get().to(posts::profile));
}
