//! HTTP handlers and route configuration.

mod about;
mod forms;
mod health;
mod posts;
mod views;

use actix_web::{HttpMessage, HttpRequest, HttpResponse, web};

use yatube_shared::ErrorResponse;

use crate::middleware::error::AppError;
use crate::observability::RequestId;

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::QueryConfig::default()
            .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into()),
    )
    .app_data(
        web::FormConfig::default()
            .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into()),
    )
    .route("/health", web::get().to(health::health_check))
    .route("/", web::get().to(posts::index))
    .route("/group/{slug}/", web::get().to(posts::group_posts))
    .route("/profile/{username}/", web::get().to(posts::profile))
    .route("/posts/{post_id}/", web::get().to(posts::post_detail))
    .service(
        web::resource("/posts/{post_id}/edit/")
            .route(web::get().to(posts::post_edit_form))
            .route(web::post().to(posts::post_edit)),
    )
    .service(
        web::resource("/create/")
            .route(web::get().to(posts::post_create_form))
            .route(web::post().to(posts::post_create)),
    )
    .service(
        web::scope("/about")
            .route("/author/", web::get().to(about::author))
            .route("/tech/", web::get().to(about::tech)),
    );
}

/// Fallback for paths no route matches.
pub async fn not_found(req: HttpRequest) -> HttpResponse {
    let request_id = req
        .extensions()
        .get::<RequestId>()
        .map(|id| id.0.clone())
        .unwrap_or_default();
    tracing::debug!(path = %req.path(), request_id = %request_id, "No route matched");

    HttpResponse::NotFound().json(
        ErrorResponse::not_found("The requested page does not exist.").with_instance(req.path()),
    )
}
