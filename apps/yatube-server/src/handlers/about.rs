//! Static about pages.

use actix_web::HttpResponse;

use yatube_shared::TemplateResponse;
use yatube_shared::dto::AboutContext;
use yatube_shared::templates;

/// GET /about/author/
pub async fn author() -> HttpResponse {
    page(templates::ABOUT_AUTHOR, "Об авторе")
}

/// GET /about/tech/
pub async fn tech() -> HttpResponse {
    page(templates::ABOUT_TECH, "Технологии")
}

fn page(template: &'static str, title: &str) -> HttpResponse {
    HttpResponse::Ok().json(TemplateResponse::new(
        template,
        AboutContext {
            title: title.to_string(),
        },
    ))
}
