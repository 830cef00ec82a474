//! Post handlers: feeds, post detail and the create/edit form.

use actix_web::{HttpResponse, http::header, web};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde::Deserialize;
use uuid::Uuid;

use yatube_core::FeedFilter;
use yatube_core::domain::{Post, User};
use yatube_core::error::DomainError;
use yatube_core::ports::{
    BaseRepository, GroupRepository, PostRepository, PostScope, UserRepository,
};
use yatube_shared::TemplateResponse;
use yatube_shared::dto::{
    GroupListContext, IndexContext, PostDetailContext, PostFormContext, PostFormData,
    ProfileContext,
};
use yatube_shared::templates;

use super::forms;
use super::views;
use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// Characters left unescaped in a single path segment.
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page: Option<i64>,
}

impl PageQuery {
    fn number(&self) -> i64 {
        self.page.unwrap_or(1)
    }
}

/// GET /
pub async fn index(
    state: web::Data<AppState>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let page = state.feed().assemble(&FeedFilter::All, query.number()).await?;
    let page_obj = views::page_view(&state, page).await?;

    Ok(render(templates::INDEX, IndexContext { page_obj }))
}

/// GET /group/{slug}/
pub async fn group_posts(
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let slug = path.into_inner();
    let group = state
        .groups
        .find_by_slug(&slug)
        .await?
        .ok_or_else(|| DomainError::not_found("group", &slug))?;

    let page = state
        .feed()
        .assemble(&FeedFilter::ByGroup(slug), query.number())
        .await?;
    let page_obj = views::page_view(&state, page).await?;

    Ok(render(
        templates::GROUP_LIST,
        GroupListContext {
            group: views::group_view(&group),
            page_obj,
        },
    ))
}

/// GET /profile/{username}/
pub async fn profile(
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let username = path.into_inner();
    let author = state
        .users
        .find_by_username(&username)
        .await?
        .ok_or_else(|| DomainError::not_found("user", &username))?;

    let page = state
        .feed()
        .assemble(&FeedFilter::ByAuthor(author.id), query.number())
        .await?;
    let post_count = page.total_count as u64;
    let page_obj = views::page_view(&state, page).await?;

    Ok(render(
        templates::PROFILE,
        ProfileContext {
            author: views::author_view(&author),
            post_count,
            page_obj,
        },
    ))
}

/// GET /posts/{id}/
pub async fn post_detail(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let post = state.post_service().get_post(path.into_inner()).await?;
    let author_post_count = state
        .posts
        .count_in_scope(PostScope::Author(post.author_id))
        .await?;
    let post = views::post_view(&state, post).await?;

    Ok(render(
        templates::POST_DETAIL,
        PostDetailContext {
            post,
            author_post_count,
        },
    ))
}

/// GET /create/
pub async fn post_create_form(
    state: web::Data<AppState>,
    identity: Identity,
) -> AppResult<HttpResponse> {
    current_user(&state, &identity).await?;
    let groups = state.groups.list().await?;

    Ok(render(
        templates::POST_FORM,
        PostFormContext {
            form: forms::post_form(&groups, None, None),
            is_edit: false,
            post: None,
        },
    ))
}

/// POST /create/
///
/// Redirects to the author's profile; an invalid form is shown again with
/// its errors.
pub async fn post_create(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Form<PostFormData>,
) -> AppResult<HttpResponse> {
    let user = current_user(&state, &identity).await?;
    let data = body.into_inner();

    match state
        .post_service()
        .create_post(user.id, &data.text, data.group.as_deref())
        .await
    {
        Ok(_) => Ok(redirect(profile_url(&user.username))),
        Err(DomainError::Validation { field, message }) => {
            rerender(&state, &data, field, message, None).await
        }
        Err(e) => Err(e.into()),
    }
}

/// GET /posts/{id}/edit/
pub async fn post_edit_form(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let user = current_user(&state, &identity).await?;
    let post = state.post_service().get_post(path.into_inner()).await?;
    if post.author_id != user.id {
        return Err(AppError::Forbidden);
    }

    let groups = state.groups.list().await?;
    let selected = groups
        .iter()
        .find(|g| Some(g.id) == post.group_id)
        .map(|g| g.slug.clone());
    let form = forms::post_form(&groups, Some(&post.text), selected.as_deref());

    Ok(render(
        templates::POST_FORM,
        PostFormContext {
            form,
            is_edit: true,
            post: Some(views::post_view(&state, post).await?),
        },
    ))
}

/// POST /posts/{id}/edit/
///
/// Redirects to the post's detail page.
pub async fn post_edit(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
    body: web::Form<PostFormData>,
) -> AppResult<HttpResponse> {
    let user = current_user(&state, &identity).await?;
    let post_id = path.into_inner();
    let data = body.into_inner();

    match state
        .post_service()
        .edit_post(post_id, user.id, &data.text, data.group.as_deref())
        .await
    {
        Ok(post) => Ok(redirect(format!("/posts/{}/", post.id))),
        Err(DomainError::Validation { field, message }) => {
            let post = state.post_service().get_post(post_id).await?;
            rerender(&state, &data, field, message, Some(post)).await
        }
        Err(e) => Err(e.into()),
    }
}

/// The token must belong to a user that still exists.
async fn current_user(state: &AppState, identity: &Identity) -> AppResult<User> {
    state
        .users
        .find_by_id(identity.user_id)
        .await?
        .ok_or_else(|| AppError::Unauthorized(format!("unknown user {}", identity.username)))
}

/// Show the submitted form again with the validation error attached.
async fn rerender(
    state: &AppState,
    data: &PostFormData,
    field: &str,
    message: String,
    post: Option<Post>,
) -> AppResult<HttpResponse> {
    let groups = state.groups.list().await?;
    let mut form = forms::post_form(&groups, Some(&data.text), data.group.as_deref());
    forms::add_error(&mut form, field, message);

    let post = match post {
        Some(post) => Some(views::post_view(state, post).await?),
        None => None,
    };

    Ok(render(
        templates::POST_FORM,
        PostFormContext {
            form,
            is_edit: post.is_some(),
            post,
        },
    ))
}

fn render<C: serde::Serialize>(template: &'static str, context: C) -> HttpResponse {
    HttpResponse::Ok().json(TemplateResponse::new(template, context))
}

/// Path of a profile page, with the username encoded as one path segment.
fn profile_url(username: &str) -> String {
    format!("/profile/{}/", utf8_percent_encode(username, SEGMENT))
}

fn redirect(location: String) -> HttpResponse {
    HttpResponse::Found()
        .insert_header((header::LOCATION, location))
        .finish()
}
