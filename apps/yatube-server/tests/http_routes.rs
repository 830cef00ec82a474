use std::sync::Arc;

use actix_web::http::{StatusCode, header};
use actix_web::{App, test, web};
use chrono::{TimeDelta, Utc};
use serde_json::Value;

use yatube_core::domain::{Group, Post, User};
use yatube_core::ports::{BaseRepository, PostRepository, PostScope, TokenService};
use yatube_infra::auth::{JwtConfig, JwtTokenService};
use yatube_server::handlers;
use yatube_server::observability::{REQUEST_ID_HEADER, RequestIdMiddleware};
use yatube_server::state::AppState;
use yatube_shared::dto::PostFormData;

struct Fixture {
    state: AppState,
    tokens: Arc<dyn TokenService>,
    author: User,
    other: User,
    group: Group,
    other_group: Group,
    /// The newest of the thirteen fixture posts.
    post: Post,
}

impl Fixture {
    fn bearer(&self, user: &User) -> (header::HeaderName, String) {
        let token = self.tokens.generate_token(user.id, &user.username).unwrap();
        (header::AUTHORIZATION, format!("Bearer {token}"))
    }

    async fn post_count(&self) -> u64 {
        self.state
            .posts
            .count_in_scope(PostScope::All)
            .await
            .unwrap()
    }
}

async fn fixture() -> Fixture {
    let state = AppState::in_memory();
    let tokens: Arc<dyn TokenService> =
        Arc::new(JwtTokenService::new(JwtConfig::new("test-secret")));

    let author = state.users.save(User::new("auth").unwrap()).await.unwrap();
    let other = state.users.save(User::new("other").unwrap()).await.unwrap();
    let group = state
        .groups
        .save(Group::new("Тестовая группа", "test-slug", "Тестовое описание").unwrap())
        .await
        .unwrap();
    let other_group = state
        .groups
        .save(Group::new("Другая группа", "other-slug", "").unwrap())
        .await
        .unwrap();

    let base = Utc::now() - TimeDelta::hours(1);
    let mut post = None;
    for i in 0..13 {
        let mut p = Post::new(author.id, format!("Тестовый пост {i}"), Some(group.id));
        p.created_at = base + TimeDelta::seconds(i);
        post = Some(state.posts.save(p).await.unwrap());
    }

    Fixture {
        state,
        tokens,
        author,
        other,
        group,
        other_group,
        post: post.unwrap(),
    }
}

macro_rules! app {
    ($fx:expr) => {
        test::init_service(
            App::new()
                .wrap(RequestIdMiddleware)
                .app_data(web::Data::new($fx.state.clone()))
                .app_data(web::Data::new($fx.tokens.clone()))
                .configure(handlers::configure_routes)
                .default_service(web::to(handlers::not_found)),
        )
        .await
    };
}

#[actix_rt::test]
async fn public_pages_use_expected_templates() {
    let fx = fixture().await;
    let app = app!(fx);

    let pages = [
        ("/".to_string(), "posts/index.html"),
        ("/group/test-slug/".to_string(), "posts/group_list.html"),
        ("/profile/auth/".to_string(), "posts/profile.html"),
        (format!("/posts/{}/", fx.post.id), "posts/post_detail.html"),
        ("/about/author/".to_string(), "about/author.html"),
        ("/about/tech/".to_string(), "about/tech.html"),
    ];

    for (uri, template) in pages {
        let req = test::TestRequest::get().uri(&uri).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK, "{uri}");

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["template"], template, "{uri}");
    }
}

#[actix_rt::test]
async fn author_pages_use_form_template() {
    let fx = fixture().await;
    let app = app!(fx);

    for uri in ["/create/".to_string(), format!("/posts/{}/edit/", fx.post.id)] {
        let req = test::TestRequest::get()
            .uri(&uri)
            .insert_header(fx.bearer(&fx.author))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK, "{uri}");

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["template"], "posts/create_or_update.html", "{uri}");
    }
}

#[actix_rt::test]
async fn unknown_page_returns_404() {
    let fx = fixture().await;
    let app = app!(fx);

    let req = test::TestRequest::get().uri("/unexisting_page/").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["instance"], "/unexisting_page/");
}

#[actix_rt::test]
async fn unknown_objects_return_404() {
    let fx = fixture().await;
    let app = app!(fx);

    for uri in [
        "/group/no-such-group/".to_string(),
        "/profile/nobody/".to_string(),
        format!("/posts/{}/", uuid::Uuid::now_v7()),
        "/posts/not-a-uuid/".to_string(),
    ] {
        let req = test::TestRequest::get().uri(&uri).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND, "{uri}");
    }
}

#[actix_rt::test]
async fn feeds_paginate_by_ten() {
    let fx = fixture().await;
    let app = app!(fx);

    for base in ["/", "/group/test-slug/", "/profile/auth/"] {
        let req = test::TestRequest::get().uri(base).to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["context"]["page_obj"]["object_list"].as_array().unwrap().len(), 10);
        assert_eq!(body["context"]["page_obj"]["num_pages"], 2);
        assert_eq!(body["context"]["page_obj"]["has_next"], true);

        let req = test::TestRequest::get()
            .uri(&format!("{base}?page=2"))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["context"]["page_obj"]["object_list"].as_array().unwrap().len(), 3);
        assert_eq!(body["context"]["page_obj"]["has_previous"], true);
    }
}

#[actix_rt::test]
async fn page_past_the_end_is_empty() {
    let fx = fixture().await;
    let app = app!(fx);

    let req = test::TestRequest::get().uri("/?page=3").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert!(body["context"]["page_obj"]["object_list"].as_array().unwrap().is_empty());
    assert_eq!(body["context"]["page_obj"]["number"], 3);
}

#[actix_rt::test]
async fn invalid_page_number_is_bad_request() {
    let fx = fixture().await;
    let app = app!(fx);

    for uri in ["/?page=0", "/?page=-1", "/?page=abc"] {
        let req = test::TestRequest::get().uri(uri).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{uri}");
    }
}

#[actix_rt::test]
async fn index_context_shows_resolved_post() {
    let fx = fixture().await;
    let app = app!(fx);

    let req = test::TestRequest::get().uri("/").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    let first = &body["context"]["page_obj"]["object_list"][0];
    assert_eq!(first["text"], "Тестовый пост 12");
    assert_eq!(first["author"]["username"], "auth");
    assert_eq!(first["group"]["slug"], "test-slug");
}

#[actix_rt::test]
async fn group_and_profile_contexts() {
    let fx = fixture().await;
    let app = app!(fx);

    let req = test::TestRequest::get().uri("/group/test-slug/").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["context"]["group"]["title"], "Тестовая группа");
    assert_eq!(body["context"]["group"]["description"], "Тестовое описание");

    let req = test::TestRequest::get().uri("/profile/auth/").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["context"]["author"]["username"], "auth");
    assert_eq!(body["context"]["post_count"], 13);
}

#[actix_rt::test]
async fn empty_group_shows_no_posts() {
    let fx = fixture().await;
    let app = app!(fx);

    let req = test::TestRequest::get()
        .uri(&format!("/group/{}/", fx.other_group.slug))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert!(body["context"]["page_obj"]["object_list"].as_array().unwrap().is_empty());
    assert_eq!(body["context"]["page_obj"]["count"], 0);
}

#[actix_rt::test]
async fn post_detail_context() {
    let fx = fixture().await;
    let app = app!(fx);

    let req = test::TestRequest::get()
        .uri(&format!("/posts/{}/", fx.post.id))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["context"]["post"]["text"], fx.post.text);
    assert_eq!(body["context"]["post"]["author"]["username"], "auth");
    assert_eq!(body["context"]["author_post_count"], 13);
}

#[actix_rt::test]
async fn form_fields_have_expected_kinds() {
    let fx = fixture().await;
    let app = app!(fx);

    let req = test::TestRequest::get()
        .uri("/create/")
        .insert_header(fx.bearer(&fx.author))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    let fields = body["context"]["form"]["fields"].as_array().unwrap();
    assert_eq!(fields[0]["name"], "text");
    assert_eq!(fields[0]["kind"], "CharField");
    assert_eq!(fields[1]["name"], "group");
    assert_eq!(fields[1]["kind"], "ModelChoiceField");
    assert_eq!(fields[1]["choices"].as_array().unwrap().len(), 2);
    assert_eq!(body["context"]["is_edit"], false);
}

#[actix_rt::test]
async fn edit_form_is_prefilled() {
    let fx = fixture().await;
    let app = app!(fx);

    let req = test::TestRequest::get()
        .uri(&format!("/posts/{}/edit/", fx.post.id))
        .insert_header(fx.bearer(&fx.author))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    let fields = &body["context"]["form"]["fields"];
    assert_eq!(fields[0]["value"], fx.post.text);
    assert_eq!(fields[1]["value"], "test-slug");
    assert_eq!(body["context"]["is_edit"], true);
    assert_eq!(body["context"]["post"]["id"], fx.post.id.to_string());
}

#[actix_rt::test]
async fn create_redirects_to_profile_and_stores_post() {
    let fx = fixture().await;
    let app = app!(fx);

    let req = test::TestRequest::post()
        .uri("/create/")
        .insert_header(fx.bearer(&fx.author))
        .set_form(PostFormData {
            text: "Новый пост".to_string(),
            group: Some(fx.group.slug.clone()),
        })
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(resp.headers().get(header::LOCATION).unwrap(), "/profile/auth/");
    assert_eq!(fx.post_count().await, 14);

    let req = test::TestRequest::get().uri("/").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let first = &body["context"]["page_obj"]["object_list"][0];
    assert_eq!(first["text"], "Новый пост");
    assert_eq!(first["group"]["slug"], "test-slug");
}

#[actix_rt::test]
async fn create_redirect_encodes_username() {
    let fx = fixture().await;
    let app = app!(fx);
    let user = fx.state.users.save(User::new("лев").unwrap()).await.unwrap();

    let req = test::TestRequest::post()
        .uri("/create/")
        .insert_header(fx.bearer(&user))
        .set_form(PostFormData {
            text: "Пост".to_string(),
            group: None,
        })
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::FOUND);
    let location = resp
        .headers()
        .get(header::LOCATION)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert_eq!(location, "/profile/%D0%BB%D0%B5%D0%B2/");

    let req = test::TestRequest::get().uri(&location).to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["context"]["author"]["username"], "лев");
    assert_eq!(body["context"]["post_count"], 1);
}

#[actix_rt::test]
async fn create_with_empty_text_shows_form_errors() {
    let fx = fixture().await;
    let app = app!(fx);

    let req = test::TestRequest::post()
        .uri("/create/")
        .insert_header(fx.bearer(&fx.author))
        .set_form(PostFormData {
            text: "   ".to_string(),
            group: None,
        })
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["template"], "posts/create_or_update.html");
    assert_eq!(
        body["context"]["form"]["fields"][0]["errors"][0],
        "This field is required."
    );
    assert_eq!(fx.post_count().await, 13);
}

#[actix_rt::test]
async fn create_with_unknown_group_shows_form_errors() {
    let fx = fixture().await;
    let app = app!(fx);

    let req = test::TestRequest::post()
        .uri("/create/")
        .insert_header(fx.bearer(&fx.author))
        .set_form(PostFormData {
            text: "Текст".to_string(),
            group: Some("no-such-group".to_string()),
        })
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert!(
        !body["context"]["form"]["fields"][1]["errors"]
            .as_array()
            .unwrap()
            .is_empty()
    );
    assert_eq!(fx.post_count().await, 13);
}

#[actix_rt::test]
async fn edit_redirects_to_detail_and_moves_group() {
    let fx = fixture().await;
    let app = app!(fx);

    let req = test::TestRequest::post()
        .uri(&format!("/posts/{}/edit/", fx.post.id))
        .insert_header(fx.bearer(&fx.author))
        .set_form(PostFormData {
            text: "Изменённый текст".to_string(),
            group: Some(fx.other_group.slug.clone()),
        })
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::FOUND);
    let location = format!("/posts/{}/", fx.post.id);
    assert_eq!(resp.headers().get(header::LOCATION).unwrap(), location.as_str());

    let req = test::TestRequest::get().uri(&location).to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["context"]["post"]["text"], "Изменённый текст");
    assert_eq!(body["context"]["post"]["group"]["slug"], "other-slug");

    let req = test::TestRequest::get().uri("/group/test-slug/").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["context"]["page_obj"]["count"], 12);

    let req = test::TestRequest::get().uri("/group/other-slug/").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["context"]["page_obj"]["count"], 1);
    assert_eq!(fx.post_count().await, 13);
}

#[actix_rt::test]
async fn anonymous_user_cannot_create_or_edit() {
    let fx = fixture().await;
    let app = app!(fx);

    let req = test::TestRequest::post()
        .uri("/create/")
        .set_form(PostFormData {
            text: "Анонимный пост".to_string(),
            group: None,
        })
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::get()
        .uri(&format!("/posts/{}/edit/", fx.post.id))
        .insert_header((header::AUTHORIZATION, "Bearer not-a-token"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    assert_eq!(fx.post_count().await, 13);
}

#[actix_rt::test]
async fn only_author_can_edit() {
    let fx = fixture().await;
    let app = app!(fx);

    let req = test::TestRequest::get()
        .uri(&format!("/posts/{}/edit/", fx.post.id))
        .insert_header(fx.bearer(&fx.other))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let req = test::TestRequest::post()
        .uri(&format!("/posts/{}/edit/", fx.post.id))
        .insert_header(fx.bearer(&fx.other))
        .set_form(PostFormData {
            text: "Чужая правка".to_string(),
            group: None,
        })
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let stored = fx.state.posts.find_by_id(fx.post.id).await.unwrap().unwrap();
    assert_eq!(stored.text, fx.post.text);
}

#[actix_rt::test]
async fn editing_unknown_post_returns_404() {
    let fx = fixture().await;
    let app = app!(fx);

    let req = test::TestRequest::get()
        .uri(&format!("/posts/{}/edit/", uuid::Uuid::now_v7()))
        .insert_header(fx.bearer(&fx.author))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_rt::test]
async fn request_id_is_echoed() {
    let fx = fixture().await;
    let app = app!(fx);

    let req = test::TestRequest::get()
        .uri("/health")
        .insert_header((REQUEST_ID_HEADER, "req-42"))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers().get(REQUEST_ID_HEADER).unwrap(), "req-42");

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["storage"], "memory");
    assert_eq!(body["database"], false);
}
