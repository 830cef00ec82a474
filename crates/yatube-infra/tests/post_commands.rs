use std::sync::Arc;

use uuid::Uuid;

use yatube_core::DomainError;
use yatube_core::FeedFilter;
use yatube_core::domain::Group;
use yatube_core::ports::{BaseRepository, PostRepository, PostScope};
use yatube_core::services::{FeedService, PostService};
use yatube_infra::{InMemoryGroupRepository, InMemoryPostRepository};

struct Fixture {
    posts: Arc<InMemoryPostRepository>,
    commands: PostService,
    feed: FeedService,
    g1: Group,
    g2: Group,
}

async fn fixture() -> Fixture {
    let posts = Arc::new(InMemoryPostRepository::new());
    let groups = Arc::new(InMemoryGroupRepository::new());

    let g1 = groups
        .save(Group::new("test-title", "test-slug", "test-descr").unwrap())
        .await
        .unwrap();
    let g2 = groups
        .save(Group::new("test-title2", "test-slug2", "test-descr2").unwrap())
        .await
        .unwrap();

    Fixture {
        commands: PostService::new(posts.clone(), groups.clone()),
        feed: FeedService::new(posts.clone(), groups),
        posts,
        g1,
        g2,
    }
}

#[tokio::test]
async fn create_stores_text_group_and_author() {
    let fx = fixture().await;
    let author = Uuid::new_v4();

    let post = fx
        .commands
        .create_post(author, "testtextsss", Some("test-slug"))
        .await
        .unwrap();

    let stored = fx.posts.find_page(PostScope::All, 0, 10).await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].id, post.id);
    assert_eq!(stored[0].text, "testtextsss");
    assert_eq!(stored[0].group_id, Some(fx.g1.id));
    assert_eq!(stored[0].author_id, author);
}

#[tokio::test]
async fn create_without_group() {
    let fx = fixture().await;

    let post = fx
        .commands
        .create_post(Uuid::new_v4(), "no group", Some(""))
        .await
        .unwrap();

    assert_eq!(post.group_id, None);
}

#[tokio::test]
async fn create_with_empty_text_leaves_store_unchanged() {
    let fx = fixture().await;

    for text in ["", "   "] {
        let result = fx.commands.create_post(Uuid::new_v4(), text, None).await;
        assert!(matches!(
            result,
            Err(DomainError::Validation { field: "text", .. })
        ));
    }

    assert_eq!(fx.posts.count_in_scope(PostScope::All).await.unwrap(), 0);
}

#[tokio::test]
async fn create_with_unknown_group_is_rejected() {
    let fx = fixture().await;

    let result = fx
        .commands
        .create_post(Uuid::new_v4(), "text", Some("nope"))
        .await;

    assert!(matches!(
        result,
        Err(DomainError::Validation { field: "group", .. })
    ));
    assert_eq!(fx.posts.count_in_scope(PostScope::All).await.unwrap(), 0);
}

#[tokio::test]
async fn edit_moves_post_between_groups() {
    let fx = fixture().await;
    let author = Uuid::new_v4();
    let post = fx
        .commands
        .create_post(author, "test-text", Some("test-slug"))
        .await
        .unwrap();

    let edited = fx
        .commands
        .edit_post(post.id, author, "Тестовый текст", Some("test-slug2"))
        .await
        .unwrap();

    assert_eq!(edited.id, post.id);
    assert_eq!(edited.text, "Тестовый текст");
    assert_eq!(edited.group_id, Some(fx.g2.id));
    assert_eq!(edited.author_id, author);
    assert_eq!(edited.created_at, post.created_at);
    assert!(edited.updated_at >= post.updated_at);

    let in_g1 = fx
        .feed
        .assemble(&FeedFilter::ByGroup(fx.g1.slug.clone()), 1)
        .await
        .unwrap();
    let in_g2 = fx
        .feed
        .assemble(&FeedFilter::ByGroup(fx.g2.slug.clone()), 1)
        .await
        .unwrap();
    assert!(in_g1.items.iter().all(|p| p.id != post.id));
    assert!(in_g2.items.iter().any(|p| p.id == post.id));
}

#[tokio::test]
async fn edit_unknown_post_is_not_found() {
    let fx = fixture().await;

    let result = fx
        .commands
        .edit_post(Uuid::new_v4(), Uuid::new_v4(), "text", None)
        .await;

    assert!(matches!(
        result,
        Err(DomainError::NotFound {
            entity_type: "post",
            ..
        })
    ));
}

#[tokio::test]
async fn edit_by_someone_else_is_forbidden() {
    let fx = fixture().await;
    let author = Uuid::new_v4();
    let post = fx.commands.create_post(author, "mine", None).await.unwrap();

    let result = fx
        .commands
        .edit_post(post.id, Uuid::new_v4(), "hijacked", None)
        .await;

    assert!(matches!(result, Err(DomainError::Forbidden)));
    let unchanged = fx.commands.get_post(post.id).await.unwrap();
    assert_eq!(unchanged.text, "mine");
}

#[tokio::test]
async fn edit_with_empty_text_keeps_original() {
    let fx = fixture().await;
    let author = Uuid::new_v4();
    let post = fx
        .commands
        .create_post(author, "original", Some("test-slug"))
        .await
        .unwrap();

    let result = fx.commands.edit_post(post.id, author, "", None).await;

    assert!(matches!(result, Err(DomainError::Validation { .. })));
    let unchanged = fx.commands.get_post(post.id).await.unwrap();
    assert_eq!(unchanged, post);
}

#[tokio::test]
async fn get_unknown_post_is_not_found() {
    let fx = fixture().await;

    assert!(matches!(
        fx.commands.get_post(Uuid::new_v4()).await,
        Err(DomainError::NotFound { .. })
    ));
}
