//! Domain-to-view conversion: resolves authors and groups for a set of posts.

use std::collections::{HashMap, HashSet};

use futures::future::try_join_all;
use uuid::Uuid;

use yatube_core::FeedPage;
use yatube_core::domain::{Group, Post, User};
use yatube_core::ports::BaseRepository;
use yatube_shared::dto::{AuthorView, GroupView, PageView, PostView};

use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

pub fn author_view(user: &User) -> AuthorView {
    AuthorView {
        id: user.id,
        username: user.username.clone(),
    }
}

pub fn group_view(group: &Group) -> GroupView {
    GroupView {
        id: group.id,
        title: group.title.clone(),
        slug: group.slug.clone(),
        description: group.description.clone(),
    }
}

/// Resolve authors and groups for `posts`, one lookup per distinct id.
pub async fn post_views(state: &AppState, posts: Vec<Post>) -> AppResult<Vec<PostView>> {
    let author_ids: HashSet<Uuid> = posts.iter().map(|p| p.author_id).collect();
    let group_ids: HashSet<Uuid> = posts.iter().filter_map(|p| p.group_id).collect();

    let authors: HashMap<Uuid, AuthorView> =
        try_join_all(author_ids.into_iter().map(|id| state.users.find_by_id(id)))
            .await?
            .into_iter()
            .flatten()
            .map(|u| (u.id, author_view(&u)))
            .collect();

    let groups: HashMap<Uuid, GroupView> =
        try_join_all(group_ids.into_iter().map(|id| state.groups.find_by_id(id)))
            .await?
            .into_iter()
            .flatten()
            .map(|g| (g.id, group_view(&g)))
            .collect();

    posts
        .into_iter()
        .map(|post| {
            let author = authors.get(&post.author_id).cloned().ok_or_else(|| {
                AppError::Internal(format!(
                    "post {} references missing author {}",
                    post.id, post.author_id
                ))
            })?;
            // A deleted group leaves the post ungrouped.
            let group = post.group_id.and_then(|id| groups.get(&id).cloned());

            Ok(PostView {
                id: post.id,
                text: post.text,
                author,
                group,
                created_at: post.created_at,
            })
        })
        .collect()
}

pub async fn post_view(state: &AppState, post: Post) -> AppResult<PostView> {
    post_views(state, vec![post])
        .await?
        .pop()
        .ok_or_else(|| AppError::Internal("post view lost during hydration".to_string()))
}

/// Hydrate a feed page into the paginator shape templates consume.
pub async fn page_view(state: &AppState, page: FeedPage) -> AppResult<PageView<PostView>> {
    let num_pages = page.total_pages();
    let has_next = page.has_next();
    let has_previous = page.has_previous();
    let FeedPage {
        items,
        page_number,
        page_size,
        total_count,
    } = page;

    Ok(PageView {
        object_list: post_views(state, items).await?,
        number: page_number,
        per_page: page_size,
        count: total_count,
        num_pages,
        has_next,
        has_previous,
    })
}
