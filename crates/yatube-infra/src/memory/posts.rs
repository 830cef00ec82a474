//! In-memory post repository.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use yatube_core::domain::Post;
use yatube_core::error::RepoError;
use yatube_core::ports::{BaseRepository, PostRepository, PostScope};

/// Post store backed by a `HashMap` behind an async `RwLock`.
///
/// Used when no database is configured and in tests.
/// Note: Data is lost on process restart.
pub struct InMemoryPostRepository {
    store: RwLock<HashMap<Uuid, Post>>,
}

impl InMemoryPostRepository {
    pub fn new() -> Self {
        Self {
            store: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryPostRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BaseRepository<Post, Uuid> for InMemoryPostRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        Ok(self.store.read().await.get(&id).cloned())
    }

    async fn save(&self, post: Post) -> Result<Post, RepoError> {
        self.store.write().await.insert(post.id, post.clone());
        Ok(post)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        match self.store.write().await.remove(&id) {
            Some(_) => Ok(()),
            None => Err(RepoError::NotFound),
        }
    }
}

fn in_scope(post: &Post, scope: PostScope) -> bool {
    match scope {
        PostScope::All => true,
        PostScope::Group(group_id) => post.group_id == Some(group_id),
        PostScope::Author(author_id) => post.author_id == author_id,
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn count_in_scope(&self, scope: PostScope) -> Result<u64, RepoError> {
        let store = self.store.read().await;
        Ok(store.values().filter(|p| in_scope(p, scope)).count() as u64)
    }

    async fn find_page(
        &self,
        scope: PostScope,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<Post>, RepoError> {
        let store = self.store.read().await;
        let mut posts: Vec<&Post> = store.values().filter(|p| in_scope(p, scope)).collect();
        posts.sort_by(|a, b| Post::feed_order(a, b));

        let offset = usize::try_from(offset).unwrap_or(usize::MAX);
        let limit = usize::try_from(limit).unwrap_or(usize::MAX);
        Ok(posts.into_iter().skip(offset).take(limit).cloned().collect())
    }
}
