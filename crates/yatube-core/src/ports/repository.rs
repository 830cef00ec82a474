use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Group, Post, User};
use crate::error::RepoError;

/// Generic repository trait defining standard CRUD operations.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Save an entity (create or update).
    async fn save(&self, entity: T) -> Result<T, RepoError>;

    /// Delete an entity by its ID.
    async fn delete(&self, id: ID) -> Result<(), RepoError>;
}

/// Which posts a storage query selects. Group filters are already resolved
/// to an id here; slug lookup happens in the feed service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostScope {
    All,
    Group(Uuid),
    Author(Uuid),
}

/// User repository with domain-specific methods.
#[async_trait]
pub trait UserRepository: BaseRepository<User, Uuid> {
    /// Find a user by their username.
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError>;
}

/// Group repository.
#[async_trait]
pub trait GroupRepository: BaseRepository<Group, Uuid> {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Group>, RepoError>;

    /// All groups ordered by title, used to populate choice fields.
    async fn list(&self) -> Result<Vec<Group>, RepoError>;
}

/// Post repository.
///
/// Pages are read in feed order: `created_at` descending, then `id`
/// descending.
#[async_trait]
pub trait PostRepository: BaseRepository<Post, Uuid> {
    async fn count_in_scope(&self, scope: PostScope) -> Result<u64, RepoError>;

    /// At most `limit` posts of `scope` in feed order, skipping the first `offset`.
    async fn find_page(
        &self,
        scope: PostScope,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<Post>, RepoError>;
}
