use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::domain::{Group, Post};
use crate::error::DomainError;
use crate::ports::{GroupRepository, PostRepository};

/// Create, edit and look up single posts.
#[derive(Clone)]
pub struct PostService {
    posts: Arc<dyn PostRepository>,
    groups: Arc<dyn GroupRepository>,
}

impl PostService {
    pub fn new(posts: Arc<dyn PostRepository>, groups: Arc<dyn GroupRepository>) -> Self {
        Self { posts, groups }
    }

    /// Fetch a post or fail with `NotFound`.
    pub async fn get_post(&self, post_id: Uuid) -> Result<Post, DomainError> {
        self.posts
            .find_by_id(post_id)
            .await?
            .ok_or_else(|| DomainError::not_found("post", post_id))
    }

    /// Publish a new post. Nothing is stored when validation fails.
    pub async fn create_post(
        &self,
        author_id: Uuid,
        text: &str,
        group_slug: Option<&str>,
    ) -> Result<Post, DomainError> {
        let text = validate_text(text)?;
        let group = self.resolve_group(group_slug).await?;

        let post = Post::new(author_id, text, group.map(|g| g.id));
        let saved = self.posts.save(post).await?;

        tracing::info!(post_id = %saved.id, author_id = %author_id, "Post created");
        Ok(saved)
    }

    /// Replace the text and group of an existing post. Only its author may do this.
    pub async fn edit_post(
        &self,
        post_id: Uuid,
        author_id: Uuid,
        text: &str,
        group_slug: Option<&str>,
    ) -> Result<Post, DomainError> {
        let mut post = self.get_post(post_id).await?;
        if post.author_id != author_id {
            tracing::warn!(post_id = %post_id, author_id = %author_id, "Edit attempted by non-author");
            return Err(DomainError::Forbidden);
        }

        post.text = validate_text(text)?;
        post.group_id = self.resolve_group(group_slug).await?.map(|g| g.id);
        post.updated_at = Utc::now();

        let saved = self.posts.save(post).await?;

        tracing::info!(post_id = %saved.id, "Post edited");
        Ok(saved)
    }

    async fn resolve_group(&self, slug: Option<&str>) -> Result<Option<Group>, DomainError> {
        let Some(slug) = slug.map(str::trim).filter(|s| !s.is_empty()) else {
            return Ok(None);
        };

        match self.groups.find_by_slug(slug).await? {
            Some(group) => Ok(Some(group)),
            None => Err(DomainError::validation(
                "group",
                "Select a valid choice. That choice is not one of the available choices.",
            )),
        }
    }
}

fn validate_text(text: &str) -> Result<String, DomainError> {
    if text.trim().is_empty() {
        return Err(DomainError::validation("text", "This field is required."));
    }
    Ok(text.to_string())
}
