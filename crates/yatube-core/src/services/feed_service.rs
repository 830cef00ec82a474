use std::sync::Arc;

use crate::error::DomainError;
use crate::feed::{self, FeedFilter, FeedPage, PAGE_SIZE};
use crate::ports::{GroupRepository, PostRepository, PostScope};

/// Resolves a [`FeedFilter`] against the stores and assembles the page.
#[derive(Clone)]
pub struct FeedService {
    posts: Arc<dyn PostRepository>,
    groups: Arc<dyn GroupRepository>,
}

impl FeedService {
    pub fn new(posts: Arc<dyn PostRepository>, groups: Arc<dyn GroupRepository>) -> Self {
        Self { posts, groups }
    }

    /// Assemble page `page_number` of the feed with the fixed page size.
    pub async fn assemble(
        &self,
        filter: &FeedFilter,
        page_number: i64,
    ) -> Result<FeedPage, DomainError> {
        let page = feed::validate_page_number(page_number)?;

        let scope = match filter {
            FeedFilter::All => PostScope::All,
            FeedFilter::ByAuthor(author_id) => PostScope::Author(*author_id),
            FeedFilter::ByGroup(slug) => match self.groups.find_by_slug(slug).await? {
                Some(group) => PostScope::Group(group.id),
                None => {
                    tracing::debug!(slug = %slug, "Feed requested for unknown group");
                    return Ok(FeedPage::empty(page, PAGE_SIZE));
                }
            },
        };

        let total_count = self.posts.count_in_scope(scope).await?;
        let items = match feed::page_offset(page, PAGE_SIZE) {
            Some(offset) if offset < total_count => {
                self.posts
                    .find_page(scope, offset, PAGE_SIZE as u64)
                    .await?
            }
            _ => Vec::new(),
        };

        let page = FeedPage {
            items,
            page_number: page,
            page_size: PAGE_SIZE,
            total_count: total_count as usize,
        };

        tracing::debug!(
            filter = ?filter,
            page = page.page_number,
            items = page.items.len(),
            total = page.total_count,
            "Feed assembled"
        );

        Ok(page)
    }
}
