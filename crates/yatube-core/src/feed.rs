//! Feed filters, feed pages and page arithmetic.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::Post;
use crate::error::DomainError;

/// Number of posts on one feed page.
pub const PAGE_SIZE: usize = 10;

/// Which posts a feed shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum FeedFilter {
    /// The global feed.
    All,
    /// Posts published in the group with this slug.
    ByGroup(String),
    /// Posts written by this user.
    ByAuthor(Uuid),
}

/// One page of a feed.
///
/// `page_number` is the page that was asked for, even when it lies past
/// the last page and `items` is therefore empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedPage<T = Post> {
    pub items: Vec<T>,
    pub page_number: u64,
    pub page_size: usize,
    pub total_count: usize,
}

impl<T> FeedPage<T> {
    /// An empty page for feeds that match nothing.
    pub fn empty(page_number: u64, page_size: usize) -> Self {
        Self {
            items: Vec::new(),
            page_number,
            page_size,
            total_count: 0,
        }
    }

    /// `ceil(total_count / page_size)`; zero for an empty feed.
    pub fn total_pages(&self) -> usize {
        self.total_count.div_ceil(self.page_size)
    }

    pub fn has_next(&self) -> bool {
        (self.page_number as usize) < self.total_pages()
    }

    pub fn has_previous(&self) -> bool {
        self.page_number > 1
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Convert the items while keeping the pagination metadata.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> FeedPage<U> {
        FeedPage {
            items: self.items.into_iter().map(f).collect(),
            page_number: self.page_number,
            page_size: self.page_size,
            total_count: self.total_count,
        }
    }
}

/// Validate a 1-based page number coming from the outside world.
pub fn validate_page_number(page_number: i64) -> Result<u64, DomainError> {
    if page_number <= 0 {
        return Err(DomainError::InvalidArgument(format!(
            "page number must be a positive integer, got {page_number}"
        )));
    }
    Ok(page_number as u64)
}

/// Offset of the first post on page `page_number`, or `None` when it
/// does not fit in a `u64`.
pub fn page_offset(page_number: u64, page_size: usize) -> Option<u64> {
    page_number
        .checked_sub(1)?
        .checked_mul(u64::try_from(page_size).ok()?)
}
