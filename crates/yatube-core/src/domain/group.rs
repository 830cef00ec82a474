use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

/// Group entity - a named community posts can be published into.
///
/// The slug is the group's public address (`/group/{slug}/`) and never
/// changes after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

impl Group {
    /// Create a new group, validating the title and slug.
    pub fn new(
        title: impl Into<String>,
        slug: impl Into<String>,
        description: impl Into<String>,
    ) -> Result<Self, DomainError> {
        let title = title.into();
        let slug = slug.into();

        if title.trim().is_empty() {
            return Err(DomainError::validation("title", "This field is required."));
        }
        if !is_valid_slug(&slug) {
            return Err(DomainError::validation(
                "slug",
                "Enter a valid slug consisting of letters, numbers, underscores or hyphens.",
            ));
        }

        Ok(Self {
            id: Uuid::new_v4(),
            title,
            slug,
            description: description.into(),
            created_at: Utc::now(),
        })
    }
}

/// Letters (any script), digits, `-` and `_`; nothing else survives in a URL segment unescaped.
pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug
            .chars()
            .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.title)
    }
}
