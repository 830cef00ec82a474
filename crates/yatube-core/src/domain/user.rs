use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

/// User entity - the author of posts. Credentials live outside this system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Create a new user with generated ID and timestamp.
    pub fn new(username: impl Into<String>) -> Result<Self, DomainError> {
        let username = username.into();
        if username.trim().is_empty() {
            return Err(DomainError::validation("username", "This field is required."));
        }
        if !is_valid_username(&username) {
            return Err(DomainError::validation(
                "username",
                "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.",
            ));
        }

        Ok(Self {
            id: Uuid::new_v4(),
            username,
            created_at: Utc::now(),
        })
    }
}

/// Letters (any script), digits and `@ . + - _`, at most 150 characters.
pub fn is_valid_username(username: &str) -> bool {
    let mut len = 0;
    for c in username.chars() {
        len += 1;
        if !(c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_')) {
            return false;
        }
    }
    (1..=150).contains(&len)
}
