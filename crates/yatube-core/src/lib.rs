//! # Yatube Core
//!
//! The domain layer of Yatube: posts, groups and authors, the feed
//! assembler and the post command service.
//! This crate contains pure business logic with zero infrastructure dependencies.

pub mod domain;
pub mod error;
pub mod feed;
pub mod ports;
pub mod services;

pub use error::DomainError;
pub use feed::{FeedFilter, FeedPage, PAGE_SIZE};
