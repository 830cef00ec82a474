//! # Yatube Shared
//!
//! Serializable view models exchanged between the server and whatever
//! renders its pages.

pub mod dto;
pub mod response;
pub mod templates;

pub use response::{ErrorResponse, TemplateResponse};
