//! Domain entities - the core business objects.

mod group;
mod post;
mod user;

pub use group::{Group, is_valid_slug};
pub use post::Post;
pub use user::{User, is_valid_username};
