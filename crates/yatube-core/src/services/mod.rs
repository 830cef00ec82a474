//! Application services - use cases composed over the ports.

mod feed_service;
mod post_service;

pub use feed_service::FeedService;
pub use post_service::PostService;
