//! # Yatube server
//!
//! Actix-web application serving the post feeds, post pages and the
//! post create/edit form. Pages are returned as template name plus context.

pub mod config;
pub mod handlers;
pub mod middleware;
pub mod observability;
pub mod state;
pub mod telemetry;
