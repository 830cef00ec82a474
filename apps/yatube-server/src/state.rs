//! Application state - shared across all handlers.

use std::sync::Arc;

use yatube_core::ports::{GroupRepository, PostRepository, UserRepository};
use yatube_core::services::{FeedService, PostService};
use yatube_infra::database::{DatabaseConfig, DatabaseConnections};
use yatube_infra::memory::{InMemoryGroupRepository, InMemoryPostRepository, InMemoryUserRepository};

#[cfg(feature = "postgres")]
use yatube_infra::database::{PostgresGroupRepository, PostgresPostRepository, PostgresUserRepository};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub groups: Arc<dyn GroupRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub db: Option<Arc<DatabaseConnections>>,
}

impl AppState {
    /// Build the application state, falling back to in-memory stores when
    /// no database is configured or it cannot be reached.
    pub async fn new(db_config: Option<&DatabaseConfig>) -> Self {
        #[cfg(feature = "postgres")]
        let state = match db_config {
            Some(config) => match DatabaseConnections::init(config).await {
                Ok(connections) => Self::postgres(Arc::new(connections)),
                Err(e) => {
                    tracing::error!(
                        "Failed to connect to database: {}. Using in-memory fallback.",
                        e
                    );
                    Self::in_memory()
                }
            },
            None => {
                tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
                Self::in_memory()
            }
        };

        #[cfg(not(feature = "postgres"))]
        let state = {
            if db_config.is_some() {
                tracing::warn!("DATABASE_URL ignored: built without the postgres feature");
            }
            tracing::info!("Running without postgres feature - using in-memory repositories");
            Self::in_memory()
        };

        tracing::info!(storage = state.storage(), "Application state initialized");
        state
    }

    /// State backed entirely by in-memory repositories.
    pub fn in_memory() -> Self {
        Self {
            users: Arc::new(InMemoryUserRepository::new()),
            groups: Arc::new(InMemoryGroupRepository::new()),
            posts: Arc::new(InMemoryPostRepository::new()),
            db: None,
        }
    }

    #[cfg(feature = "postgres")]
    fn postgres(connections: Arc<DatabaseConnections>) -> Self {
        let conn = connections.main.clone();
        Self {
            users: Arc::new(PostgresUserRepository::new(conn.clone())),
            groups: Arc::new(PostgresGroupRepository::new(conn.clone())),
            posts: Arc::new(PostgresPostRepository::new(conn)),
            db: Some(connections),
        }
    }

    pub fn feed(&self) -> FeedService {
        FeedService::new(self.posts.clone(), self.groups.clone())
    }

    pub fn post_service(&self) -> PostService {
        PostService::new(self.posts.clone(), self.groups.clone())
    }

    pub fn storage(&self) -> &'static str {
        if self.db.is_some() { "postgres" } else { "memory" }
    }
}
