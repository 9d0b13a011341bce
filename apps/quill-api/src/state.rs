//! Application state - shared across all handlers.

use std::sync::Arc;

use quill_core::PostService;
use quill_core::ports::UserRepository;
use quill_infra::{InMemoryPostRepository, InMemoryUserRepository};

#[cfg(feature = "postgres")]
use quill_infra::database::{DatabaseConfig, connect};
#[cfg(feature = "postgres")]
use quill_infra::{PostgresPostRepository, PostgresUserRepository};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub posts: PostService,
    /// Which storage backend is serving requests, for the health check.
    pub storage: &'static str,
}

impl AppState {
    /// State backed by process memory.
    pub fn in_memory() -> Self {
        let users = Arc::new(InMemoryUserRepository::new());
        let posts = Arc::new(InMemoryPostRepository::new(users.clone()));

        Self {
            users,
            posts: PostService::new(posts),
            storage: "memory",
        }
    }

    /// Build the application state, preferring Postgres when configured.
    #[cfg(feature = "postgres")]
    pub async fn new(db_config: Option<&DatabaseConfig>) -> Self {
        let Some(config) = db_config else {
            tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
            return Self::in_memory();
        };

        match connect(config).await {
            Ok(conn) => {
                tracing::info!("Application state initialized (postgres)");
                Self {
                    users: Arc::new(PostgresUserRepository::new(conn.clone())),
                    posts: PostService::new(Arc::new(PostgresPostRepository::new(conn))),
                    storage: "postgres",
                }
            }
            Err(e) => {
                tracing::error!(
                    "Failed to connect to database: {}. Using in-memory fallback.",
                    e
                );
                Self::in_memory()
            }
        }
    }
}
