//! Application state - shared across all handlers.

use std::sync::Arc;

use quill_core::error::RepoError;
use quill_core::ports::PostRepository;
use quill_infra::database::{DatabaseConfig, InMemoryPostRepository};

#[cfg(feature = "postgres")]
use quill_infra::database::PostgresPostRepository;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub posts: Arc<dyn PostRepository>,
}

impl AppState {
    /// Build the application state with the store selected by configuration.
    ///
    /// Without a database configuration the server runs on the in-memory
    /// store. A configured database that cannot be reached is an error.
    pub async fn new(db_config: Option<&DatabaseConfig>) -> Result<Self, RepoError> {
        #[cfg(feature = "postgres")]
        let posts: Arc<dyn PostRepository> = match db_config {
            Some(config) => {
                let db = quill_infra::database::connect(config)
                    .await
                    .map_err(|e| RepoError::Connection(e.to_string()))?;
                Arc::new(PostgresPostRepository::new(db))
            }
            None => {
                tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
                Arc::new(InMemoryPostRepository::new())
            }
        };

        #[cfg(not(feature = "postgres"))]
        let posts: Arc<dyn PostRepository> = {
            if db_config.is_some() {
                tracing::warn!("postgres feature disabled - ignoring DATABASE_URL");
            }
            tracing::info!("Running without postgres feature - using in-memory repository");
            Arc::new(InMemoryPostRepository::new())
        };

        tracing::info!("Application state initialized");

        Ok(Self::with_repository(posts))
    }

    /// State over an already constructed store.
    pub fn with_repository(posts: Arc<dyn PostRepository>) -> Self {
        Self { posts }
    }
}
