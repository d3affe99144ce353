//! Store lifecycle for integration tests.
//!
//! A [`StoreLifecycle`] carries the four hooks a test suite needs: `connect`
//! once before all cases, `seed` before each case, `reset` after each case and
//! `close` after all cases. [`TestHarness`] drives them.
//!
//! ```ignore
//! let harness = TestHarness::start(InMemoryLifecycle).await?;
//! harness
//!     .run(|posts, seeded| async move {
//!         assert_eq!(posts.count().await.unwrap(), seeded.len() as u64);
//!     })
//!     .await?;
//! harness.stop().await?;
//! ```

use std::future::Future;
use std::panic::{AssertUnwindSafe, resume_unwind};
use std::sync::Arc;

use async_trait::async_trait;
use futures::FutureExt;

use quill_core::domain::BlogPost;
use quill_core::error::RepoError;
use quill_core::ports::PostRepository;

use crate::database::InMemoryPostRepository;
use crate::fixtures::{SEED_COUNT, seed_records};

#[async_trait]
pub trait StoreLifecycle: Send + Sync {
    /// Connect to the store and return it once it is ready for queries.
    async fn connect(&self) -> Result<Arc<dyn PostRepository>, RepoError>;

    /// Bulk-insert fixture posts.
    async fn seed(&self, posts: &dyn PostRepository) -> Result<Vec<BlogPost>, RepoError> {
        tracing::info!(count = SEED_COUNT, "Seeding blog post data");
        posts.insert_many(seed_records(SEED_COUNT)).await
    }

    /// Drop all data.
    async fn reset(&self, posts: &dyn PostRepository) -> Result<(), RepoError> {
        let removed = posts.delete_all().await?;
        tracing::info!(removed, "Store reset");
        Ok(())
    }

    async fn close(&self) -> Result<(), RepoError> {
        Ok(())
    }
}

/// Lifecycle over a fresh [`InMemoryPostRepository`].
pub struct InMemoryLifecycle;

#[async_trait]
impl StoreLifecycle for InMemoryLifecycle {
    async fn connect(&self) -> Result<Arc<dyn PostRepository>, RepoError> {
        Ok(Arc::new(InMemoryPostRepository::new()))
    }
}

/// Lifecycle over a PostgreSQL test database.
#[cfg(feature = "postgres")]
pub struct PostgresLifecycle {
    config: crate::database::DatabaseConfig,
    repo: tokio::sync::Mutex<Option<Arc<crate::database::PostgresPostRepository>>>,
}

#[cfg(feature = "postgres")]
impl PostgresLifecycle {
    pub fn new(config: crate::database::DatabaseConfig) -> Self {
        Self {
            config,
            repo: tokio::sync::Mutex::new(None),
        }
    }

    /// Build from `TEST_DATABASE_URL`, if set.
    pub fn from_env() -> Option<Self> {
        std::env::var("TEST_DATABASE_URL")
            .ok()
            .map(|url| Self::new(crate::database::DatabaseConfig::new(url)))
    }
}

#[cfg(feature = "postgres")]
#[async_trait]
impl StoreLifecycle for PostgresLifecycle {
    async fn connect(&self) -> Result<Arc<dyn PostRepository>, RepoError> {
        use crate::database::{PostgresPostRepository, connect, ensure_schema};

        let db = connect(&self.config)
            .await
            .map_err(|e| RepoError::Connection(e.to_string()))?;
        ensure_schema(&db)
            .await
            .map_err(|e| RepoError::Query(e.to_string()))?;

        let repo = Arc::new(PostgresPostRepository::new(db));
        *self.repo.lock().await = Some(Arc::clone(&repo));
        Ok(repo)
    }

    async fn close(&self) -> Result<(), RepoError> {
        let Some(repo) = self.repo.lock().await.take() else {
            return Ok(());
        };
        match Arc::try_unwrap(repo) {
            Ok(repo) => {
                repo.into_connection()
                    .close()
                    .await
                    .map_err(|e| RepoError::Connection(e.to_string()))?;
                tracing::info!("Test database connection closed");
            }
            // The pool closes when the last handle is dropped.
            Err(_) => tracing::warn!("Test database still in use, leaving pool to drop"),
        }
        Ok(())
    }
}

/// Runs test cases between seed and reset on a connected store.
pub struct TestHarness {
    lifecycle: Box<dyn StoreLifecycle>,
    posts: Arc<dyn PostRepository>,
}

impl TestHarness {
    /// Connect once; the store stays open until [`TestHarness::stop`].
    pub async fn start(lifecycle: impl StoreLifecycle + 'static) -> Result<Self, RepoError> {
        let posts = lifecycle.connect().await?;
        Ok(Self {
            lifecycle: Box::new(lifecycle),
            posts,
        })
    }

    pub fn posts(&self) -> Arc<dyn PostRepository> {
        Arc::clone(&self.posts)
    }

    /// Seed, run `case` with the store and the seeded posts, then reset.
    ///
    /// The store is reset even when `case` panics; the panic is resumed
    /// afterwards.
    pub async fn run<F, Fut>(&self, case: F) -> Result<(), RepoError>
    where
        F: FnOnce(Arc<dyn PostRepository>, Vec<BlogPost>) -> Fut,
        Fut: Future<Output = ()>,
    {
        let seeded = self.lifecycle.seed(self.posts.as_ref()).await?;
        let outcome = AssertUnwindSafe(case(self.posts(), seeded))
            .catch_unwind()
            .await;
        let reset = self.lifecycle.reset(self.posts.as_ref()).await;

        if let Err(panic) = outcome {
            if let Err(e) = reset {
                tracing::error!("Store reset after failed case: {}", e);
            }
            resume_unwind(panic);
        }
        reset
    }

    pub async fn stop(self) -> Result<(), RepoError> {
        // Release the harness handle so the lifecycle can own the connection.
        drop(self.posts);
        self.lifecycle.close().await
    }
}
