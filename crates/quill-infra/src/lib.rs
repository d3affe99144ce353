//! # Quill Infrastructure
//!
//! Concrete implementations of the ports defined in `quill-core`, plus the
//! seed fixtures and store lifecycle used by the test suite.
//!
//! ## Feature Flags
//!
//! - `postgres` (default) - PostgreSQL post store via SeaORM
//! - `minimal` - No external dependencies, in-memory only

pub mod database;
pub mod fixtures;
pub mod testing;

// Re-exports - In-Memory
pub use database::{DatabaseConfig, InMemoryPostRepository};
pub use testing::{InMemoryLifecycle, StoreLifecycle, TestHarness};

// Re-exports - PostgreSQL
#[cfg(feature = "postgres")]
pub use database::PostgresPostRepository;
#[cfg(feature = "postgres")]
pub use testing::PostgresLifecycle;
