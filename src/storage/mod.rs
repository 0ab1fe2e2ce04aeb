//! Persistence engines for the target registry
//!
//! This module provides a trait-based abstraction over the durable set of
//! target records.
//!
//! ## Backends
//!
//! - **SQLite** (default): Embedded database with a unique index on `name`
//! - **In-Memory**: No persistence, for testing or throwaway deployments
//!
//! ## Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use rmon::{registry::Registry, storage::sqlite::SqliteBackend};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let backend = SqliteBackend::new("./rmon.db").await?;
//!     let registry = Registry::new(Arc::new(backend));
//!     Ok(())
//! }
//! ```

pub mod backend;
pub mod error;
pub mod memory;
pub mod schema;
#[cfg(feature = "storage-sqlite")]
pub mod sqlite;

pub use backend::TargetStore;
pub use error::{StorageError, StorageResult};
pub use schema::{DEFAULT_PORT, NewTarget, Target, TargetChanges, TargetId};
