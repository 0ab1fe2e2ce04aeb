//! Storage backend trait definition
//!
//! This module defines the `TargetStore` trait that all persistence
//! engines for the target registry implement.

use async_trait::async_trait;

use super::error::StorageResult;
use super::schema::{NewTarget, Target, TargetChanges, TargetId};

/// Durable set of target records
///
/// Implementations must:
///
/// - enforce uniqueness of `name` themselves, returning
///   [`StorageError::UniqueViolation`] when an insert or update would produce
///   a second record with the same name. Application-level checks are racy;
///   this is the backstop.
/// - commit each write atomically: either every column of the record is
///   written or none is.
///
/// ## Thread Safety
///
/// Implementations must be `Send + Sync` as one store is shared by every
/// request handler.
///
/// [`StorageError::UniqueViolation`]: super::StorageError::UniqueViolation
#[async_trait]
pub trait TargetStore: Send + Sync {
    /// Insert a record, returning it with its assigned id
    async fn insert(&self, target: NewTarget) -> StorageResult<Target>;

    /// Replace the mutable columns of an existing record
    ///
    /// Fails with `NotFound` when `id` is unknown.
    async fn update(&self, id: TargetId, changes: TargetChanges) -> StorageResult<Target>;

    /// Remove a record permanently
    ///
    /// Fails with `NotFound` when `id` is unknown.
    async fn delete(&self, id: TargetId) -> StorageResult<()>;

    async fn get(&self, id: TargetId) -> StorageResult<Option<Target>>;

    /// Exact, case-sensitive name lookup
    async fn find_by_name(&self, name: &str) -> StorageResult<Option<Target>>;

    /// Every record, ordered by id
    async fn list(&self) -> StorageResult<Vec<Target>>;

    /// Lightweight check that the store is reachable
    async fn health_check(&self) -> StorageResult<()>;

    /// Close the store and release resources
    async fn close(&self) -> StorageResult<()>;
}
