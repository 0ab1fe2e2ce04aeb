//! In-memory storage backend (no persistence)
//!
//! Records live in a map guarded by a single lock, so every write is atomic
//! and the name-uniqueness check happens under the same lock as the write.
//! It's useful for:
//! - Testing without database dependencies
//! - Throwaway deployments where targets are re-registered on start
//!
//! ## Limitations
//!
//! - **No persistence**: All data lost on restart

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use super::backend::TargetStore;
use super::error::{StorageError, StorageResult};
use super::schema::{NewTarget, Target, TargetChanges, TargetId};

#[derive(Debug, Default)]
struct Inner {
    targets: BTreeMap<TargetId, Target>,
    last_id: TargetId,
}

impl Inner {
    fn name_taken(&self, name: &str, except: Option<TargetId>) -> bool {
        self.targets
            .values()
            .any(|t| t.name == name && Some(t.id) != except)
    }
}

/// In-memory target store
#[derive(Debug, Default)]
pub struct MemoryBackend {
    inner: RwLock<Inner>,
}

impl MemoryBackend {
    /// Create a new, empty in-memory store
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TargetStore for MemoryBackend {
    async fn insert(&self, target: NewTarget) -> StorageResult<Target> {
        let mut inner = self.inner.write().await;

        if inner.name_taken(&target.name, None) {
            return Err(StorageError::UniqueViolation(target.name));
        }

        inner.last_id += 1;
        let target = target.into_target(inner.last_id);
        inner.targets.insert(target.id, target.clone());

        debug!("stored target {} in memory", target.id);
        Ok(target)
    }

    async fn update(&self, id: TargetId, changes: TargetChanges) -> StorageResult<Target> {
        let mut inner = self.inner.write().await;

        if !inner.targets.contains_key(&id) {
            return Err(StorageError::NotFound(id));
        }
        if inner.name_taken(&changes.name, Some(id)) {
            return Err(StorageError::UniqueViolation(changes.name));
        }

        let target = inner
            .targets
            .get_mut(&id)
            .ok_or(StorageError::NotFound(id))?;
        changes.apply_to(target);

        Ok(target.clone())
    }

    async fn delete(&self, id: TargetId) -> StorageResult<()> {
        let mut inner = self.inner.write().await;
        inner
            .targets
            .remove(&id)
            .map(|_| ())
            .ok_or(StorageError::NotFound(id))
    }

    async fn get(&self, id: TargetId) -> StorageResult<Option<Target>> {
        Ok(self.inner.read().await.targets.get(&id).cloned())
    }

    async fn find_by_name(&self, name: &str) -> StorageResult<Option<Target>> {
        let inner = self.inner.read().await;
        Ok(inner.targets.values().find(|t| t.name == name).cloned())
    }

    async fn list(&self) -> StorageResult<Vec<Target>> {
        Ok(self.inner.read().await.targets.values().cloned().collect())
    }

    async fn health_check(&self) -> StorageResult<()> {
        Ok(())
    }

    async fn close(&self) -> StorageResult<()> {
        Ok(())
    }
}
