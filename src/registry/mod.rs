//! Target registry
//!
//! Validated CRUD over the set of monitored redis servers. The registry
//! holds an explicit storage handle; it never caches records, every call
//! goes to the store.
//!
//! Name uniqueness is checked here before writing, and enforced again by
//! the store itself. Two concurrent creates with the same name can both pass
//! the first check; the store rejects the second and the registry reports it
//! as the same `name` validation error.

pub mod error;
pub mod validation;

use std::sync::Arc;

use chrono::{DateTime, Duration, SubsecRound, Utc};
use tracing::{debug, info, instrument};

use crate::storage::{NewTarget, Target, TargetChanges, TargetId, TargetStore};

pub use error::{RegistryError, RegistryResult, ValidationError};
pub use validation::{
    TargetFields, ValidatedFields, check_fields, check_not_null, check_unique,
};

/// Current time at the precision the stores persist
fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

#[derive(Clone)]
pub struct Registry {
    store: Arc<dyn TargetStore>,
}

impl Registry {
    pub fn new(store: Arc<dyn TargetStore>) -> Self {
        Self { store }
    }

    /// Validate a candidate field set
    ///
    /// `existing` is the record being updated, or `None` on create. The
    /// candidate is normalized (defaults filled) before any constraint is
    /// checked.
    pub async fn validate(
        &self,
        candidate: TargetFields,
        existing: Option<&Target>,
    ) -> RegistryResult<ValidatedFields> {
        let fields = check_fields(candidate.normalize())?;

        let found = self.store.find_by_name(&fields.name).await?;
        check_unique(found.as_ref(), existing)?;

        Ok(fields)
    }

    #[instrument(skip_all, fields(name = ?candidate.name))]
    pub async fn create(&self, candidate: TargetFields) -> RegistryResult<Target> {
        let fields = self.validate(candidate, None).await?;

        let target = self
            .store
            .insert(NewTarget {
                name: fields.name,
                description: fields.description,
                host: fields.host,
                port: fields.port,
                password: fields.password,
                created_at: now(),
            })
            .await?;

        info!("registered target {} ({})", target.name, target.address());
        Ok(target)
    }

    /// Apply the fields present in `partial`; absent fields keep their values
    #[instrument(skip(self, partial))]
    pub async fn update(&self, id: TargetId, partial: TargetFields) -> RegistryResult<Target> {
        let existing = self.get(id).await?;

        let fields = self
            .validate(partial.merged_onto(&existing), Some(&existing))
            .await?;

        let mut updated_at = now();
        if updated_at <= existing.updated_at {
            updated_at = existing.updated_at + Duration::milliseconds(1);
        }

        let target = self
            .store
            .update(
                id,
                TargetChanges {
                    name: fields.name,
                    description: fields.description,
                    host: fields.host,
                    port: fields.port,
                    password: fields.password,
                    updated_at,
                },
            )
            .await?;

        info!("updated target {} ({})", target.name, target.address());
        Ok(target)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: TargetId) -> RegistryResult<()> {
        self.store.delete(id).await?;
        info!("deleted target {}", id);
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: TargetId) -> RegistryResult<Target> {
        self.store
            .get(id)
            .await?
            .ok_or(RegistryError::NotFound(id))
    }

    pub async fn list(&self) -> RegistryResult<Vec<Target>> {
        let targets = self.store.list().await?;
        debug!("listing {} targets", targets.len());
        Ok(targets)
    }

    /// Check that the underlying store is reachable
    pub async fn health_check(&self) -> RegistryResult<()> {
        Ok(self.store.health_check().await?)
    }
}
