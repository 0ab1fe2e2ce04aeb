//! Error types for registry operations

use serde::Serialize;
use thiserror::Error;

use crate::storage::{StorageError, TargetId};

/// Result type alias for registry operations
pub type RegistryResult<T> = Result<T, RegistryError>;

/// A single field failed a constraint or the name-uniqueness rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }

    /// Another record already owns the requested name
    pub fn name_conflict() -> Self {
        Self::new("name", "Redis server already exist")
    }
}

/// Errors returned by [`Registry`](super::Registry) operations
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("target {0} not found")]
    NotFound(TargetId),

    /// Unexpected persistence failure
    #[error(transparent)]
    Storage(StorageError),
}

impl From<StorageError> for RegistryError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::UniqueViolation(_) => ValidationError::name_conflict().into(),
            StorageError::NotFound(id) => RegistryError::NotFound(id),
            other => RegistryError::Storage(other),
        }
    }
}
