//! Record types persisted by the target stores
//!
//! `Target` is the full row as stored. `NewTarget` and `TargetChanges` are
//! the already-validated write shapes handed to a [`TargetStore`]; stores do
//! not validate anything except the unique `name` constraint.
//!
//! [`TargetStore`]: super::TargetStore

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Port assumed when a target is registered without one
pub const DEFAULT_PORT: u16 = 6379;

/// Identifier assigned by the store on insert
pub type TargetId = i64;

/// A monitored redis server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    pub id: TargetId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub host: String,
    pub port: u16,

    /// Stored in plaintext; never serialized back to clients
    #[serde(default, skip_serializing)]
    pub password: Option<String>,

    pub updated_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Target {
    /// `host:port` form used in logs
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Insert payload: every field already validated and defaulted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTarget {
    pub name: String,
    pub description: Option<String>,
    pub host: String,
    pub port: u16,
    pub password: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Full replacement of the mutable columns of one record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetChanges {
    pub name: String,
    pub description: Option<String>,
    pub host: String,
    pub port: u16,
    pub password: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl NewTarget {
    /// Materialize the stored row once the store has picked an id
    pub fn into_target(self, id: TargetId) -> Target {
        Target {
            id,
            name: self.name,
            description: self.description,
            host: self.host,
            port: self.port,
            password: self.password,
            updated_at: self.created_at,
            created_at: self.created_at,
        }
    }
}

impl TargetChanges {
    /// Apply onto an existing row, keeping `id` and `created_at`
    pub fn apply_to(self, target: &mut Target) {
        target.name = self.name;
        target.description = self.description;
        target.host = self.host;
        target.port = self.port;
        target.password = self.password;
        target.updated_at = self.updated_at;
    }
}
