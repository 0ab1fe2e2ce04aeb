//! API response types

use serde::{Deserialize, Serialize};

use crate::storage::Target;

/// Returned by GET /api/v1/health
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// `ok` when the target store answers, `degraded` otherwise
    pub status: String,

    /// RFC 3339 timestamp
    pub timestamp: String,
}

/// Returned by GET /api/v1/servers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServersResponse {
    pub servers: Vec<Target>,
    pub count: usize,
}

/// Returned by GET /api/v1/servers/:id/ping
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LivenessResponse {
    pub alive: bool,
}
