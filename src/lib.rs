//! Registry and health/metrics gateway for remote redis servers
//!
//! - [`registry`]: validated CRUD over the monitored targets
//! - [`prober`]: one-shot liveness and metrics probes against a target
//! - [`storage`]: persistence engines behind the registry
//! - [`api`]: HTTP boundary (feature `api`)

#[cfg(feature = "api")]
pub mod api;
pub mod config;
pub mod prober;
pub mod registry;
pub mod storage;

pub use prober::{Metrics, ProbeError, Prober};
pub use registry::{Registry, RegistryError, TargetFields, ValidationError};
pub use storage::{Target, TargetId, TargetStore};
