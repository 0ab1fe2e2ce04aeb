//! API shared state

use crate::prober::Prober;
use crate::registry::Registry;

/// Shared state passed to all API handlers
#[derive(Clone)]
pub struct ApiState {
    /// Validated access to the stored targets
    pub registry: Registry,

    /// Issues liveness and metrics probes
    pub prober: Prober,
}

impl ApiState {
    pub fn new(registry: Registry, prober: Prober) -> Self {
        Self { registry, prober }
    }
}
