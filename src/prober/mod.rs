//! On-demand probes against a target's redis server
//!
//! Each probe opens a fresh connection, optionally authenticates with the
//! target's password, issues a single command and drops the connection.
//! There is no pooling and no retry.
//!
//! ## Failure mapping
//!
//! An empty password is treated as no password, so no `AUTH` is sent.
//!
//! Every failure (refused connection, timeout, failed `AUTH`, protocol
//! error) surfaces as the same [`ProbeError`], whose message only names the
//! target host. The underlying error is logged and then discarded.

pub mod info;

use std::time::Duration;

use anyhow::Context;
use redis::{FromRedisValue, IntoConnectionInfo};
use thiserror::Error;
use tokio::time::timeout;
use tracing::{debug, instrument, warn};

use crate::storage::Target;

pub use info::{Metrics, parse_info};

/// Default bound for connecting and for awaiting each reply
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// The target's redis server could not be reached or did not answer
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ProbeError {
    pub host: String,
    pub message: String,
}

impl ProbeError {
    pub fn unreachable(host: &str) -> Self {
        Self {
            host: host.to_string(),
            message: format!("redis server {host} can not connected"),
        }
    }
}

/// Issues liveness and metrics probes
#[derive(Debug, Clone)]
pub struct Prober {
    timeout: Duration,
}

impl Default for Prober {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT)
    }
}

impl Prober {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// `PING` the target; `true` when it answers `PONG`
    #[instrument(skip_all, fields(target = %target.address()))]
    pub async fn check_liveness(&self, target: &Target) -> Result<bool, ProbeError> {
        let reply: String = self.query(target, "PING").await?;
        debug!("liveness reply: {reply}");
        Ok(reply.eq_ignore_ascii_case("PONG"))
    }

    /// Fetch and parse the target's `INFO` report
    #[instrument(skip_all, fields(target = %target.address()))]
    pub async fn get_metrics(&self, target: &Target) -> Result<Metrics, ProbeError> {
        let reply: String = self.query(target, "INFO").await?;
        let metrics = parse_info(&reply);
        debug!("received {} metrics", metrics.len());
        Ok(metrics)
    }

    async fn query<T: FromRedisValue>(
        &self,
        target: &Target,
        command: &str,
    ) -> Result<T, ProbeError> {
        self.execute(target, command).await.map_err(|e| {
            warn!("{command} against {} failed: {e:#}", target.address());
            ProbeError::unreachable(&target.host)
        })
    }

    async fn execute<T: FromRedisValue>(
        &self,
        target: &Target,
        command: &str,
    ) -> anyhow::Result<T> {
        let mut connection_info = (target.host.clone(), target.port).into_connection_info()?;
        // servers without a password reject any `AUTH`
        connection_info.redis.password = target.password.clone().filter(|p| !p.is_empty());

        let client = redis::Client::open(connection_info)?;
        let mut connection = timeout(self.timeout, client.get_multiplexed_async_connection())
            .await
            .context("connect timed out")?
            .context("connect failed")?;

        let reply = timeout(self.timeout, redis::cmd(command).query_async(&mut connection))
            .await
            .context("reply timed out")?
            .with_context(|| format!("{command} failed"))?;

        Ok(reply)
    }
}
