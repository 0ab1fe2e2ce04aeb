use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tracing::{info, trace};

use crate::prober::{DEFAULT_TIMEOUT, Prober};
use crate::storage::{TargetStore, memory::MemoryBackend};

const AUTH_TOKEN_ENV: &str = "RMON_AUTH_TOKEN";

/// Storage backend configuration
#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
#[serde(tag = "backend", rename_all = "lowercase")]
pub enum StorageConfig {
    /// In-memory storage (no persistence)
    Memory,

    /// SQLite database (default)
    Sqlite {
        /// Path to the SQLite database file
        #[serde(default = "default_sqlite_path")]
        path: PathBuf,
    },
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig::Sqlite {
            path: default_sqlite_path(),
        }
    }
}

fn default_sqlite_path() -> PathBuf {
    PathBuf::from("./rmon.db")
}

impl StorageConfig {
    /// Open the configured store
    pub async fn open(&self) -> anyhow::Result<Arc<dyn TargetStore>> {
        match self {
            StorageConfig::Memory => {
                info!("using in-memory target store");
                Ok(Arc::new(MemoryBackend::new()))
            }
            #[cfg(feature = "storage-sqlite")]
            StorageConfig::Sqlite { path } => {
                let backend = crate::storage::sqlite::SqliteBackend::new(path).await?;
                Ok(Arc::new(backend))
            }
            #[cfg(not(feature = "storage-sqlite"))]
            StorageConfig::Sqlite { .. } => {
                anyhow::bail!("sqlite storage requested but the storage-sqlite feature is disabled")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_bind")]
    pub bind: SocketAddr,
    pub auth_token: Option<String>,
    #[serde(default = "default_enable_cors")]
    pub enable_cors: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            auth_token: None,
            enable_cors: default_enable_cors(),
        }
    }
}

fn default_bind() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 5000))
}

fn default_enable_cors() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
pub struct ProbeConfig {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT.as_secs()
}

impl ProbeConfig {
    pub fn prober(&self) -> Prober {
        Prober::new(Duration::from_secs(self.timeout_secs))
    }
}

#[derive(Debug, Clone, Default, PartialEq, serde::Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub probe: ProbeConfig,
}

impl Config {
    /// Let the environment override secrets kept out of the config file
    pub fn apply_env(mut self) -> Self {
        if let Ok(token) = std::env::var(AUTH_TOKEN_ENV) {
            trace!("auth token taken from {AUTH_TOKEN_ENV}");
            self.api.auth_token = Some(token);
        }
        self
    }
}

pub fn parse_config(content: &str) -> anyhow::Result<Config> {
    serde_json::from_str(content)
        .map_err(|e| anyhow::anyhow!("Invalid configuration file provided: {e}"))
        .inspect(|config| trace!("loaded config: {config:?}"))
}

pub fn read_config_file(path: &str) -> anyhow::Result<Config> {
    let file_content = std::fs::read_to_string(path)?;
    parse_config(&file_content)
}
