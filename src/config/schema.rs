//! Configuration schema for kfzf
//!
//! Configuration is stored at `~/.config/kfzf/config.toml`

use crate::resources::ResourceType;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Cluster identity
    pub cluster: ClusterConfig,

    /// Cache store settings
    pub store: StoreSettings,
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log format: "text" or "json"
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_format: "text".to_string(),
        }
    }
}

/// Cluster the cache belongs to
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterConfig {
    /// Cluster name, used as the dump subdirectory
    pub name: String,

    /// Kubeconfig used by the watch process
    pub kubeconfig: Option<PathBuf>,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            kubeconfig: None,
        }
    }
}

/// Store and dump settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSettings {
    /// Root of the dump files (defaults to the user cache dir)
    pub cache_dir: Option<PathBuf>,

    /// Interval between dump-eligibility checks, in milliseconds
    pub time_between_full_dump_ms: u64,

    /// Resource types to maintain
    pub resources: Vec<ResourceType>,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            cache_dir: None,
            time_between_full_dump_ms: 15_000,
            resources: ResourceType::all().to_vec(),
        }
    }
}

impl StoreSettings {
    /// Configured cache dir, or `<user cache dir>/kfzf`
    pub fn cache_dir(&self) -> PathBuf {
        self.cache_dir.clone().unwrap_or_else(default_cache_dir)
    }

    pub fn time_between_full_dump(&self) -> Duration {
        Duration::from_millis(self.time_between_full_dump_ms)
    }
}

/// Default root of the dump files
pub fn default_cache_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("kfzf")
}
