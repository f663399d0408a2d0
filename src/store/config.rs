//! Store configuration

use crate::config::Config;
use crate::error::{KfzfError, KfzfResult};
use crate::resources::ResourceType;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;
use tracing::debug;

/// Where and how often a Store dumps its cache
///
/// Dump files live under `<cache_dir>/<cluster_name>/`, one per resource type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub cluster_name: String,
    pub cache_dir: PathBuf,
    pub time_between_full_dump: Duration,
}

impl StoreConfig {
    pub fn new(
        cluster_name: impl Into<String>,
        cache_dir: impl Into<PathBuf>,
        time_between_full_dump: Duration,
    ) -> Self {
        Self {
            cluster_name: cluster_name.into(),
            cache_dir: cache_dir.into(),
            time_between_full_dump,
        }
    }

    /// Build from the loaded configuration file
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.cluster.name.clone(),
            config.store.cache_dir(),
            config.store.time_between_full_dump(),
        )
    }

    /// Directory holding this cluster's dump files
    pub fn dest_dir(&self) -> PathBuf {
        self.cache_dir.join(&self.cluster_name)
    }

    /// Dump file for a resource type
    pub fn file_path(&self, resource_type: ResourceType) -> PathBuf {
        self.dest_dir().join(resource_type.plural())
    }

    /// Create the destination directory; must run before any Store is built
    pub async fn create_dest_dir(&self) -> KfzfResult<()> {
        let dir = self.dest_dir();
        fs::create_dir_all(&dir)
            .await
            .map_err(|e| KfzfError::io(format!("creating directory {}", dir.display()), e))?;
        debug!("Using cache directory {}", dir.display());
        Ok(())
    }

    /// Check that the destination directory exists and is a directory
    pub fn validate_dest_dir(&self) -> KfzfResult<()> {
        let dir = self.dest_dir();
        check_dir(&dir)
    }
}

fn check_dir(dir: &Path) -> KfzfResult<()> {
    match std::fs::metadata(dir) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(KfzfError::DestDirNotADirectory(dir.to_path_buf())),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(KfzfError::DestDirMissing(dir.to_path_buf()))
        }
        Err(e) => Err(KfzfError::io(format!("checking {}", dir.display()), e)),
    }
}
