//! Snapshot encoding and atomic dump files
//!
//! A dump is written to a hidden temp file next to the target, flushed to
//! disk, then renamed over the target. Readers see either the previous full
//! snapshot or the new one, never a partial write.

use crate::error::{KfzfError, KfzfResult};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::debug;

/// Encodes a key to object mapping to bytes and back
pub trait SnapshotCodec: Send + Sync + 'static {
    fn encode<T: Serialize>(&self, entries: &BTreeMap<String, T>) -> KfzfResult<Vec<u8>>;

    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> KfzfResult<BTreeMap<String, T>>;
}

/// JSON object keyed by resource key
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl SnapshotCodec for JsonCodec {
    fn encode<T: Serialize>(&self, entries: &BTreeMap<String, T>) -> KfzfResult<Vec<u8>> {
        Ok(serde_json::to_vec(entries)?)
    }

    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> KfzfResult<BTreeMap<String, T>> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

/// Temp file used while a dump of `path` is in flight
pub fn temp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{}.tmp", name))
}

/// Encode `entries` and atomically replace the file at `path`
pub async fn write_snapshot<C, T>(
    codec: &C,
    entries: &BTreeMap<String, T>,
    path: &Path,
) -> KfzfResult<()>
where
    C: SnapshotCodec,
    T: Serialize,
{
    let bytes = codec.encode(entries)?;
    let tmp = temp_path(path);

    if let Err(e) = write_and_sync(&tmp, &bytes).await {
        let _ = fs::remove_file(&tmp).await;
        return Err(KfzfError::io(format!("writing {}", tmp.display()), e));
    }

    if let Err(e) = fs::rename(&tmp, path).await {
        let _ = fs::remove_file(&tmp).await;
        return Err(KfzfError::io(
            format!("renaming {} to {}", tmp.display(), path.display()),
            e,
        ));
    }

    debug!("Wrote {} entries ({} bytes) to {}", entries.len(), bytes.len(), path.display());
    Ok(())
}

async fn write_and_sync(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = fs::File::create(path).await?;
    file.write_all(bytes).await?;
    file.sync_all().await
}

/// Load a dump file written by `write_snapshot`
pub async fn load_snapshot<C, T>(codec: &C, path: &Path) -> KfzfResult<BTreeMap<String, T>>
where
    C: SnapshotCodec,
    T: DeserializeOwned,
{
    let bytes = fs::read(path)
        .await
        .map_err(|e| KfzfError::io(format!("reading dump {}", path.display()), e))?;

    codec
        .decode(&bytes)
        .map_err(|e| KfzfError::codec(path, e))
}
