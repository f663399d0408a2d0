//! Per-resource-type cache with debounced persistence
//!
//! A `Store` keeps the latest known object for every key of one resource
//! type and writes the whole map to `<dest_dir>/<plural>` from a background
//! ticker, only when something changed since the last successful dump.
//!
//! ```rust,ignore
//! let config = StoreConfig::new("prod", cache_dir, Duration::from_secs(15));
//! config.create_dest_dir().await?;
//!
//! let store = Store::new(token.clone(), &config, ResourceType::Pod)?;
//! store.add_resource(pod)?;
//! store.delete_resource("default_web-0");
//! store.dump_full_state().await?;
//! ```

pub mod cache;
pub mod codec;
pub mod config;
mod dumper;

pub use cache::{ResourceCache, Snapshot};
pub use codec::{load_snapshot, write_snapshot, JsonCodec, SnapshotCodec};
pub use config::StoreConfig;

use crate::error::{KfzfError, KfzfResult};
use crate::resources::{Resource, ResourceType};
use chrono::{DateTime, Utc};
use dumper::Dumper;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Lifecycle of a Store's dump loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreState {
    /// Built, dump loop not yet scheduled
    Initialized,
    /// Dump loop ticking
    Running,
    /// Token cancelled, dump loop exited
    Stopped,
}

/// Counters describing how fresh the dump file is
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DumpStats {
    /// Successful dumps, explicit or ticker-driven
    pub dumps: u64,
    /// Failed dump attempts
    pub failures: u64,
    /// Completion time of the last successful dump
    pub last_dump: Option<DateTime<Utc>>,
    /// Message of the most recent failure
    pub last_error: Option<String>,
}

/// State shared between a Store handle and its dump loop
pub(crate) struct Shared<T, C> {
    resource_type: ResourceType,
    file_path: PathBuf,
    cache: ResourceCache<T>,
    codec: C,
    // Serializes dumps; never taken while the cache lock is held
    dump_lock: tokio::sync::Mutex<()>,
    stats: Mutex<DumpStats>,
    state: watch::Sender<StoreState>,
}

impl<T, C> Shared<T, C>
where
    T: Resource + Serialize,
    C: SnapshotCodec,
{
    async fn dump_full_state(&self) -> KfzfResult<u64> {
        let _guard = self.dump_lock.lock().await;
        self.dump_locked().await
    }

    /// Dump only if dirty, clearing the flag when the dump captured the
    /// latest mutation
    async fn flush_if_dirty(&self) -> KfzfResult<bool> {
        if !self.cache.is_dirty() {
            return Ok(false);
        }

        let _guard = self.dump_lock.lock().await;
        let generation = self.dump_locked().await?;
        if !self.cache.mark_clean(generation) {
            debug!("{} changed during dump, keeping dirty flag", self.resource_type);
        }
        Ok(true)
    }

    async fn dump_locked(&self) -> KfzfResult<u64> {
        let snapshot = self.cache.snapshot();
        let result = write_snapshot(&self.codec, &snapshot.entries, &self.file_path).await;

        let mut stats = self.stats.lock().unwrap_or_else(PoisonError::into_inner);
        match result {
            Ok(()) => {
                stats.dumps += 1;
                stats.last_dump = Some(Utc::now());
                debug!(
                    "Dumped {} {} to {}",
                    snapshot.entries.len(),
                    self.resource_type,
                    self.file_path.display()
                );
                Ok(snapshot.generation)
            }
            Err(e) => {
                stats.failures += 1;
                stats.last_error = Some(e.to_string());
                Err(e)
            }
        }
    }

    fn set_state(&self, state: StoreState) {
        self.state.send_replace(state);
    }
}

/// Cache of one resource type, flushed to disk by a background ticker
///
/// Ingestion methods take `&self`; share a Store across tasks with `Arc`.
pub struct Store<T, C = JsonCodec> {
    shared: Arc<Shared<T, C>>,
    token: CancellationToken,
}

impl<T> Store<T, JsonCodec>
where
    T: Resource + Serialize,
{
    /// Build a Store writing JSON dumps and start its dump loop
    ///
    /// Must be called from within a Tokio runtime. The destination directory
    /// must already exist.
    pub fn new(
        token: CancellationToken,
        config: &StoreConfig,
        resource_type: ResourceType,
    ) -> KfzfResult<Self> {
        Self::with_codec(token, config, resource_type, JsonCodec)
    }
}

impl<T, C> Store<T, C>
where
    T: Resource + Serialize,
    C: SnapshotCodec,
{
    /// Build a Store with a custom snapshot codec and start its dump loop
    ///
    /// The loop stops when `token` (or the Store's own child token) is
    /// cancelled.
    pub fn with_codec(
        token: CancellationToken,
        config: &StoreConfig,
        resource_type: ResourceType,
        codec: C,
    ) -> KfzfResult<Self> {
        config.validate_dest_dir()?;

        let (state, _) = watch::channel(StoreState::Initialized);
        let shared = Arc::new(Shared {
            resource_type,
            file_path: config.file_path(resource_type),
            cache: ResourceCache::new(),
            codec,
            dump_lock: tokio::sync::Mutex::new(()),
            stats: Mutex::new(DumpStats::default()),
            state,
        });

        let token = token.child_token();
        let dumper = Dumper::new(
            Arc::clone(&shared),
            config.time_between_full_dump,
            token.clone(),
        );
        tokio::spawn(dumper.run());

        Ok(Self { shared, token })
    }

    /// Add or update an object
    ///
    /// Objects without a name are rejected; nothing else can fail.
    pub fn add_resource(&self, object: T) -> KfzfResult<()> {
        if object.name().is_empty() {
            return Err(KfzfError::InvalidIdentity {
                namespace: object.namespace().map(str::to_string),
            });
        }
        self.shared.cache.put(object);
        Ok(())
    }

    /// Delete an object by key; returns whether it was present
    pub fn delete_resource(&self, key: &str) -> bool {
        self.shared.cache.remove(key)
    }

    /// Write the full cache to the dump file now
    ///
    /// Waits for any in-flight dump first. Leaves the dirty flag untouched;
    /// the dump loop still writes at its next tick if the cache is dirty.
    pub async fn dump_full_state(&self) -> KfzfResult<()> {
        self.shared.dump_full_state().await.map(|_| ())
    }

    /// Whether the dump file may be older than the cache
    pub fn is_dump_required(&self) -> bool {
        self.shared.cache.is_dirty()
    }

    /// Dump counters, last success time and last failure message
    pub fn stats(&self) -> DumpStats {
        self.shared
            .stats
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Current lifecycle state of the dump loop
    pub fn state(&self) -> StoreState {
        *self.shared.state.borrow()
    }

    /// Stop this Store's dump loop without cancelling the parent token
    pub fn stop(&self) {
        self.token.cancel();
    }

    /// Wait until the dump loop has exited
    pub async fn stopped(&self) {
        let mut rx = self.shared.state.subscribe();
        // Sender lives in `shared`, which we hold, so this cannot fail
        let _ = rx.wait_for(|s| *s == StoreState::Stopped).await;
    }

    pub fn resource_type(&self) -> ResourceType {
        self.shared.resource_type
    }

    /// Dump file this Store writes
    pub fn file_path(&self) -> &Path {
        &self.shared.file_path
    }

    /// Cached object for `key`, if any
    pub fn get(&self, key: &str) -> Option<T> {
        self.shared.cache.get(key)
    }

    pub fn len(&self) -> usize {
        self.shared.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shared.cache.is_empty()
    }
}

impl<T, C> Drop for Store<T, C> {
    fn drop(&mut self) {
        self.token.cancel();
    }
}
