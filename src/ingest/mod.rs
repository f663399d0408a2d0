//! Routing of watch events into per-resource-type Stores

pub mod event;

pub use event::{parse_line, WatchEvent};

use crate::error::{KfzfError, KfzfResult};
use crate::resources::{K8sResource, Resource, ResourceType};
use crate::store::{Store, StoreConfig};
use std::collections::BTreeMap;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Counters for one ingestion run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestStats {
    /// Add and modify events applied to a store
    pub applied: u64,
    /// Delete events that removed an entry
    pub deleted: u64,
    /// Events for types without a store, bookmarks and rejected objects
    pub skipped: u64,
    /// Lines that failed to parse
    pub malformed: u64,
}

/// Owns one Store per resource type and feeds them watch events
pub struct Ingestor {
    stores: BTreeMap<ResourceType, Store<K8sResource>>,
    token: CancellationToken,
    stats: IngestStats,
}

impl Ingestor {
    /// Start a Store for each resource type
    ///
    /// The destination directory must exist. Cancelling `token` stops every
    /// Store's dump loop and any running `run`.
    pub fn new(
        token: CancellationToken,
        config: &StoreConfig,
        resource_types: &[ResourceType],
    ) -> KfzfResult<Self> {
        let token = token.child_token();
        let mut stores = BTreeMap::new();

        for &resource_type in resource_types {
            if stores.contains_key(&resource_type) {
                continue;
            }
            let store = Store::new(token.clone(), config, resource_type)?;
            stores.insert(resource_type, store);
        }

        info!(
            "Maintaining {} resource type(s) under {}",
            stores.len(),
            config.dest_dir().display()
        );

        Ok(Self {
            stores,
            token,
            stats: IngestStats::default(),
        })
    }

    /// Apply a single event to the matching store
    pub fn apply(&mut self, event: WatchEvent) {
        match event {
            WatchEvent::Added(obj) | WatchEvent::Modified(obj) => {
                let Some(store) = self.stores.get(&obj.resource_type()) else {
                    debug!("No store for {}, skipping {}", obj.resource_type(), obj.key());
                    self.stats.skipped += 1;
                    return;
                };

                match store.add_resource(obj) {
                    Ok(()) => self.stats.applied += 1,
                    Err(e) => {
                        warn!("Rejected object: {}", e);
                        self.stats.skipped += 1;
                    }
                }
            }
            WatchEvent::Deleted(obj) => {
                let key = obj.key();
                match self.stores.get(&obj.resource_type()) {
                    Some(store) if store.delete_resource(&key) => self.stats.deleted += 1,
                    Some(_) => debug!("Delete for unknown key {}", key),
                    None => self.stats.skipped += 1,
                }
            }
            WatchEvent::Bookmark(_) => self.stats.skipped += 1,
            WatchEvent::Error(status) => {
                warn!("Watch stream reported an error: {}", status);
                self.stats.skipped += 1;
            }
        }
    }

    /// Consume a newline separated watch stream until EOF or cancellation
    ///
    /// Malformed lines are logged and skipped; only read errors abort.
    pub async fn run<R>(&mut self, reader: R) -> KfzfResult<IngestStats>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut lines = reader.lines();
        let mut line_no = 0usize;

        loop {
            let line = tokio::select! {
                biased;
                _ = self.token.cancelled() => {
                    debug!("Ingestion cancelled after {} lines", line_no);
                    break;
                }
                line = lines.next_line() => line,
            };

            let line = line.map_err(|e| KfzfError::io("reading watch stream", e))?;
            let Some(line) = line else {
                debug!("Watch stream ended after {} lines", line_no);
                break;
            };
            line_no += 1;

            match parse_line(line_no, &line) {
                Ok(Some(event)) => self.apply(event),
                Ok(None) => {}
                Err(e) => {
                    warn!("{}", e);
                    self.stats.malformed += 1;
                }
            }
        }

        Ok(self.stats.clone())
    }

    /// Dump every store once more, then stop all dump loops
    ///
    /// Every store is dumped and stopped even if one dump fails; the first
    /// failure is returned.
    pub async fn shutdown(self) -> KfzfResult<IngestStats> {
        let mut first_err = None;

        for (resource_type, store) in &self.stores {
            if let Err(e) = store.dump_full_state().await {
                warn!("Final dump of {} failed: {}", resource_type, e);
                first_err.get_or_insert(e);
            }
        }

        self.token.cancel();
        for store in self.stores.values() {
            store.stopped().await;
        }

        info!(
            "Ingestion finished: {} applied, {} deleted, {} skipped, {} malformed",
            self.stats.applied, self.stats.deleted, self.stats.skipped, self.stats.malformed
        );

        match first_err {
            Some(e) => Err(e),
            None => Ok(self.stats),
        }
    }

    pub fn store(&self, resource_type: ResourceType) -> Option<&Store<K8sResource>> {
        self.stores.get(&resource_type)
    }

    pub fn stats(&self) -> &IngestStats {
        &self.stats
    }
}
