//! Ticker-driven flush of a Store's cache

use super::{Shared, StoreState};
use crate::resources::Resource;
use crate::store::codec::SnapshotCodec;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Background loop that dumps the cache at most once per tick, and only when
/// it changed since the last successful dump
pub(crate) struct Dumper<T, C> {
    shared: Arc<Shared<T, C>>,
    period: Duration,
    token: CancellationToken,
}

impl<T, C> Dumper<T, C>
where
    T: Resource + Serialize,
    C: SnapshotCodec,
{
    pub(crate) fn new(shared: Arc<Shared<T, C>>, period: Duration, token: CancellationToken) -> Self {
        Self {
            shared,
            // tokio intervals cannot have a zero period
            period: period.max(Duration::from_millis(1)),
            token,
        }
    }

    pub(crate) async fn run(self) {
        let resource = self.shared.resource_type;

        // First check one period after start, like a plain ticker
        let mut ticker = interval_at(Instant::now() + self.period, self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        self.shared.set_state(StoreState::Running);
        info!("Store for {} running, full dump every {:?}", resource, self.period);

        loop {
            tokio::select! {
                biased;
                _ = self.token.cancelled() => break,
                _ = ticker.tick() => {}
            }

            match self.shared.flush_if_dirty().await {
                Ok(true) => debug!("Flushed {} on tick", resource),
                Ok(false) => {}
                Err(e) if e.is_retryable() => {
                    warn!("Dumping {} failed, retrying next tick: {}", resource, e)
                }
                Err(e) => error!("Dumping {} failed and is unlikely to recover: {}", resource, e),
            }
        }

        self.shared.set_state(StoreState::Stopped);
        info!("Store for {} stopped", resource);
    }
}
