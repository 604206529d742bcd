use db::{ObservationSource, ReadOrder};
use log::debug;
use std::time::Duration;

use super::{render, CitySelection, DashboardView};
use crate::cache::TtlCache;
use crate::reader::{read_snapshot, Snapshot};
use crate::scheduler::Clock;

/// Read-and-render pass with the table read memoized for a short TTL.
///
/// Failed reads are not cached so that the next interaction retries.
pub struct DashboardService<S, C> {
    source: S,
    cache: TtlCache<Snapshot>,
    clock: C,
    queries: u64,
}

impl<S: ObservationSource, C: Clock> DashboardService<S, C> {
    pub fn new(source: S, ttl: Duration, clock: C) -> Self {
        Self {
            source,
            cache: TtlCache::new(ttl),
            clock,
            queries: 0,
        }
    }

    /// The cached snapshot while it is fresh, a new read otherwise
    pub fn snapshot(&mut self) -> Snapshot {
        let now = self.clock.now();
        if let Some(snapshot) = self.cache.get(now) {
            debug!("Serving cached snapshot");
            return snapshot.clone();
        }

        self.queries += 1;
        let snapshot = read_snapshot(&mut self.source, ReadOrder::NewestFirst);
        debug!("Read {} rows from the weather table", snapshot.rows.len());
        if snapshot.is_available() {
            self.cache.insert(now, snapshot.clone());
        }
        snapshot
    }

    pub fn view(&mut self, selection: &CitySelection) -> DashboardView {
        render(&self.snapshot(), selection)
    }

    /// Number of reads that reached the source
    pub fn queries(&self) -> u64 {
        self.queries
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }
}
