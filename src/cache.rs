//! Snapshot cache with an explicit clock.
//!
//! The refresh machinery the host wires between its scheduler and the data
//! core. Staleness is decided against an injected [`Clock`], so tests can
//! move time without sleeping, and the contract is explicit: `is_stale`
//! answers "is a refresh due", `invalidate` forces one, and `refresh` swaps
//! in a whole new snapshot, keeping the previous one when the source fails,
//! so a flaky upstream degrades to slightly stale data instead of an empty
//! page.

use std::sync::{Arc, RwLock};

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, warn};

use crate::constants::cache::DEFAULT_TTL_SECONDS;
use crate::errors::DashboardError;
use crate::source::{DatasetSnapshot, DatasetSource};

/// Time source for staleness checks.
pub trait Clock: Send + Sync {
    /// Current instant.
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock implementation of [`Clock`].
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Thread-safe holder of the current dataset snapshot.
pub struct DatasetCache {
    clock: Arc<dyn Clock>,
    ttl: Duration,
    slot: RwLock<Option<DatasetSnapshot>>,
}

impl DatasetCache {
    /// Cache with the default TTL and the system clock.
    pub fn new() -> Self {
        Self::with_ttl(Duration::seconds(DEFAULT_TTL_SECONDS))
    }

    /// Cache with a custom TTL and the system clock.
    pub fn with_ttl(ttl: Duration) -> Self {
        Self::with_clock(ttl, Arc::new(SystemClock))
    }

    /// Cache with a custom TTL and clock.
    pub fn with_clock(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            ttl,
            slot: RwLock::new(None),
        }
    }

    /// True when no snapshot is held or the held one has outlived the TTL.
    pub fn is_stale(&self) -> bool {
        let slot = self.slot.read().expect("dataset cache poisoned");
        match slot.as_ref() {
            None => true,
            Some(snapshot) => self.clock.now() - snapshot.loaded_at > self.ttl,
        }
    }

    /// Drop the held snapshot so the next check reports stale.
    pub fn invalidate(&self) {
        let mut slot = self.slot.write().expect("dataset cache poisoned");
        *slot = None;
    }

    /// Clone of the currently held snapshot, if any.
    ///
    /// `None` means "no dataset yet": callers degrade every computation to
    /// its sentinel rather than treating this as an error.
    pub fn current(&self) -> Option<DatasetSnapshot> {
        self.slot
            .read()
            .expect("dataset cache poisoned")
            .as_ref()
            .cloned()
    }

    /// Load a fresh snapshot from `source` and swap it in.
    ///
    /// On load failure the previous snapshot (when one exists) keeps being
    /// served and is returned; the error surfaces only when there is nothing
    /// to fall back to.
    pub fn refresh(&self, source: &dyn DatasetSource) -> Result<DatasetSnapshot, DashboardError> {
        match source.load() {
            Ok(dataset) => {
                let snapshot = DatasetSnapshot {
                    dataset,
                    loaded_at: self.clock.now(),
                };
                let mut slot = self.slot.write().expect("dataset cache poisoned");
                *slot = Some(snapshot.clone());
                debug!(source_id = source.id(), rows = snapshot.dataset.len(), "snapshot refreshed");
                Ok(snapshot)
            }
            Err(err) => {
                let fallback = self.current();
                match fallback {
                    Some(snapshot) => {
                        warn!(
                            source_id = source.id(),
                            error = %err,
                            "refresh failed; serving previous snapshot"
                        );
                        Ok(snapshot)
                    }
                    None => Err(err),
                }
            }
        }
    }

    /// Return the current snapshot, refreshing first when stale.
    pub fn snapshot(&self, source: &dyn DatasetSource) -> Result<DatasetSnapshot, DashboardError> {
        if self.is_stale() {
            return self.refresh(source);
        }
        self.current()
            .ok_or_else(|| DashboardError::Configuration("cache empty but not stale".to_string()))
    }
}

impl Default for DatasetCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Dataset;
    use crate::source::InMemorySource;
    use std::sync::Mutex;

    struct ManualClock {
        now: Mutex<DateTime<Utc>>,
    }

    impl ManualClock {
        fn starting_at(now: DateTime<Utc>) -> Arc<Self> {
            Arc::new(Self {
                now: Mutex::new(now),
            })
        }

        fn advance(&self, by: Duration) {
            let mut now = self.now.lock().unwrap();
            *now += by;
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> DateTime<Utc> {
            *self.now.lock().unwrap()
        }
    }

    struct FailingSource;

    impl DatasetSource for FailingSource {
        fn id(&self) -> &str {
            "failing"
        }

        fn load(&self) -> Result<Dataset, DashboardError> {
            Err(DashboardError::SourceUnavailable {
                source_id: "failing".into(),
                reason: "upstream offline".into(),
            })
        }
    }

    fn fixture_source() -> InMemorySource {
        InMemorySource::new("fixture", Dataset::new(["a"]).unwrap())
    }

    #[test]
    fn empty_cache_is_stale_and_serves_nothing() {
        let cache = DatasetCache::new();
        assert!(cache.is_stale());
        assert!(cache.current().is_none());
    }

    #[test]
    fn refresh_then_ttl_expiry_then_invalidate() {
        let clock = ManualClock::starting_at(Utc::now());
        let cache = DatasetCache::with_clock(Duration::seconds(60), clock.clone());
        let source = fixture_source();

        cache.refresh(&source).unwrap();
        assert!(!cache.is_stale());

        clock.advance(Duration::seconds(61));
        assert!(cache.is_stale());

        cache.refresh(&source).unwrap();
        assert!(!cache.is_stale());
        cache.invalidate();
        assert!(cache.is_stale());
        assert!(cache.current().is_none());
    }

    #[test]
    fn failed_refresh_keeps_previous_snapshot() {
        let cache = DatasetCache::with_ttl(Duration::seconds(60));
        let source = fixture_source();
        let good = cache.refresh(&source).unwrap();

        let served = cache.refresh(&FailingSource).unwrap();
        assert_eq!(served.dataset, good.dataset);
        assert!(cache.current().is_some());
    }

    #[test]
    fn failed_refresh_with_no_fallback_is_an_error() {
        let cache = DatasetCache::new();
        let result = cache.refresh(&FailingSource);
        assert!(matches!(
            result,
            Err(DashboardError::SourceUnavailable { .. })
        ));
    }

    #[test]
    fn snapshot_refreshes_only_when_stale() {
        let clock = ManualClock::starting_at(Utc::now());
        let cache = DatasetCache::with_clock(Duration::seconds(60), clock.clone());
        let source = fixture_source();

        let first = cache.snapshot(&source).unwrap();
        clock.advance(Duration::seconds(10));
        let second = cache.snapshot(&source).unwrap();
        assert_eq!(first.loaded_at, second.loaded_at);

        clock.advance(Duration::seconds(120));
        let third = cache.snapshot(&source).unwrap();
        assert!(third.loaded_at > first.loaded_at);
    }
}
