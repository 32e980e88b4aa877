//! Time-expiring single-slot cache for the aggregated result set.
//!
//! Expiry is lazy: `get()` checks the TTL at read time and never
//! returns a logically expired value. No background eviction runs.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::types::{AggregatedResult, CacheStats};

/// Fixed time-to-live for the aggregated result.
pub const CACHE_TTL: Duration = Duration::from_secs(300);

/// Name of the single cache slot, reported by the debug endpoint.
pub const CACHE_KEY: &str = "weather_results";

/// Time source, injectable so expiry tests can use a manual clock.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// Default wall-clock time source.
#[derive(Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

struct Slot {
    value: AggregatedResult,
    stored_at: Instant,
}

/// Single named slot holding at most one [`AggregatedResult`].
pub struct ResultCache {
    slot: Mutex<Option<Slot>>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl ResultCache {
    /// Cache with the fixed 300-second TTL and the system clock.
    pub fn new() -> Self {
        Self::with_clock(CACHE_TTL, Arc::new(SystemClock))
    }

    /// Cache with an explicit TTL and clock, for deterministic tests.
    pub fn with_clock(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            slot: Mutex::new(None),
            clock,
            ttl,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Return the cached value if present and within TTL.
    ///
    /// Counts a hit or a miss; an expired entry is dropped and counts
    /// as a miss.
    pub fn get(&self) -> Option<AggregatedResult> {
        let mut slot = self.slot.lock();

        let expired = matches!(
            slot.as_ref(),
            Some(s) if self.clock.now().duration_since(s.stored_at) >= self.ttl
        );
        if expired {
            *slot = None;
        }

        match slot.as_ref() {
            Some(s) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(s.value.clone())
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Store a value, restarting the TTL countdown.
    pub fn set(&self, value: AggregatedResult) {
        let mut slot = self.slot.lock();
        *slot = Some(Slot {
            value,
            stored_at: self.clock.now(),
        });
    }

    /// Cumulative counters since process start.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            present: self.peek().is_some(),
        }
    }

    /// Time left before the current entry expires, without touching
    /// the hit/miss counters.
    pub fn remaining_ttl(&self) -> Option<Duration> {
        let slot = self.slot.lock();
        let stored_at = slot.as_ref().map(|s| s.stored_at)?;
        let elapsed = self.clock.now().duration_since(stored_at);
        (elapsed < self.ttl).then(|| self.ttl - elapsed)
    }

    /// Introspect the current entry without counting a hit or miss.
    pub fn peek(&self) -> Option<AggregatedResult> {
        let slot = self.slot.lock();
        slot.as_ref()
            .filter(|s| self.clock.now().duration_since(s.stored_at) < self.ttl)
            .map(|s| s.value.clone())
    }
}

impl Default for ResultCache {
    fn default() -> Self {
        Self::new()
    }
}
