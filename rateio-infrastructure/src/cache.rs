use dashmap::DashMap;
use rateio_application::{BalanceCache, CacheKey, CachedValue};
use std::{
    sync::atomic::{AtomicU64, Ordering},
    time::{Duration, Instant},
};

pub const DEFAULT_TTL: Duration = Duration::from_secs(60);
pub const DEFAULT_SWEEP_THRESHOLD: usize = 100;

pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    origin: Instant,
    elapsed_nanos: AtomicU64,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            elapsed_nanos: AtomicU64::new(0),
        }
    }

    pub fn advance(&self, by: Duration) {
        let nanos = u64::try_from(by.as_nanos()).unwrap_or(u64::MAX);
        self.elapsed_nanos.fetch_add(nanos, Ordering::Relaxed);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + Duration::from_nanos(self.elapsed_nanos.load(Ordering::Relaxed))
    }
}

#[derive(Debug, Clone)]
struct Entry {
    value: CachedValue,
    stored_at: Instant,
}

/// Concurrent cache whose entries expire a fixed time after they were stored.
///
/// A read of an expired entry removes it and reports a miss. Expired entries
/// that are never read again are dropped by [`BalanceCache::sweep`], which runs
/// automatically whenever a write leaves more than `sweep_threshold` entries.
pub struct TtlCache<C = SystemClock> {
    entries: DashMap<CacheKey, Entry>,
    ttl: Duration,
    sweep_threshold: usize,
    clock: C,
}

impl TtlCache<SystemClock> {
    pub fn new(ttl: Duration, sweep_threshold: usize) -> Self {
        Self::with_clock(ttl, sweep_threshold, SystemClock)
    }
}

impl Default for TtlCache<SystemClock> {
    fn default() -> Self {
        Self::new(DEFAULT_TTL, DEFAULT_SWEEP_THRESHOLD)
    }
}

impl<C: Clock> TtlCache<C> {
    pub fn with_clock(ttl: Duration, sweep_threshold: usize, clock: C) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
            sweep_threshold,
            clock,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    fn is_expired(&self, entry: &Entry, now: Instant) -> bool {
        now.saturating_duration_since(entry.stored_at) >= self.ttl
    }
}

impl<C: Clock> BalanceCache for TtlCache<C> {
    fn get(&self, key: &CacheKey) -> Option<CachedValue> {
        let now = self.clock.now();
        let stale = match self.entries.get(key) {
            Some(entry) if !self.is_expired(&entry, now) => return Some(entry.value.clone()),
            Some(_) => true,
            None => false,
        };
        if stale {
            self.entries
                .remove_if(key, |_, entry| self.is_expired(entry, now));
            tracing::trace!(key = key.as_str(), "Expired cache entry evicted on read");
        }
        None
    }

    fn set(&self, key: CacheKey, value: CachedValue) {
        let stored_at = self.clock.now();
        self.entries.insert(key, Entry { value, stored_at });
        if self.entries.len() > self.sweep_threshold {
            self.sweep();
        }
    }

    fn sweep(&self) -> usize {
        let now = self.clock.now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| !self.is_expired(entry, now));
        let removed = before.saturating_sub(self.entries.len());
        if removed > 0 {
            tracing::debug!(
                removed,
                remaining = self.entries.len(),
                "Expired cache entries swept"
            );
        }
        removed
    }

    fn clear(&self) {
        self.entries.clear();
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}
