//! Session cache statistics
//!
//! Atomic counters describing how the cache and the resumption matcher are
//! doing. They are local observability only: the peer never learns which
//! counter a failed resumption landed in.
//!
//! One [`CacheStats`] belongs to each session store; there is no global
//! instance.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tracing::info;

/// Counters for one session store and the contexts using it
#[derive(Debug)]
pub struct CacheStats {
    /// Resumption offers evaluated
    pub accept: AtomicU64,
    /// Server handshakes completed and reported to the cache
    pub accept_good: AtomicU64,
    /// Client handshakes completed and reported to the cache
    pub connect_good: AtomicU64,
    /// Offers resumed
    pub hits: AtomicU64,
    /// Sessions supplied by the external get hook
    pub cb_hits: AtomicU64,
    /// Offers with no candidate session
    pub misses: AtomicU64,
    /// Candidates rejected because they expired
    pub timeouts: AtomicU64,
    /// Entries evicted to respect the capacity bound
    pub cache_full: AtomicU64,
    /// Candidates rejected because their id_context differs
    pub context_mismatches: AtomicU64,
    /// Tickets that decrypted to a candidate session
    pub tickets_decrypted: AtomicU64,
    start_time: Instant,
}

impl CacheStats {
    /// Create a zeroed set of counters
    pub fn new() -> Self {
        Self {
            accept: AtomicU64::new(0),
            accept_good: AtomicU64::new(0),
            connect_good: AtomicU64::new(0),
            hits: AtomicU64::new(0),
            cb_hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            timeouts: AtomicU64::new(0),
            cache_full: AtomicU64::new(0),
            context_mismatches: AtomicU64::new(0),
            tickets_decrypted: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    pub fn record_accept(&self) {
        self.accept.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a completed server handshake; returns the new total
    pub fn record_accept_good(&self) -> u64 {
        self.accept_good.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Record a completed client handshake; returns the new total
    pub fn record_connect_good(&self) -> u64 {
        self.connect_good.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_cb_hit(&self) {
        self.cb_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_timeout(&self) {
        self.timeouts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_cache_full(&self, evicted: u64) {
        self.cache_full.fetch_add(evicted, Ordering::Relaxed);
    }

    pub fn record_context_mismatch(&self) {
        self.context_mismatches.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_ticket_decrypted(&self) {
        self.tickets_decrypted.fetch_add(1, Ordering::Relaxed);
    }

    /// Copy the counters; `number` is the store's current entry count
    pub fn snapshot(&self, number: usize) -> CacheStatsSnapshot {
        CacheStatsSnapshot {
            number,
            accept: self.accept.load(Ordering::Relaxed),
            accept_good: self.accept_good.load(Ordering::Relaxed),
            connect_good: self.connect_good.load(Ordering::Relaxed),
            hits: self.hits.load(Ordering::Relaxed),
            cb_hits: self.cb_hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            timeouts: self.timeouts.load(Ordering::Relaxed),
            cache_full: self.cache_full.load(Ordering::Relaxed),
            context_mismatches: self.context_mismatches.load(Ordering::Relaxed),
            tickets_decrypted: self.tickets_decrypted.load(Ordering::Relaxed),
            uptime_seconds: self.start_time.elapsed().as_secs(),
        }
    }

    /// Log a snapshot at info level
    pub fn log_metrics(&self, number: usize) {
        let snapshot = self.snapshot(number);
        info!(
            number = snapshot.number,
            accept = snapshot.accept,
            accept_good = snapshot.accept_good,
            connect_good = snapshot.connect_good,
            hits = snapshot.hits,
            cb_hits = snapshot.cb_hits,
            misses = snapshot.misses,
            timeouts = snapshot.timeouts,
            cache_full = snapshot.cache_full,
            context_mismatches = snapshot.context_mismatches,
            tickets_decrypted = snapshot.tickets_decrypted,
            uptime_seconds = snapshot.uptime_seconds,
            "Session cache metrics snapshot"
        );
    }
}

impl Default for CacheStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of [`CacheStats`] at a point in time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStatsSnapshot {
    pub number: usize,
    pub accept: u64,
    pub accept_good: u64,
    pub connect_good: u64,
    pub hits: u64,
    pub cb_hits: u64,
    pub misses: u64,
    pub timeouts: u64,
    pub cache_full: u64,
    pub context_mismatches: u64,
    pub tickets_decrypted: u64,
    pub uptime_seconds: u64,
}
