//! # Session Store
//!
//! In-memory index of resumable sessions with least-recently-used eviction.
//!
//! ## Features
//! - **Keyed by `(id, id_context, protocol_version)`**: two applications
//!   sharing a store never see each other's sessions
//! - **Recency-ordered map**: an unbounded `lru::LruCache` holds index and
//!   recency list in one structure behind a single `parking_lot::RwLock`
//! - **Concurrent lookups**: hits take the read lock first and only escalate
//!   to promote the entry
//! - **Capacity bound**: inserts evict from the tail once the bound is
//!   exceeded; 0 disables the bound
//! - **Chunked sweeps**: expiry sweeps release the write lock between
//!   batches so lookups are never starved
//!
//! External hooks are always invoked after the lock is dropped.
//!
//! ## Usage
//! ```rust
//! use tls_session_cache::cache::store::SessionStore;
//! use tls_session_cache::core::session::{ProtocolVersion, Session};
//!
//! let store = SessionStore::new(1024);
//!
//! let mut session = Session::new(ProtocolVersion::Tls12, 0xC02F);
//! session.set_id(&[0x01; 32]).unwrap();
//! session.set_id_context(b"srv").unwrap();
//! let handle = session.into_handle();
//! store.insert(&handle);
//!
//! let hit = store.lookup(&[0x01; 32], b"srv", ProtocolVersion::Tls12).unwrap();
//! assert!(hit.is_some());
//! ```

use crate::cache::hooks::{GetSessionHook, NewSessionHook, RemoveSessionHook, SessionHooks};
use crate::core::session::{ProtocolVersion, SessionHandle, SessionId, SessionIdContext};
use crate::error::Result;
use crate::utils::metrics::{CacheStats, CacheStatsSnapshot};
use crate::utils::time::{Clock, SystemClock};
use lru::LruCache;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{debug, trace};

/// Default number of entries processed per write-lock acquisition in a sweep
pub const DEFAULT_SWEEP_BATCH_SIZE: usize = 256;

/// Index key of a stored session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionKey {
    id: SessionId,
    id_context: SessionIdContext,
    version: ProtocolVersion,
}

impl SessionKey {
    /// Build a key from raw parts, rejecting oversized id or context
    pub fn new(id: &[u8], id_context: &[u8], version: ProtocolVersion) -> Result<Self> {
        Ok(Self {
            id: SessionId::new(id)?,
            id_context: SessionIdContext::new(id_context)?,
            version,
        })
    }

    /// The key a session is indexed under
    pub fn of(session: &SessionHandle) -> Self {
        Self {
            id: *session.id(),
            id_context: *session.id_context(),
            version: session.protocol_version(),
        }
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn id_context(&self) -> &SessionIdContext {
        &self.id_context
    }

    pub fn version(&self) -> ProtocolVersion {
        self.version
    }
}

/// Outcome of a keyed lookup
#[derive(Debug)]
pub enum LookupOutcome {
    /// A live entry; the caller owns the returned reference
    Hit(SessionHandle),
    /// An entry existed but had expired; it has been removed
    Expired,
    /// Nothing is indexed under the key
    Absent,
}

struct StoreInner {
    entries: LruCache<SessionKey, SessionHandle>,
}

impl StoreInner {
    fn is_indexed(&self, key: &SessionKey, session: &SessionHandle) -> bool {
        self.entries.peek(key).is_some_and(|h| h.ptr_eq(session))
    }

    fn unindex(&mut self, key: &SessionKey, session: &SessionHandle) -> Option<SessionHandle> {
        if self.is_indexed(key, session) {
            self.entries.pop(key)
        } else {
            None
        }
    }
}

/// Thread-safe session store shared by every connection of a context
pub struct SessionStore {
    inner: RwLock<StoreInner>,
    capacity: AtomicUsize,
    sweep_batch_size: usize,
    hooks: RwLock<SessionHooks>,
    stats: Arc<CacheStats>,
    clock: Arc<dyn Clock>,
}

impl SessionStore {
    /// Create a store bounded to `capacity` entries (0 for unbounded) on the
    /// system clock
    pub fn new(capacity: usize) -> Self {
        Self::with_clock(capacity, Arc::new(SystemClock))
    }

    /// Create a store reading time from `clock`
    pub fn with_clock(capacity: usize, clock: Arc<dyn Clock>) -> Self {
        Self {
            // the bound is enforced here rather than by the map so it can
            // change at runtime and evictions reach the remove hook
            inner: RwLock::new(StoreInner {
                entries: LruCache::unbounded(),
            }),
            capacity: AtomicUsize::new(capacity),
            sweep_batch_size: DEFAULT_SWEEP_BATCH_SIZE,
            hooks: RwLock::new(SessionHooks::default()),
            stats: Arc::new(CacheStats::new()),
            clock,
        }
    }

    /// Set how many entries a sweep handles per lock acquisition
    pub fn with_sweep_batch_size(mut self, batch: usize) -> Self {
        self.sweep_batch_size = batch.max(1);
        self
    }

    /// Index `session`, taking one reference for the store.
    ///
    /// A different session already living under the same key is unindexed,
    /// flagged not resumable and released first; in that case the call
    /// returns `true`. Inserting the object that is already indexed is a
    /// no-op. Sessions with an empty id or that are no longer resumable are
    /// refused.
    pub fn insert(&self, session: &SessionHandle) -> bool {
        if session.id().is_empty() || !session.is_resumable() {
            trace!(id_len = session.id().len(), "Session not cacheable, insert refused");
            return false;
        }

        let key = SessionKey::of(session);
        let replaced;
        let evicted;
        let session_count;
        {
            let mut inner = self.inner.write();
            // a concurrent remove may have flagged the session since the check above
            if !session.is_resumable() || inner.is_indexed(&key, session) {
                return false;
            }

            replaced = inner.entries.put(key, session.acquire());
            if let Some(old) = &replaced {
                old.mark_not_resumable();
            }

            evicted = match self.capacity.load(Ordering::Relaxed) {
                0 => Vec::new(),
                cap => Self::evict_locked(&mut inner, cap),
            };
            session_count = inner.entries.len();
        }

        debug!(
            session_count,
            replaced = replaced.is_some(),
            evicted_count = evicted.len(),
            "Session stored in cache"
        );
        self.finish_eviction(evicted);
        replaced.is_some()
    }

    /// Find the session stored under `(id, id_context, version)`.
    ///
    /// A hit returns a new owning reference and promotes the entry to most
    /// recently used. An entry that has expired by the store clock is
    /// removed, counted as a timeout and reported as absent; use
    /// [`lookup_entry`](Self::lookup_entry) to tell the two apart.
    pub fn lookup(
        &self,
        id: &[u8],
        id_context: &[u8],
        version: ProtocolVersion,
    ) -> Result<Option<SessionHandle>> {
        Ok(match self.lookup_entry(id, id_context, version)? {
            LookupOutcome::Hit(handle) => Some(handle),
            LookupOutcome::Expired | LookupOutcome::Absent => None,
        })
    }

    /// Like [`lookup`](Self::lookup), but distinguishes an expired entry
    /// from a missing one.
    pub fn lookup_entry(
        &self,
        id: &[u8],
        id_context: &[u8],
        version: ProtocolVersion,
    ) -> Result<LookupOutcome> {
        let key = SessionKey::new(id, id_context, version)?;

        let found = {
            let inner = self.inner.read();
            inner.entries.peek(&key).map(SessionHandle::acquire)
        };

        let Some(handle) = found.filter(|h| h.is_resumable()) else {
            trace!("Session cache miss");
            return Ok(LookupOutcome::Absent);
        };

        if handle.is_expired_at(self.clock.now()) {
            trace!("Session cache entry expired");
            self.stats.record_timeout();
            self.remove(&handle);
            return Ok(LookupOutcome::Expired);
        }

        {
            let mut inner = self.inner.write();
            if inner.is_indexed(&key, &handle) {
                inner.entries.promote(&key);
            }
        }

        trace!("Session cache hit");
        Ok(LookupOutcome::Hit(handle))
    }

    /// Whether any session is indexed under `(id, id_context, version)`
    pub fn has_matching_session_id(
        &self,
        id: &[u8],
        id_context: &[u8],
        version: ProtocolVersion,
    ) -> bool {
        match SessionKey::new(id, id_context, version) {
            Ok(key) => self.inner.read().entries.contains(&key),
            Err(_) => false,
        }
    }

    /// Take `session` out of circulation.
    ///
    /// The session is flagged not resumable and, if it is the object indexed
    /// under its own key, unindexed and released by the store. Returns `true`
    /// when this call unindexed it. Calling it again is harmless.
    pub fn remove(&self, session: &SessionHandle) -> bool {
        session.mark_not_resumable();
        if session.id().is_empty() {
            return false;
        }

        let key = SessionKey::of(session);
        let removed = self.inner.write().unindex(&key, session);

        match removed {
            Some(handle) => {
                debug!("Session removed from cache");
                self.notify_removed(std::slice::from_ref(&handle));
                true
            }
            None => false,
        }
    }

    /// Evict least recently used entries until at most `capacity` remain.
    ///
    /// Returns the number of entries evicted.
    pub fn evict_excess(&self, capacity: usize) -> usize {
        let evicted = {
            let mut inner = self.inner.write();
            Self::evict_locked(&mut inner, capacity)
        };
        let count = evicted.len();
        self.finish_eviction(evicted);
        count
    }

    /// Remove every session that expired before `cutoff`.
    ///
    /// A cutoff of 0 removes everything. Work is done in batches of the
    /// configured sweep size, releasing the write lock between batches.
    /// Returns the number of sessions removed.
    pub fn sweep_expired(&self, cutoff: u64) -> usize {
        let candidates: Vec<(SessionKey, SessionHandle)> = {
            let inner = self.inner.read();
            inner
                .entries
                .iter()
                .filter(|(_, h)| cutoff == 0 || h.expires_before(cutoff))
                .map(|(k, h)| (*k, h.acquire()))
                .collect()
        };

        if candidates.is_empty() {
            return 0;
        }

        let mut removed_count = 0;
        for chunk in candidates.chunks(self.sweep_batch_size) {
            let mut removed = Vec::with_capacity(chunk.len());
            {
                let mut inner = self.inner.write();
                for (key, handle) in chunk {
                    if let Some(h) = inner.unindex(key, handle) {
                        h.mark_not_resumable();
                        removed.push(h);
                    }
                }
            }
            removed_count += removed.len();
            self.notify_removed(&removed);
        }

        debug!(
            removed_count,
            remaining_count = self.len(),
            cutoff,
            "Expired sessions swept"
        );
        removed_count
    }

    /// Number of indexed sessions
    pub fn len(&self) -> usize {
        self.inner.read().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Current capacity bound; 0 means unbounded
    pub fn capacity(&self) -> usize {
        self.capacity.load(Ordering::Relaxed)
    }

    /// Change the capacity bound, evicting immediately if the store is over
    /// the new bound. Returns the previous bound.
    pub fn set_capacity(&self, capacity: usize) -> usize {
        let previous = self.capacity.swap(capacity, Ordering::Relaxed);
        if capacity > 0 {
            self.evict_excess(capacity);
        }
        previous
    }

    /// Keys from most to least recently used
    pub fn keys(&self) -> Vec<SessionKey> {
        self.inner.read().entries.iter().map(|(k, _)| *k).collect()
    }

    /// Check that every entry is stored under its own session's key and that
    /// the capacity bound holds
    pub fn is_consistent(&self) -> bool {
        let inner = self.inner.read();
        let cap = self.capacity();
        (cap == 0 || inner.entries.len() <= cap)
            && inner
                .entries
                .iter()
                .all(|(key, handle)| SessionKey::of(handle) == *key && handle.is_resumable())
    }

    /// Copy of the registered hooks
    pub fn hooks(&self) -> SessionHooks {
        self.hooks.read().clone()
    }

    /// Replace all three hooks at once
    pub fn set_hooks(&self, hooks: SessionHooks) {
        *self.hooks.write() = hooks;
    }

    pub fn set_new_session_hook(&self, hook: Option<Arc<dyn NewSessionHook>>) {
        self.hooks.write().new_session = hook;
    }

    pub fn set_get_session_hook(&self, hook: Option<Arc<dyn GetSessionHook>>) {
        self.hooks.write().get_session = hook;
    }

    pub fn set_remove_session_hook(&self, hook: Option<Arc<dyn RemoveSessionHook>>) {
        self.hooks.write().remove_session = hook;
    }

    pub fn stats(&self) -> &Arc<CacheStats> {
        &self.stats
    }

    /// Counter snapshot including the live entry count
    pub fn stats_snapshot(&self) -> CacheStatsSnapshot {
        self.stats.snapshot(self.len())
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    fn evict_locked(inner: &mut StoreInner, capacity: usize) -> Vec<SessionHandle> {
        let mut evicted = Vec::new();
        while inner.entries.len() > capacity {
            match inner.entries.pop_lru() {
                Some((_, handle)) => {
                    handle.mark_not_resumable();
                    evicted.push(handle);
                }
                None => break,
            }
        }
        evicted
    }

    fn finish_eviction(&self, evicted: Vec<SessionHandle>) {
        if evicted.is_empty() {
            return;
        }
        self.stats.record_cache_full(evicted.len() as u64);
        debug!(evicted_count = evicted.len(), "Sessions evicted to respect capacity");
        self.notify_removed(&evicted);
    }

    fn notify_removed(&self, removed: &[SessionHandle]) {
        if removed.is_empty() {
            return;
        }
        let hook = self.hooks.read().remove_session.clone();
        if let Some(hook) = hook {
            for handle in removed {
                hook.on_remove_session(handle);
            }
        }
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("len", &self.len())
            .field("capacity", &self.capacity())
            .field("sweep_batch_size", &self.sweep_batch_size)
            .field("hooks", &*self.hooks.read())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::session::Session;
    use crate::utils::time::ManualClock;
    use std::time::Duration;

    fn session(id: u8, ctx: &[u8], now: u64) -> SessionHandle {
        let mut s = Session::new(ProtocolVersion::Tls12, 0xC02F);
        s.set_id(&[id; 32]).unwrap();
        s.set_id_context(ctx).unwrap();
        s.set_master_secret(&[id; 48]).unwrap();
        s.set_time(now);
        s.into_handle()
    }

    fn store_at(capacity: usize, now: u64) -> (SessionStore, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(now));
        (SessionStore::with_clock(capacity, clock.clone()), clock)
    }

    #[test]
    fn test_insert_and_lookup() {
        let (store, _) = store_at(10, 1_000);
        let s = session(1, b"srv", 1_000);
        assert!(!store.insert(&s));
        assert_eq!(s.ref_count(), 2);

        let hit = store.lookup(&[1; 32], b"srv", ProtocolVersion::Tls12).unwrap().unwrap();
        assert!(hit.ptr_eq(&s));
        assert_eq!(s.ref_count(), 3);
        assert!(store.lookup(&[1; 32], b"other", ProtocolVersion::Tls12).unwrap().is_none());
        assert!(store.lookup(&[1; 32], b"srv", ProtocolVersion::Tls13).unwrap().is_none());
    }

    #[test]
    fn test_insert_same_object_is_noop() {
        let (store, _) = store_at(10, 1_000);
        let s = session(1, b"srv", 1_000);
        store.insert(&s);
        assert!(!store.insert(&s));
        assert_eq!(store.len(), 1);
        assert_eq!(s.ref_count(), 2);
        assert!(s.is_resumable());
    }

    #[test]
    fn test_insert_collision_replaces() {
        let (store, _) = store_at(10, 1_000);
        let old = session(1, b"srv", 1_000);
        let new = session(1, b"srv", 1_000);
        store.insert(&old);
        assert!(store.insert(&new));
        assert_eq!(store.len(), 1);
        assert_eq!(old.ref_count(), 1);
        assert!(!old.is_resumable());

        let hit = store.lookup(&[1; 32], b"srv", ProtocolVersion::Tls12).unwrap().unwrap();
        assert!(hit.ptr_eq(&new));
    }

    #[test]
    fn test_insert_refuses_empty_id_and_not_resumable() {
        let (store, _) = store_at(10, 1_000);
        let anon = Session::new(ProtocolVersion::Tls12, 0xC02F).into_handle();
        assert!(!store.insert(&anon));

        let dead = session(2, b"srv", 1_000);
        dead.mark_not_resumable();
        assert!(!store.insert(&dead));
        assert!(store.is_empty());
    }

    #[test]
    fn test_lru_eviction_order() {
        let (store, _) = store_at(2, 1_000);
        let a = session(1, b"srv", 1_000);
        let b = session(2, b"srv", 1_000);
        let c = session(3, b"srv", 1_000);
        store.insert(&a);
        store.insert(&b);
        store.insert(&c);

        assert_eq!(store.len(), 2);
        assert!(!a.is_resumable());
        assert_eq!(a.ref_count(), 1);
        assert!(store.has_matching_session_id(&[2; 32], b"srv", ProtocolVersion::Tls12));
        assert!(store.has_matching_session_id(&[3; 32], b"srv", ProtocolVersion::Tls12));
        assert_eq!(store.stats_snapshot().cache_full, 1);
    }

    #[test]
    fn test_lookup_refreshes_recency() {
        let (store, _) = store_at(2, 1_000);
        let a = session(1, b"srv", 1_000);
        let b = session(2, b"srv", 1_000);
        store.insert(&a);
        store.insert(&b);
        store.lookup(&[1; 32], b"srv", ProtocolVersion::Tls12).unwrap();
        store.insert(&session(3, b"srv", 1_000));

        assert!(a.is_resumable());
        assert!(!b.is_resumable());
    }

    #[test]
    fn test_lookup_drops_expired_entry() {
        let (store, clock) = store_at(10, 1_000);
        let removed = Arc::new(AtomicUsize::new(0));
        let counter = removed.clone();
        store.set_remove_session_hook(Some(Arc::new(move |_: &SessionHandle| {
            counter.fetch_add(1, Ordering::SeqCst);
        })));

        let mut s = Session::new(ProtocolVersion::Tls12, 0xC02F);
        s.set_id(&[1; 32]).unwrap();
        s.set_id_context(b"srv").unwrap();
        s.set_time(1_000);
        s.set_timeout(Duration::from_secs(5));
        let s = s.into_handle();
        store.insert(&s);

        assert!(store.lookup(&[1; 32], b"srv", ProtocolVersion::Tls12).unwrap().is_some());
        clock.advance(Duration::from_secs(6));
        assert!(store.lookup(&[1; 32], b"srv", ProtocolVersion::Tls12).unwrap().is_none());
        assert_eq!(store.len(), 0);
        assert_eq!(removed.load(Ordering::SeqCst), 1);
        assert_eq!(store.stats_snapshot().timeouts, 1);
    }

    #[test]
    fn test_lookup_entry_tells_expired_from_absent() {
        let (store, clock) = store_at(10, 1_000);
        let mut s = Session::new(ProtocolVersion::Tls12, 0xC02F);
        s.set_id(&[1; 32]).unwrap();
        s.set_id_context(b"srv").unwrap();
        s.set_time(1_000);
        s.set_timeout(Duration::from_secs(5));
        let s = s.into_handle();
        store.insert(&s);
        clock.advance(Duration::from_secs(6));

        let outcome = store.lookup_entry(&[1; 32], b"srv", ProtocolVersion::Tls12).unwrap();
        assert!(matches!(outcome, LookupOutcome::Expired));
        assert!(!s.is_resumable());

        let outcome = store.lookup_entry(&[1; 32], b"srv", ProtocolVersion::Tls12).unwrap();
        assert!(matches!(outcome, LookupOutcome::Absent));
        assert_eq!(store.stats_snapshot().timeouts, 1);
    }

    #[test]
    fn test_lookup_skips_flagged_entry() {
        let (store, _) = store_at(10, 1_000);
        let s = session(1, b"srv", 1_000);
        store.insert(&s);
        // flagged but not yet unindexed, as during a concurrent remove
        s.mark_not_resumable();
        assert!(store.lookup(&[1; 32], b"srv", ProtocolVersion::Tls12).unwrap().is_none());
        assert!(!store.is_consistent());
        assert!(store.remove(&s));
        assert!(store.is_consistent());
    }

    #[test]
    fn test_keys_follow_recency() {
        let (store, _) = store_at(0, 1_000);
        let a = session(1, b"srv", 1_000);
        let b = session(2, b"srv", 1_000);
        store.insert(&a);
        store.insert(&b);
        assert_eq!(store.keys(), vec![SessionKey::of(&b), SessionKey::of(&a)]);

        store.lookup(&[1; 32], b"srv", ProtocolVersion::Tls12).unwrap();
        assert_eq!(store.keys(), vec![SessionKey::of(&a), SessionKey::of(&b)]);
    }

    #[test]
    fn test_set_hooks_replaces_all() {
        let (store, _) = store_at(1, 1_000);
        let removed = Arc::new(AtomicUsize::new(0));
        let counter = removed.clone();
        store.set_get_session_hook(Some(Arc::new(|_: &[u8]| -> Option<SessionHandle> { None })));
        store.set_hooks(SessionHooks {
            remove_session: Some(Arc::new(move |_: &SessionHandle| {
                counter.fetch_add(1, Ordering::SeqCst);
            })),
            ..SessionHooks::default()
        });
        assert!(store.hooks().get_session.is_none());

        store.insert(&session(1, b"srv", 1_000));
        store.insert(&session(2, b"srv", 1_000));
        assert_eq!(removed.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let (store, _) = store_at(10, 1_000);
        let s = session(1, b"srv", 1_000);
        store.insert(&s);
        assert!(store.remove(&s));
        assert!(!store.remove(&s));
        assert_eq!(s.ref_count(), 1);
        assert!(!store.insert(&s));
        assert!(store.is_empty());
    }

    #[test]
    fn test_remove_leaves_replacement_alone() {
        let (store, _) = store_at(10, 1_000);
        let old = session(1, b"srv", 1_000);
        let new = session(1, b"srv", 1_000);
        store.insert(&old);
        store.insert(&new);
        assert!(!store.remove(&old));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_sweep_expired_in_batches() {
        let clock = Arc::new(ManualClock::new(2_000));
        let store = SessionStore::with_clock(0, clock).with_sweep_batch_size(2);
        for i in 0..5u8 {
            store.insert(&session(i + 1, b"srv", 1_000));
        }
        let fresh = session(9, b"srv", 2_000);
        store.insert(&fresh);

        // default timeout is 304s, so the first five expired at 1_304
        assert_eq!(store.sweep_expired(1_400), 5);
        assert_eq!(store.len(), 1);
        assert!(fresh.is_resumable());
        assert!(store.is_consistent());
    }

    #[test]
    fn test_sweep_with_zero_cutoff_clears() {
        let (store, _) = store_at(0, 1_000);
        for i in 0..4u8 {
            store.insert(&session(i + 1, b"srv", 1_000));
        }
        assert_eq!(store.sweep_expired(0), 4);
        assert!(store.is_empty());
    }

    #[test]
    fn test_evict_excess_zero_evicts_all() {
        let (store, _) = store_at(0, 1_000);
        store.insert(&session(1, b"srv", 1_000));
        store.insert(&session(2, b"srv", 1_000));
        assert_eq!(store.evict_excess(0), 2);
        assert!(store.is_empty());
    }

    #[test]
    fn test_hook_may_reenter_store() {
        let store = Arc::new(SessionStore::new(1));
        let weak = Arc::downgrade(&store);
        store.set_remove_session_hook(Some(Arc::new(move |_: &SessionHandle| {
            if let Some(store) = weak.upgrade() {
                let _ = store.len();
            }
        })));
        let now = store.clock().now();
        store.insert(&session(1, b"srv", now));
        store.insert(&session(2, b"srv", now));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_oversized_lookup_key_is_error() {
        let store = SessionStore::new(1);
        assert!(store.lookup(&[0; 33], b"srv", ProtocolVersion::Tls12).is_err());
        assert!(!store.has_matching_session_id(&[0; 33], b"srv", ProtocolVersion::Tls12));
    }
}
