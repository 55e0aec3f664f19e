//! # Session Context
//!
//! Per-application entry point to the engine. A [`SessionContext`] owns the
//! session store, the configuration knobs and the pluggable pieces (clock,
//! id generator, ticket decrypter) for every connection it serves.
//!
//! ## Handshake Integration
//! - At ClientHello: [`SessionContext::on_resumption_offered`] decides between
//!   an abbreviated and a full handshake
//! - For a full handshake: [`SessionContext::new_session`] creates the session
//!   object with a fresh id (or an empty one when a ticket will be issued)
//! - Once the handshake completes: [`SessionContext::on_session_established`]
//!   caches the session and fires the new-session hook
//!
//! ## Usage
//! ```rust
//! use tls_session_cache::context::{Role, SessionContext};
//! use tls_session_cache::core::session::ProtocolVersion;
//! use tls_session_cache::protocol::resumption::ResumptionOffer;
//!
//! let ctx = SessionContext::builder(Role::Server)
//!     .id_context(b"mail-frontend")
//!     .build()
//!     .unwrap();
//!
//! let mut session = ctx.new_session(ProtocolVersion::Tls12, 0xC02F, false).unwrap();
//! session.set_master_secret(&[0x11; 48]).unwrap();
//! let session = session.into_handle();
//! ctx.on_session_established(&session);
//!
//! let offer = ResumptionOffer::by_id(session.id().as_bytes(), ProtocolVersion::Tls12);
//! assert!(ctx.on_resumption_offered(&offer).unwrap().is_resumed());
//! ```

use crate::cache::hooks::{GetSessionHook, NewSessionHook, RemoveSessionHook};
use crate::cache::store::SessionStore;
use crate::config::{CacheConfig, CacheMode};
use crate::core::session::{ProtocolVersion, Session, SessionHandle, SessionIdContext};
use crate::error::Result;
use crate::protocol::id_generator::{generate_session_id, RandomIdGenerator, SessionIdGenerator};
use crate::protocol::resumption::{MatchResult, ResumptionMatcher, ResumptionOffer};
use crate::protocol::ticket::TicketDecrypter;
use crate::utils::metrics::CacheStatsSnapshot;
use crate::utils::time::{Clock, SystemClock};
use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, trace};

/// An automatic flush runs whenever the low bits of the completed-handshake
/// counter selected by this mask are all set: after 255, 511, 767, ...
pub const AUTO_FLUSH_MASK: u64 = 0xff;

/// Which end of the connection a context serves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Client,
    Server,
}

/// Builder for [`SessionContext`]
pub struct SessionContextBuilder {
    role: Role,
    config: CacheConfig,
    id_context: Vec<u8>,
    clock: Arc<dyn Clock>,
    id_generator: Arc<dyn SessionIdGenerator>,
    ticket_decrypter: Option<Arc<dyn TicketDecrypter>>,
}

impl SessionContextBuilder {
    pub fn config(mut self, config: CacheConfig) -> Self {
        self.config = config;
        self
    }

    /// Application context new sessions are tagged with and offers must match
    pub fn id_context(mut self, id_context: &[u8]) -> Self {
        self.id_context = id_context.to_vec();
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn id_generator(mut self, generator: Arc<dyn SessionIdGenerator>) -> Self {
        self.id_generator = generator;
        self
    }

    pub fn ticket_decrypter(mut self, decrypter: Arc<dyn TicketDecrypter>) -> Self {
        self.ticket_decrypter = Some(decrypter);
        self
    }

    /// Build the context; fails if the id context is longer than 32 bytes
    pub fn build(self) -> Result<SessionContext> {
        let id_context = SessionIdContext::new(&self.id_context)?;
        let store = SessionStore::with_clock(self.config.capacity, self.clock.clone())
            .with_sweep_batch_size(self.config.sweep_batch_size);

        debug!(
            role = ?self.role,
            capacity = self.config.capacity,
            mode = ?self.config.mode,
            "Session context created"
        );

        Ok(SessionContext {
            role: self.role,
            id_context,
            store: Arc::new(store),
            config: RwLock::new(self.config),
            clock: self.clock,
            id_generator: self.id_generator,
            ticket_decrypter: self.ticket_decrypter,
        })
    }
}

/// Session cache state shared by all connections of one application
pub struct SessionContext {
    role: Role,
    id_context: SessionIdContext,
    store: Arc<SessionStore>,
    config: RwLock<CacheConfig>,
    clock: Arc<dyn Clock>,
    id_generator: Arc<dyn SessionIdGenerator>,
    ticket_decrypter: Option<Arc<dyn TicketDecrypter>>,
}

impl SessionContext {
    /// Start building a context with default configuration, the system
    /// clock and the random id generator
    pub fn builder(role: Role) -> SessionContextBuilder {
        SessionContextBuilder {
            role,
            config: CacheConfig::default(),
            id_context: Vec::new(),
            clock: Arc::new(SystemClock),
            id_generator: Arc::new(RandomIdGenerator),
            ticket_decrypter: None,
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn id_context(&self) -> &SessionIdContext {
        &self.id_context
    }

    /// The underlying store, for sweeping or direct inspection
    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    /// Snapshot of the cache configuration
    pub fn config(&self) -> CacheConfig {
        self.config.read().clone()
    }

    /// Set the cache size bound; 0 means unbounded. Returns the previous bound.
    pub fn set_cache_capacity(&self, capacity: usize) -> usize {
        self.config.write().capacity = capacity;
        self.store.set_capacity(capacity)
    }

    pub fn cache_capacity(&self) -> usize {
        self.store.capacity()
    }

    /// Set the lifetime of sessions created from now on. Returns the
    /// previous value.
    pub fn set_default_timeout(&self, timeout: Duration) -> Duration {
        std::mem::replace(&mut self.config.write().default_timeout, timeout)
    }

    pub fn default_timeout(&self) -> Duration {
        self.config.read().default_timeout
    }

    /// Change which roles are cached. Returns the previous mode.
    pub fn set_cache_mode(&self, mode: CacheMode) -> CacheMode {
        std::mem::replace(&mut self.config.write().mode, mode)
    }

    pub fn cache_mode(&self) -> CacheMode {
        self.config.read().mode
    }

    /// Remove every session that expired before `cutoff`; 0 clears the store
    pub fn flush(&self, cutoff: u64) -> usize {
        self.store.sweep_expired(cutoff)
    }

    pub fn register_new_session_hook(&self, hook: Arc<dyn NewSessionHook>) {
        self.store.set_new_session_hook(Some(hook));
    }

    pub fn register_get_session_hook(&self, hook: Arc<dyn GetSessionHook>) {
        self.store.set_get_session_hook(Some(hook));
    }

    pub fn register_remove_session_hook(&self, hook: Arc<dyn RemoveSessionHook>) {
        self.store.set_remove_session_hook(Some(hook));
    }

    pub fn stats(&self) -> CacheStatsSnapshot {
        self.store.stats_snapshot()
    }

    /// Log the current statistics at info level
    pub fn log_stats(&self) {
        self.store.stats().log_metrics(self.store.len());
    }

    /// Create the session object for a full handshake.
    ///
    /// The session is stamped with the current time, the default timeout
    /// and this context's id_context. It gets an empty id when a ticket will
    /// be issued instead, or when a server context does not cache server
    /// sessions; otherwise the id comes from the configured generator.
    pub fn new_session(
        &self,
        version: ProtocolVersion,
        cipher_id: u16,
        ticket_expected: bool,
    ) -> Result<Session> {
        let config = self.config();
        let mut session = Session::new(version, cipher_id);
        session.set_time(self.clock.now());
        session.set_timeout(config.default_timeout);
        session.set_id_context(self.id_context.as_bytes())?;

        let server_uncached = self.role == Role::Server && !config.mode.covers(Role::Server);
        if ticket_expected || server_uncached {
            trace!(ticket_expected, "New session without a session id");
            return Ok(session);
        }

        let id = generate_session_id(
            &self.store,
            self.id_generator.as_ref(),
            self.id_context.as_bytes(),
            version,
            config.session_id_length,
        )?;
        session.set_id(id.as_bytes())?;
        Ok(session)
    }

    /// Report a completed full handshake.
    ///
    /// Every call counts toward `accept_good` or `connect_good`; sessions
    /// without an id are otherwise ignored. When the cache mode covers this
    /// context's role the session is inserted (unless internal storage is
    /// disabled) and handed to the new-session hook. Expired entries are
    /// flushed whenever the counter reaches 255 modulo 256, unless auto
    /// clear is disabled.
    pub fn on_session_established(&self, session: &SessionHandle) {
        let stats = self.store.stats();
        let completed = match self.role {
            Role::Server => stats.record_accept_good(),
            Role::Client => stats.record_connect_good(),
        };

        if session.id().is_empty() {
            return;
        }

        let config = self.config();
        if !config.mode.covers(self.role) {
            return;
        }

        if !config.no_internal_store {
            self.store.insert(session);
        }

        let hook = self.store.hooks().new_session;
        if let Some(hook) = hook {
            hook.on_new_session(session);
        }

        if !config.no_auto_clear && completed & AUTO_FLUSH_MASK == AUTO_FLUSH_MASK {
            let now = self.clock.now();
            let removed = self.flush(now);
            debug!(completed, removed_count = removed, "Automatic session flush");
        }
    }

    /// Decide whether a peer's resumption offer can be honoured
    pub fn on_resumption_offered(&self, offer: &ResumptionOffer<'_>) -> Result<MatchResult> {
        self.store.stats().record_accept();
        let config = self.config();

        ResumptionMatcher::new(&self.store, self.id_context.as_bytes())
            .with_ticket_decrypter(self.ticket_decrypter.as_deref())
            .lookup_internal(!config.no_internal_lookup)
            .store_external(!config.no_internal_store)
            .match_offer(offer)
    }
}

impl std::fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionContext")
            .field("role", &self.role)
            .field("id_context", &self.id_context)
            .field("store", &self.store)
            .field("config", &*self.config.read())
            .field("has_ticket_decrypter", &self.ticket_decrypter.is_some())
            .finish_non_exhaustive()
    }
}
