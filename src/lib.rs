//! # TLS Session Cache
//!
//! Session caching and resumption engine for TLS servers and clients.
//!
//! A full TLS handshake is expensive. When a peer reconnects it may offer a
//! session id or a session ticket from an earlier connection; if the server
//! still trusts that session both sides skip the key exchange and
//! certificate verification. This crate holds those sessions and decides
//! when an offer may be honoured.
//!
//! ## Features
//! - **Session objects**: reference counted, secrets zeroized on release
//! - **Session store**: `(id, id_context, version)` index with LRU eviction
//!   under a single reader/writer lock
//! - **ID generation**: pluggable generator with collision retries
//! - **Resumption matching**: tickets, internal store and external hooks,
//!   with constant-time context checks
//! - **Expiry**: on-demand flushes, auto-flush and a periodic tokio sweeper
//! - **Observability**: `tracing` logs and per-store statistics
//!
//! ## Modules
//! - [`context`]: per-application entry point
//! - [`core`]: session objects and serialization
//! - [`cache`]: the store, hooks and sweeper
//! - [`protocol`]: id generation, tickets and the matcher
//! - [`config`]: TOML/env configuration
//! - [`utils`]: crypto, logging, metrics, time
//!
//! ## Example
//! ```rust
//! use tls_session_cache::{ProtocolVersion, ResumptionOffer, Role, SessionContext};
//!
//! let ctx = SessionContext::builder(Role::Server).id_context(b"srv").build().unwrap();
//! let session = ctx
//!     .new_session(ProtocolVersion::Tls13, 0x1301, false)
//!     .unwrap()
//!     .into_handle();
//! ctx.on_session_established(&session);
//!
//! let offer = ResumptionOffer::by_id(session.id().as_bytes(), ProtocolVersion::Tls13);
//! assert!(ctx.on_resumption_offered(&offer).unwrap().is_resumed());
//! ```

#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

pub mod cache;
pub mod config;
pub mod context;
pub mod core;
pub mod error;
pub mod protocol;
pub mod utils;

pub use cache::{SessionHooks, SessionStore};
pub use config::{CacheConfig, CacheMode, LoggingConfig, SessionCacheConfig};
pub use context::{Role, SessionContext};
pub use crate::core::session::{ProtocolVersion, Session, SessionHandle, VerifyResult};
pub use error::{Result, SessionError};
pub use protocol::{MatchResult, ResumptionOffer, TicketKeys};
