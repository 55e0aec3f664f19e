//! # Session Cache
//!
//! Server-side storage for resumable sessions.
//!
//! ## Components
//! - **Store**: recency-ordered `lru::LruCache` keyed by session id,
//!   id_context and version, under one lock
//! - **Hooks**: callbacks for external session caches
//! - **Sweeper**: periodic tokio task reclaiming expired sessions

pub mod hooks;
pub mod store;
pub mod sweeper;

pub use hooks::{GetSessionHook, NewSessionHook, RemoveSessionHook, SessionHooks};
pub use store::{LookupOutcome, SessionKey, SessionStore};
pub use sweeper::{spawn_sweeper, SweeperHandle};
