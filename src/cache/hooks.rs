//! Application callbacks for external session caches.
//!
//! Hooks let an application mirror the in-memory store somewhere else
//! (a shared cache, a database) and feed sessions back in on lookup.
//! They are always invoked after the store lock has been released, so a
//! hook may call back into the store.
//!
//! Any `Fn` closure with the right signature is a hook:
//!
//! ```rust
//! use tls_session_cache::cache::hooks::SessionHooks;
//! use tls_session_cache::core::session::SessionHandle;
//! use std::sync::Arc;
//!
//! let hooks = SessionHooks {
//!     remove_session: Some(Arc::new(|s: &SessionHandle| {
//!         println!("dropped session with {} owners", s.ref_count());
//!     })),
//!     ..SessionHooks::default()
//! };
//! assert!(hooks.remove_session.is_some());
//! ```

use crate::core::session::SessionHandle;
use std::fmt;
use std::sync::Arc;

/// Called when a newly established session becomes cacheable.
///
/// The hook receives its own reference; it may keep it by calling
/// [`SessionHandle::acquire`].
pub trait NewSessionHook: Send + Sync {
    fn on_new_session(&self, session: &SessionHandle);
}

/// Asked for a session the internal store does not hold.
///
/// A returned handle is an owning reference handed to the engine.
pub trait GetSessionHook: Send + Sync {
    fn get_session(&self, session_id: &[u8]) -> Option<SessionHandle>;
}

/// Told that a session left the store.
pub trait RemoveSessionHook: Send + Sync {
    fn on_remove_session(&self, session: &SessionHandle);
}

impl<F> NewSessionHook for F
where
    F: Fn(&SessionHandle) + Send + Sync,
{
    fn on_new_session(&self, session: &SessionHandle) {
        self(session)
    }
}

impl<F> GetSessionHook for F
where
    F: Fn(&[u8]) -> Option<SessionHandle> + Send + Sync,
{
    fn get_session(&self, session_id: &[u8]) -> Option<SessionHandle> {
        self(session_id)
    }
}

impl<F> RemoveSessionHook for F
where
    F: Fn(&SessionHandle) + Send + Sync,
{
    fn on_remove_session(&self, session: &SessionHandle) {
        self(session)
    }
}

/// The set of hooks registered on a store
#[derive(Clone, Default)]
pub struct SessionHooks {
    pub new_session: Option<Arc<dyn NewSessionHook>>,
    pub get_session: Option<Arc<dyn GetSessionHook>>,
    pub remove_session: Option<Arc<dyn RemoveSessionHook>>,
}

impl fmt::Debug for SessionHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionHooks")
            .field("new_session", &self.new_session.is_some())
            .field("get_session", &self.get_session.is_some())
            .field("remove_session", &self.remove_session.is_some())
            .finish()
    }
}
