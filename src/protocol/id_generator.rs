//! Session ID generation.
//!
//! A server picks a fresh session ID for every new session. The default
//! generator draws random bytes from the OS CSPRNG; applications may plug
//! in their own (for example to embed a shard number) through
//! [`SessionIdGenerator`]. Whatever the source, the result is checked
//! against the store so a new session never shadows a live one.

use crate::cache::store::SessionStore;
use crate::core::session::{ProtocolVersion, SessionId, MAX_SESSION_ID_LENGTH};
use crate::error::{Result, SessionError};
use crate::utils::crypto::fill_random;
use tracing::{trace, warn};

/// Number of candidates tried before giving up on a unique id
pub const MAX_SESSION_ID_ATTEMPTS: usize = 10;

/// Produces candidate session ids.
///
/// `generate` writes into `buf` (whose length is the desired id length) and
/// returns how many bytes it used. Returning 0 or more than `buf.len()`
/// breaks the contract and aborts the handshake.
pub trait SessionIdGenerator: Send + Sync {
    fn generate(&self, buf: &mut [u8]) -> Result<usize>;
}

impl<F> SessionIdGenerator for F
where
    F: Fn(&mut [u8]) -> Result<usize> + Send + Sync,
{
    fn generate(&self, buf: &mut [u8]) -> Result<usize> {
        self(buf)
    }
}

/// Fills the whole buffer from the OS CSPRNG
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomIdGenerator;

impl SessionIdGenerator for RandomIdGenerator {
    fn generate(&self, buf: &mut [u8]) -> Result<usize> {
        fill_random(buf)?;
        Ok(buf.len())
    }
}

/// Produce an id of up to `desired_len` bytes that is not indexed in `store`
/// under `(id_context, version)`.
///
/// A candidate colliding with a live entry is discarded and the generator is
/// asked again, at most [`MAX_SESSION_ID_ATTEMPTS`] times. Remaining bytes
/// of a short id are never padded.
pub fn generate_session_id(
    store: &SessionStore,
    generator: &dyn SessionIdGenerator,
    id_context: &[u8],
    version: ProtocolVersion,
    desired_len: usize,
) -> Result<SessionId> {
    if desired_len == 0 || desired_len > MAX_SESSION_ID_LENGTH {
        return Err(SessionError::InvalidLength {
            field: "desired session id",
            len: desired_len,
            max: MAX_SESSION_ID_LENGTH,
        });
    }

    let mut buf = [0u8; MAX_SESSION_ID_LENGTH];
    for attempt in 1..=MAX_SESSION_ID_ATTEMPTS {
        buf.fill(0);
        let candidate = &mut buf[..desired_len];
        let len = generator.generate(candidate)?;
        if len == 0 || len > desired_len {
            warn!(len, desired_len, "Session ID generator broke its length contract");
            return Err(SessionError::IdGeneratorContract {
                len,
                max: desired_len,
            });
        }

        let id = &buf[..len];
        if !store.has_matching_session_id(id, id_context, version) {
            trace!(attempt, id_len = len, "Session ID generated");
            return SessionId::new(id);
        }
        trace!(attempt, "Session ID collided with a live session");
    }

    warn!(
        attempts = MAX_SESSION_ID_ATTEMPTS,
        "Unable to generate a unique session ID"
    );
    Err(SessionError::IdGenerationExhausted {
        attempts: MAX_SESSION_ID_ATTEMPTS,
    })
}
