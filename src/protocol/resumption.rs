//! # Resumption Matcher
//!
//! Decides whether a ClientHello's resumption offer can be honoured.
//!
//! ## Lookup Order
//! 1. **Ticket**: if the peer offered a ticket and a decrypter is
//!    configured, try to recover the session from it
//! 2. **Store**: look the offered session id up in the internal store
//! 3. **External**: ask the application's get-session hook
//!
//! An expired store entry ends the search: it is removed and counted as a
//! timeout, and the get-session hook is not consulted.
//!
//! ## Validation
//! A candidate from any source must then pass, in order:
//! - still resumable (not removed or evicted since it was handed out)
//! - id_context equal to the connection's (compared in constant time)
//! - protocol version equal to the connection's
//! - session id equal to the offered one (store and external sources)
//! - a cipher suite the engine can resolve
//! - not expired
//!
//! Any failure is a miss. Every miss produces the same
//! [`MatchResult::FullHandshake`] tag; the reason only shows up in the local
//! statistics. Errors are reserved for fatal ticket outcomes and malformed
//! offers.

use crate::cache::store::{LookupOutcome, SessionStore};
use crate::core::session::{
    CipherSuite, PeerIdentity, ProtocolVersion, SessionHandle, VerifyResult, MAX_SESSION_ID_LENGTH,
};
use crate::error::{Result, SessionError};
use crate::protocol::ticket::{TicketDecrypter, TicketOutcome};
use crate::utils::crypto::ct_eq;
use tracing::{trace, warn};

/// What a peer offered for resumption
#[derive(Debug, Clone, Copy)]
pub struct ResumptionOffer<'a> {
    /// Legacy session id from the ClientHello, possibly empty
    pub session_id: &'a [u8],
    /// Session ticket extension contents; `None` when the extension is absent
    pub ticket: Option<&'a [u8]>,
    /// Version negotiated for this connection
    pub protocol_version: ProtocolVersion,
}

impl<'a> ResumptionOffer<'a> {
    /// Offer carrying only a session id
    pub fn by_id(session_id: &'a [u8], protocol_version: ProtocolVersion) -> Self {
        Self {
            session_id,
            ticket: None,
            protocol_version,
        }
    }

    /// Offer carrying a ticket and the session id sent alongside it
    pub fn by_ticket(ticket: &'a [u8], session_id: &'a [u8], protocol_version: ProtocolVersion) -> Self {
        Self {
            session_id,
            ticket: Some(ticket),
            protocol_version,
        }
    }
}

/// Where a resumed session came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionSource {
    Store,
    External,
    Ticket,
}

/// A successful match
#[derive(Debug)]
pub struct Resumed {
    session: SessionHandle,
    cipher: &'static CipherSuite,
    source: SessionSource,
    issue_new_ticket: bool,
}

impl Resumed {
    /// The session to resume; the caller owns this reference
    pub fn session(&self) -> &SessionHandle {
        &self.session
    }

    /// Consume the match, keeping the session reference
    pub fn into_session(self) -> SessionHandle {
        self.session
    }

    pub fn cipher(&self) -> &'static CipherSuite {
        self.cipher
    }

    pub fn protocol_version(&self) -> ProtocolVersion {
        self.session.protocol_version()
    }

    pub fn peer(&self) -> Option<&PeerIdentity> {
        self.session.peer()
    }

    pub fn verify_result(&self) -> VerifyResult {
        self.session.verify_result()
    }

    pub fn source(&self) -> SessionSource {
        self.source
    }

    /// Whether the server should send the peer a fresh ticket
    pub fn issue_new_ticket(&self) -> bool {
        self.issue_new_ticket
    }
}

/// Outcome of matching an offer
#[derive(Debug)]
pub enum MatchResult {
    /// Resume the contained session with an abbreviated handshake
    Resumed(Resumed),
    /// Run a full handshake
    FullHandshake {
        /// Whether the server should send the peer a fresh ticket
        issue_new_ticket: bool,
    },
}

impl MatchResult {
    pub fn is_resumed(&self) -> bool {
        matches!(self, MatchResult::Resumed(_))
    }

    pub fn resumed(&self) -> Option<&Resumed> {
        match self {
            MatchResult::Resumed(r) => Some(r),
            MatchResult::FullHandshake { .. } => None,
        }
    }

    pub fn issue_new_ticket(&self) -> bool {
        match self {
            MatchResult::Resumed(r) => r.issue_new_ticket,
            MatchResult::FullHandshake { issue_new_ticket } => *issue_new_ticket,
        }
    }
}

enum IdLookup {
    Found(SessionHandle, SessionSource),
    Expired,
    Absent,
}

/// Matches resumption offers for one connection context
pub struct ResumptionMatcher<'a> {
    store: &'a SessionStore,
    ticket_decrypter: Option<&'a dyn TicketDecrypter>,
    id_context: &'a [u8],
    lookup_internal: bool,
    store_external: bool,
}

impl<'a> ResumptionMatcher<'a> {
    /// Matcher consulting `store` for sessions created under `id_context`
    pub fn new(store: &'a SessionStore, id_context: &'a [u8]) -> Self {
        Self {
            store,
            ticket_decrypter: None,
            id_context,
            lookup_internal: true,
            store_external: true,
        }
    }

    pub fn with_ticket_decrypter(mut self, decrypter: Option<&'a dyn TicketDecrypter>) -> Self {
        self.ticket_decrypter = decrypter;
        self
    }

    /// Whether to consult the internal store before the get-session hook
    pub fn lookup_internal(mut self, enabled: bool) -> Self {
        self.lookup_internal = enabled;
        self
    }

    /// Whether sessions supplied by the get-session hook are inserted into
    /// the internal store
    pub fn store_external(mut self, enabled: bool) -> Self {
        self.store_external = enabled;
        self
    }

    /// Evaluate `offer`.
    ///
    /// Returns an error only for a fatal ticket outcome, which must abort
    /// the handshake, or for an offered id longer than 32 bytes.
    pub fn match_offer(&self, offer: &ResumptionOffer<'_>) -> Result<MatchResult> {
        if offer.session_id.len() > MAX_SESSION_ID_LENGTH {
            return Err(SessionError::InvalidLength {
                field: "offered session id",
                len: offer.session_id.len(),
                max: MAX_SESSION_ID_LENGTH,
            });
        }

        let stats = self.store.stats();
        let mut issue_ticket = false;
        let mut candidate: Option<(SessionHandle, SessionSource)> = None;

        match self.decrypt_ticket(offer) {
            TicketOutcome::Absent | TicketOutcome::NotAttempted => {}
            TicketOutcome::Empty | TicketOutcome::CannotDecrypt => issue_ticket = true,
            TicketOutcome::Fatal(alert) => {
                warn!(%alert, "Fatal session ticket outcome");
                return Err(SessionError::TicketFatal { alert });
            }
            TicketOutcome::Decrypted(mut session) => {
                stats.record_ticket_decrypted();
                session.set_id(offer.session_id)?;
                candidate = Some((session.into_handle(), SessionSource::Ticket));
            }
        }

        if candidate.is_none() && !offer.session_id.is_empty() {
            match self.lookup_by_id(offer)? {
                IdLookup::Found(session, source) => candidate = Some((session, source)),
                IdLookup::Expired => {
                    trace!("Stored session expired, full handshake");
                    return Ok(MatchResult::FullHandshake {
                        issue_new_ticket: issue_ticket,
                    })
                }
                IdLookup::Absent => {}
            }
        }

        let Some((session, source)) = candidate else {
            trace!(ticket_offered = offer.ticket.is_some(), "No session to resume");
            stats.record_miss();
            return Ok(MatchResult::FullHandshake {
                issue_new_ticket: issue_ticket,
            });
        };

        match self.validate(&session, source, offer) {
            Some(cipher) => {
                stats.record_hit();
                trace!(?source, "Session resumed");
                Ok(MatchResult::Resumed(Resumed {
                    session,
                    cipher,
                    source,
                    issue_new_ticket: issue_ticket || source == SessionSource::Ticket,
                }))
            }
            None => Ok(MatchResult::FullHandshake {
                issue_new_ticket: issue_ticket || source == SessionSource::Ticket,
            }),
        }
    }

    fn decrypt_ticket(&self, offer: &ResumptionOffer<'_>) -> TicketOutcome {
        match (offer.ticket, self.ticket_decrypter) {
            (None, _) => TicketOutcome::Absent,
            (Some(_), None) => TicketOutcome::NotAttempted,
            (Some(ticket), Some(decrypter)) => decrypter.decrypt(ticket, offer.session_id),
        }
    }

    fn lookup_by_id(&self, offer: &ResumptionOffer<'_>) -> Result<IdLookup> {
        if self.lookup_internal {
            match self
                .store
                .lookup_entry(offer.session_id, self.id_context, offer.protocol_version)?
            {
                LookupOutcome::Hit(session) => return Ok(IdLookup::Found(session, SessionSource::Store)),
                // already counted as a timeout by the store
                LookupOutcome::Expired => return Ok(IdLookup::Expired),
                LookupOutcome::Absent => {}
            }
        }

        // the store lock is not held here, so the hook may re-enter the store
        let Some(hook) = self.store.hooks().get_session else {
            return Ok(IdLookup::Absent);
        };
        let Some(session) = hook.get_session(offer.session_id) else {
            return Ok(IdLookup::Absent);
        };

        self.store.stats().record_cb_hit();
        if self.store_external {
            self.store.insert(&session);
        }
        Ok(IdLookup::Found(session, SessionSource::External))
    }

    fn validate(
        &self,
        session: &SessionHandle,
        source: SessionSource,
        offer: &ResumptionOffer<'_>,
    ) -> Option<&'static CipherSuite> {
        let stats = self.store.stats();

        if !session.is_resumable() {
            trace!(?source, "Session is no longer resumable");
            return None;
        }

        if !ct_eq(session.id_context().as_bytes(), self.id_context) {
            trace!("Session id_context mismatch");
            stats.record_context_mismatch();
            return None;
        }

        if session.protocol_version() != offer.protocol_version {
            trace!("Session protocol version mismatch");
            return None;
        }

        if source != SessionSource::Ticket && session.id().as_bytes() != offer.session_id {
            trace!("Session id does not match the offer");
            return None;
        }

        let Some(cipher) = session.cipher() else {
            trace!(cipher_id = session.cipher_id(), "Session cipher is unknown");
            return None;
        };

        if session.is_expired_at(self.store.clock().now()) {
            trace!("Session expired");
            stats.record_timeout();
            if source != SessionSource::Ticket {
                self.store.remove(session);
            }
            return None;
        }

        Some(cipher)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::session::Session;
    use crate::protocol::ticket::TicketKeys;
    use crate::utils::time::ManualClock;
    use std::sync::Arc;
    use std::time::Duration;

    const NOW: u64 = 10_000;

    fn store() -> (SessionStore, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(NOW));
        (SessionStore::with_clock(0, clock.clone()), clock)
    }

    fn session(id: &[u8], ctx: &[u8]) -> Session {
        let mut s = Session::new(ProtocolVersion::Tls12, 0xC02F);
        s.set_id(id).unwrap();
        s.set_id_context(ctx).unwrap();
        s.set_master_secret(&[0x5A; 48]).unwrap();
        s.set_time(NOW);
        s
    }

    #[test]
    fn test_store_hit() {
        let (store, _) = store();
        let s = session(&[1; 32], b"srv").into_handle();
        store.insert(&s);

        let matcher = ResumptionMatcher::new(&store, b"srv");
        let result = matcher
            .match_offer(&ResumptionOffer::by_id(&[1; 32], ProtocolVersion::Tls12))
            .unwrap();
        let resumed = result.resumed().unwrap();
        assert!(resumed.session().ptr_eq(&s));
        assert_eq!(resumed.source(), SessionSource::Store);
        assert_eq!(resumed.cipher().id, 0xC02F);
        assert!(!resumed.issue_new_ticket());
        assert_eq!(store.stats_snapshot().hits, 1);
    }

    #[test]
    fn test_empty_id_without_ticket_is_miss() {
        let (store, _) = store();
        let matcher = ResumptionMatcher::new(&store, b"srv");
        let result = matcher
            .match_offer(&ResumptionOffer::by_id(&[], ProtocolVersion::Tls12))
            .unwrap();
        assert!(matches!(result, MatchResult::FullHandshake { issue_new_ticket: false }));
        assert_eq!(store.stats_snapshot().misses, 1);
    }

    #[test]
    fn test_version_mismatch_is_miss() {
        let (store, _) = store();
        let s = session(&[1; 32], b"srv").into_handle();
        store.insert(&s);
        // the store key includes the version, so a TLS 1.3 offer never finds it
        let matcher = ResumptionMatcher::new(&store, b"srv");
        let result = matcher
            .match_offer(&ResumptionOffer::by_id(&[1; 32], ProtocolVersion::Tls13))
            .unwrap();
        assert!(!result.is_resumed());
    }

    #[test]
    fn test_unknown_cipher_is_miss() {
        let (store, _) = store();
        let mut s = session(&[1; 32], b"srv");
        s = {
            let mut record = crate::core::serialization::SessionRecord::from_session(&s);
            record.cipher_id = 0xFFFF;
            record.to_session().unwrap()
        };
        store.insert(&s.into_handle());

        let matcher = ResumptionMatcher::new(&store, b"srv");
        let result = matcher
            .match_offer(&ResumptionOffer::by_id(&[1; 32], ProtocolVersion::Tls12))
            .unwrap();
        assert!(!result.is_resumed());
    }

    #[test]
    fn test_ticket_hit_takes_offered_id() {
        let (store, _) = store();
        let keys = TicketKeys::new([7; 16], &[9; 32]);
        let ticket = keys.seal(&session(&[], b"srv")).unwrap();

        let matcher = ResumptionMatcher::new(&store, b"srv").with_ticket_decrypter(Some(&keys));
        let result = matcher
            .match_offer(&ResumptionOffer::by_ticket(&ticket, &[0xEE; 16], ProtocolVersion::Tls12))
            .unwrap();
        let resumed = result.resumed().unwrap();
        assert_eq!(resumed.source(), SessionSource::Ticket);
        assert!(resumed.issue_new_ticket());
        assert_eq!(resumed.session().id().as_bytes(), &[0xEE; 16]);
        assert!(store.is_empty());
        assert_eq!(store.stats_snapshot().tickets_decrypted, 1);
    }

    #[test]
    fn test_undecryptable_ticket_falls_back_to_id() {
        let (store, _) = store();
        let s = session(&[1; 32], b"srv").into_handle();
        store.insert(&s);
        let keys = TicketKeys::new([7; 16], &[9; 32]);

        let matcher = ResumptionMatcher::new(&store, b"srv").with_ticket_decrypter(Some(&keys));
        let garbage = [0u8; 64];
        let result = matcher
            .match_offer(&ResumptionOffer::by_ticket(&garbage, &[1; 32], ProtocolVersion::Tls12))
            .unwrap();
        let resumed = result.resumed().unwrap();
        assert_eq!(resumed.source(), SessionSource::Store);
        assert!(resumed.issue_new_ticket());

        let result = matcher
            .match_offer(&ResumptionOffer::by_ticket(&garbage, &[2; 32], ProtocolVersion::Tls12))
            .unwrap();
        assert!(matches!(result, MatchResult::FullHandshake { issue_new_ticket: true }));
    }

    #[test]
    fn test_fatal_ticket_is_error() {
        let (store, _) = store();
        let fatal = |_: &[u8], _: &[u8]| TicketOutcome::Fatal(crate::error::AlertDescription::InternalError);
        let matcher = ResumptionMatcher::new(&store, b"srv").with_ticket_decrypter(Some(&fatal));
        let err = matcher
            .match_offer(&ResumptionOffer::by_ticket(&[1, 2, 3], &[], ProtocolVersion::Tls12))
            .unwrap_err();
        assert!(err.is_fatal());
        assert_eq!(err.alert(), Some(crate::error::AlertDescription::InternalError));
    }

    #[test]
    fn test_expired_ticket_requests_new_ticket() {
        let (store, clock) = store();
        let keys = TicketKeys::new([7; 16], &[9; 32]);
        let mut s = session(&[], b"srv");
        s.set_timeout(Duration::from_secs(5));
        let ticket = keys.seal(&s).unwrap();
        clock.advance(Duration::from_secs(6));

        let matcher = ResumptionMatcher::new(&store, b"srv").with_ticket_decrypter(Some(&keys));
        let result = matcher
            .match_offer(&ResumptionOffer::by_ticket(&ticket, &[], ProtocolVersion::Tls12))
            .unwrap();
        assert!(matches!(result, MatchResult::FullHandshake { issue_new_ticket: true }));
        assert_eq!(store.stats_snapshot().timeouts, 1);
    }

    #[test]
    fn test_external_hook_supplies_session() {
        let (store, _) = store();
        let external = session(&[4; 32], b"srv").into_handle();
        let supplied = external.acquire();
        store.set_get_session_hook(Some(Arc::new(move |id: &[u8]| {
            (id == [4u8; 32].as_slice()).then(|| supplied.acquire())
        })));

        let matcher = ResumptionMatcher::new(&store, b"srv");
        let result = matcher
            .match_offer(&ResumptionOffer::by_id(&[4; 32], ProtocolVersion::Tls12))
            .unwrap();
        assert_eq!(result.resumed().unwrap().source(), SessionSource::External);
        assert_eq!(store.len(), 1);
        assert_eq!(store.stats_snapshot().cb_hits, 1);

        // the second offer is served by the internal store
        let result = matcher
            .match_offer(&ResumptionOffer::by_id(&[4; 32], ProtocolVersion::Tls12))
            .unwrap();
        assert_eq!(result.resumed().unwrap().source(), SessionSource::Store);
    }

    #[test]
    fn test_external_session_not_stored_when_disabled() {
        let (store, _) = store();
        let external = session(&[4; 32], b"srv").into_handle();
        store.set_get_session_hook(Some(Arc::new(move |_: &[u8]| Some(external.acquire()))));

        let matcher = ResumptionMatcher::new(&store, b"srv")
            .lookup_internal(false)
            .store_external(false);
        assert!(matcher
            .match_offer(&ResumptionOffer::by_id(&[4; 32], ProtocolVersion::Tls12))
            .unwrap()
            .is_resumed());
        assert!(store.is_empty());
    }

    #[test]
    fn test_external_session_with_wrong_context_is_rejected() {
        let (store, _) = store();
        let external = session(&[4; 32], b"other").into_handle();
        store.set_get_session_hook(Some(Arc::new(move |_: &[u8]| Some(external.acquire()))));

        let matcher = ResumptionMatcher::new(&store, b"srv").store_external(false);
        let result = matcher
            .match_offer(&ResumptionOffer::by_id(&[4; 32], ProtocolVersion::Tls12))
            .unwrap();
        assert!(!result.is_resumed());
        assert_eq!(store.stats_snapshot().context_mismatches, 1);
        assert_eq!(store.stats_snapshot().misses, 0);
    }

    #[test]
    fn test_removed_session_from_hook_is_not_resumed() {
        let (store, _) = store();
        let s = session(&[4; 32], b"srv").into_handle();
        store.insert(&s);
        store.remove(&s);
        let supplied = s.acquire();
        store.set_get_session_hook(Some(Arc::new(move |_: &[u8]| Some(supplied.acquire()))));

        let matcher = ResumptionMatcher::new(&store, b"srv");
        let result = matcher
            .match_offer(&ResumptionOffer::by_id(&[4; 32], ProtocolVersion::Tls12))
            .unwrap();
        assert!(!result.is_resumed());
        assert!(store.is_empty());
        assert_eq!(store.stats_snapshot().hits, 0);
    }

    #[test]
    fn test_expired_store_entry_skips_hook() {
        let (store, clock) = store();
        let mut s = session(&[1; 32], b"srv");
        s.set_timeout(Duration::from_secs(5));
        store.insert(&s.into_handle());
        clock.advance(Duration::from_secs(6));

        let calls = Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let counter = calls.clone();
        store.set_get_session_hook(Some(Arc::new(move |_: &[u8]| -> Option<SessionHandle> {
            counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            None
        })));

        let matcher = ResumptionMatcher::new(&store, b"srv");
        let result = matcher
            .match_offer(&ResumptionOffer::by_id(&[1; 32], ProtocolVersion::Tls12))
            .unwrap();
        assert!(matches!(result, MatchResult::FullHandshake { issue_new_ticket: false }));
        assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 0);
        let stats = store.stats_snapshot();
        assert_eq!(stats.timeouts, 1);
        assert_eq!(stats.misses, 0);
        assert!(store.is_empty());
    }

    #[test]
    fn test_oversized_offer_is_error() {
        let (store, _) = store();
        let matcher = ResumptionMatcher::new(&store, b"srv");
        assert!(matcher
            .match_offer(&ResumptionOffer::by_id(&[0; 33], ProtocolVersion::Tls12))
            .is_err());
    }
}
