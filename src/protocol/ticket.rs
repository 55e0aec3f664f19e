//! # Session Tickets
//!
//! Boundary between the resumption matcher and whatever protects ticket
//! contents. The matcher only consumes a [`TicketDecrypter`] and its
//! [`TicketOutcome`]; [`TicketKeys`] is a ready-made implementation.
//!
//! ## Ticket Format
//! ```text
//! [KeyName(16)] [Nonce(12)] [ChaCha20-Poly1305(SessionRecord) + Tag(16)]
//! ```
//! The key name doubles as associated data, so a ticket cannot be replayed
//! under a different key name.
//!
//! ## Outcomes
//! - **Absent / NotAttempted**: fall through to ID-based lookup
//! - **Empty / CannotDecrypt**: fall through and ask for a new ticket
//! - **Decrypted**: candidate session, still subject to the matcher's checks
//! - **Fatal**: abort the handshake with the given alert

use crate::core::serialization::{serialize_session, SerializationFormat};
use crate::core::session::Session;
use crate::error::{AlertDescription, Result};
use crate::utils::crypto::{fill_random, Crypto, KEY_LEN, NONCE_LEN, TAG_LEN};
use tracing::{debug, warn};
use zeroize::Zeroizing;

/// Length of the key name prefix of a ticket
pub const KEY_NAME_LEN: usize = 16;

/// Result of trying to recover a session from a ticket
#[derive(Debug)]
pub enum TicketOutcome {
    /// The peer did not offer a ticket
    Absent,
    /// Ticket processing is not applicable to this handshake
    NotAttempted,
    /// The peer sent the extension without a ticket
    Empty,
    /// The ticket could not be decrypted (unknown key, bad tag)
    CannotDecrypt,
    /// The ticket held this session
    Decrypted(Session),
    /// Ticket processing failed in a way that must abort the handshake
    Fatal(AlertDescription),
}

/// Turns ticket bytes into a candidate session.
///
/// `offered_id` is the session id the peer sent alongside the ticket; a
/// decrypted session is given that id by the matcher.
pub trait TicketDecrypter: Send + Sync {
    fn decrypt(&self, ticket: &[u8], offered_id: &[u8]) -> TicketOutcome;
}

impl<F> TicketDecrypter for F
where
    F: Fn(&[u8], &[u8]) -> TicketOutcome + Send + Sync,
{
    fn decrypt(&self, ticket: &[u8], offered_id: &[u8]) -> TicketOutcome {
        self(ticket, offered_id)
    }
}

/// A named ChaCha20-Poly1305 ticket key
pub struct TicketKeys {
    name: [u8; KEY_NAME_LEN],
    crypto: Crypto,
}

impl TicketKeys {
    /// Build ticket keys from a key name and a 32-byte key
    pub fn new(name: [u8; KEY_NAME_LEN], key: &[u8; KEY_LEN]) -> Self {
        Self {
            name,
            crypto: Crypto::new(key),
        }
    }

    /// Generate a random key name and key
    pub fn generate() -> Result<Self> {
        let mut name = [0u8; KEY_NAME_LEN];
        fill_random(&mut name)?;
        let mut key = Zeroizing::new([0u8; KEY_LEN]);
        fill_random(&mut *key)?;
        Ok(Self::new(name, &key))
    }

    pub fn name(&self) -> &[u8; KEY_NAME_LEN] {
        &self.name
    }

    /// Encrypt a session into a ticket.
    ///
    /// The session id is carried but ignored on the way back in: the
    /// matcher overwrites it with the id the peer offers.
    pub fn seal(&self, session: &Session) -> Result<Vec<u8>> {
        let plaintext = Zeroizing::new(serialize_session(session, SerializationFormat::Bincode)?);
        let (nonce, ciphertext) = self.crypto.encrypt(&plaintext, &self.name)?;

        let mut ticket = Vec::with_capacity(KEY_NAME_LEN + NONCE_LEN + ciphertext.len());
        ticket.extend_from_slice(&self.name);
        ticket.extend_from_slice(&nonce);
        ticket.extend_from_slice(&ciphertext);
        debug!(ticket_len = ticket.len(), "Session ticket sealed");
        Ok(ticket)
    }
}

impl TicketDecrypter for TicketKeys {
    fn decrypt(&self, ticket: &[u8], _offered_id: &[u8]) -> TicketOutcome {
        if ticket.is_empty() {
            return TicketOutcome::Empty;
        }
        if ticket.len() < KEY_NAME_LEN + NONCE_LEN + TAG_LEN {
            return TicketOutcome::CannotDecrypt;
        }

        let (name, rest) = ticket.split_at(KEY_NAME_LEN);
        if name != self.name.as_slice() {
            return TicketOutcome::CannotDecrypt;
        }
        let (nonce, ciphertext) = rest.split_at(NONCE_LEN);

        let Some(plaintext) = self.crypto.decrypt(nonce, ciphertext, &self.name) else {
            return TicketOutcome::CannotDecrypt;
        };

        match Session::from_bytes(&plaintext) {
            Ok(session) => TicketOutcome::Decrypted(session),
            Err(e) => {
                warn!(error = %e, "Authenticated ticket did not decode");
                TicketOutcome::Fatal(AlertDescription::DecodeError)
            }
        }
    }
}

impl std::fmt::Debug for TicketKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TicketKeys").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::session::ProtocolVersion;

    fn keys() -> TicketKeys {
        TicketKeys::new(*b"ticket-key-name!", &[0x42; KEY_LEN])
    }

    fn session() -> Session {
        let mut s = Session::new(ProtocolVersion::Tls12, 0xC02F);
        s.set_id_context(b"srv").unwrap();
        s.set_master_secret(&[0x33; 48]).unwrap();
        s
    }

    #[test]
    fn test_seal_and_decrypt() {
        let keys = keys();
        let ticket = keys.seal(&session()).unwrap();
        assert_eq!(&ticket[..KEY_NAME_LEN], keys.name());

        match keys.decrypt(&ticket, &[]) {
            TicketOutcome::Decrypted(s) => {
                assert_eq!(s.master_secret().as_bytes(), &[0x33; 48]);
                assert_eq!(s.id_context().as_bytes(), b"srv");
            }
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[test]
    fn test_empty_and_garbage_tickets() {
        let keys = keys();
        assert!(matches!(keys.decrypt(&[], &[]), TicketOutcome::Empty));
        assert!(matches!(keys.decrypt(&[1, 2, 3], &[]), TicketOutcome::CannotDecrypt));
    }

    #[test]
    fn test_other_key_cannot_decrypt() {
        let ticket = keys().seal(&session()).unwrap();
        let other = TicketKeys::new(*b"ticket-key-name!", &[0x43; KEY_LEN]);
        assert!(matches!(other.decrypt(&ticket, &[]), TicketOutcome::CannotDecrypt));
        let renamed = TicketKeys::new(*b"another-key-name", &[0x42; KEY_LEN]);
        assert!(matches!(renamed.decrypt(&ticket, &[]), TicketOutcome::CannotDecrypt));
    }

    #[test]
    fn test_tampered_ticket_cannot_decrypt() {
        let keys = keys();
        let mut ticket = keys.seal(&session()).unwrap();
        let last = ticket.len() - 1;
        ticket[last] ^= 0x01;
        assert!(matches!(keys.decrypt(&ticket, &[]), TicketOutcome::CannotDecrypt));
    }

    #[test]
    fn test_undecodable_plaintext_is_fatal() {
        let keys = keys();
        let (nonce, ct) = keys.crypto.encrypt(b"\x01not a record", keys.name()).unwrap();
        let mut ticket = keys.name().to_vec();
        ticket.extend_from_slice(&nonce);
        ticket.extend_from_slice(&ct);
        assert!(matches!(
            keys.decrypt(&ticket, &[]),
            TicketOutcome::Fatal(AlertDescription::DecodeError)
        ));
    }

    #[test]
    fn test_generated_keys_differ() {
        let a = TicketKeys::generate().unwrap();
        let b = TicketKeys::generate().unwrap();
        assert_ne!(a.name(), b.name());
    }
}
