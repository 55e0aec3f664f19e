//! # Session Objects
//!
//! A [`Session`] is the cached state of one negotiated TLS session: its
//! identifier, the context it belongs to, the negotiated version and cipher,
//! the master secret and the peer identity established by the original
//! handshake.
//!
//! ## Lifecycle
//! - Built as an owned, mutable [`Session`] by the handshake layer (or
//!   recovered from a ticket / persisted record).
//! - Frozen into a shared [`SessionHandle`] with [`Session::into_handle`].
//!   From then on the only mutable state is the `not_resumable` flag and the
//!   lazily resolved cipher.
//! - Every handle is one owner. [`SessionHandle::acquire`] adds an owner and
//!   [`SessionHandle::release`] drops one; the reference count is atomic and
//!   independent of any store lock.
//! - When the last owner is released the session is dropped and the master
//!   secret and session ID are zeroized before the memory is freed.
//!
//! Secrets never appear in `Debug` output.

use crate::error::{Result, SessionError};
use crate::utils::time::unix_now;
use std::fmt;
use std::ops::Deref;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use zeroize::{Zeroize, ZeroizeOnDrop};

use serde::{Deserialize, Serialize};

/// Maximum session ID length in bytes
pub const MAX_SESSION_ID_LENGTH: usize = 32;

/// Maximum session ID context length in bytes
pub const MAX_SID_CTX_LENGTH: usize = 32;

/// Maximum master secret length in bytes
pub const MAX_MASTER_KEY_LENGTH: usize = 48;

/// Default session lifetime: five minutes plus a few seconds of jitter
pub const DEFAULT_SESSION_TIMEOUT: Duration = Duration::from_secs(60 * 5 + 4);

macro_rules! bounded_bytes {
    ($(#[$meta:meta])* $name:ident, $max:expr, $field:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, Zeroize)]
        pub struct $name {
            bytes: [u8; $max],
            len: u8,
        }

        impl $name {
            /// Maximum length in bytes
            pub const MAX_LEN: usize = $max;

            /// Copy `bytes`, rejecting inputs longer than the maximum
            pub fn new(bytes: &[u8]) -> Result<Self> {
                if bytes.len() > $max {
                    return Err(SessionError::InvalidLength {
                        field: $field,
                        len: bytes.len(),
                        max: $max,
                    });
                }
                let mut out = Self::empty();
                out.bytes[..bytes.len()].copy_from_slice(bytes);
                out.len = bytes.len() as u8;
                Ok(out)
            }

            /// Zero-length value
            pub const fn empty() -> Self {
                Self {
                    bytes: [0u8; $max],
                    len: 0,
                }
            }

            pub fn as_bytes(&self) -> &[u8] {
                &self.bytes[..self.len as usize]
            }

            pub fn len(&self) -> usize {
                self.len as usize
            }

            pub fn is_empty(&self) -> bool {
                self.len == 0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::empty()
            }
        }

        impl AsRef<[u8]> for $name {
            fn as_ref(&self) -> &[u8] {
                self.as_bytes()
            }
        }
    };
}

bounded_bytes!(
    /// Session identifier, 0 to 32 bytes. Empty means the session cannot be
    /// resumed by ID.
    SessionId,
    MAX_SESSION_ID_LENGTH,
    "session id"
);

bounded_bytes!(
    /// Application context a session was created under, 0 to 32 bytes
    SessionIdContext,
    MAX_SID_CTX_LENGTH,
    "session id context"
);

impl fmt::Debug for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionId").field("len", &self.len).finish()
    }
}

impl fmt::Debug for SessionIdContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match std::str::from_utf8(self.as_bytes()) {
            Ok(s) => f.debug_tuple("SessionIdContext").field(&s).finish(),
            Err(_) => f
                .debug_tuple("SessionIdContext")
                .field(&self.as_bytes())
                .finish(),
        }
    }
}

/// Master secret of a session. Zeroized on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct MasterSecret {
    bytes: [u8; MAX_MASTER_KEY_LENGTH],
    len: usize,
}

impl MasterSecret {
    /// Copy a master secret of at most 48 bytes
    pub fn new(secret: &[u8]) -> Result<Self> {
        if secret.len() > MAX_MASTER_KEY_LENGTH {
            return Err(SessionError::InvalidLength {
                field: "master secret",
                len: secret.len(),
                max: MAX_MASTER_KEY_LENGTH,
            });
        }
        let mut bytes = [0u8; MAX_MASTER_KEY_LENGTH];
        bytes[..secret.len()].copy_from_slice(secret);
        Ok(Self {
            bytes,
            len: secret.len(),
        })
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len]
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl Default for MasterSecret {
    fn default() -> Self {
        Self {
            bytes: [0u8; MAX_MASTER_KEY_LENGTH],
            len: 0,
        }
    }
}

impl fmt::Debug for MasterSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MasterSecret")
            .field("len", &self.len)
            .finish_non_exhaustive()
    }
}

/// Negotiated protocol version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProtocolVersion {
    Tls10,
    Tls11,
    Tls12,
    Tls13,
    Dtls10,
    Dtls12,
}

impl ProtocolVersion {
    /// Wire value of the version
    pub fn wire(self) -> u16 {
        match self {
            ProtocolVersion::Tls10 => 0x0301,
            ProtocolVersion::Tls11 => 0x0302,
            ProtocolVersion::Tls12 => 0x0303,
            ProtocolVersion::Tls13 => 0x0304,
            ProtocolVersion::Dtls10 => 0xfeff,
            ProtocolVersion::Dtls12 => 0xfefd,
        }
    }

    /// Parse a wire value
    pub fn from_wire(value: u16) -> Option<Self> {
        match value {
            0x0301 => Some(ProtocolVersion::Tls10),
            0x0302 => Some(ProtocolVersion::Tls11),
            0x0303 => Some(ProtocolVersion::Tls12),
            0x0304 => Some(ProtocolVersion::Tls13),
            0xfeff => Some(ProtocolVersion::Dtls10),
            0xfefd => Some(ProtocolVersion::Dtls12),
            _ => None,
        }
    }
}

/// A cipher suite known to the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CipherSuite {
    /// IANA identifier
    pub id: u16,
    /// OpenSSL-style name
    pub name: &'static str,
}

/// Cipher suites a stored numeric identifier can resolve to
pub static KNOWN_CIPHER_SUITES: &[CipherSuite] = &[
    CipherSuite { id: 0x1301, name: "TLS_AES_128_GCM_SHA256" },
    CipherSuite { id: 0x1302, name: "TLS_AES_256_GCM_SHA384" },
    CipherSuite { id: 0x1303, name: "TLS_CHACHA20_POLY1305_SHA256" },
    CipherSuite { id: 0xC02B, name: "ECDHE-ECDSA-AES128-GCM-SHA256" },
    CipherSuite { id: 0xC02C, name: "ECDHE-ECDSA-AES256-GCM-SHA384" },
    CipherSuite { id: 0xC02F, name: "ECDHE-RSA-AES128-GCM-SHA256" },
    CipherSuite { id: 0xC030, name: "ECDHE-RSA-AES256-GCM-SHA384" },
    CipherSuite { id: 0xCCA8, name: "ECDHE-RSA-CHACHA20-POLY1305" },
    CipherSuite { id: 0xCCA9, name: "ECDHE-ECDSA-CHACHA20-POLY1305" },
    CipherSuite { id: 0xC013, name: "ECDHE-RSA-AES128-SHA" },
    CipherSuite { id: 0xC014, name: "ECDHE-RSA-AES256-SHA" },
    CipherSuite { id: 0x009C, name: "AES128-GCM-SHA256" },
    CipherSuite { id: 0x009D, name: "AES256-GCM-SHA384" },
    CipherSuite { id: 0x002F, name: "AES128-SHA" },
    CipherSuite { id: 0x0035, name: "AES256-SHA" },
];

impl CipherSuite {
    /// Look up a suite by IANA identifier
    pub fn from_id(id: u16) -> Option<&'static CipherSuite> {
        KNOWN_CIPHER_SUITES.iter().find(|c| c.id == id)
    }
}

/// Outcome of peer certificate verification during the original handshake
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VerifyResult {
    /// No verification has happened yet; never equal to `Ok`
    NotVerified,
    /// The peer chain verified
    Ok,
    /// Verification failed with the given X.509 error code
    Failed(i32),
}

/// Peer identity validated during the original handshake
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerIdentity {
    /// DER encoding of the peer's leaf certificate
    pub certificate_der: Vec<u8>,
}

/// Ticket issued by a server for stateless resumption
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionTicket {
    /// Opaque ticket bytes
    pub data: Vec<u8>,
    /// Lifetime hint in seconds announced with the ticket
    pub lifetime_hint: u32,
}

/// One resumable TLS session
pub struct Session {
    id: SessionId,
    id_context: SessionIdContext,
    protocol_version: ProtocolVersion,
    cipher_id: u16,
    cipher: OnceLock<&'static CipherSuite>,
    master_secret: MasterSecret,
    peer: Option<Arc<PeerIdentity>>,
    verify_result: VerifyResult,
    creation_time: u64,
    timeout: u64,
    ticket: Option<SessionTicket>,
    server_name: Option<String>,
    extended_master_secret: bool,
    not_resumable: AtomicBool,
}

impl Session {
    /// Create a fresh session created now with the default timeout.
    ///
    /// The verify result starts as [`VerifyResult::NotVerified`].
    pub fn new(protocol_version: ProtocolVersion, cipher_id: u16) -> Self {
        Self {
            id: SessionId::empty(),
            id_context: SessionIdContext::empty(),
            protocol_version,
            cipher_id,
            cipher: OnceLock::new(),
            master_secret: MasterSecret::default(),
            peer: None,
            verify_result: VerifyResult::NotVerified,
            creation_time: unix_now(),
            timeout: DEFAULT_SESSION_TIMEOUT.as_secs(),
            ticket: None,
            server_name: None,
            extended_master_secret: false,
            not_resumable: AtomicBool::new(false),
        }
    }

    pub fn set_id(&mut self, id: &[u8]) -> Result<()> {
        self.id = SessionId::new(id)?;
        Ok(())
    }

    pub fn set_id_context(&mut self, id_context: &[u8]) -> Result<()> {
        self.id_context = SessionIdContext::new(id_context)?;
        Ok(())
    }

    pub fn set_master_secret(&mut self, secret: &[u8]) -> Result<()> {
        self.master_secret = MasterSecret::new(secret)?;
        Ok(())
    }

    /// Attach the verified peer certificate and the verification outcome
    pub fn set_peer(&mut self, certificate_der: &[u8], verify_result: VerifyResult) -> Result<()> {
        let der = copy_bytes(certificate_der)?;
        self.peer = Some(Arc::new(PeerIdentity {
            certificate_der: der,
        }));
        self.verify_result = verify_result;
        Ok(())
    }

    pub fn set_verify_result(&mut self, verify_result: VerifyResult) {
        self.verify_result = verify_result;
    }

    pub fn set_ticket(&mut self, ticket: &[u8], lifetime_hint: u32) -> Result<()> {
        self.ticket = Some(SessionTicket {
            data: copy_bytes(ticket)?,
            lifetime_hint,
        });
        Ok(())
    }

    /// Set the creation time in seconds since the UNIX epoch
    pub fn set_time(&mut self, creation_time: u64) {
        self.creation_time = creation_time;
    }

    pub fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = timeout.as_secs();
    }

    pub fn set_server_name(&mut self, server_name: Option<String>) {
        self.server_name = server_name;
    }

    pub fn set_extended_master_secret(&mut self, ems: bool) {
        self.extended_master_secret = ems;
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn id_context(&self) -> &SessionIdContext {
        &self.id_context
    }

    pub fn protocol_version(&self) -> ProtocolVersion {
        self.protocol_version
    }

    pub fn cipher_id(&self) -> u16 {
        self.cipher_id
    }

    /// Negotiated cipher suite, resolved from the stored identifier on first use
    pub fn cipher(&self) -> Option<&'static CipherSuite> {
        if let Some(cipher) = self.cipher.get() {
            return Some(*cipher);
        }
        let resolved = CipherSuite::from_id(self.cipher_id)?;
        Some(*self.cipher.get_or_init(|| resolved))
    }

    pub fn master_secret(&self) -> &MasterSecret {
        &self.master_secret
    }

    pub fn peer(&self) -> Option<&PeerIdentity> {
        self.peer.as_deref()
    }

    pub fn verify_result(&self) -> VerifyResult {
        self.verify_result
    }

    /// Creation time in seconds since the UNIX epoch
    pub fn creation_time(&self) -> u64 {
        self.creation_time
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }

    pub fn ticket(&self) -> Option<&SessionTicket> {
        self.ticket.as_ref()
    }

    pub fn server_name(&self) -> Option<&str> {
        self.server_name.as_deref()
    }

    pub fn extended_master_secret(&self) -> bool {
        self.extended_master_secret
    }

    /// Absolute expiry time, saturating at `u64::MAX`
    pub fn expires_at(&self) -> u64 {
        self.creation_time.saturating_add(self.timeout)
    }

    /// True once `now` is past `creation_time + timeout`
    pub fn is_expired_at(&self, now: u64) -> bool {
        now > self.expires_at()
    }

    /// True when the session expired strictly before `cutoff`
    pub fn expires_before(&self, cutoff: u64) -> bool {
        self.expires_at() < cutoff
    }

    pub fn is_resumable(&self) -> bool {
        !self.not_resumable.load(Ordering::Acquire)
    }

    /// Deep copy into a fresh, unshared session.
    ///
    /// The copy is resumable again and shares the peer identity with the
    /// original.
    pub fn duplicate(&self) -> Result<Session> {
        let ticket = match &self.ticket {
            Some(t) => Some(SessionTicket {
                data: copy_bytes(&t.data)?,
                lifetime_hint: t.lifetime_hint,
            }),
            None => None,
        };
        let cipher = OnceLock::new();
        if let Some(c) = self.cipher.get() {
            let _ = cipher.set(*c);
        }
        Ok(Session {
            id: self.id,
            id_context: self.id_context,
            protocol_version: self.protocol_version,
            cipher_id: self.cipher_id,
            cipher,
            master_secret: self.master_secret.clone(),
            peer: self.peer.clone(),
            verify_result: self.verify_result,
            creation_time: self.creation_time,
            timeout: self.timeout,
            ticket,
            server_name: self.server_name.clone(),
            extended_master_secret: self.extended_master_secret,
            not_resumable: AtomicBool::new(false),
        })
    }

    /// Freeze the session into a shared handle with a reference count of one
    pub fn into_handle(self) -> SessionHandle {
        SessionHandle(Arc::new(self))
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.master_secret.zeroize();
        self.id.zeroize();
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("id_context", &self.id_context)
            .field("protocol_version", &self.protocol_version)
            .field("cipher_id", &format_args!("{:#06x}", self.cipher_id))
            .field("master_secret", &self.master_secret)
            .field("verify_result", &self.verify_result)
            .field("creation_time", &self.creation_time)
            .field("timeout", &self.timeout)
            .field("has_ticket", &self.ticket.is_some())
            .field("not_resumable", &!self.is_resumable())
            .finish_non_exhaustive()
    }
}

fn copy_bytes(src: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    out.try_reserve_exact(src.len())
        .map_err(|_| SessionError::Allocation)?;
    out.extend_from_slice(src);
    Ok(out)
}

/// Shared, reference-counted owner of a [`Session`]
#[derive(Clone)]
pub struct SessionHandle(Arc<Session>);

impl SessionHandle {
    /// Take an additional owning reference
    pub fn acquire(&self) -> SessionHandle {
        SessionHandle(Arc::clone(&self.0))
    }

    /// Give up this reference. The last release zeroizes and frees the session.
    pub fn release(self) {
        drop(self);
    }

    /// Number of live owners
    pub fn ref_count(&self) -> usize {
        Arc::strong_count(&self.0)
    }

    /// Whether both handles own the same session object
    pub fn ptr_eq(&self, other: &SessionHandle) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Flag the session as no longer resumable.
    ///
    /// Returns `true` only for the call that flipped the flag.
    pub fn mark_not_resumable(&self) -> bool {
        !self.0.not_resumable.swap(true, Ordering::AcqRel)
    }
}

impl Deref for SessionHandle {
    type Target = Session;

    fn deref(&self) -> &Session {
        &self.0
    }
}

impl fmt::Debug for SessionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionHandle")
            .field("ref_count", &self.ref_count())
            .field("session", &*self.0)
            .finish()
    }
}
