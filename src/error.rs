//! # Error Types
//!
//! Error handling for the session cache and resumption engine.
//!
//! Only conditions that must abort a handshake, or that are caller mistakes,
//! are errors. A resumption that does not happen (unknown ID, context
//! mismatch, expired session, undecryptable ticket) is a normal outcome and
//! is reported as [`MatchResult::FullHandshake`](crate::protocol::resumption::MatchResult),
//! never through this module.
//!
//! ## Error Categories
//! - **Fatal**: allocation failure, session ID generator failures, fatal
//!   ticket outcomes. [`SessionError::is_fatal`] returns `true` for these and
//!   the connection must be aborted.
//! - **Usage**: oversized identifiers, configuration problems.
//! - **Persistence**: serialization and deserialization of session state.
//!
//! Store-internal invariant violations are programming errors; they are
//! checked with `debug_assert!` and never surface here.
//!
//! ## Example Usage
//! ```rust
//! use tls_session_cache::core::session::SessionId;
//! use tls_session_cache::error::SessionError;
//!
//! let err = SessionId::new(&[0u8; 40]).unwrap_err();
//! assert!(matches!(err, SessionError::InvalidLength { len: 40, .. }));
//! assert!(!err.is_fatal());
//! ```

use std::fmt;
use std::io;
use thiserror::Error;

/// Error message constants to reduce allocations in error paths.
pub mod constants {
    /// Serialization errors
    pub const ERR_EMPTY_RECORD: &str = "Empty session record";
    pub const ERR_UNKNOWN_FORMAT: &str = "Unknown serialization format byte";
    pub const ERR_UNKNOWN_VERSION: &str = "Unknown protocol version in session record";
    pub const ERR_SECRET_TOO_LONG: &str = "Master secret exceeds maximum length";

    /// Configuration errors
    pub const ERR_UNKNOWN_CACHE_MODE: &str = "Unknown session cache mode";
    pub const ERR_LOGGING_INIT: &str = "Failed to install tracing subscriber";
}

/// TLS alert descriptions the engine can ask the handshake layer to send.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlertDescription {
    /// handshake_failure(40)
    HandshakeFailure,
    /// illegal_parameter(47)
    IllegalParameter,
    /// decode_error(50)
    DecodeError,
    /// decrypt_error(51)
    DecryptError,
    /// internal_error(80)
    InternalError,
}

impl AlertDescription {
    /// Wire value of the alert description
    pub fn code(self) -> u8 {
        match self {
            AlertDescription::HandshakeFailure => 40,
            AlertDescription::IllegalParameter => 47,
            AlertDescription::DecodeError => 50,
            AlertDescription::DecryptError => 51,
            AlertDescription::InternalError => 80,
        }
    }
}

impl fmt::Display for AlertDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AlertDescription::HandshakeFailure => "handshake_failure",
            AlertDescription::IllegalParameter => "illegal_parameter",
            AlertDescription::DecodeError => "decode_error",
            AlertDescription::DecryptError => "decrypt_error",
            AlertDescription::InternalError => "internal_error",
        };
        write!(f, "{name}({})", self.code())
    }
}

// SessionError is the single error type for all cache and resumption operations
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Allocation failed while building session state")]
    Allocation,

    #[error("{field} length {len} exceeds maximum of {max} bytes")]
    InvalidLength {
        field: &'static str,
        len: usize,
        max: usize,
    },

    #[error("Session ID generator returned invalid length {len} (allowed 1..={max})")]
    IdGeneratorContract { len: usize, max: usize },

    #[error("Random number generator failed: {0}")]
    Random(String),

    #[error("Unable to generate a unique session ID after {attempts} attempts")]
    IdGenerationExhausted { attempts: usize },

    #[error("Fatal session ticket error, alert {alert}")]
    TicketFatal { alert: AlertDescription },

    #[error("Session ticket encryption failed")]
    TicketEncryption,

    #[error("Serialize error: {0}")]
    SerializeError(String),

    #[error("Deserialize error: {0}")]
    DeserializeError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl SessionError {
    /// Whether the error must abort the connection it occurred on.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            SessionError::Allocation
                | SessionError::IdGeneratorContract { .. }
                | SessionError::Random(_)
                | SessionError::IdGenerationExhausted { .. }
                | SessionError::TicketFatal { .. }
                | SessionError::TicketEncryption
        )
    }

    /// Alert to send to the peer when the error is fatal.
    pub fn alert(&self) -> Option<AlertDescription> {
        match self {
            SessionError::TicketFatal { alert } => Some(*alert),
            e if e.is_fatal() => Some(AlertDescription::InternalError),
            _ => None,
        }
    }
}

/// Type alias for Results using SessionError
pub type Result<T> = std::result::Result<T, SessionError>;
