//! # Session Serialization
//!
//! Import/export boundary for session state. The engine itself only needs a
//! lossless round trip of every [`Session`] field; persistence code and the
//! ticket layer pick the concrete format.
//!
//! ## Formats
//! - **Bincode**: compact binary, used for ticket payloads (default)
//! - **JSON**: human-readable, for debugging and admin tooling
//!
//! Every encoded record starts with a one-byte format identifier so a reader
//! can detect the encoding:
//! ```text
//! [Format(1)] [SessionRecord(N)]
//! ```
//!
//! ## Security
//! - Intermediate [`SessionRecord`] values zeroize their secret bytes on drop
//! - Bincode decoding is bounded by [`MAX_RECORD_SIZE`]
//! - The `not_resumable` flag is process-local and never serialized

use crate::core::session::{ProtocolVersion, Session, VerifyResult};
use crate::error::{constants, Result, SessionError};
use bincode::Options;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Upper bound on an encoded bincode record
pub const MAX_RECORD_SIZE: u64 = 256 * 1024;

const RECORD_VERSION: u8 = 1;

/// Supported serialization formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SerializationFormat {
    /// Binary compact format (default, fastest)
    #[default]
    Bincode,
    /// Human-readable JSON format (debugging, interop)
    Json,
}

impl SerializationFormat {
    /// Get the format identifier byte
    pub fn format_byte(self) -> u8 {
        match self {
            SerializationFormat::Bincode => 0x01,
            SerializationFormat::Json => 0x02,
        }
    }

    /// Detect format from identifier byte
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0x01 => Some(SerializationFormat::Bincode),
            0x02 => Some(SerializationFormat::Json),
            _ => None,
        }
    }

    /// Get human-readable name
    pub fn name(self) -> &'static str {
        match self {
            SerializationFormat::Bincode => "Bincode",
            SerializationFormat::Json => "JSON",
        }
    }
}

/// Flat, serializable copy of every field of a [`Session`]
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct SessionRecord {
    pub record_version: u8,
    pub id: Vec<u8>,
    pub id_context: Vec<u8>,
    pub protocol_version: u16,
    pub cipher_id: u16,
    pub master_secret: Vec<u8>,
    pub peer_certificate: Option<Vec<u8>>,
    #[zeroize(skip)]
    pub verify_result: VerifyResult,
    pub creation_time: u64,
    pub timeout_secs: u64,
    pub ticket: Option<Vec<u8>>,
    pub ticket_lifetime_hint: u32,
    pub server_name: Option<String>,
    pub extended_master_secret: bool,
}

impl SessionRecord {
    /// Capture a session's fields
    pub fn from_session(session: &Session) -> Self {
        Self {
            record_version: RECORD_VERSION,
            id: session.id().as_bytes().to_vec(),
            id_context: session.id_context().as_bytes().to_vec(),
            protocol_version: session.protocol_version().wire(),
            cipher_id: session.cipher_id(),
            master_secret: session.master_secret().as_bytes().to_vec(),
            peer_certificate: session.peer().map(|p| p.certificate_der.clone()),
            verify_result: session.verify_result(),
            creation_time: session.creation_time(),
            timeout_secs: session.timeout().as_secs(),
            ticket: session.ticket().map(|t| t.data.clone()),
            ticket_lifetime_hint: session.ticket().map_or(0, |t| t.lifetime_hint),
            server_name: session.server_name().map(str::to_owned),
            extended_master_secret: session.extended_master_secret(),
        }
    }

    /// Rebuild an unshared session from the record
    pub fn to_session(&self) -> Result<Session> {
        let version = ProtocolVersion::from_wire(self.protocol_version).ok_or_else(|| {
            SessionError::DeserializeError(format!(
                "{}: {:#06x}",
                constants::ERR_UNKNOWN_VERSION,
                self.protocol_version
            ))
        })?;

        let mut session = Session::new(version, self.cipher_id);
        session.set_id(&self.id)?;
        session.set_id_context(&self.id_context)?;
        session
            .set_master_secret(&self.master_secret)
            .map_err(|_| SessionError::DeserializeError(constants::ERR_SECRET_TOO_LONG.into()))?;
        match &self.peer_certificate {
            Some(der) => session.set_peer(der, self.verify_result)?,
            None => session.set_verify_result(self.verify_result),
        }
        session.set_time(self.creation_time);
        session.set_timeout(Duration::from_secs(self.timeout_secs));
        if let Some(ticket) = &self.ticket {
            session.set_ticket(ticket, self.ticket_lifetime_hint)?;
        }
        session.set_server_name(self.server_name.clone());
        session.set_extended_master_secret(self.extended_master_secret);
        Ok(session)
    }
}

impl fmt::Debug for SessionRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionRecord")
            .field("record_version", &self.record_version)
            .field("id_len", &self.id.len())
            .field("id_context", &self.id_context)
            .field("protocol_version", &self.protocol_version)
            .field("cipher_id", &self.cipher_id)
            .field("master_secret_len", &self.master_secret.len())
            .field("verify_result", &self.verify_result)
            .field("creation_time", &self.creation_time)
            .field("timeout_secs", &self.timeout_secs)
            .finish_non_exhaustive()
    }
}

fn bincode_options() -> impl Options {
    bincode::DefaultOptions::new().with_limit(MAX_RECORD_SIZE)
}

/// Serialize a session with a leading format byte
pub fn serialize_session(session: &Session, format: SerializationFormat) -> Result<Vec<u8>> {
    let record = SessionRecord::from_session(session);
    let mut payload = match format {
        SerializationFormat::Bincode => bincode_options()
            .serialize(&record)
            .map_err(|e| SessionError::SerializeError(e.to_string()))?,
        SerializationFormat::Json => serde_json::to_vec(&record)
            .map_err(|e| SessionError::SerializeError(e.to_string()))?,
    };

    let mut data = Vec::with_capacity(payload.len() + 1);
    data.push(format.format_byte());
    data.extend_from_slice(&payload);
    payload.zeroize();
    Ok(data)
}

/// Deserialize a session written by [`serialize_session`]
pub fn deserialize_session(data: &[u8]) -> Result<Session> {
    let (&format_byte, payload) = data
        .split_first()
        .ok_or_else(|| SessionError::DeserializeError(constants::ERR_EMPTY_RECORD.into()))?;

    let format = SerializationFormat::from_byte(format_byte).ok_or_else(|| {
        SessionError::DeserializeError(format!(
            "{}: {format_byte}",
            constants::ERR_UNKNOWN_FORMAT
        ))
    })?;

    let record: SessionRecord = match format {
        SerializationFormat::Bincode => bincode_options()
            .deserialize(payload)
            .map_err(|e| SessionError::DeserializeError(e.to_string()))?,
        SerializationFormat::Json => serde_json::from_slice(payload)
            .map_err(|e| SessionError::DeserializeError(e.to_string()))?,
    };

    record.to_session()
}

impl Session {
    /// Export with the default (bincode) format
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        serialize_session(self, SerializationFormat::default())
    }

    /// Import a session exported by [`Session::to_bytes`] or [`serialize_session`]
    pub fn from_bytes(data: &[u8]) -> Result<Session> {
        deserialize_session(data)
    }
}
