//! # Resumption Protocol
//!
//! Handshake-facing pieces of the engine: picking session ids for new
//! sessions, recovering sessions from tickets, and deciding whether an
//! offer resumes.
//!
//! ## Components
//! - **ID Generator**: collision-checked session id generation
//! - **Ticket**: ticket decryption boundary and reference ticket keys
//! - **Resumption**: the matcher turning an offer into a [`MatchResult`]
//!
//! [`MatchResult`]: resumption::MatchResult

pub mod id_generator;
pub mod resumption;
pub mod ticket;

pub use id_generator::{generate_session_id, RandomIdGenerator, SessionIdGenerator};
pub use resumption::{MatchResult, ResumptionMatcher, ResumptionOffer, Resumed, SessionSource};
pub use ticket::{TicketDecrypter, TicketKeys, TicketOutcome};
