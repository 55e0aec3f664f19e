//! # Core Session Components
//!
//! The session object and its persistence format.
//!
//! ## Components
//! - **Session**: session state, shared handles, bounded identifiers
//! - **Serialization**: export/import of sessions (bincode or JSON)
//!
//! ## Record Format
//! ```text
//! [Format(1)] [SessionRecord(N)]
//! ```
//!
//! ## Security
//! - Master secrets and session ids are zeroized when the last owner goes away
//! - Secrets never appear in `Debug` output
//! - Decoding is size-bounded

pub mod serialization;
pub mod session;
