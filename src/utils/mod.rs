//! # Utility Modules
//!
//! Supporting utilities shared across the engine.
//!
//! ## Components
//! - **Crypto**: ChaCha20-Poly1305 AEAD, constant-time comparison, OS randomness
//! - **Logging**: Structured logging configuration
//! - **Metrics**: Per-store statistics counters
//! - **Time**: Clock abstraction for expiry checks
//!
//! ## Security
//! - Cryptographically secure RNG (getrandom)
//! - Memory zeroing for sensitive data (zeroize crate)

pub mod crypto;
pub mod logging;
pub mod metrics;
pub mod time;

pub use metrics::{CacheStats, CacheStatsSnapshot};
pub use time::{Clock, ManualClock, SystemClock};
