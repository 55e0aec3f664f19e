//! Cryptographic helpers shared by the ticket layer and the resumption matcher.
//!
//! - ChaCha20-Poly1305 AEAD sealing with random 96-bit nonces
//! - Constant-time byte comparison
//! - OS random fill

use crate::error::{Result, SessionError};
use chacha20poly1305::aead::{Aead, KeyInit, Payload};
use chacha20poly1305::{ChaCha20Poly1305, Key, Nonce};
use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

/// AEAD key length in bytes
pub const KEY_LEN: usize = 32;

/// AEAD nonce length in bytes
pub const NONCE_LEN: usize = 12;

/// Poly1305 tag length in bytes
pub const TAG_LEN: usize = 16;

/// ChaCha20-Poly1305 cipher bound to one key
pub struct Crypto {
    cipher: ChaCha20Poly1305,
}

impl Crypto {
    /// Create a cipher from a 32-byte key
    pub fn new(key: &[u8; KEY_LEN]) -> Self {
        let key = Zeroizing::new(*key);
        Self {
            cipher: ChaCha20Poly1305::new(Key::from_slice(key.as_ref())),
        }
    }

    /// Encrypt `plaintext` under a fresh random nonce; returns the nonce and
    /// the ciphertext with its tag appended
    pub fn encrypt(&self, plaintext: &[u8], aad: &[u8]) -> Result<([u8; NONCE_LEN], Vec<u8>)> {
        let nonce = Self::generate_nonce()?;
        let ciphertext = self
            .cipher
            .encrypt(
                Nonce::from_slice(&nonce),
                Payload {
                    msg: plaintext,
                    aad,
                },
            )
            .map_err(|_| SessionError::TicketEncryption)?;
        Ok((nonce, ciphertext))
    }

    /// Decrypt and authenticate; `None` on any failure
    pub fn decrypt(&self, nonce: &[u8], ciphertext: &[u8], aad: &[u8]) -> Option<Zeroizing<Vec<u8>>> {
        if nonce.len() != NONCE_LEN {
            return None;
        }
        self.cipher
            .decrypt(
                Nonce::from_slice(nonce),
                Payload {
                    msg: ciphertext,
                    aad,
                },
            )
            .ok()
            .map(Zeroizing::new)
    }

    /// Random 96-bit nonce from the OS generator
    pub fn generate_nonce() -> Result<[u8; NONCE_LEN]> {
        let mut nonce = [0u8; NONCE_LEN];
        fill_random(&mut nonce)?;
        Ok(nonce)
    }
}

/// Fill `buf` from the operating system CSPRNG
pub fn fill_random(buf: &mut [u8]) -> Result<()> {
    getrandom::fill(buf).map_err(|e| SessionError::Random(e.to_string()))
}

/// Compare two byte strings in time independent of where they differ.
///
/// Lengths are not secret; different lengths compare unequal.
pub fn ct_eq(a: &[u8], b: &[u8]) -> bool {
    a.ct_eq(b).into()
}
