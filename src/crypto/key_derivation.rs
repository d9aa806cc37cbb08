//! Key derivation using PBKDF2-HMAC-SHA256.
//!
//! The key is never persisted. Every session re-derives it from the same
//! passphrase + salt + iteration count, so the output must be bit-identical
//! across runs for previously stored blobs to stay readable.

use pbkdf2::pbkdf2_hmac;
use sha2::Sha256;
use std::fmt;

/// Key length (bytes) - 256 bits for AES-256
pub const KEY_LEN: usize = 32;

/// Default PBKDF2 iteration count
pub const DEFAULT_ITERATIONS: u32 = 100_000;

/// Default salt used when the config does not override it
pub const DEFAULT_SALT: &str = "unique-salt";

/// Inputs to key derivation, injected from config / environment.
#[derive(Clone)]
pub struct KeyMaterial {
    pub passphrase: String,
    pub salt: String,
    pub iterations: u32,
}

impl KeyMaterial {
    /// Key material with the default salt and iteration count.
    pub fn new(passphrase: impl Into<String>) -> Self {
        Self {
            passphrase: passphrase.into(),
            salt: DEFAULT_SALT.to_string(),
            iterations: DEFAULT_ITERATIONS,
        }
    }

    pub fn with_salt(mut self, salt: impl Into<String>) -> Self {
        self.salt = salt.into();
        self
    }

    pub fn with_iterations(mut self, iterations: u32) -> Self {
        self.iterations = iterations;
        self
    }
}

impl fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyMaterial")
            .field("passphrase", &"<redacted>")
            .field("salt", &self.salt)
            .field("iterations", &self.iterations)
            .finish()
    }
}

/// Symmetric key derived from [`KeyMaterial`].
#[derive(Clone, PartialEq, Eq)]
pub struct DerivedKey([u8; KEY_LEN]);

impl DerivedKey {
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }
}

impl From<[u8; KEY_LEN]> for DerivedKey {
    fn from(bytes: [u8; KEY_LEN]) -> Self {
        Self(bytes)
    }
}

impl fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DerivedKey(<redacted>)")
    }
}

/// Derive the AES-256 key. Pure and deterministic: no randomness, no I/O.
pub fn derive_key(material: &KeyMaterial) -> DerivedKey {
    let mut key = [0u8; KEY_LEN];
    pbkdf2_hmac::<Sha256>(
        material.passphrase.as_bytes(),
        material.salt.as_bytes(),
        material.iterations,
        &mut key,
    );
    DerivedKey(key)
}
