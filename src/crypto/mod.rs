//! Crypto module - AES-256-GCM over a PBKDF2-derived key.
//!
//! - PBKDF2-HMAC-SHA256 key derivation from injected key material
//! - AES-256-GCM encryption with a random nonce per message
//! - Base64 blob encoding for the key-value store

pub mod encryption;
pub mod key_derivation;

pub use encryption::{decrypt, encrypt, EncryptedBlob, Encryptor};
pub use key_derivation::{derive_key, DerivedKey, KeyMaterial, KEY_LEN};
