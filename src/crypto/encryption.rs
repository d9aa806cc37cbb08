//! AES-256-GCM Encryption/Decryption.
//!
//! AES-GCM is an AEAD cipher: a blob that was truncated, bit-flipped or
//! sealed under another key fails tag verification instead of decrypting
//! to garbage.
//!
//! Blob layout (base64 of):
//!   [ 12-byte nonce | ciphertext + 16-byte auth tag ]

use super::key_derivation::DerivedKey;
use crate::error::{Error, Result};
use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Key, Nonce,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use rand::{rngs::OsRng, RngCore};
use std::fmt;

/// Nonce length (bytes) - 96 bits
pub const NONCE_LEN: usize = 12;

/// Authentication tag length (bytes) - 128 bits
pub const TAG_LEN: usize = 16;

/// Base64 text of nonce || ciphertext. Opaque above this module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedBlob(String);

impl EncryptedBlob {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl From<String> for EncryptedBlob {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for EncryptedBlob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Encrypts/decrypts string payloads with a derived key.
pub struct Encryptor {
    cipher: Aes256Gcm,
}

impl Encryptor {
    pub fn new(key: &DerivedKey) -> Self {
        let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key.as_bytes()));
        Self { cipher }
    }

    /// Encrypt with a fresh random nonce. Two calls on the same plaintext
    /// never produce the same blob.
    pub fn encrypt(&self, plaintext: &str) -> Result<EncryptedBlob> {
        let mut nonce_bytes = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = self
            .cipher
            .encrypt(nonce, plaintext.as_bytes())
            .map_err(|e| Error::Encryption(e.to_string()))?;

        let mut combined = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        combined.extend_from_slice(&nonce_bytes);
        combined.extend_from_slice(&ciphertext);

        Ok(EncryptedBlob(BASE64.encode(combined)))
    }

    /// Reverse of [`Encryptor::encrypt`]. Any malformed, truncated or foreign
    /// blob yields [`Error::Decryption`].
    pub fn decrypt(&self, blob: &EncryptedBlob) -> Result<String> {
        let combined = BASE64
            .decode(blob.as_str())
            .map_err(|_| Error::Decryption)?;

        if combined.len() < NONCE_LEN + TAG_LEN {
            return Err(Error::Decryption);
        }

        let (nonce_bytes, ciphertext) = combined.split_at(NONCE_LEN);
        let plaintext = self
            .cipher
            .decrypt(Nonce::from_slice(nonce_bytes), ciphertext)
            .map_err(|_| Error::Decryption)?;

        String::from_utf8(plaintext).map_err(|_| Error::Decryption)
    }
}

/// Convenience function to encrypt with a one-off encryptor
pub fn encrypt(plaintext: &str, key: &DerivedKey) -> Result<EncryptedBlob> {
    Encryptor::new(key).encrypt(plaintext)
}

/// Convenience function to decrypt with a one-off encryptor
pub fn decrypt(blob: &EncryptedBlob, key: &DerivedKey) -> Result<String> {
    Encryptor::new(key).decrypt(blob)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::key_derivation::KEY_LEN;

    fn test_key() -> DerivedKey {
        let mut bytes = [0u8; KEY_LEN];
        for (i, b) in bytes.iter_mut().enumerate() {
            *b = i as u8;
        }
        DerivedKey::from(bytes)
    }

    #[test]
    fn test_encrypt_decrypt_roundtrip() -> Result<()> {
        let encryptor = Encryptor::new(&test_key());

        let long = "x".repeat(10_000);
        let plaintexts: [&str; 4] = ["", "hello", "héllo wörld 👋", &long];
        for plaintext in plaintexts {
            let blob = encryptor.encrypt(plaintext)?;
            assert_eq!(encryptor.decrypt(&blob)?, plaintext);
        }
        Ok(())
    }

    #[test]
    fn test_encrypted_size() -> Result<()> {
        let blob = encrypt("test", &test_key())?;
        let raw = BASE64.decode(blob.as_str()).unwrap();

        // nonce (12) + plaintext + tag (16)
        assert_eq!(raw.len(), NONCE_LEN + 4 + TAG_LEN);
        Ok(())
    }

    #[test]
    fn test_different_nonce_each_time() -> Result<()> {
        let key = test_key();

        let blob1 = encrypt("same message", &key)?;
        let blob2 = encrypt("same message", &key)?;

        assert_ne!(blob1, blob2);
        assert_eq!(decrypt(&blob1, &key)?, "same message");
        assert_eq!(decrypt(&blob2, &key)?, "same message");
        Ok(())
    }

    #[test]
    fn test_wrong_key_fails() -> Result<()> {
        let blob = encrypt("secret message", &test_key())?;

        let result = decrypt(&blob, &DerivedKey::from([1u8; KEY_LEN]));
        assert!(matches!(result, Err(Error::Decryption)));
        Ok(())
    }

    #[test]
    fn test_any_flipped_byte_fails() -> Result<()> {
        let key = test_key();
        let blob = encrypt("secret message", &key)?;
        let raw = BASE64.decode(blob.as_str()).unwrap();

        for i in 0..raw.len() {
            let mut tampered = raw.clone();
            tampered[i] ^= 0x01;
            let tampered = EncryptedBlob::from(BASE64.encode(tampered));
            assert!(
                matches!(decrypt(&tampered, &key), Err(Error::Decryption)),
                "flipping byte {} was not detected",
                i
            );
        }
        Ok(())
    }

    #[test]
    fn test_malformed_blobs_fail() {
        let key = test_key();

        let nonce_only = BASE64.encode([0u8; NONCE_LEN]);
        let blobs: [&str; 4] = ["", "not base64 at all!", "AAAA", &nonce_only];
        for bad in blobs {
            let result = decrypt(&EncryptedBlob::from(bad.to_string()), &key);
            assert!(matches!(result, Err(Error::Decryption)), "accepted {:?}", bad);
        }
    }
}
