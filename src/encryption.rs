//! At-rest encryption of sensitive payment fields
//!
//! Card numbers and CVVs are stored as AES-256-GCM ciphertext. Each value is
//! encrypted with a fresh 12-byte nonce which is prepended to the ciphertext;
//! the whole blob is base64-encoded so it can live in a TEXT column.

use aes_gcm::aead::{Aead, AeadCore, KeyInit, OsRng};
use aes_gcm::{Aes256Gcm, Nonce};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use thiserror::Error;

const NONCE_LEN: usize = 12;

#[derive(Debug, Clone, Error)]
pub enum CryptoError {
    #[error("Encryption key error: {0}")]
    Key(String),

    #[error("Encryption error: {0}")]
    Encrypt(String),

    #[error("Decryption error: {0}")]
    Decrypt(String),
}

/// Symmetric codec for string fields.
///
/// The key is supplied at construction; using the codec before configuration
/// is impossible by design. Blank plaintext encrypts to the absent marker
/// (the empty string) and the absent marker decrypts back to `None` rather
/// than an error, so optional fields round-trip without special cases at the
/// call sites.
pub struct EncryptionCodec {
    key: [u8; 32],
}

impl EncryptionCodec {
    /// Build a codec from a configured key string. AES-256 needs 32 key
    /// bytes; longer keys are truncated, shorter keys are rejected.
    pub fn new(key: &str) -> Result<Self, CryptoError> {
        let bytes = key.as_bytes();
        if bytes.len() < 32 {
            return Err(CryptoError::Key(
                "encryption key must be at least 32 bytes".to_string(),
            ));
        }

        let mut key = [0u8; 32];
        key.copy_from_slice(&bytes[..32]);
        Ok(Self { key })
    }

    /// Encrypt a plaintext value for storage. Blank input yields `None`.
    pub fn encrypt(&self, plaintext: &str) -> Result<Option<String>, CryptoError> {
        if plaintext.trim().is_empty() {
            return Ok(None);
        }

        let cipher = Aes256Gcm::new_from_slice(&self.key)
            .map_err(|e| CryptoError::Encrypt(e.to_string()))?;
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);

        let ciphertext = cipher
            .encrypt(&nonce, plaintext.as_bytes())
            .map_err(|e| CryptoError::Encrypt(e.to_string()))?;

        let mut blob = nonce.to_vec();
        blob.extend_from_slice(&ciphertext);

        Ok(Some(BASE64.encode(blob)))
    }

    /// Decrypt a stored value. The absent marker yields `None`.
    pub fn decrypt(&self, stored: &str) -> Result<Option<String>, CryptoError> {
        if stored.trim().is_empty() {
            return Ok(None);
        }

        let blob = BASE64
            .decode(stored)
            .map_err(|e| CryptoError::Decrypt(e.to_string()))?;
        if blob.len() < NONCE_LEN {
            return Err(CryptoError::Decrypt(
                "invalid ciphertext: too short".to_string(),
            ));
        }

        let cipher = Aes256Gcm::new_from_slice(&self.key)
            .map_err(|e| CryptoError::Decrypt(e.to_string()))?;

        let (nonce_bytes, ciphertext) = blob.split_at(NONCE_LEN);
        let nonce_array: [u8; NONCE_LEN] = nonce_bytes
            .try_into()
            .map_err(|_| CryptoError::Decrypt("invalid nonce length".to_string()))?;
        let nonce = Nonce::from(nonce_array);

        let plaintext = cipher
            .decrypt(&nonce, ciphertext)
            .map_err(|e| CryptoError::Decrypt(e.to_string()))?;

        String::from_utf8(plaintext)
            .map(Some)
            .map_err(|e| CryptoError::Decrypt(e.to_string()))
    }

    /// Encrypt for a NOT NULL column: absent values store as the empty string.
    pub fn encrypt_required(&self, plaintext: &str) -> Result<String, CryptoError> {
        Ok(self.encrypt(plaintext)?.unwrap_or_default())
    }

    /// Decrypt a NOT NULL column: the absent marker reads back as empty.
    pub fn decrypt_required(&self, stored: &str) -> Result<String, CryptoError> {
        Ok(self.decrypt(stored)?.unwrap_or_default())
    }
}
