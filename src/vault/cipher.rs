//! Document encryption keyring
//!
//! ChaCha20-Poly1305 with a random 96-bit nonce per document. The first key
//! in the ring encrypts; every key can decrypt documents tagged with its id.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chacha20poly1305::aead::{Aead, KeyInit};
use chacha20poly1305::{ChaCha20Poly1305, Key, Nonce};
use rand::rngs::OsRng;
use rand::RngCore;
use thiserror::Error;

use crate::config::Environment;
use crate::error::ApiError;

/// Nonce size for ChaCha20-Poly1305
pub const NONCE_SIZE: usize = 12;

/// Key size for ChaCha20-Poly1305
pub const KEY_SIZE: usize = 32;

const EPHEMERAL_KEY_ID: &str = "ephemeral";

#[derive(Error, Debug)]
pub enum VaultError {
    #[error("Invalid document key entry: {0}")]
    InvalidKey(String),

    #[error("No document keys configured")]
    NoKeys,

    #[error("Unknown document key id: {0}")]
    UnknownKey(String),

    #[error("Invalid nonce length: expected {expected}, got {actual}")]
    InvalidNonceLength { expected: usize, actual: usize },

    #[error("Encryption failed")]
    EncryptionFailed,

    #[error("Decryption failed")]
    DecryptionFailed,
}

impl From<VaultError> for ApiError {
    fn from(err: VaultError) -> Self {
        ApiError::InternalError(err.to_string())
    }
}

/// Ciphertext plus what is needed to decrypt it
#[derive(Debug, Clone)]
pub struct Sealed {
    pub key_id: String,
    pub nonce: [u8; NONCE_SIZE],
    pub ciphertext: Vec<u8>,
}

struct KeyEntry {
    id: String,
    cipher: ChaCha20Poly1305,
}

/// Ordered set of document keys; the first is active
pub struct DocumentCipher {
    keys: Vec<KeyEntry>,
}

impl std::fmt::Debug for DocumentCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let ids: Vec<&str> = self.keys.iter().map(|k| k.id.as_str()).collect();
        f.debug_struct("DocumentCipher").field("key_ids", &ids).finish()
    }
}

impl DocumentCipher {
    /// Parse `key_id:base64key[,key_id:base64key...]`
    pub fn from_keyring(keyring: &str) -> Result<Self, VaultError> {
        let mut keys = Vec::new();

        for entry in keyring.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            let (id, encoded) = entry
                .split_once(':')
                .ok_or_else(|| VaultError::InvalidKey("expected key_id:base64key".to_string()))?;
            let id = id.trim();
            if id.is_empty() {
                return Err(VaultError::InvalidKey("empty key id".to_string()));
            }
            if keys.iter().any(|k: &KeyEntry| k.id == id) {
                return Err(VaultError::InvalidKey(format!("duplicate key id {}", id)));
            }

            let bytes = BASE64
                .decode(encoded.trim())
                .map_err(|e| VaultError::InvalidKey(format!("{}: {}", id, e)))?;
            if bytes.len() != KEY_SIZE {
                return Err(VaultError::InvalidKey(format!(
                    "{}: key must be {} bytes, got {}",
                    id,
                    KEY_SIZE,
                    bytes.len()
                )));
            }

            keys.push(KeyEntry {
                id: id.to_string(),
                cipher: ChaCha20Poly1305::new(Key::from_slice(&bytes)),
            });
        }

        if keys.is_empty() {
            return Err(VaultError::NoKeys);
        }
        Ok(Self { keys })
    }

    /// Single random key that lives as long as the process
    pub fn ephemeral() -> Self {
        let mut bytes = [0u8; KEY_SIZE];
        OsRng.fill_bytes(&mut bytes);
        Self {
            keys: vec![KeyEntry {
                id: EPHEMERAL_KEY_ID.to_string(),
                cipher: ChaCha20Poly1305::new(Key::from_slice(&bytes)),
            }],
        }
    }

    /// Build from configuration. Falls back to an ephemeral key outside production.
    pub fn from_config(
        document_keys: Option<&str>,
        environment: &Environment,
    ) -> Result<Self, VaultError> {
        match document_keys {
            Some(keyring) => {
                let cipher = Self::from_keyring(keyring)?;
                tracing::info!(
                    active_key = cipher.active_key_id(),
                    keys = cipher.keys.len(),
                    "Document keyring loaded"
                );
                Ok(cipher)
            }
            None if environment.is_production() => Err(VaultError::NoKeys),
            None => {
                tracing::warn!(
                    "DOCUMENT_KEYS not set, using an ephemeral key. Documents will be unreadable after restart."
                );
                Ok(Self::ephemeral())
            }
        }
    }

    pub fn active_key_id(&self) -> &str {
        // from_keyring and ephemeral never build an empty ring
        self.keys.first().map(|k| k.id.as_str()).unwrap_or_default()
    }

    /// Encrypt with the active key
    pub fn seal(&self, plaintext: &[u8]) -> Result<Sealed, VaultError> {
        let key = self.keys.first().ok_or(VaultError::NoKeys)?;

        let mut nonce = [0u8; NONCE_SIZE];
        OsRng.fill_bytes(&mut nonce);

        let ciphertext = key
            .cipher
            .encrypt(Nonce::from_slice(&nonce), plaintext)
            .map_err(|_| VaultError::EncryptionFailed)?;

        Ok(Sealed {
            key_id: key.id.clone(),
            nonce,
            ciphertext,
        })
    }

    /// Decrypt with the key named by `key_id`
    pub fn open(&self, key_id: &str, nonce: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>, VaultError> {
        if nonce.len() != NONCE_SIZE {
            return Err(VaultError::InvalidNonceLength {
                expected: NONCE_SIZE,
                actual: nonce.len(),
            });
        }

        let key = self
            .keys
            .iter()
            .find(|k| k.id == key_id)
            .ok_or_else(|| VaultError::UnknownKey(key_id.to_string()))?;

        key.cipher
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .map_err(|_| VaultError::DecryptionFailed)
    }
}
