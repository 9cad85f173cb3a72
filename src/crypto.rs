//! # Credential Encryption at Rest
//!
//! Embedder credentials (provider API keys and the like) never reach the
//! database in the clear. [`CredentialCipher`] wraps an AES-256-GCM key
//! taken from configuration and turns credential strings into opaque
//! base64 blobs and back.
//!
//! Blob layout: a fresh 96-bit nonce drawn from the OS generator, followed
//! by the GCM ciphertext and tag, the whole thing base64-encoded so it
//! fits an ordinary text column. GCM authenticates the blob, so opening
//! fails on a wrong key as well as on any modification of the stored
//! value.
//!
//! Failures surface as [`ApiError::Internal`] like every other
//! infrastructure fault in this crate; the messages describe the stage
//! that failed and never echo key material or plaintext.
//!
//! ```rust
//! use goodmem_server::crypto::{generate_key, CredentialCipher};
//!
//! # fn main() -> Result<(), goodmem_server::error::ApiError> {
//! let cipher = CredentialCipher::from_base64(&generate_key())?;
//! let blob = cipher.seal("sk-provider-secret")?;
//! assert_eq!(cipher.open(&blob)?, "sk-provider-secret");
//! # Ok(())
//! # }
//! ```

use aes_gcm::aead::Aead;
use aes_gcm::{Aes256Gcm, KeyInit, Nonce};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use rand::rngs::OsRng;
use rand::RngCore;

use crate::error::ApiError;

/// AES-256 key length in bytes.
const KEY_LEN: usize = 32;

/// GCM nonce length in bytes; one nonce is drawn per `seal` call.
const NONCE_LEN: usize = 12;

/// Draws a fresh 256-bit key from the OS generator, base64-encoded for the
/// `GOODMEM_CREDENTIALS_KEY` configuration variable.
pub fn generate_key() -> String {
    let mut key = [0u8; KEY_LEN];
    OsRng.fill_bytes(&mut key);
    STANDARD.encode(key)
}

/// An AES-256-GCM cipher bound to the server-wide credentials key.
///
/// Construct once from the configured key and reuse; the type holds no
/// per-call state. Key material is absorbed into the cipher schedule and
/// is not retrievable from the value.
#[derive(Clone)]
pub struct CredentialCipher {
    cipher: Aes256Gcm,
}

impl CredentialCipher {
    /// Builds the cipher from a base64-encoded 32-byte key.
    pub fn from_base64(key: &str) -> Result<Self, ApiError> {
        let bytes = STANDARD
            .decode(key)
            .map_err(|_| ApiError::internal("credentials key is not valid base64"))?;
        if bytes.len() != KEY_LEN {
            return Err(ApiError::internal(format!(
                "credentials key must decode to {} bytes, got {}",
                KEY_LEN,
                bytes.len()
            )));
        }
        let cipher = Aes256Gcm::new_from_slice(&bytes)
            .map_err(|_| ApiError::internal("credentials key was rejected by the cipher"))?;
        Ok(CredentialCipher { cipher })
    }

    /// Encrypts a credential string into its storage form.
    ///
    /// The nonce is random per call, so sealing the same plaintext twice
    /// yields unrelated blobs.
    pub fn seal(&self, credentials: &str) -> Result<String, ApiError> {
        let mut nonce = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut nonce);

        let sealed = self
            .cipher
            .encrypt(Nonce::from_slice(&nonce), credentials.as_bytes())
            .map_err(|_| ApiError::internal("credential encryption was rejected by the cipher"))?;

        let mut blob = Vec::with_capacity(NONCE_LEN + sealed.len());
        blob.extend_from_slice(&nonce);
        blob.extend_from_slice(&sealed);
        Ok(STANDARD.encode(blob))
    }

    /// Decrypts a blob produced by [`CredentialCipher::seal`].
    ///
    /// # Errors
    ///
    /// `Internal` when the blob is not base64, is too short to hold a
    /// nonce, fails GCM authentication (wrong key or altered bytes), or
    /// decrypts to something other than UTF-8.
    pub fn open(&self, blob: &str) -> Result<String, ApiError> {
        let bytes = STANDARD
            .decode(blob)
            .map_err(|_| ApiError::internal("stored credential blob is not valid base64"))?;
        if bytes.len() <= NONCE_LEN {
            return Err(ApiError::internal("stored credential blob is truncated"));
        }

        let (nonce, sealed) = bytes.split_at(NONCE_LEN);
        let plain = self
            .cipher
            .decrypt(Nonce::from_slice(nonce), sealed)
            .map_err(|_| {
                ApiError::internal("credential decryption failed: wrong key or corrupted blob")
            })?;

        String::from_utf8(plain)
            .map_err(|_| ApiError::internal("decrypted credentials are not valid UTF-8"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cipher() -> CredentialCipher {
        CredentialCipher::from_base64(&generate_key()).unwrap()
    }

    #[test]
    fn generated_keys_decode_to_32_bytes() {
        let key = generate_key();
        assert_eq!(STANDARD.decode(&key).unwrap().len(), KEY_LEN);
        assert_ne!(generate_key(), key);
    }

    #[test]
    fn seal_open_round_trip() {
        let cipher = cipher();
        let blob = cipher.seal("sk-test-credential").unwrap();
        assert_ne!(blob, "sk-test-credential");
        assert_eq!(cipher.open(&blob).unwrap(), "sk-test-credential");
    }

    #[test]
    fn nonces_make_blobs_unique() {
        let cipher = cipher();
        assert_ne!(cipher.seal("secret").unwrap(), cipher.seal("secret").unwrap());
    }

    #[test]
    fn wrong_key_fails_authentication() {
        let blob = cipher().seal("secret").unwrap();
        assert!(cipher().open(&blob).is_err());
    }

    #[test]
    fn altered_blob_fails_authentication() {
        let cipher = cipher();
        let blob = cipher.seal("secret").unwrap();
        let mut bytes = STANDARD.decode(&blob).unwrap();
        let last = bytes.len() - 1;
        bytes[last] ^= 0x01;
        assert!(cipher.open(&STANDARD.encode(bytes)).is_err());
    }

    #[test]
    fn rejects_truncated_or_garbage_blobs() {
        let cipher = cipher();
        assert!(cipher.open("").is_err());
        assert!(cipher.open("@@not-base64@@").is_err());
        // Nonce-sized payload with no ciphertext behind it.
        assert!(cipher.open(&STANDARD.encode([0u8; NONCE_LEN])).is_err());
    }

    #[test]
    fn rejects_bad_key_material() {
        assert!(CredentialCipher::from_base64("@@not-base64@@").is_err());
        let short = STANDARD.encode([0u8; 16]);
        assert!(CredentialCipher::from_base64(&short).is_err());
    }
}
