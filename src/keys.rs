//! # API Key Codec
//!
//! Generates and verifies the opaque API keys that authenticate every
//! request. A raw key has the shape:
//!
//! ```text
//! gm_<26 chars of lower-case unpadded base32>
//! ```
//!
//! built from 16 bytes drawn from the OS cryptographic generator. Only the
//! SHA3-256 digest of the full raw string (32 bytes) and the first 8
//! characters (the display prefix) are ever persisted; the raw key is shown
//! exactly once at creation time.
//!
//! ## Properties
//!
//! - Hashing is deterministic: the same raw key always produces the same
//!   32-byte digest, so the resolver can look keys up by hash.
//! - The raw key is not recoverable from the stored digest.
//! - The format validator rejects any string that does not start with
//!   `gm_` or whose payload is not lower-case base32.

use rand::rngs::OsRng;
use rand::RngCore;
use sha3::{Digest, Sha3_256};

use crate::error::ApiError;

/// Literal prefix of every raw API key.
pub const KEY_PREFIX: &str = "gm_";

/// Number of random bytes behind a key (128 bits of entropy).
const KEY_MATERIAL_BYTES: usize = 16;

/// Length of the displayable prefix stored alongside the hash.
pub const DISPLAY_PREFIX_LEN: usize = 8;

/// A freshly generated API key.
///
/// Holds the raw key (returned to the caller exactly once), the display
/// prefix, and the storage hash. The raw form is deliberately excluded from
/// `Debug` output.
#[derive(Clone)]
pub struct GeneratedKey {
    /// Full raw key (`gm_…`). Never persisted.
    pub raw: String,
    /// First 8 characters of the raw key, safe to store and display.
    pub display_prefix: String,
    /// SHA3-256 digest of the raw key's byte representation.
    pub hashed_material: [u8; 32],
}

impl std::fmt::Debug for GeneratedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeneratedKey")
            .field("raw", &"[REDACTED]")
            .field("display_prefix", &self.display_prefix)
            .finish()
    }
}

/// Generates a new raw API key from the OS cryptographic generator.
///
/// # Examples
///
/// ```rust
/// use goodmem_server::keys;
///
/// let key = keys::new_key();
/// assert!(key.raw.starts_with("gm_"));
/// assert_eq!(key.display_prefix.len(), 8);
/// ```
pub fn new_key() -> GeneratedKey {
    let mut material = [0u8; KEY_MATERIAL_BYTES];
    OsRng.fill_bytes(&mut material);

    let encoded = base32::encode(base32::Alphabet::RFC4648 { padding: false }, &material)
        .to_ascii_lowercase();
    let raw = format!("{}{}", KEY_PREFIX, encoded);
    let display_prefix = raw[..DISPLAY_PREFIX_LEN].to_string();
    let hashed_material = hash_raw_key(&raw);

    GeneratedKey {
        raw,
        display_prefix,
        hashed_material,
    }
}

/// Computes the 32-byte storage hash of a raw key.
///
/// The digest covers the full `gm_…` string, not just the payload, so a
/// key from a foreign system with an identical payload cannot collide.
pub fn hash_raw_key(raw: &str) -> [u8; 32] {
    let mut hasher = Sha3_256::new();
    hasher.update(raw.as_bytes());
    let digest = hasher.finalize();
    let mut out = [0u8; 32];
    out.copy_from_slice(&digest);
    out
}

/// Validates the shape of a raw key and returns its storage hash.
///
/// Used by the principal resolver to turn the `x-api-key` header value into
/// the lookup hash.
///
/// # Errors
///
/// Returns `InvalidArgument` when the string does not begin with `gm_` or
/// its payload is not lower-case unpadded base32 of the expected length.
pub fn verify(raw: &str) -> Result<[u8; 32], ApiError> {
    let payload = raw
        .strip_prefix(KEY_PREFIX)
        .ok_or_else(|| ApiError::invalid("API key must start with gm_"))?;

    if payload.chars().any(|c| c.is_ascii_uppercase()) {
        return Err(ApiError::invalid("API key payload must be lower-case"));
    }

    let decoded = base32::decode(
        base32::Alphabet::RFC4648 { padding: false },
        &payload.to_ascii_uppercase(),
    )
    .ok_or_else(|| ApiError::invalid("API key payload is not valid base32"))?;

    if decoded.len() != KEY_MATERIAL_BYTES {
        return Err(ApiError::invalid("API key payload has the wrong length"));
    }

    Ok(hash_raw_key(raw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn generated_key_has_expected_shape() {
        let key = new_key();
        assert!(key.raw.starts_with(KEY_PREFIX));
        // 3-char prefix + 26 base32 chars for 16 bytes.
        assert_eq!(key.raw.len(), 3 + 26);
        assert_eq!(key.display_prefix, &key.raw[..8]);
        assert!(key.raw[3..].chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
    }

    #[test]
    fn hashing_is_deterministic() {
        let key = new_key();
        assert_eq!(hash_raw_key(&key.raw), key.hashed_material);
        assert_eq!(verify(&key.raw).unwrap(), key.hashed_material);
    }

    #[test]
    fn no_collisions_over_many_samples() {
        let mut seen = HashSet::new();
        for _ in 0..1000 {
            let key = new_key();
            assert!(seen.insert(key.hashed_material), "hash collision observed");
        }
    }

    #[test]
    fn verify_rejects_foreign_formats() {
        assert!(verify("").is_err());
        assert!(verify("gm").is_err());
        assert!(verify("ak_abcdefghijklmnopqrstuvwxyz").is_err());
        // Upper-case payloads are rejected even when they decode.
        let key = new_key();
        assert!(verify(&key.raw.to_ascii_uppercase()).is_err());
        // Truncated payload decodes to fewer than 16 bytes.
        assert!(verify(&key.raw[..10]).is_err());
    }

    #[test]
    fn debug_output_redacts_raw_key() {
        let key = new_key();
        let rendered = format!("{:?}", key);
        assert!(!rendered.contains(&key.raw));
        assert!(rendered.contains("REDACTED"));
    }
}
