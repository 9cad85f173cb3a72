//! # Pagination Protocol
//!
//! List endpoints return opaque cursor tokens. A token captures the entire
//! query shape — offset, filters, sort — plus the requesting principal, so
//! a follow-up request enumerates the same logical result set even when the
//! client passes different filter parameters alongside the token (those are
//! ignored by contract).
//!
//! ## Token format
//!
//! One version byte (`0x01`) followed by the JSON serialization of
//! [`PageToken`], URL-safe base64 encoded without padding. Tokens with an
//! unknown version byte are rejected so fields can be added later without
//! breaking old clients. A token minted for principal A is rejected when
//! presented by principal B.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::error::ApiError;

/// Current token schema version.
const TOKEN_VERSION: u8 = 1;

/// Default page size when the caller leaves `max_results` unset or <= 0.
pub const DEFAULT_PAGE_SIZE: i64 = 50;

/// Upper bound on the page size; larger requests are clamped.
pub const MAX_PAGE_SIZE: i64 = 200;

/// The decoded interior of a cursor token.
///
/// `label_selectors` uses a `BTreeMap` so serialization is stable across
/// encode/decode cycles regardless of insertion order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageToken {
    /// Row offset of the next page.
    pub offset: i64,
    /// Owner filter carried over from the first request, if any.
    pub owner_id: Option<Uuid>,
    /// Label selectors carried over from the first request.
    pub label_selectors: BTreeMap<String, String>,
    /// SQL LIKE pattern derived from the caller's glob.
    pub name_filter: Option<String>,
    /// Principal the token was minted for.
    pub requestor_id: Uuid,
    /// Allow-listed sort column.
    pub sort_by: String,
    /// True for ascending order.
    pub sort_ascending: bool,
    /// Page size of the original request; follow-up pages keep it so an
    /// enumeration started at one size stays at that size.
    pub page_size: i64,
}

impl PageToken {
    /// Serializes the token into its opaque wire form.
    pub fn encode(&self) -> Result<String, ApiError> {
        let json = serde_json::to_vec(self)
            .map_err(|e| ApiError::internal(format!("failed to encode page token: {}", e)))?;
        let mut bytes = Vec::with_capacity(json.len() + 1);
        bytes.push(TOKEN_VERSION);
        bytes.extend_from_slice(&json);
        Ok(URL_SAFE_NO_PAD.encode(bytes))
    }

    /// Decodes an opaque token and binds it to the calling principal.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` when the token is not valid base64/JSON, carries an
    /// unknown version byte, or was minted for a different principal.
    pub fn decode(token: &str, requestor_id: Uuid) -> Result<PageToken, ApiError> {
        let bytes = URL_SAFE_NO_PAD
            .decode(token)
            .map_err(|_| ApiError::invalid("malformed pagination token"))?;
        let (version, json) = bytes
            .split_first()
            .ok_or_else(|| ApiError::invalid("malformed pagination token"))?;
        if *version != TOKEN_VERSION {
            return Err(ApiError::invalid(format!(
                "unsupported pagination token version: {}",
                version
            )));
        }
        let token: PageToken = serde_json::from_slice(json)
            .map_err(|_| ApiError::invalid("malformed pagination token"))?;
        if token.requestor_id != requestor_id {
            return Err(ApiError::invalid(
                "pagination token was issued to a different principal",
            ));
        }
        Ok(token)
    }
}

/// Normalizes a caller-supplied page size.
///
/// Unset, zero, or negative values become [`DEFAULT_PAGE_SIZE`]; anything
/// above [`MAX_PAGE_SIZE`] is clamped down to it.
pub fn clamp_page_size(requested: Option<i32>) -> i64 {
    match requested {
        Some(n) if n > 0 => (n as i64).min(MAX_PAGE_SIZE),
        _ => DEFAULT_PAGE_SIZE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_token(requestor: Uuid) -> PageToken {
        let mut labels = BTreeMap::new();
        labels.insert("env".to_string(), "prod".to_string());
        PageToken {
            offset: 3,
            owner_id: Some(Uuid::new_v4()),
            label_selectors: labels,
            name_filter: Some("S%".to_string()),
            requestor_id: requestor,
            sort_by: "name".to_string(),
            sort_ascending: true,
            page_size: 3,
        }
    }

    #[test]
    fn encode_decode_round_trip() {
        let requestor = Uuid::new_v4();
        let token = sample_token(requestor);
        let encoded = token.encode().unwrap();
        // URL-safe without padding.
        assert!(!encoded.contains('='));
        assert!(!encoded.contains('+'));
        assert!(!encoded.contains('/'));
        let decoded = PageToken::decode(&encoded, requestor).unwrap();
        assert_eq!(decoded, token);
    }

    #[test]
    fn rejects_foreign_principal() {
        let token = sample_token(Uuid::new_v4()).encode().unwrap();
        let err = PageToken::decode(&token, Uuid::new_v4()).unwrap_err();
        assert!(matches!(err, ApiError::InvalidArgument(_)));
    }

    #[test]
    fn rejects_unknown_version() {
        let requestor = Uuid::new_v4();
        let token = sample_token(requestor);
        let json = serde_json::to_vec(&token).unwrap();
        let mut bytes = vec![9u8];
        bytes.extend_from_slice(&json);
        let encoded = URL_SAFE_NO_PAD.encode(bytes);
        let err = PageToken::decode(&encoded, requestor).unwrap_err();
        assert!(err.to_string().contains("version"));
    }

    #[test]
    fn rejects_garbage() {
        let requestor = Uuid::new_v4();
        assert!(PageToken::decode("", requestor).is_err());
        assert!(PageToken::decode("!!!not-base64!!!", requestor).is_err());
        let encoded = URL_SAFE_NO_PAD.encode([TOKEN_VERSION, b'{']);
        assert!(PageToken::decode(&encoded, requestor).is_err());
    }

    #[test]
    fn page_size_clamping() {
        assert_eq!(clamp_page_size(None), 50);
        assert_eq!(clamp_page_size(Some(0)), 50);
        assert_eq!(clamp_page_size(Some(-7)), 50);
        assert_eq!(clamp_page_size(Some(25)), 25);
        assert_eq!(clamp_page_size(Some(200)), 200);
        assert_eq!(clamp_page_size(Some(1000)), 200);
    }
}
