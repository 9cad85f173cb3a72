//! # Identifier & Time Codec
//!
//! Identifiers are 16-byte binary values on the wire and in the database;
//! the canonical 36-character textual form appears only at human-facing
//! edges (REST paths and payloads). Timestamps travel as `{seconds, nanos}`
//! pairs on the gRPC surface and as millisecond-since-epoch integers on the
//! REST surface.
//!
//! All conversions are total on their declared domains and fail with
//! [`ApiError::InvalidArgument`] otherwise.

use chrono::{DateTime, TimeZone, Utc};
use prost_types::Timestamp;
use uuid::Uuid;

use crate::error::ApiError;

/// Converts a 16-byte binary identifier into its 36-character textual form.
///
/// # Errors
///
/// Returns `InvalidArgument` if the input is not exactly 16 bytes.
pub fn textual_from_binary(bytes: &[u8]) -> Result<String, ApiError> {
    let id = uuid_from_binary(bytes)?;
    Ok(id.to_string())
}

/// Parses the 36-character textual form back into a [`Uuid`].
///
/// # Errors
///
/// Returns `InvalidArgument` on any malformed input.
pub fn uuid_from_textual(text: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(text)
        .map_err(|_| ApiError::invalid(format!("malformed identifier: {}", text)))
}

/// Parses a 16-byte binary identifier into a [`Uuid`].
///
/// # Errors
///
/// Returns `InvalidArgument` if the input is not exactly 16 bytes.
pub fn uuid_from_binary(bytes: &[u8]) -> Result<Uuid, ApiError> {
    Uuid::from_slice(bytes).map_err(|_| {
        ApiError::invalid(format!(
            "identifier must be 16 bytes, got {}",
            bytes.len()
        ))
    })
}

/// Parses an *optional* binary identifier field from the wire.
///
/// Proto3 presence semantics: `None` stays `None`; a present value must be
/// a well-formed 16-byte identifier.
pub fn optional_uuid_from_binary(bytes: Option<&Vec<u8>>) -> Result<Option<Uuid>, ApiError> {
    match bytes {
        Some(b) => Ok(Some(uuid_from_binary(b)?)),
        None => Ok(None),
    }
}

/// Renders a [`Uuid`] as the 16-byte wire form.
pub fn binary_from_uuid(id: &Uuid) -> Vec<u8> {
    id.as_bytes().to_vec()
}

/// Converts a wall-clock instant into the wire timestamp form.
pub fn wire_timestamp_from_instant(instant: &DateTime<Utc>) -> Timestamp {
    Timestamp {
        seconds: instant.timestamp(),
        nanos: instant.timestamp_subsec_nanos() as i32,
    }
}

/// Converts a wire timestamp back into a wall-clock instant.
///
/// # Errors
///
/// Returns `InvalidArgument` when either field is negative or the pair does
/// not denote a representable instant.
pub fn instant_from_wire_timestamp(ts: &Timestamp) -> Result<DateTime<Utc>, ApiError> {
    if ts.seconds < 0 || ts.nanos < 0 {
        return Err(ApiError::invalid(
            "timestamp seconds and nanos must be non-negative",
        ));
    }
    Utc.timestamp_opt(ts.seconds, ts.nanos as u32)
        .single()
        .ok_or_else(|| ApiError::invalid("timestamp out of range"))
}

/// Millisecond-since-epoch form used on the REST surface.
pub fn millis_from_instant(instant: &DateTime<Utc>) -> i64 {
    instant.timestamp_millis()
}

/// Parses a millisecond-since-epoch integer from the REST surface.
pub fn instant_from_millis(millis: i64) -> Result<DateTime<Utc>, ApiError> {
    Utc.timestamp_millis_opt(millis)
        .single()
        .ok_or_else(|| ApiError::invalid("timestamp out of range"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binary_textual_round_trip() {
        let id = Uuid::new_v4();
        let text = textual_from_binary(id.as_bytes()).unwrap();
        assert_eq!(text.len(), 36);
        let back = uuid_from_textual(&text).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn rejects_wrong_length_binary() {
        assert!(uuid_from_binary(&[0u8; 15]).is_err());
        assert!(uuid_from_binary(&[0u8; 17]).is_err());
        assert!(uuid_from_binary(&[]).is_err());
    }

    #[test]
    fn rejects_malformed_textual() {
        assert!(uuid_from_textual("not-a-uuid").is_err());
        assert!(uuid_from_textual("").is_err());
    }

    #[test]
    fn optional_binary_passes_none_through() {
        assert_eq!(optional_uuid_from_binary(None).unwrap(), None);
        let id = Uuid::new_v4();
        let bytes = binary_from_uuid(&id);
        assert_eq!(optional_uuid_from_binary(Some(&bytes)).unwrap(), Some(id));
    }

    #[test]
    fn timestamp_round_trip_microsecond_precision() {
        let now = Utc::now();
        let wire = wire_timestamp_from_instant(&now);
        assert!(wire.seconds >= 0);
        assert!(wire.nanos >= 0);
        let back = instant_from_wire_timestamp(&wire).unwrap();
        assert_eq!(back.timestamp_micros(), now.timestamp_micros());
    }

    #[test]
    fn rejects_negative_wire_fields() {
        let ts = Timestamp { seconds: -1, nanos: 0 };
        assert!(instant_from_wire_timestamp(&ts).is_err());
        let ts = Timestamp { seconds: 0, nanos: -1 };
        assert!(instant_from_wire_timestamp(&ts).is_err());
    }

    #[test]
    fn millis_round_trip() {
        let now = Utc::now();
        let millis = millis_from_instant(&now);
        let back = instant_from_millis(millis).unwrap();
        assert_eq!(back.timestamp_millis(), millis);
    }
}
