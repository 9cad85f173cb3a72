//! # Data Models Module
//!
//! This module defines the persistent entities of the memory store and the
//! small value types that travel with them. It includes the status enums
//! with their legal state transitions and the label-update strategy applied
//! by the Update operations.
//!
//! ## Model Categories
//!
//! ### Database Entities
//! Core business entities persisted in PostgreSQL:
//! - [`User`] - an account that owns spaces, embedders, and API keys
//! - [`ApiKeyRecord`] - stored API key metadata (hash + display prefix only)
//! - [`Embedder`] - configuration for turning content into vectors
//! - [`Space`] - a named, labeled container of memories
//! - [`Memory`] - a content blob attached to a space
//! - [`MemoryChunk`] - an indexed unit of text with an embedding vector
//!
//! ### Value Types
//! - [`ApiKeyStatus`], [`ProviderType`], [`Modality`],
//!   [`ProcessingStatus`], [`VectorStatus`] - closed enums stored as text
//! - [`LabelUpdate`] - the replace/merge/unchanged strategy for label maps
//!
//! ## Security Considerations
//!
//! - [`ApiKeyRecord`] never holds raw key material; only the SHA3-256 hash
//!   and an 8-character display prefix are persisted.
//! - [`Embedder::credentials`] holds the *encrypted* blob as stored; the
//!   plaintext exists only transiently inside the service handlers.
//! - `Debug` for secret-bearing records redacts the sensitive fields.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use uuid::Uuid;

use crate::error::ApiError;

/// String-to-string label/metadata map, stored as JSONB.
pub type Labels = HashMap<String, String>;

/// Lifecycle status of an API key.
///
/// Keys start `ACTIVE` and can be toggled via `UpdateApiKey`; only `ACTIVE`
/// and unexpired keys authenticate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiKeyStatus {
    Active,
    Inactive,
}

impl ApiKeyStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApiKeyStatus::Active => "ACTIVE",
            ApiKeyStatus::Inactive => "INACTIVE",
        }
    }

    pub fn parse(s: &str) -> Result<Self, ApiError> {
        match s {
            "ACTIVE" => Ok(ApiKeyStatus::Active),
            "INACTIVE" => Ok(ApiKeyStatus::Inactive),
            other => Err(ApiError::internal(format!("unknown api key status: {}", other))),
        }
    }
}

/// Embedding provider family. Immutable after embedder creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderType {
    OpenAi,
    Vllm,
    Tei,
}

impl ProviderType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderType::OpenAi => "OPENAI",
            ProviderType::Vllm => "VLLM",
            ProviderType::Tei => "TEI",
        }
    }

    pub fn parse(s: &str) -> Result<Self, ApiError> {
        match s {
            "OPENAI" => Ok(ProviderType::OpenAi),
            "VLLM" => Ok(ProviderType::Vllm),
            "TEI" => Ok(ProviderType::Tei),
            other => Err(ApiError::internal(format!("unknown provider type: {}", other))),
        }
    }
}

/// Content modality an embedder can vectorize. Defaults to `{TEXT}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Modality {
    Text,
    Image,
    Audio,
    Video,
}

impl Modality {
    pub fn as_str(&self) -> &'static str {
        match self {
            Modality::Text => "TEXT",
            Modality::Image => "IMAGE",
            Modality::Audio => "AUDIO",
            Modality::Video => "VIDEO",
        }
    }

    pub fn parse(s: &str) -> Result<Self, ApiError> {
        match s {
            "TEXT" => Ok(Modality::Text),
            "IMAGE" => Ok(Modality::Image),
            "AUDIO" => Ok(Modality::Audio),
            "VIDEO" => Ok(Modality::Video),
            other => Err(ApiError::internal(format!("unknown modality: {}", other))),
        }
    }
}

/// Processing state of a memory.
///
/// The core creates memories as `PENDING`; the external chunking/embedding
/// worker advances them. Legal transitions:
///
/// ```text
/// PENDING -> PROCESSING -> COMPLETED
///                       -> FAILED
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessingStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl ProcessingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessingStatus::Pending => "PENDING",
            ProcessingStatus::Processing => "PROCESSING",
            ProcessingStatus::Completed => "COMPLETED",
            ProcessingStatus::Failed => "FAILED",
        }
    }

    pub fn parse(s: &str) -> Result<Self, ApiError> {
        match s {
            "PENDING" => Ok(ProcessingStatus::Pending),
            "PROCESSING" => Ok(ProcessingStatus::Processing),
            "COMPLETED" => Ok(ProcessingStatus::Completed),
            "FAILED" => Ok(ProcessingStatus::Failed),
            other => Err(ApiError::internal(format!("unknown processing status: {}", other))),
        }
    }

    /// Whether the state machine permits moving to `next`.
    pub fn can_transition_to(&self, next: ProcessingStatus) -> bool {
        matches!(
            (self, next),
            (ProcessingStatus::Pending, ProcessingStatus::Processing)
                | (ProcessingStatus::Processing, ProcessingStatus::Completed)
                | (ProcessingStatus::Processing, ProcessingStatus::Failed)
        )
    }
}

/// Vectorization state of a memory chunk, owned by the external worker.
///
/// Legal transitions: `PENDING -> GENERATED` and `PENDING -> FAILED`.
/// A `GENERATED` chunk must carry an embedding vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VectorStatus {
    Pending,
    Generated,
    Failed,
}

impl VectorStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VectorStatus::Pending => "PENDING",
            VectorStatus::Generated => "GENERATED",
            VectorStatus::Failed => "FAILED",
        }
    }

    pub fn parse(s: &str) -> Result<Self, ApiError> {
        match s {
            "PENDING" => Ok(VectorStatus::Pending),
            "GENERATED" => Ok(VectorStatus::Generated),
            "FAILED" => Ok(VectorStatus::Failed),
            other => Err(ApiError::internal(format!("unknown vector status: {}", other))),
        }
    }

    pub fn can_transition_to(&self, next: VectorStatus) -> bool {
        matches!(
            (self, next),
            (VectorStatus::Pending, VectorStatus::Generated)
                | (VectorStatus::Pending, VectorStatus::Failed)
        )
    }
}

/// How an Update operation treats the entity's label map.
///
/// The wire carries this as a one-of: setting both `replace_labels` and
/// `merge_labels` is rejected at the boundary, setting neither means
/// `Unchanged`.
#[derive(Debug, Clone, PartialEq)]
pub enum LabelUpdate {
    /// Set the labels to exactly the given map.
    Replace(Labels),
    /// Union the given map into the current labels; the caller's values win
    /// on conflicting keys.
    Merge(Labels),
    /// Leave the labels untouched.
    Unchanged,
}

impl LabelUpdate {
    /// Applies the strategy to the current label map.
    pub fn apply(&self, current: &Labels) -> Labels {
        match self {
            LabelUpdate::Replace(next) => next.clone(),
            LabelUpdate::Merge(overlay) => {
                let mut merged = current.clone();
                for (k, v) in overlay {
                    merged.insert(k.clone(), v.clone());
                }
                merged
            }
            LabelUpdate::Unchanged => current.clone(),
        }
    }
}

/// A user account.
///
/// Users exclusively own their API keys, spaces, and embedders; roles are
/// stored separately in `user_role` and resolved into a
/// [`crate::auth::Principal`] at authentication time.
#[derive(Debug, Clone)]
pub struct User {
    pub user_id: Uuid,
    pub username: Option<String>,
    /// Unique, matched case-sensitively.
    pub email: String,
    pub display_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Stored API key metadata.
///
/// # Security Notes
///
/// The raw key is never persisted and never reconstructable from this
/// record: only the 32-byte SHA3-256 hash and the first 8 characters of
/// the raw key (for display) are stored. A key authenticates only while
/// `status == ACTIVE` and `expires_at` (if set) lies in the future.
#[derive(Clone)]
pub struct ApiKeyRecord {
    pub api_key_id: Uuid,
    pub user_id: Uuid,
    pub key_prefix: String,
    pub hashed_key_material: Vec<u8>,
    pub status: ApiKeyStatus,
    pub labels: Labels,
    pub expires_at: Option<DateTime<Utc>>,
    pub last_used_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub created_by: Uuid,
    pub updated_by: Uuid,
}

/// Custom Debug implementation that hides the stored hash.
impl std::fmt::Debug for ApiKeyRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiKeyRecord")
            .field("api_key_id", &self.api_key_id)
            .field("user_id", &self.user_id)
            .field("key_prefix", &self.key_prefix)
            .field("hashed_key_material", &"[REDACTED]")
            .field("status", &self.status)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

impl ApiKeyRecord {
    /// Whether this key currently authenticates requests.
    pub fn authenticates_at(&self, now: DateTime<Utc>) -> bool {
        if self.status != ApiKeyStatus::Active {
            return false;
        }
        match self.expires_at {
            Some(expiry) => expiry > now,
            None => true,
        }
    }
}

/// Embedding service configuration.
///
/// `provider_type` is immutable after creation; `(owner_id, display_name)`
/// is unique per owner. `credentials` holds the AES-GCM encrypted blob as
/// persisted — decryption happens only in the handlers that are allowed to
/// reveal it.
#[derive(Clone)]
pub struct Embedder {
    pub embedder_id: Uuid,
    pub display_name: String,
    pub description: Option<String>,
    pub provider_type: ProviderType,
    pub endpoint_url: String,
    pub api_path: String,
    pub model_identifier: String,
    /// Fixed output dimension; strictly positive.
    pub dimensionality: i32,
    pub max_sequence_length: Option<i32>,
    pub supported_modalities: Vec<Modality>,
    /// Encrypted at rest; see [`crate::crypto`].
    pub credentials: String,
    pub labels: Labels,
    pub version: Option<String>,
    pub monitoring_endpoint: Option<String>,
    pub owner_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub created_by: Uuid,
    pub updated_by: Uuid,
}

/// Custom Debug implementation that hides stored credentials.
impl std::fmt::Debug for Embedder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Embedder")
            .field("embedder_id", &self.embedder_id)
            .field("display_name", &self.display_name)
            .field("provider_type", &self.provider_type)
            .field("endpoint_url", &self.endpoint_url)
            .field("model_identifier", &self.model_identifier)
            .field("dimensionality", &self.dimensionality)
            .field("credentials", &"[REDACTED]")
            .field("owner_id", &self.owner_id)
            .finish()
    }
}

/// A named container of memories sharing one embedder.
///
/// `(owner_id, name)` is unique; `embedder_id` is immutable after creation;
/// `public_read` makes the space visible (read-only) to other principals.
#[derive(Debug, Clone)]
pub struct Space {
    pub space_id: Uuid,
    pub name: String,
    pub labels: Labels,
    pub embedder_id: Uuid,
    pub owner_id: Uuid,
    pub public_read: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub created_by: Uuid,
    pub updated_by: Uuid,
}

/// Maximum length of a space name.
pub const SPACE_NAME_MAX_LEN: usize = 255;

/// A logical document attached to a space.
///
/// Created as `PENDING`; the external worker chunks and vectorizes it.
/// Deleting a memory deletes its chunks.
#[derive(Debug, Clone)]
pub struct Memory {
    pub memory_id: Uuid,
    pub space_id: Uuid,
    pub original_content_ref: String,
    pub content_type: String,
    pub metadata: Labels,
    pub processing_status: ProcessingStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub created_by: Uuid,
    pub updated_by: Uuid,
}

/// An indexed unit of text with its embedding vector.
///
/// `(memory_id, chunk_sequence_number)` is unique. The embedding vector is
/// present exactly when `vector_status == GENERATED`, and its dimension
/// matches the owning space's embedder.
#[derive(Debug, Clone)]
pub struct MemoryChunk {
    pub chunk_id: Uuid,
    pub memory_id: Uuid,
    pub chunk_sequence_number: i32,
    pub chunk_text: String,
    pub embedding_vector: Option<Vec<f32>>,
    pub vector_status: VectorStatus,
    pub start_offset: Option<i32>,
    pub end_offset: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_enums_round_trip_through_text() {
        for status in [ApiKeyStatus::Active, ApiKeyStatus::Inactive] {
            assert_eq!(ApiKeyStatus::parse(status.as_str()).unwrap(), status);
        }
        for provider in [ProviderType::OpenAi, ProviderType::Vllm, ProviderType::Tei] {
            assert_eq!(ProviderType::parse(provider.as_str()).unwrap(), provider);
        }
        for modality in [Modality::Text, Modality::Image, Modality::Audio, Modality::Video] {
            assert_eq!(Modality::parse(modality.as_str()).unwrap(), modality);
        }
        assert!(ProcessingStatus::parse("UNKNOWN").is_err());
        assert!(VectorStatus::parse("").is_err());
    }

    #[test]
    fn processing_status_machine() {
        use ProcessingStatus::*;
        assert!(Pending.can_transition_to(Processing));
        assert!(Processing.can_transition_to(Completed));
        assert!(Processing.can_transition_to(Failed));
        assert!(!Pending.can_transition_to(Completed));
        assert!(!Completed.can_transition_to(Processing));
        assert!(!Failed.can_transition_to(Pending));
    }

    #[test]
    fn vector_status_machine() {
        use VectorStatus::*;
        assert!(Pending.can_transition_to(Generated));
        assert!(Pending.can_transition_to(Failed));
        assert!(!Generated.can_transition_to(Failed));
        assert!(!Failed.can_transition_to(Generated));
    }

    fn labels(pairs: &[(&str, &str)]) -> Labels {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn label_merge_overrides_and_unions() {
        let current = labels(&[("a", "1"), ("b", "2")]);
        let merged = LabelUpdate::Merge(labels(&[("b", "3"), ("c", "4")])).apply(&current);
        assert_eq!(merged, labels(&[("a", "1"), ("b", "3"), ("c", "4")]));
    }

    #[test]
    fn label_replace_discards_previous() {
        let current = labels(&[("a", "1"), ("b", "2")]);
        let replaced = LabelUpdate::Replace(labels(&[("a", "9")])).apply(&current);
        assert_eq!(replaced, labels(&[("a", "9")]));
    }

    #[test]
    fn label_unchanged_is_identity() {
        let current = labels(&[("a", "1")]);
        assert_eq!(LabelUpdate::Unchanged.apply(&current), current);
    }

    #[test]
    fn api_key_authentication_window() {
        let now = Utc::now();
        let base = ApiKeyRecord {
            api_key_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            key_prefix: "gm_abcde".to_string(),
            hashed_key_material: vec![0u8; 32],
            status: ApiKeyStatus::Active,
            labels: Labels::new(),
            expires_at: None,
            last_used_at: None,
            created_at: now,
            updated_at: now,
            created_by: Uuid::new_v4(),
            updated_by: Uuid::new_v4(),
        };

        assert!(base.authenticates_at(now));

        let mut inactive = base.clone();
        inactive.status = ApiKeyStatus::Inactive;
        assert!(!inactive.authenticates_at(now));

        let mut expired = base.clone();
        expired.expires_at = Some(now - chrono::Duration::seconds(1));
        assert!(!expired.authenticates_at(now));

        let mut future = base;
        future.expires_at = Some(now + chrono::Duration::hours(1));
        assert!(future.authenticates_at(now));
    }

    #[test]
    fn secret_bearing_debug_is_redacted() {
        let now = Utc::now();
        let record = ApiKeyRecord {
            api_key_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            key_prefix: "gm_abcde".to_string(),
            hashed_key_material: vec![7u8; 32],
            status: ApiKeyStatus::Active,
            labels: Labels::new(),
            expires_at: None,
            last_used_at: None,
            created_at: now,
            updated_at: now,
            created_by: Uuid::new_v4(),
            updated_by: Uuid::new_v4(),
        };
        assert!(format!("{:?}", record).contains("[REDACTED]"));
    }
}
