//! # REST View Models
//!
//! JSON shapes of the REST adapter: camelCase field names, 36-character
//! textual identifiers, and millisecond-since-epoch integers for
//! timestamps. Every view is built from the corresponding `goodmem.v1`
//! wire message, so the two surfaces cannot drift apart.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::api::v1;
use crate::error::ApiError;
use crate::ids;

/// Millisecond form of an optional wire timestamp.
fn millis(ts: Option<&prost_types::Timestamp>) -> Result<Option<i64>, ApiError> {
    ts.map(|t| ids::instant_from_wire_timestamp(t).map(|dt| ids::millis_from_instant(&dt)))
        .transpose()
}

/// Millisecond form of a required wire timestamp.
fn required_millis(ts: Option<&prost_types::Timestamp>) -> Result<i64, ApiError> {
    millis(ts)?.ok_or_else(|| ApiError::internal("missing timestamp in wire message"))
}

fn textual(id: &[u8]) -> Result<String, ApiError> {
    ids::textual_from_binary(id)
}

fn optional_textual(id: &[u8]) -> Result<Option<String>, ApiError> {
    if id.is_empty() {
        Ok(None)
    } else {
        Ok(Some(ids::textual_from_binary(id)?))
    }
}

// ---------------------------------------------------------------------------
// Views (responses)
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub user_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl UserView {
    pub fn from_wire(user: &v1::User) -> Result<Self, ApiError> {
        Ok(UserView {
            user_id: textual(&user.user_id)?,
            username: user.username.clone(),
            email: user.email.clone(),
            display_name: user.display_name.clone(),
            created_at: required_millis(user.created_at.as_ref())?,
            updated_at: required_millis(user.updated_at.as_ref())?,
        })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiKeyView {
    pub api_key_id: String,
    pub user_id: String,
    pub key_prefix: String,
    pub status: String,
    pub labels: HashMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_used_at: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl ApiKeyView {
    pub fn from_wire(key: &v1::ApiKey) -> Result<Self, ApiError> {
        let status = match v1::ApiKeyStatus::try_from(key.status) {
            Ok(v1::ApiKeyStatus::Active) => "ACTIVE",
            Ok(v1::ApiKeyStatus::Inactive) => "INACTIVE",
            _ => return Err(ApiError::internal("invalid api key status in wire message")),
        };
        Ok(ApiKeyView {
            api_key_id: textual(&key.api_key_id)?,
            user_id: textual(&key.user_id)?,
            key_prefix: key.key_prefix.clone(),
            status: status.to_string(),
            labels: key.labels.clone(),
            expires_at: millis(key.expires_at.as_ref())?,
            last_used_at: millis(key.last_used_at.as_ref())?,
            created_at: required_millis(key.created_at.as_ref())?,
            updated_at: required_millis(key.updated_at.as_ref())?,
        })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateApiKeyView {
    pub api_key: ApiKeyView,
    /// Present exactly once, at creation.
    pub raw_api_key: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmbedderView {
    pub embedder_id: String,
    pub display_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub provider_type: String,
    pub endpoint_url: String,
    pub api_path: String,
    pub model_identifier: String,
    pub dimensionality: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_sequence_length: Option<i32>,
    pub supported_modalities: Vec<String>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub credentials: String,
    pub labels: HashMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monitoring_endpoint: Option<String>,
    pub owner_id: String,
    pub created_at: i64,
    pub updated_at: i64,
}

impl EmbedderView {
    pub fn from_wire(embedder: &v1::Embedder) -> Result<Self, ApiError> {
        let provider_type = match v1::ProviderType::try_from(embedder.provider_type) {
            Ok(v1::ProviderType::Openai) => "OPENAI",
            Ok(v1::ProviderType::Vllm) => "VLLM",
            Ok(v1::ProviderType::Tei) => "TEI",
            _ => return Err(ApiError::internal("invalid provider type in wire message")),
        };
        let supported_modalities = embedder
            .supported_modalities
            .iter()
            .map(|m| match v1::Modality::try_from(*m) {
                Ok(v1::Modality::Text) => Ok("TEXT".to_string()),
                Ok(v1::Modality::Image) => Ok("IMAGE".to_string()),
                Ok(v1::Modality::Audio) => Ok("AUDIO".to_string()),
                Ok(v1::Modality::Video) => Ok("VIDEO".to_string()),
                _ => Err(ApiError::internal("invalid modality in wire message")),
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(EmbedderView {
            embedder_id: textual(&embedder.embedder_id)?,
            display_name: embedder.display_name.clone(),
            description: embedder.description.clone(),
            provider_type: provider_type.to_string(),
            endpoint_url: embedder.endpoint_url.clone(),
            api_path: embedder.api_path.clone(),
            model_identifier: embedder.model_identifier.clone(),
            dimensionality: embedder.dimensionality,
            max_sequence_length: embedder.max_sequence_length,
            supported_modalities,
            credentials: embedder.credentials.clone(),
            labels: embedder.labels.clone(),
            version: embedder.version.clone(),
            monitoring_endpoint: embedder.monitoring_endpoint.clone(),
            owner_id: textual(&embedder.owner_id)?,
            created_at: required_millis(embedder.created_at.as_ref())?,
            updated_at: required_millis(embedder.updated_at.as_ref())?,
        })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpaceView {
    pub space_id: String,
    pub name: String,
    pub labels: HashMap<String, String>,
    pub embedder_id: String,
    pub owner_id: String,
    pub public_read: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

impl SpaceView {
    pub fn from_wire(space: &v1::Space) -> Result<Self, ApiError> {
        Ok(SpaceView {
            space_id: textual(&space.space_id)?,
            name: space.name.clone(),
            labels: space.labels.clone(),
            embedder_id: textual(&space.embedder_id)?,
            owner_id: textual(&space.owner_id)?,
            public_read: space.public_read,
            created_at: required_millis(space.created_at.as_ref())?,
            updated_at: required_millis(space.updated_at.as_ref())?,
        })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListSpacesView {
    pub spaces: Vec<SpaceView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_token: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryView {
    pub memory_id: String,
    pub space_id: String,
    pub original_content_ref: String,
    pub content_type: String,
    pub metadata: HashMap<String, String>,
    pub processing_status: String,
    pub created_at: i64,
    pub updated_at: i64,
}

impl MemoryView {
    pub fn from_wire(memory: &v1::Memory) -> Result<Self, ApiError> {
        let processing_status = match v1::ProcessingStatus::try_from(memory.processing_status) {
            Ok(v1::ProcessingStatus::Pending) => "PENDING",
            Ok(v1::ProcessingStatus::Processing) => "PROCESSING",
            Ok(v1::ProcessingStatus::Completed) => "COMPLETED",
            Ok(v1::ProcessingStatus::Failed) => "FAILED",
            _ => return Err(ApiError::internal("invalid processing status in wire message")),
        };
        Ok(MemoryView {
            memory_id: textual(&memory.memory_id)?,
            space_id: textual(&memory.space_id)?,
            original_content_ref: memory.original_content_ref.clone(),
            content_type: memory.content_type.clone(),
            metadata: memory.metadata.clone(),
            processing_status: processing_status.to_string(),
            created_at: required_millis(memory.created_at.as_ref())?,
            updated_at: required_millis(memory.updated_at.as_ref())?,
        })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryChunkView {
    pub chunk_id: String,
    pub memory_id: String,
    pub chunk_sequence_number: i32,
    pub chunk_text: String,
    pub embedding_vector: Vec<f32>,
    pub vector_status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_offset: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_offset: Option<i32>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl MemoryChunkView {
    pub fn from_wire(chunk: &v1::MemoryChunk) -> Result<Self, ApiError> {
        let vector_status = match v1::VectorStatus::try_from(chunk.vector_status) {
            Ok(v1::VectorStatus::Pending) => "PENDING",
            Ok(v1::VectorStatus::Generated) => "GENERATED",
            Ok(v1::VectorStatus::Failed) => "FAILED",
            _ => return Err(ApiError::internal("invalid vector status in wire message")),
        };
        Ok(MemoryChunkView {
            chunk_id: textual(&chunk.chunk_id)?,
            memory_id: textual(&chunk.memory_id)?,
            chunk_sequence_number: chunk.chunk_sequence_number,
            chunk_text: chunk.chunk_text.clone(),
            embedding_vector: chunk.embedding_vector.clone(),
            vector_status: vector_status.to_string(),
            start_offset: chunk.start_offset,
            end_offset: chunk.end_offset,
            created_at: required_millis(chunk.created_at.as_ref())?,
            updated_at: required_millis(chunk.updated_at.as_ref())?,
        })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeSystemView {
    pub already_initialized: bool,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub root_api_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub message: String,
}

impl InitializeSystemView {
    pub fn from_wire(response: &v1::InitializeSystemResponse) -> Result<Self, ApiError> {
        Ok(InitializeSystemView {
            already_initialized: response.already_initialized,
            root_api_key: response.root_api_key.clone(),
            user_id: optional_textual(&response.user_id)?,
            message: response.message.clone(),
        })
    }
}

// ---------------------------------------------------------------------------
// Request bodies
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateApiKeyBody {
    #[serde(default)]
    pub labels: HashMap<String, String>,
    pub expires_at: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateApiKeyBody {
    pub status: Option<String>,
    pub replace_labels: Option<HashMap<String, String>>,
    pub merge_labels: Option<HashMap<String, String>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEmbedderBody {
    pub display_name: String,
    pub description: Option<String>,
    pub provider_type: String,
    pub endpoint_url: String,
    pub api_path: Option<String>,
    pub model_identifier: String,
    pub dimensionality: i32,
    pub max_sequence_length: Option<i32>,
    #[serde(default)]
    pub supported_modalities: Vec<String>,
    pub credentials: String,
    #[serde(default)]
    pub labels: HashMap<String, String>,
    pub version: Option<String>,
    pub monitoring_endpoint: Option<String>,
    pub owner_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEmbedderBody {
    pub display_name: Option<String>,
    pub description: Option<String>,
    pub endpoint_url: Option<String>,
    pub api_path: Option<String>,
    pub model_identifier: Option<String>,
    pub dimensionality: Option<i32>,
    pub max_sequence_length: Option<i32>,
    #[serde(default)]
    pub supported_modalities: Vec<String>,
    pub credentials: Option<String>,
    pub version: Option<String>,
    pub monitoring_endpoint: Option<String>,
    pub provider_type: Option<String>,
    pub replace_labels: Option<HashMap<String, String>>,
    pub merge_labels: Option<HashMap<String, String>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSpaceBody {
    pub name: String,
    pub embedder_id: String,
    #[serde(default)]
    pub labels: HashMap<String, String>,
    pub public_read: Option<bool>,
    pub owner_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSpaceBody {
    pub name: Option<String>,
    pub public_read: Option<bool>,
    pub replace_labels: Option<HashMap<String, String>>,
    pub merge_labels: Option<HashMap<String, String>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMemoryBody {
    pub space_id: String,
    pub original_content_ref: String,
    pub content_type: String,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchMemoryChunksBody {
    pub space_id: String,
    pub query_vector: Vec<f32>,
    pub top_k: Option<i32>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    #[test]
    fn space_view_uses_textual_ids_and_millis() {
        let now = Utc::now();
        let wire = v1::Space {
            space_id: Uuid::new_v4().as_bytes().to_vec(),
            name: "Alpha".to_string(),
            labels: HashMap::new(),
            embedder_id: Uuid::new_v4().as_bytes().to_vec(),
            owner_id: Uuid::new_v4().as_bytes().to_vec(),
            public_read: true,
            created_at: Some(crate::ids::wire_timestamp_from_instant(&now)),
            updated_at: Some(crate::ids::wire_timestamp_from_instant(&now)),
            created_by: Uuid::new_v4().as_bytes().to_vec(),
            updated_by: Uuid::new_v4().as_bytes().to_vec(),
        };
        let view = SpaceView::from_wire(&wire).unwrap();
        assert_eq!(view.space_id.len(), 36);
        assert_eq!(view.created_at, now.timestamp_millis());

        let json = serde_json::to_value(&view).unwrap();
        assert!(json.get("spaceId").is_some());
        assert!(json.get("publicRead").is_some());
        assert!(json.get("space_id").is_none());
    }

    #[test]
    fn init_view_omits_empty_key_material() {
        let wire = v1::InitializeSystemResponse {
            already_initialized: true,
            root_api_key: String::new(),
            user_id: Vec::new(),
            message: "System is already initialized".to_string(),
        };
        let view = InitializeSystemView::from_wire(&wire).unwrap();
        let json = serde_json::to_value(&view).unwrap();
        assert!(json.get("rootApiKey").is_none());
        assert!(json.get("userId").is_none());
        assert_eq!(json["alreadyInitialized"], serde_json::json!(true));
    }

    #[test]
    fn camel_case_bodies_deserialize() {
        let body: CreateSpaceBody = serde_json::from_str(
            r#"{"name":"Alpha","embedderId":"00000000-0000-0000-0000-000000000000","publicRead":true}"#,
        )
        .unwrap();
        assert_eq!(body.name, "Alpha");
        assert_eq!(body.public_read, Some(true));
        assert!(body.labels.is_empty());

        let body: UpdateApiKeyBody =
            serde_json::from_str(r#"{"status":"INACTIVE","mergeLabels":{"b":"3"}}"#).unwrap();
        assert_eq!(body.status.as_deref(), Some("INACTIVE"));
        assert!(body.replace_labels.is_none());
        assert_eq!(body.merge_labels.unwrap()["b"], "3");
    }
}
