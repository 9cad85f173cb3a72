//! Conversions between the `goodmem.v1` wire model and the domain models.
//!
//! Inbound enum values are validated here: the reserved zero value and any
//! unknown discriminant are `InvalidArgument`, so handlers only ever see
//! well-formed domain enums.

use std::collections::HashMap;

use crate::api::v1;
use crate::error::ApiError;
use crate::ids;
use crate::models::{
    ApiKeyRecord, ApiKeyStatus, Embedder, Labels, Memory, MemoryChunk, Modality,
    ProcessingStatus, ProviderType, Space, User, VectorStatus,
};

// ---------------------------------------------------------------------------
// Enums, wire -> domain
// ---------------------------------------------------------------------------

pub fn api_key_status_from_wire(value: i32) -> Result<ApiKeyStatus, ApiError> {
    match v1::ApiKeyStatus::try_from(value) {
        Ok(v1::ApiKeyStatus::Active) => Ok(ApiKeyStatus::Active),
        Ok(v1::ApiKeyStatus::Inactive) => Ok(ApiKeyStatus::Inactive),
        _ => Err(ApiError::invalid(format!("invalid api key status: {}", value))),
    }
}

pub fn provider_type_from_wire(value: i32) -> Result<ProviderType, ApiError> {
    match v1::ProviderType::try_from(value) {
        Ok(v1::ProviderType::Openai) => Ok(ProviderType::OpenAi),
        Ok(v1::ProviderType::Vllm) => Ok(ProviderType::Vllm),
        Ok(v1::ProviderType::Tei) => Ok(ProviderType::Tei),
        _ => Err(ApiError::invalid(format!("invalid provider type: {}", value))),
    }
}

pub fn modality_from_wire(value: i32) -> Result<Modality, ApiError> {
    match v1::Modality::try_from(value) {
        Ok(v1::Modality::Text) => Ok(Modality::Text),
        Ok(v1::Modality::Image) => Ok(Modality::Image),
        Ok(v1::Modality::Audio) => Ok(Modality::Audio),
        Ok(v1::Modality::Video) => Ok(Modality::Video),
        _ => Err(ApiError::invalid(format!("invalid modality: {}", value))),
    }
}

/// Maps an optional wire sort order onto the ascending flag.
///
/// Absent means ascending; the reserved zero value and unknown
/// discriminants are rejected.
pub fn sort_ascending_from_wire(value: Option<i32>) -> Result<bool, ApiError> {
    match value {
        None => Ok(true),
        Some(v) => match v1::SortOrder::try_from(v) {
            Ok(v1::SortOrder::Ascending) => Ok(true),
            Ok(v1::SortOrder::Descending) => Ok(false),
            _ => Err(ApiError::invalid(format!("unrecognized sort order: {}", v))),
        },
    }
}

// ---------------------------------------------------------------------------
// Enums, domain -> wire
// ---------------------------------------------------------------------------

pub fn api_key_status_to_wire(status: ApiKeyStatus) -> i32 {
    match status {
        ApiKeyStatus::Active => v1::ApiKeyStatus::Active as i32,
        ApiKeyStatus::Inactive => v1::ApiKeyStatus::Inactive as i32,
    }
}

pub fn provider_type_to_wire(provider: ProviderType) -> i32 {
    match provider {
        ProviderType::OpenAi => v1::ProviderType::Openai as i32,
        ProviderType::Vllm => v1::ProviderType::Vllm as i32,
        ProviderType::Tei => v1::ProviderType::Tei as i32,
    }
}

pub fn modality_to_wire(modality: Modality) -> i32 {
    match modality {
        Modality::Text => v1::Modality::Text as i32,
        Modality::Image => v1::Modality::Image as i32,
        Modality::Audio => v1::Modality::Audio as i32,
        Modality::Video => v1::Modality::Video as i32,
    }
}

pub fn processing_status_to_wire(status: ProcessingStatus) -> i32 {
    match status {
        ProcessingStatus::Pending => v1::ProcessingStatus::Pending as i32,
        ProcessingStatus::Processing => v1::ProcessingStatus::Processing as i32,
        ProcessingStatus::Completed => v1::ProcessingStatus::Completed as i32,
        ProcessingStatus::Failed => v1::ProcessingStatus::Failed as i32,
    }
}

pub fn vector_status_to_wire(status: VectorStatus) -> i32 {
    match status {
        VectorStatus::Pending => v1::VectorStatus::Pending as i32,
        VectorStatus::Generated => v1::VectorStatus::Generated as i32,
        VectorStatus::Failed => v1::VectorStatus::Failed as i32,
    }
}

// ---------------------------------------------------------------------------
// Label maps
// ---------------------------------------------------------------------------

pub fn labels_to_wire(labels: &Labels) -> HashMap<String, String> {
    labels.clone()
}

pub fn labels_from_wire(labels: HashMap<String, String>) -> Labels {
    labels
}

// ---------------------------------------------------------------------------
// Entities, domain -> wire
// ---------------------------------------------------------------------------

pub fn user_to_wire(user: &User) -> v1::User {
    v1::User {
        user_id: ids::binary_from_uuid(&user.user_id),
        username: user.username.clone(),
        email: user.email.clone(),
        display_name: user.display_name.clone(),
        created_at: Some(ids::wire_timestamp_from_instant(&user.created_at)),
        updated_at: Some(ids::wire_timestamp_from_instant(&user.updated_at)),
    }
}

/// Never includes raw key material or the stored hash.
pub fn api_key_to_wire(key: &ApiKeyRecord) -> v1::ApiKey {
    v1::ApiKey {
        api_key_id: ids::binary_from_uuid(&key.api_key_id),
        user_id: ids::binary_from_uuid(&key.user_id),
        key_prefix: key.key_prefix.clone(),
        status: api_key_status_to_wire(key.status),
        labels: labels_to_wire(&key.labels),
        expires_at: key.expires_at.as_ref().map(ids::wire_timestamp_from_instant),
        last_used_at: key.last_used_at.as_ref().map(ids::wire_timestamp_from_instant),
        created_at: Some(ids::wire_timestamp_from_instant(&key.created_at)),
        updated_at: Some(ids::wire_timestamp_from_instant(&key.updated_at)),
    }
}

/// `credentials` carries the plaintext to reveal, or `None` to redact
/// (always `None` for list responses).
pub fn embedder_to_wire(embedder: &Embedder, credentials: Option<String>) -> v1::Embedder {
    v1::Embedder {
        embedder_id: ids::binary_from_uuid(&embedder.embedder_id),
        display_name: embedder.display_name.clone(),
        description: embedder.description.clone(),
        provider_type: provider_type_to_wire(embedder.provider_type),
        endpoint_url: embedder.endpoint_url.clone(),
        api_path: embedder.api_path.clone(),
        model_identifier: embedder.model_identifier.clone(),
        dimensionality: embedder.dimensionality,
        max_sequence_length: embedder.max_sequence_length,
        supported_modalities: embedder
            .supported_modalities
            .iter()
            .map(|m| modality_to_wire(*m))
            .collect(),
        credentials: credentials.unwrap_or_default(),
        labels: labels_to_wire(&embedder.labels),
        version: embedder.version.clone(),
        monitoring_endpoint: embedder.monitoring_endpoint.clone(),
        owner_id: ids::binary_from_uuid(&embedder.owner_id),
        created_at: Some(ids::wire_timestamp_from_instant(&embedder.created_at)),
        updated_at: Some(ids::wire_timestamp_from_instant(&embedder.updated_at)),
        created_by: ids::binary_from_uuid(&embedder.created_by),
        updated_by: ids::binary_from_uuid(&embedder.updated_by),
    }
}

pub fn space_to_wire(space: &Space) -> v1::Space {
    v1::Space {
        space_id: ids::binary_from_uuid(&space.space_id),
        name: space.name.clone(),
        labels: labels_to_wire(&space.labels),
        embedder_id: ids::binary_from_uuid(&space.embedder_id),
        owner_id: ids::binary_from_uuid(&space.owner_id),
        public_read: space.public_read,
        created_at: Some(ids::wire_timestamp_from_instant(&space.created_at)),
        updated_at: Some(ids::wire_timestamp_from_instant(&space.updated_at)),
        created_by: ids::binary_from_uuid(&space.created_by),
        updated_by: ids::binary_from_uuid(&space.updated_by),
    }
}

pub fn memory_to_wire(memory: &Memory) -> v1::Memory {
    v1::Memory {
        memory_id: ids::binary_from_uuid(&memory.memory_id),
        space_id: ids::binary_from_uuid(&memory.space_id),
        original_content_ref: memory.original_content_ref.clone(),
        content_type: memory.content_type.clone(),
        metadata: labels_to_wire(&memory.metadata),
        processing_status: processing_status_to_wire(memory.processing_status),
        created_at: Some(ids::wire_timestamp_from_instant(&memory.created_at)),
        updated_at: Some(ids::wire_timestamp_from_instant(&memory.updated_at)),
        created_by: ids::binary_from_uuid(&memory.created_by),
        updated_by: ids::binary_from_uuid(&memory.updated_by),
    }
}

pub fn chunk_to_wire(chunk: &MemoryChunk) -> v1::MemoryChunk {
    v1::MemoryChunk {
        chunk_id: ids::binary_from_uuid(&chunk.chunk_id),
        memory_id: ids::binary_from_uuid(&chunk.memory_id),
        chunk_sequence_number: chunk.chunk_sequence_number,
        chunk_text: chunk.chunk_text.clone(),
        embedding_vector: chunk.embedding_vector.clone().unwrap_or_default(),
        vector_status: vector_status_to_wire(chunk.vector_status),
        start_offset: chunk.start_offset,
        end_offset: chunk.end_offset,
        created_at: Some(ids::wire_timestamp_from_instant(&chunk.created_at)),
        updated_at: Some(ids::wire_timestamp_from_instant(&chunk.updated_at)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    #[test]
    fn rejects_unspecified_enum_inputs() {
        assert!(api_key_status_from_wire(0).is_err());
        assert!(provider_type_from_wire(0).is_err());
        assert!(modality_from_wire(0).is_err());
        assert!(sort_ascending_from_wire(Some(0)).is_err());
        assert!(api_key_status_from_wire(99).is_err());
    }

    #[test]
    fn enum_round_trips() {
        for status in [ApiKeyStatus::Active, ApiKeyStatus::Inactive] {
            assert_eq!(
                api_key_status_from_wire(api_key_status_to_wire(status)).unwrap(),
                status
            );
        }
        for provider in [ProviderType::OpenAi, ProviderType::Vllm, ProviderType::Tei] {
            assert_eq!(
                provider_type_from_wire(provider_type_to_wire(provider)).unwrap(),
                provider
            );
        }
        for modality in [Modality::Text, Modality::Image, Modality::Audio, Modality::Video] {
            assert_eq!(
                modality_from_wire(modality_to_wire(modality)).unwrap(),
                modality
            );
        }
    }

    #[test]
    fn sort_order_defaults_to_ascending() {
        assert!(sort_ascending_from_wire(None).unwrap());
        assert!(sort_ascending_from_wire(Some(v1::SortOrder::Ascending as i32)).unwrap());
        assert!(!sort_ascending_from_wire(Some(v1::SortOrder::Descending as i32)).unwrap());
    }

    #[test]
    fn space_wire_view_carries_binary_ids() {
        let now = Utc::now();
        let space = Space {
            space_id: Uuid::new_v4(),
            name: "Alpha".to_string(),
            labels: Labels::new(),
            embedder_id: Uuid::new_v4(),
            owner_id: Uuid::new_v4(),
            public_read: false,
            created_at: now,
            updated_at: now,
            created_by: Uuid::new_v4(),
            updated_by: Uuid::new_v4(),
        };
        let wire = space_to_wire(&space);
        assert_eq!(wire.space_id.len(), 16);
        assert_eq!(wire.space_id, space.space_id.as_bytes().to_vec());
        assert_eq!(wire.name, "Alpha");
        assert!(wire.created_at.is_some());
    }

    #[test]
    fn redacted_embedder_has_empty_credentials() {
        let now = Utc::now();
        let embedder = Embedder {
            embedder_id: Uuid::new_v4(),
            display_name: "prod-encoder".to_string(),
            description: None,
            provider_type: ProviderType::OpenAi,
            endpoint_url: "https://api.openai.com".to_string(),
            api_path: "/v1/embeddings".to_string(),
            model_identifier: "text-embedding-3-small".to_string(),
            dimensionality: 1536,
            max_sequence_length: None,
            supported_modalities: vec![Modality::Text],
            credentials: "ciphertext-blob".to_string(),
            labels: Labels::new(),
            version: None,
            monitoring_endpoint: None,
            owner_id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
            created_by: Uuid::new_v4(),
            updated_by: Uuid::new_v4(),
        };
        let redacted = embedder_to_wire(&embedder, None);
        assert!(redacted.credentials.is_empty());
        let revealed = embedder_to_wire(&embedder, Some("sk-plain".to_string()));
        assert_eq!(revealed.credentials, "sk-plain");
    }
}
