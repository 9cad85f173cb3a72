//! # REST Handlers
//!
//! One axum handler per gRPC method, each a thin shim: parse the HTTP
//! surface (textual identifiers, camelCase JSON, query parameters) into
//! the corresponding `goodmem.v1` request, call the shared service method
//! with the principal the middleware attached, and render the wire
//! response as a REST view. No business logic lives here.
//!
//! ## Conventions
//!
//! - `200 OK` with a JSON body on read, list, create, and update
//! - `204 No Content` on delete
//! - errors follow the taxonomy mapping in [`crate::error`]
//! - list filters accept repeated `label.<key>=<value>` query parameters

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json as ResponseJson;
use axum::{Extension, Json};
use std::collections::HashMap;
use std::sync::Arc;

use crate::api::v1;
use crate::auth::Principal;
use crate::error::ApiError;
use crate::ids;

use super::models::*;
use super::RestState;

/// Parses a textual identifier from a path or query segment into the
/// 16-byte wire form.
fn binary_id(text: &str) -> Result<Vec<u8>, ApiError> {
    Ok(ids::binary_from_uuid(&ids::uuid_from_textual(text)?))
}

fn provider_type_value(name: &str) -> Result<i32, ApiError> {
    match name {
        "OPENAI" => Ok(v1::ProviderType::Openai as i32),
        "VLLM" => Ok(v1::ProviderType::Vllm as i32),
        "TEI" => Ok(v1::ProviderType::Tei as i32),
        other => Err(ApiError::invalid(format!("unknown provider type: {}", other))),
    }
}

fn modality_value(name: &str) -> Result<i32, ApiError> {
    match name {
        "TEXT" => Ok(v1::Modality::Text as i32),
        "IMAGE" => Ok(v1::Modality::Image as i32),
        "AUDIO" => Ok(v1::Modality::Audio as i32),
        "VIDEO" => Ok(v1::Modality::Video as i32),
        other => Err(ApiError::invalid(format!("unknown modality: {}", other))),
    }
}

fn api_key_status_value(name: &str) -> Result<i32, ApiError> {
    match name {
        "ACTIVE" => Ok(v1::ApiKeyStatus::Active as i32),
        "INACTIVE" => Ok(v1::ApiKeyStatus::Inactive as i32),
        other => Err(ApiError::invalid(format!("unknown api key status: {}", other))),
    }
}

fn sort_order_value(name: &str) -> Result<i32, ApiError> {
    match name {
        "asc" => Ok(v1::SortOrder::Ascending as i32),
        "desc" => Ok(v1::SortOrder::Descending as i32),
        other => Err(ApiError::invalid(format!("unrecognized sort order: {}", other))),
    }
}

/// Collects `label.<key>=<value>` query parameters into a selector map.
fn label_selectors(params: &HashMap<String, String>) -> HashMap<String, String> {
    params
        .iter()
        .filter_map(|(k, v)| {
            k.strip_prefix("label.")
                .map(|key| (key.to_string(), v.clone()))
        })
        .collect()
}

/// Builds a label-update one-of, rejecting the both-at-once case the gRPC
/// surface excludes by construction.
macro_rules! label_strategy {
    ($oneof:path, $replace:expr, $merge:expr) => {{
        use $oneof as Strategy;
        match ($replace, $merge) {
            (Some(_), Some(_)) => Err(ApiError::invalid(
                "only one of replaceLabels and mergeLabels may be set",
            )),
            (Some(labels), None) => Ok(Some(Strategy::ReplaceLabels(v1::StringMap { labels }))),
            (None, Some(labels)) => Ok(Some(Strategy::MergeLabels(v1::StringMap { labels }))),
            (None, None) => Ok(None),
        }
    }};
}

// ---------------------------------------------------------------------------
// System
// ---------------------------------------------------------------------------

/// `POST /v1/system/init` — the only unauthenticated route.
pub async fn initialize_system(
    State(state): State<Arc<RestState>>,
) -> Result<ResponseJson<InitializeSystemView>, ApiError> {
    let response = state
        .system
        .initialize_system(v1::InitializeSystemRequest {})
        .await?;
    Ok(ResponseJson(InitializeSystemView::from_wire(&response)?))
}

// ---------------------------------------------------------------------------
// User
// ---------------------------------------------------------------------------

/// `GET /v1/users?user_id=<id>&email=<email>`
pub async fn get_user(
    State(state): State<Arc<RestState>>,
    Extension(who): Extension<Principal>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<ResponseJson<UserView>, ApiError> {
    let request = v1::GetUserRequest {
        user_id: params
            .get("user_id")
            .map(|id| binary_id(id))
            .transpose()?,
        email: params.get("email").cloned(),
    };
    let user = state.users.get_user(&who, request).await?;
    Ok(ResponseJson(UserView::from_wire(&user)?))
}

// ---------------------------------------------------------------------------
// ApiKey
// ---------------------------------------------------------------------------

/// `POST /v1/apikeys`
pub async fn create_api_key(
    State(state): State<Arc<RestState>>,
    Extension(who): Extension<Principal>,
    Json(body): Json<CreateApiKeyBody>,
) -> Result<ResponseJson<CreateApiKeyView>, ApiError> {
    let expires_at = body
        .expires_at
        .map(|ms| {
            ids::instant_from_millis(ms).map(|dt| ids::wire_timestamp_from_instant(&dt))
        })
        .transpose()?;
    let request = v1::CreateApiKeyRequest {
        labels: body.labels,
        expires_at,
    };
    let response = state.api_keys.create_api_key(&who, request).await?;
    let api_key = response
        .api_key
        .as_ref()
        .ok_or_else(|| ApiError::internal("missing api key in response"))?;
    Ok(ResponseJson(CreateApiKeyView {
        api_key: ApiKeyView::from_wire(api_key)?,
        raw_api_key: response.raw_api_key,
    }))
}

/// `GET /v1/apikeys`
pub async fn list_api_keys(
    State(state): State<Arc<RestState>>,
    Extension(who): Extension<Principal>,
) -> Result<ResponseJson<Vec<ApiKeyView>>, ApiError> {
    let response = state
        .api_keys
        .list_api_keys(&who, v1::ListApiKeysRequest {})
        .await?;
    let keys = response
        .keys
        .iter()
        .map(ApiKeyView::from_wire)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(ResponseJson(keys))
}

/// `PUT /v1/apikeys/{id}`
pub async fn update_api_key(
    State(state): State<Arc<RestState>>,
    Extension(who): Extension<Principal>,
    Path(id): Path<String>,
    Json(body): Json<UpdateApiKeyBody>,
) -> Result<ResponseJson<ApiKeyView>, ApiError> {
    let request = v1::UpdateApiKeyRequest {
        api_key_id: binary_id(&id)?,
        status: body.status.as_deref().map(api_key_status_value).transpose()?,
        label_update_strategy: label_strategy!(
            v1::update_api_key_request::LabelUpdateStrategy,
            body.replace_labels,
            body.merge_labels
        )?,
    };
    let key = state.api_keys.update_api_key(&who, request).await?;
    Ok(ResponseJson(ApiKeyView::from_wire(&key)?))
}

/// `DELETE /v1/apikeys/{id}`
pub async fn delete_api_key(
    State(state): State<Arc<RestState>>,
    Extension(who): Extension<Principal>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let request = v1::DeleteApiKeyRequest {
        api_key_id: binary_id(&id)?,
    };
    state.api_keys.delete_api_key(&who, request).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Embedder
// ---------------------------------------------------------------------------

/// `POST /v1/embedders`
pub async fn create_embedder(
    State(state): State<Arc<RestState>>,
    Extension(who): Extension<Principal>,
    Json(body): Json<CreateEmbedderBody>,
) -> Result<ResponseJson<EmbedderView>, ApiError> {
    let request = v1::CreateEmbedderRequest {
        display_name: body.display_name,
        description: body.description,
        provider_type: provider_type_value(&body.provider_type)?,
        endpoint_url: body.endpoint_url,
        api_path: body.api_path,
        model_identifier: body.model_identifier,
        dimensionality: body.dimensionality,
        max_sequence_length: body.max_sequence_length,
        supported_modalities: body
            .supported_modalities
            .iter()
            .map(|m| modality_value(m))
            .collect::<Result<Vec<_>, _>>()?,
        credentials: body.credentials,
        labels: body.labels,
        version: body.version,
        monitoring_endpoint: body.monitoring_endpoint,
        owner_id: body.owner_id.as_deref().map(binary_id).transpose()?,
    };
    let embedder = state.embedders.create_embedder(&who, request).await?;
    Ok(ResponseJson(EmbedderView::from_wire(&embedder)?))
}

/// `GET /v1/embedders/{id}`
pub async fn get_embedder(
    State(state): State<Arc<RestState>>,
    Extension(who): Extension<Principal>,
    Path(id): Path<String>,
) -> Result<ResponseJson<EmbedderView>, ApiError> {
    let request = v1::GetEmbedderRequest {
        embedder_id: binary_id(&id)?,
    };
    let embedder = state.embedders.get_embedder(&who, request).await?;
    Ok(ResponseJson(EmbedderView::from_wire(&embedder)?))
}

/// `GET /v1/embedders?owner_id=&provider_type=&label.<key>=<value>`
pub async fn list_embedders(
    State(state): State<Arc<RestState>>,
    Extension(who): Extension<Principal>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<ResponseJson<Vec<EmbedderView>>, ApiError> {
    let request = v1::ListEmbeddersRequest {
        owner_id: params
            .get("owner_id")
            .map(|id| binary_id(id))
            .transpose()?,
        provider_type: params
            .get("provider_type")
            .map(|p| provider_type_value(p))
            .transpose()?,
        label_selectors: label_selectors(&params),
    };
    let response = state.embedders.list_embedders(&who, request).await?;
    let embedders = response
        .embedders
        .iter()
        .map(EmbedderView::from_wire)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(ResponseJson(embedders))
}

/// `PUT /v1/embedders/{id}`
pub async fn update_embedder(
    State(state): State<Arc<RestState>>,
    Extension(who): Extension<Principal>,
    Path(id): Path<String>,
    Json(body): Json<UpdateEmbedderBody>,
) -> Result<ResponseJson<EmbedderView>, ApiError> {
    let request = v1::UpdateEmbedderRequest {
        embedder_id: binary_id(&id)?,
        display_name: body.display_name,
        description: body.description,
        endpoint_url: body.endpoint_url,
        api_path: body.api_path,
        model_identifier: body.model_identifier,
        dimensionality: body.dimensionality,
        max_sequence_length: body.max_sequence_length,
        supported_modalities: body
            .supported_modalities
            .iter()
            .map(|m| modality_value(m))
            .collect::<Result<Vec<_>, _>>()?,
        credentials: body.credentials,
        version: body.version,
        monitoring_endpoint: body.monitoring_endpoint,
        provider_type: body
            .provider_type
            .as_deref()
            .map(provider_type_value)
            .transpose()?,
        label_update_strategy: label_strategy!(
            v1::update_embedder_request::LabelUpdateStrategy,
            body.replace_labels,
            body.merge_labels
        )?,
    };
    let embedder = state.embedders.update_embedder(&who, request).await?;
    Ok(ResponseJson(EmbedderView::from_wire(&embedder)?))
}

/// `DELETE /v1/embedders/{id}`
pub async fn delete_embedder(
    State(state): State<Arc<RestState>>,
    Extension(who): Extension<Principal>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let request = v1::DeleteEmbedderRequest {
        embedder_id: binary_id(&id)?,
    };
    state.embedders.delete_embedder(&who, request).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Space
// ---------------------------------------------------------------------------

/// `POST /v1/spaces`
pub async fn create_space(
    State(state): State<Arc<RestState>>,
    Extension(who): Extension<Principal>,
    Json(body): Json<CreateSpaceBody>,
) -> Result<ResponseJson<SpaceView>, ApiError> {
    let request = v1::CreateSpaceRequest {
        name: body.name,
        embedder_id: binary_id(&body.embedder_id)?,
        labels: body.labels,
        public_read: body.public_read,
        owner_id: body.owner_id.as_deref().map(binary_id).transpose()?,
    };
    let space = state.spaces.create_space(&who, request).await?;
    Ok(ResponseJson(SpaceView::from_wire(&space)?))
}

/// `GET /v1/spaces/{id}`
pub async fn get_space(
    State(state): State<Arc<RestState>>,
    Extension(who): Extension<Principal>,
    Path(id): Path<String>,
) -> Result<ResponseJson<SpaceView>, ApiError> {
    let request = v1::GetSpaceRequest {
        space_id: binary_id(&id)?,
    };
    let space = state.spaces.get_space(&who, request).await?;
    Ok(ResponseJson(SpaceView::from_wire(&space)?))
}

/// `GET /v1/spaces` with the full filter surface:
/// `owner_id`, `name_filter`, `sort_by`, `sort_order` (asc|desc),
/// `max_results`, `next_token`, repeated `label.<key>=<value>`.
pub async fn list_spaces(
    State(state): State<Arc<RestState>>,
    Extension(who): Extension<Principal>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<ResponseJson<ListSpacesView>, ApiError> {
    let max_results = params
        .get("max_results")
        .map(|n| {
            n.parse::<i32>()
                .map_err(|_| ApiError::invalid(format!("malformed max_results: {}", n)))
        })
        .transpose()?;

    let request = v1::ListSpacesRequest {
        owner_id: params
            .get("owner_id")
            .map(|id| binary_id(id))
            .transpose()?,
        label_selectors: label_selectors(&params),
        name_filter: params.get("name_filter").cloned(),
        sort_by: params.get("sort_by").cloned(),
        sort_order: params
            .get("sort_order")
            .map(|o| sort_order_value(o))
            .transpose()?,
        max_results,
        next_token: params.get("next_token").cloned(),
    };
    let response = state.spaces.list_spaces(&who, request).await?;
    let spaces = response
        .spaces
        .iter()
        .map(SpaceView::from_wire)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(ResponseJson(ListSpacesView {
        spaces,
        next_token: response.next_token,
    }))
}

/// `PUT /v1/spaces/{id}`
pub async fn update_space(
    State(state): State<Arc<RestState>>,
    Extension(who): Extension<Principal>,
    Path(id): Path<String>,
    Json(body): Json<UpdateSpaceBody>,
) -> Result<ResponseJson<SpaceView>, ApiError> {
    let request = v1::UpdateSpaceRequest {
        space_id: binary_id(&id)?,
        name: body.name,
        public_read: body.public_read,
        label_update_strategy: label_strategy!(
            v1::update_space_request::LabelUpdateStrategy,
            body.replace_labels,
            body.merge_labels
        )?,
    };
    let space = state.spaces.update_space(&who, request).await?;
    Ok(ResponseJson(SpaceView::from_wire(&space)?))
}

/// `DELETE /v1/spaces/{id}`
pub async fn delete_space(
    State(state): State<Arc<RestState>>,
    Extension(who): Extension<Principal>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let request = v1::DeleteSpaceRequest {
        space_id: binary_id(&id)?,
    };
    state.spaces.delete_space(&who, request).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Memory
// ---------------------------------------------------------------------------

/// `POST /v1/memories`
pub async fn create_memory(
    State(state): State<Arc<RestState>>,
    Extension(who): Extension<Principal>,
    Json(body): Json<CreateMemoryBody>,
) -> Result<ResponseJson<MemoryView>, ApiError> {
    let request = v1::CreateMemoryRequest {
        space_id: binary_id(&body.space_id)?,
        original_content_ref: body.original_content_ref,
        content_type: body.content_type,
        metadata: body.metadata,
    };
    let memory = state.memories.create_memory(&who, request).await?;
    Ok(ResponseJson(MemoryView::from_wire(&memory)?))
}

/// `GET /v1/memories/{id}`
pub async fn get_memory(
    State(state): State<Arc<RestState>>,
    Extension(who): Extension<Principal>,
    Path(id): Path<String>,
) -> Result<ResponseJson<MemoryView>, ApiError> {
    let request = v1::GetMemoryRequest {
        memory_id: binary_id(&id)?,
    };
    let memory = state.memories.get_memory(&who, request).await?;
    Ok(ResponseJson(MemoryView::from_wire(&memory)?))
}

/// `GET /v1/memories?space_id=<id>`
pub async fn list_memories(
    State(state): State<Arc<RestState>>,
    Extension(who): Extension<Principal>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<ResponseJson<Vec<MemoryView>>, ApiError> {
    let space_id = params
        .get("space_id")
        .ok_or_else(|| ApiError::invalid("space_id query parameter is required"))?;
    let request = v1::ListMemoriesRequest {
        space_id: binary_id(space_id)?,
    };
    let response = state.memories.list_memories(&who, request).await?;
    let memories = response
        .memories
        .iter()
        .map(MemoryView::from_wire)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(ResponseJson(memories))
}

/// `DELETE /v1/memories/{id}`
pub async fn delete_memory(
    State(state): State<Arc<RestState>>,
    Extension(who): Extension<Principal>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let request = v1::DeleteMemoryRequest {
        memory_id: binary_id(&id)?,
    };
    state.memories.delete_memory(&who, request).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /v1/memories/search`
pub async fn search_memory_chunks(
    State(state): State<Arc<RestState>>,
    Extension(who): Extension<Principal>,
    Json(body): Json<SearchMemoryChunksBody>,
) -> Result<ResponseJson<Vec<MemoryChunkView>>, ApiError> {
    let request = v1::SearchMemoryChunksRequest {
        space_id: binary_id(&body.space_id)?,
        query_vector: body.query_vector,
        top_k: body.top_k,
    };
    let response = state.memories.search_memory_chunks(&who, request).await?;
    let chunks = response
        .chunks
        .iter()
        .map(MemoryChunkView::from_wire)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(ResponseJson(chunks))
}
