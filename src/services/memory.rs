//! Memory management and similarity search.
//!
//! Every operation resolves the owning space first; memory visibility and
//! ownership always follow the space.

use chrono::Utc;
use tonic::{Request, Response, Status};
use uuid::Uuid;

use crate::api::v1;
use crate::api::v1::memory_service_server::MemoryService;
use crate::auth::{Action, Principal, Resource};
use crate::database::queries;
use crate::error::ApiError;
use crate::ids;
use crate::models::{Memory, ProcessingStatus};

use super::{convert, principal_from_request, visible_space, ServiceContext};

/// Default and maximum result counts for similarity search.
const DEFAULT_TOP_K: i64 = 10;
const MAX_TOP_K: i64 = 100;

/// Implements `goodmem.v1.MemoryService`.
#[derive(Clone)]
pub struct MemoryServiceImpl {
    ctx: ServiceContext,
}

impl MemoryServiceImpl {
    pub fn new(ctx: ServiceContext) -> Self {
        MemoryServiceImpl { ctx }
    }

    /// Creates a memory in `PENDING` state.
    ///
    /// The external worker picks pending memories up, chunks them, and
    /// advances the processing status; the core only records the intent.
    pub async fn create_memory(
        &self,
        who: &Principal,
        request: v1::CreateMemoryRequest,
    ) -> Result<v1::Memory, ApiError> {
        if request.original_content_ref.is_empty() {
            return Err(ApiError::invalid("original_content_ref is required"));
        }
        if request.content_type.is_empty() {
            return Err(ApiError::invalid("content_type is required"));
        }

        let space_id = ids::uuid_from_binary(&request.space_id)?;
        let space = visible_space(&self.ctx, who, space_id, Resource::Memory).await?;
        who.require_scoped(Action::Create, Resource::Memory, space.owner_id)?;

        let now = Utc::now();
        let memory = Memory {
            memory_id: Uuid::new_v4(),
            space_id,
            original_content_ref: request.original_content_ref,
            content_type: request.content_type,
            metadata: convert::labels_from_wire(request.metadata),
            processing_status: ProcessingStatus::Pending,
            created_at: now,
            updated_at: now,
            created_by: who.user_id,
            updated_by: who.user_id,
        };

        queries::memories::save_memory(&self.ctx.pool, &memory).await?;
        tracing::info!(memory_id = %memory.memory_id, space_id = %space_id, "memory created");
        Ok(convert::memory_to_wire(&memory))
    }

    /// Fetches one memory, subject to the owning space's visibility.
    pub async fn get_memory(
        &self,
        who: &Principal,
        request: v1::GetMemoryRequest,
    ) -> Result<v1::Memory, ApiError> {
        let memory_id = ids::uuid_from_binary(&request.memory_id)?;
        let memory = queries::memories::find_by_id(&self.ctx.pool, memory_id)
            .await?
            .ok_or_else(|| ApiError::not_found(format!("memory {} not found", memory_id)))?;

        // Hidden space => the memory does not exist for this caller.
        visible_space(&self.ctx, who, memory.space_id, Resource::Memory)
            .await
            .map_err(|_| ApiError::not_found(format!("memory {} not found", memory_id)))?;

        Ok(convert::memory_to_wire(&memory))
    }

    /// Lists the memories of a space the caller can see.
    pub async fn list_memories(
        &self,
        who: &Principal,
        request: v1::ListMemoriesRequest,
    ) -> Result<v1::ListMemoriesResponse, ApiError> {
        let space_id = ids::uuid_from_binary(&request.space_id)?;
        visible_space(&self.ctx, who, space_id, Resource::Memory).await?;

        let memories = queries::memories::list_by_space(&self.ctx.pool, space_id).await?;
        Ok(v1::ListMemoriesResponse {
            memories: memories.iter().map(convert::memory_to_wire).collect(),
        })
    }

    /// Deletes a memory and its chunks.
    pub async fn delete_memory(
        &self,
        who: &Principal,
        request: v1::DeleteMemoryRequest,
    ) -> Result<v1::DeleteMemoryResponse, ApiError> {
        let memory_id = ids::uuid_from_binary(&request.memory_id)?;
        let memory = queries::memories::find_by_id(&self.ctx.pool, memory_id)
            .await?
            .ok_or_else(|| ApiError::not_found(format!("memory {} not found", memory_id)))?;

        let space = queries::spaces::find_by_id(&self.ctx.pool, memory.space_id)
            .await?
            .ok_or_else(|| ApiError::internal("memory references a missing space"))?;
        who.require_scoped(Action::Delete, Resource::Memory, space.owner_id)?;

        queries::memories::delete_memory_cascade(&self.ctx.pool, memory_id).await?;
        tracing::info!(memory_id = %memory_id, "memory deleted with its chunks");
        Ok(v1::DeleteMemoryResponse {})
    }

    /// Finds the chunks nearest to a caller-supplied query vector.
    ///
    /// The vector's dimension must match the space's embedder; only chunks
    /// with generated vectors participate, ordered by L2 distance.
    pub async fn search_memory_chunks(
        &self,
        who: &Principal,
        request: v1::SearchMemoryChunksRequest,
    ) -> Result<v1::SearchMemoryChunksResponse, ApiError> {
        let space_id = ids::uuid_from_binary(&request.space_id)?;
        let space = visible_space(&self.ctx, who, space_id, Resource::Memory).await?;

        if request.query_vector.is_empty() {
            return Err(ApiError::invalid("query_vector is required"));
        }
        let embedder = queries::embedders::find_by_id(&self.ctx.pool, space.embedder_id)
            .await?
            .ok_or_else(|| ApiError::internal("space references a missing embedder"))?;
        if request.query_vector.len() as i32 != embedder.dimensionality {
            return Err(ApiError::invalid(format!(
                "query_vector has dimension {}, expected {}",
                request.query_vector.len(),
                embedder.dimensionality
            )));
        }

        let top_k = match request.top_k {
            Some(k) if k > 0 => (k as i64).min(MAX_TOP_K),
            Some(_) | None => DEFAULT_TOP_K,
        };

        let chunks = queries::memories::nearest_chunks(
            &self.ctx.pool,
            space_id,
            &request.query_vector,
            top_k,
        )
        .await?;

        Ok(v1::SearchMemoryChunksResponse {
            chunks: chunks.iter().map(convert::chunk_to_wire).collect(),
        })
    }
}

#[tonic::async_trait]
impl MemoryService for MemoryServiceImpl {
    async fn create_memory(
        &self,
        request: Request<v1::CreateMemoryRequest>,
    ) -> Result<Response<v1::Memory>, Status> {
        let who = principal_from_request(&request)?;
        let response = MemoryServiceImpl::create_memory(self, &who, request.into_inner()).await?;
        Ok(Response::new(response))
    }

    async fn get_memory(
        &self,
        request: Request<v1::GetMemoryRequest>,
    ) -> Result<Response<v1::Memory>, Status> {
        let who = principal_from_request(&request)?;
        let response = MemoryServiceImpl::get_memory(self, &who, request.into_inner()).await?;
        Ok(Response::new(response))
    }

    async fn list_memories(
        &self,
        request: Request<v1::ListMemoriesRequest>,
    ) -> Result<Response<v1::ListMemoriesResponse>, Status> {
        let who = principal_from_request(&request)?;
        let response = MemoryServiceImpl::list_memories(self, &who, request.into_inner()).await?;
        Ok(Response::new(response))
    }

    async fn delete_memory(
        &self,
        request: Request<v1::DeleteMemoryRequest>,
    ) -> Result<Response<v1::DeleteMemoryResponse>, Status> {
        let who = principal_from_request(&request)?;
        let response = MemoryServiceImpl::delete_memory(self, &who, request.into_inner()).await?;
        Ok(Response::new(response))
    }

    async fn search_memory_chunks(
        &self,
        request: Request<v1::SearchMemoryChunksRequest>,
    ) -> Result<Response<v1::SearchMemoryChunksResponse>, Status> {
        let who = principal_from_request(&request)?;
        let response =
            MemoryServiceImpl::search_memory_chunks(self, &who, request.into_inner()).await?;
        Ok(Response::new(response))
    }
}
