//! API key management.

use chrono::Utc;
use tonic::{Request, Response, Status};
use uuid::Uuid;

use crate::api::v1;
use crate::api::v1::api_key_service_server::ApiKeyService;
use crate::api::v1::update_api_key_request::LabelUpdateStrategy;
use crate::auth::{Action, Principal, Resource};
use crate::database::queries;
use crate::error::ApiError;
use crate::ids;
use crate::keys;
use crate::models::{ApiKeyRecord, ApiKeyStatus, LabelUpdate};

use super::{convert, principal_from_request, ServiceContext};

/// Implements `goodmem.v1.ApiKeyService`.
#[derive(Clone)]
pub struct ApiKeyServiceImpl {
    ctx: ServiceContext,
}

impl ApiKeyServiceImpl {
    pub fn new(ctx: ServiceContext) -> Self {
        ApiKeyServiceImpl { ctx }
    }

    /// Mints a new key owned by the caller.
    ///
    /// The raw key is present in this response and nowhere else, ever; only
    /// the hash and the 8-character display prefix are stored.
    pub async fn create_api_key(
        &self,
        who: &Principal,
        request: v1::CreateApiKeyRequest,
    ) -> Result<v1::CreateApiKeyResponse, ApiError> {
        who.require_scoped(Action::Create, Resource::ApiKey, who.user_id)?;

        let expires_at = request
            .expires_at
            .as_ref()
            .map(ids::instant_from_wire_timestamp)
            .transpose()?;

        let generated = keys::new_key();
        let now = Utc::now();
        let record = ApiKeyRecord {
            api_key_id: Uuid::new_v4(),
            user_id: who.user_id,
            key_prefix: generated.display_prefix.clone(),
            hashed_key_material: generated.hashed_material.to_vec(),
            status: ApiKeyStatus::Active,
            labels: convert::labels_from_wire(request.labels),
            expires_at,
            last_used_at: None,
            created_at: now,
            updated_at: now,
            created_by: who.user_id,
            updated_by: who.user_id,
        };

        queries::api_keys::save_api_key(&self.ctx.pool, &record).await?;
        tracing::info!(user_id = %who.user_id, prefix = %record.key_prefix, "api key created");

        Ok(v1::CreateApiKeyResponse {
            api_key: Some(convert::api_key_to_wire(&record)),
            raw_api_key: generated.raw,
        })
    }

    /// Lists the caller's keys. No raw keys, no hashes.
    pub async fn list_api_keys(
        &self,
        who: &Principal,
        _request: v1::ListApiKeysRequest,
    ) -> Result<v1::ListApiKeysResponse, ApiError> {
        who.require_scoped(Action::Display, Resource::ApiKey, who.user_id)?;

        let records = queries::api_keys::list_by_user(&self.ctx.pool, who.user_id).await?;
        Ok(v1::ListApiKeysResponse {
            keys: records.iter().map(convert::api_key_to_wire).collect(),
        })
    }

    /// Updates a key's status and/or labels.
    pub async fn update_api_key(
        &self,
        who: &Principal,
        request: v1::UpdateApiKeyRequest,
    ) -> Result<v1::ApiKey, ApiError> {
        let api_key_id = ids::uuid_from_binary(&request.api_key_id)?;
        let mut record = queries::api_keys::find_by_id(&self.ctx.pool, api_key_id)
            .await?
            .ok_or_else(|| ApiError::not_found(format!("api key {} not found", api_key_id)))?;

        who.require_scoped(Action::Update, Resource::ApiKey, record.user_id)?;

        if let Some(status) = request.status {
            record.status = convert::api_key_status_from_wire(status)?;
        }

        let strategy = match request.label_update_strategy {
            Some(LabelUpdateStrategy::ReplaceLabels(map)) => {
                LabelUpdate::Replace(convert::labels_from_wire(map.labels))
            }
            Some(LabelUpdateStrategy::MergeLabels(map)) => {
                LabelUpdate::Merge(convert::labels_from_wire(map.labels))
            }
            None => LabelUpdate::Unchanged,
        };
        record.labels = strategy.apply(&record.labels);
        record.updated_by = who.user_id;

        queries::api_keys::save_api_key(&self.ctx.pool, &record).await?;

        let updated = queries::api_keys::find_by_id(&self.ctx.pool, api_key_id)
            .await?
            .ok_or_else(|| ApiError::internal("api key vanished during update"))?;
        Ok(convert::api_key_to_wire(&updated))
    }

    /// Hard-deletes a key.
    pub async fn delete_api_key(
        &self,
        who: &Principal,
        request: v1::DeleteApiKeyRequest,
    ) -> Result<v1::DeleteApiKeyResponse, ApiError> {
        let api_key_id = ids::uuid_from_binary(&request.api_key_id)?;
        let record = queries::api_keys::find_by_id(&self.ctx.pool, api_key_id)
            .await?
            .ok_or_else(|| ApiError::not_found(format!("api key {} not found", api_key_id)))?;

        who.require_scoped(Action::Delete, Resource::ApiKey, record.user_id)?;

        queries::api_keys::delete_api_key(&self.ctx.pool, api_key_id).await?;
        tracing::info!(api_key_id = %api_key_id, "api key deleted");
        Ok(v1::DeleteApiKeyResponse {})
    }
}

#[tonic::async_trait]
impl ApiKeyService for ApiKeyServiceImpl {
    async fn create_api_key(
        &self,
        request: Request<v1::CreateApiKeyRequest>,
    ) -> Result<Response<v1::CreateApiKeyResponse>, Status> {
        let who = principal_from_request(&request)?;
        let response =
            ApiKeyServiceImpl::create_api_key(self, &who, request.into_inner()).await?;
        Ok(Response::new(response))
    }

    async fn list_api_keys(
        &self,
        request: Request<v1::ListApiKeysRequest>,
    ) -> Result<Response<v1::ListApiKeysResponse>, Status> {
        let who = principal_from_request(&request)?;
        let response = ApiKeyServiceImpl::list_api_keys(self, &who, request.into_inner()).await?;
        Ok(Response::new(response))
    }

    async fn update_api_key(
        &self,
        request: Request<v1::UpdateApiKeyRequest>,
    ) -> Result<Response<v1::ApiKey>, Status> {
        let who = principal_from_request(&request)?;
        let response = ApiKeyServiceImpl::update_api_key(self, &who, request.into_inner()).await?;
        Ok(Response::new(response))
    }

    async fn delete_api_key(
        &self,
        request: Request<v1::DeleteApiKeyRequest>,
    ) -> Result<Response<v1::DeleteApiKeyResponse>, Status> {
        let who = principal_from_request(&request)?;
        let response = ApiKeyServiceImpl::delete_api_key(self, &who, request.into_inner()).await?;
        Ok(Response::new(response))
    }
}
