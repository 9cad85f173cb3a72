//! Embedder management.

use chrono::Utc;
use tonic::{Request, Response, Status};
use url::Url;
use uuid::Uuid;

use crate::api::v1;
use crate::api::v1::embedder_service_server::EmbedderService;
use crate::api::v1::update_embedder_request::LabelUpdateStrategy;
use crate::auth::{Action, Permission, Principal, Resource, Scope};
use crate::crypto::CredentialCipher;
use crate::database::queries;
use crate::error::ApiError;
use crate::ids;
use crate::models::{Embedder, LabelUpdate, Modality};

use super::{convert, principal_from_request, ServiceContext};

/// Default request path appended to an embedder's endpoint.
const DEFAULT_API_PATH: &str = "/v1/embeddings";

/// Implements `goodmem.v1.EmbedderService`.
#[derive(Clone)]
pub struct EmbedderServiceImpl {
    ctx: ServiceContext,
}

impl EmbedderServiceImpl {
    pub fn new(ctx: ServiceContext) -> Self {
        EmbedderServiceImpl { ctx }
    }

    /// The credential cipher bound to the configured server-wide key.
    fn cipher(&self) -> Result<CredentialCipher, ApiError> {
        CredentialCipher::from_base64(&self.ctx.config.credentials_key)
    }

    /// Whether the caller may see this embedder's decrypted credentials.
    fn may_reveal_credentials(&self, who: &Principal, embedder: &Embedder) -> bool {
        embedder.owner_id == who.user_id
            || who.has(Permission::new(Action::Display, Resource::Embedder, Scope::Any))
    }

    fn decrypt_for(&self, who: &Principal, embedder: &Embedder) -> Result<Option<String>, ApiError> {
        if !self.may_reveal_credentials(who, embedder) {
            return Ok(None);
        }
        let plain = self
            .cipher()?
            .open(&embedder.credentials)
            .map_err(|err| {
                tracing::error!(embedder_id = %embedder.embedder_id, error = %err, "failed to decrypt stored credentials");
                err
            })?;
        Ok(Some(plain))
    }

    /// Creates an embedder.
    ///
    /// Required: display name, provider type, endpoint URL, model
    /// identifier, positive dimensionality, credentials. Defaults:
    /// `api_path = /v1/embeddings`, modalities `{TEXT}`. Credentials are
    /// encrypted before they touch the access layer.
    pub async fn create_embedder(
        &self,
        who: &Principal,
        request: v1::CreateEmbedderRequest,
    ) -> Result<v1::Embedder, ApiError> {
        if request.display_name.is_empty() {
            return Err(ApiError::invalid("display_name is required"));
        }
        if request.model_identifier.is_empty() {
            return Err(ApiError::invalid("model_identifier is required"));
        }
        if request.credentials.is_empty() {
            return Err(ApiError::invalid("credentials are required"));
        }
        if request.dimensionality <= 0 {
            return Err(ApiError::invalid("dimensionality must be positive"));
        }
        let provider_type = convert::provider_type_from_wire(request.provider_type)?;
        Url::parse(&request.endpoint_url)
            .map_err(|_| ApiError::invalid(format!("malformed endpoint_url: {}", request.endpoint_url)))?;

        let owner_id = match ids::optional_uuid_from_binary(request.owner_id.as_ref())? {
            Some(owner) => owner,
            None => who.user_id,
        };
        who.require_scoped(Action::Create, Resource::Embedder, owner_id)?;

        let supported_modalities = if request.supported_modalities.is_empty() {
            vec![Modality::Text]
        } else {
            request
                .supported_modalities
                .iter()
                .map(|m| convert::modality_from_wire(*m))
                .collect::<Result<Vec<_>, _>>()?
        };

        let encrypted = self.cipher()?.seal(&request.credentials)?;

        let now = Utc::now();
        let embedder = Embedder {
            embedder_id: Uuid::new_v4(),
            display_name: request.display_name,
            description: request.description,
            provider_type,
            endpoint_url: request.endpoint_url,
            api_path: request.api_path.unwrap_or_else(|| DEFAULT_API_PATH.to_string()),
            model_identifier: request.model_identifier,
            dimensionality: request.dimensionality,
            max_sequence_length: request.max_sequence_length,
            supported_modalities,
            credentials: encrypted,
            labels: convert::labels_from_wire(request.labels),
            version: request.version,
            monitoring_endpoint: request.monitoring_endpoint,
            owner_id,
            created_at: now,
            updated_at: now,
            created_by: who.user_id,
            updated_by: who.user_id,
        };

        queries::embedders::save_embedder(&self.ctx.pool, &embedder)
            .await
            .map_err(|err| match err {
                ApiError::AlreadyExists(_) => ApiError::conflict(format!(
                    "an embedder named {:?} already exists for this owner",
                    embedder.display_name
                )),
                other => other,
            })?;

        let credentials = self.decrypt_for(who, &embedder)?;
        Ok(convert::embedder_to_wire(&embedder, credentials))
    }

    /// Fetches one embedder.
    ///
    /// Hidden and absent rows are both `NotFound`. Credentials are
    /// decrypted only for the owner or a `DISPLAY_EMBEDDER_ANY` holder.
    pub async fn get_embedder(
        &self,
        who: &Principal,
        request: v1::GetEmbedderRequest,
    ) -> Result<v1::Embedder, ApiError> {
        let embedder_id = ids::uuid_from_binary(&request.embedder_id)?;
        let embedder = self.visible_embedder(who, embedder_id).await?;
        let credentials = self.decrypt_for(who, &embedder)?;
        Ok(convert::embedder_to_wire(&embedder, credentials))
    }

    async fn visible_embedder(
        &self,
        who: &Principal,
        embedder_id: Uuid,
    ) -> Result<Embedder, ApiError> {
        let embedder = queries::embedders::find_by_id(&self.ctx.pool, embedder_id)
            .await?
            .ok_or_else(|| ApiError::not_found(format!("embedder {} not found", embedder_id)))?;

        let visible = who.has(Permission::new(Action::Display, Resource::Embedder, Scope::Any))
            || (embedder.owner_id == who.user_id
                && who.has(Permission::new(Action::Display, Resource::Embedder, Scope::Own)));
        if visible {
            Ok(embedder)
        } else {
            Err(ApiError::not_found(format!("embedder {} not found", embedder_id)))
        }
    }

    /// Lists embedders. Credentials are never included.
    pub async fn list_embedders(
        &self,
        who: &Principal,
        request: v1::ListEmbeddersRequest,
    ) -> Result<v1::ListEmbeddersResponse, ApiError> {
        let requested_owner = ids::optional_uuid_from_binary(request.owner_id.as_ref())?;
        let display_any =
            who.has(Permission::new(Action::Display, Resource::Embedder, Scope::Any));

        let owner_filter = if display_any {
            requested_owner
        } else {
            who.require(Permission::new(Action::Display, Resource::Embedder, Scope::Own))?;
            match requested_owner {
                Some(owner) if owner != who.user_id => {
                    return Err(ApiError::denied(
                        "caller lacks DISPLAY_EMBEDDER_ANY",
                    ))
                }
                _ => Some(who.user_id),
            }
        };

        let provider_type = request
            .provider_type
            .map(convert::provider_type_from_wire)
            .transpose()?;
        let selectors = convert::labels_from_wire(request.label_selectors);

        let embedders = queries::embedders::list_embedders(
            &self.ctx.pool,
            owner_filter,
            provider_type,
            &selectors,
        )
        .await?;

        Ok(v1::ListEmbeddersResponse {
            embedders: embedders
                .iter()
                .map(|e| convert::embedder_to_wire(e, None))
                .collect(),
        })
    }

    /// Updates an embedder with set-if-present semantics.
    ///
    /// `provider_type` is immutable: any attempt to set it is
    /// `InvalidArgument`. Repeated modalities replace when non-empty.
    pub async fn update_embedder(
        &self,
        who: &Principal,
        request: v1::UpdateEmbedderRequest,
    ) -> Result<v1::Embedder, ApiError> {
        if request.provider_type.is_some() {
            return Err(ApiError::invalid(
                "provider_type is immutable and may not be updated",
            ));
        }

        let embedder_id = ids::uuid_from_binary(&request.embedder_id)?;
        let mut embedder = queries::embedders::find_by_id(&self.ctx.pool, embedder_id)
            .await?
            .ok_or_else(|| ApiError::not_found(format!("embedder {} not found", embedder_id)))?;

        who.require_scoped(Action::Update, Resource::Embedder, embedder.owner_id)?;

        if let Some(display_name) = request.display_name {
            if display_name.is_empty() {
                return Err(ApiError::invalid("display_name may not be empty"));
            }
            embedder.display_name = display_name;
        }
        if let Some(description) = request.description {
            embedder.description = Some(description);
        }
        if let Some(endpoint_url) = request.endpoint_url {
            Url::parse(&endpoint_url)
                .map_err(|_| ApiError::invalid(format!("malformed endpoint_url: {}", endpoint_url)))?;
            embedder.endpoint_url = endpoint_url;
        }
        if let Some(api_path) = request.api_path {
            embedder.api_path = api_path;
        }
        if let Some(model_identifier) = request.model_identifier {
            if model_identifier.is_empty() {
                return Err(ApiError::invalid("model_identifier may not be empty"));
            }
            embedder.model_identifier = model_identifier;
        }
        if let Some(dimensionality) = request.dimensionality {
            if dimensionality <= 0 {
                return Err(ApiError::invalid("dimensionality must be positive"));
            }
            embedder.dimensionality = dimensionality;
        }
        if let Some(max_sequence_length) = request.max_sequence_length {
            embedder.max_sequence_length = Some(max_sequence_length);
        }
        if !request.supported_modalities.is_empty() {
            embedder.supported_modalities = request
                .supported_modalities
                .iter()
                .map(|m| convert::modality_from_wire(*m))
                .collect::<Result<Vec<_>, _>>()?;
        }
        if let Some(credentials) = request.credentials {
            if credentials.is_empty() {
                return Err(ApiError::invalid("credentials may not be empty"));
            }
            embedder.credentials = self.cipher()?.seal(&credentials)?;
        }
        if let Some(version) = request.version {
            embedder.version = Some(version);
        }
        if let Some(monitoring_endpoint) = request.monitoring_endpoint {
            embedder.monitoring_endpoint = Some(monitoring_endpoint);
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
        embedder.labels = strategy.apply(&embedder.labels);
        embedder.updated_by = who.user_id;

        queries::embedders::save_embedder(&self.ctx.pool, &embedder)
            .await
            .map_err(|err| match err {
                ApiError::AlreadyExists(_) => ApiError::conflict(format!(
                    "an embedder named {:?} already exists for this owner",
                    embedder.display_name
                )),
                other => other,
            })?;

        let updated = queries::embedders::find_by_id(&self.ctx.pool, embedder_id)
            .await?
            .ok_or_else(|| ApiError::internal("embedder vanished during update"))?;
        let credentials = self.decrypt_for(who, &updated)?;
        Ok(convert::embedder_to_wire(&updated, credentials))
    }

    /// Deletes an embedder not referenced by any space.
    pub async fn delete_embedder(
        &self,
        who: &Principal,
        request: v1::DeleteEmbedderRequest,
    ) -> Result<v1::DeleteEmbedderResponse, ApiError> {
        let embedder_id = ids::uuid_from_binary(&request.embedder_id)?;
        let embedder = queries::embedders::find_by_id(&self.ctx.pool, embedder_id)
            .await?
            .ok_or_else(|| ApiError::not_found(format!("embedder {} not found", embedder_id)))?;

        who.require_scoped(Action::Delete, Resource::Embedder, embedder.owner_id)?;

        let dependents = queries::embedders::space_count(&self.ctx.pool, embedder_id).await?;
        if dependents > 0 {
            return Err(ApiError::precondition(format!(
                "embedder is still used by {} space(s)",
                dependents
            )));
        }

        queries::embedders::delete_embedder(&self.ctx.pool, embedder_id).await?;
        tracing::info!(embedder_id = %embedder_id, "embedder deleted");
        Ok(v1::DeleteEmbedderResponse {})
    }
}

#[tonic::async_trait]
impl EmbedderService for EmbedderServiceImpl {
    async fn create_embedder(
        &self,
        request: Request<v1::CreateEmbedderRequest>,
    ) -> Result<Response<v1::Embedder>, Status> {
        let who = principal_from_request(&request)?;
        let response =
            EmbedderServiceImpl::create_embedder(self, &who, request.into_inner()).await?;
        Ok(Response::new(response))
    }

    async fn get_embedder(
        &self,
        request: Request<v1::GetEmbedderRequest>,
    ) -> Result<Response<v1::Embedder>, Status> {
        let who = principal_from_request(&request)?;
        let response = EmbedderServiceImpl::get_embedder(self, &who, request.into_inner()).await?;
        Ok(Response::new(response))
    }

    async fn list_embedders(
        &self,
        request: Request<v1::ListEmbeddersRequest>,
    ) -> Result<Response<v1::ListEmbeddersResponse>, Status> {
        let who = principal_from_request(&request)?;
        let response =
            EmbedderServiceImpl::list_embedders(self, &who, request.into_inner()).await?;
        Ok(Response::new(response))
    }

    async fn update_embedder(
        &self,
        request: Request<v1::UpdateEmbedderRequest>,
    ) -> Result<Response<v1::Embedder>, Status> {
        let who = principal_from_request(&request)?;
        let response =
            EmbedderServiceImpl::update_embedder(self, &who, request.into_inner()).await?;
        Ok(Response::new(response))
    }

    async fn delete_embedder(
        &self,
        request: Request<v1::DeleteEmbedderRequest>,
    ) -> Result<Response<v1::DeleteEmbedderResponse>, Status> {
        let who = principal_from_request(&request)?;
        let response =
            EmbedderServiceImpl::delete_embedder(self, &who, request.into_inner()).await?;
        Ok(Response::new(response))
    }
}
