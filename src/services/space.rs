//! Space management, including the cursor-paginated list operation.

use chrono::Utc;
use std::collections::BTreeMap;
use tonic::{Request, Response, Status};
use uuid::Uuid;

use crate::api::v1;
use crate::api::v1::space_service_server::SpaceService;
use crate::api::v1::update_space_request::LabelUpdateStrategy;
use crate::auth::{Action, Permission, Principal, Resource, Scope};
use crate::database::queries;
use crate::database::queries::spaces::{sort_column, SpaceQuery};
use crate::error::ApiError;
use crate::ids;
use crate::models::{LabelUpdate, Space, SPACE_NAME_MAX_LEN};
use crate::pagination::{clamp_page_size, PageToken};

use super::{convert, principal_from_request, visible_space, ServiceContext};

/// Implements `goodmem.v1.SpaceService`.
#[derive(Clone)]
pub struct SpaceServiceImpl {
    ctx: ServiceContext,
}

impl SpaceServiceImpl {
    pub fn new(ctx: ServiceContext) -> Self {
        SpaceServiceImpl { ctx }
    }

    /// Creates a space.
    pub async fn create_space(
        &self,
        who: &Principal,
        request: v1::CreateSpaceRequest,
    ) -> Result<v1::Space, ApiError> {
        if request.name.is_empty() || request.name.len() > SPACE_NAME_MAX_LEN {
            return Err(ApiError::invalid(format!(
                "space name length must be between 1 and {} characters",
                SPACE_NAME_MAX_LEN
            )));
        }

        let embedder_id = ids::uuid_from_binary(&request.embedder_id)?;
        queries::embedders::find_by_id(&self.ctx.pool, embedder_id)
            .await?
            .ok_or_else(|| ApiError::not_found(format!("embedder {} not found", embedder_id)))?;

        let owner_id = match ids::optional_uuid_from_binary(request.owner_id.as_ref())? {
            Some(owner) => owner,
            None => who.user_id,
        };
        who.require_scoped(Action::Create, Resource::Space, owner_id)?;

        let now = Utc::now();
        let space = Space {
            space_id: Uuid::new_v4(),
            name: request.name,
            labels: convert::labels_from_wire(request.labels),
            embedder_id,
            owner_id,
            public_read: request.public_read.unwrap_or(false),
            created_at: now,
            updated_at: now,
            created_by: who.user_id,
            updated_by: who.user_id,
        };

        queries::spaces::save_space(&self.ctx.pool, &space)
            .await
            .map_err(|err| match err {
                ApiError::AlreadyExists(_) => ApiError::conflict(format!(
                    "a space named {:?} already exists for this owner",
                    space.name
                )),
                other => other,
            })?;

        tracing::info!(space_id = %space.space_id, owner_id = %owner_id, "space created");
        Ok(convert::space_to_wire(&space))
    }

    /// Fetches one space.
    ///
    /// Visible when the caller owns it, the space is `public_read`, or the
    /// caller holds `DISPLAY_SPACE_ANY`; anything else is `NotFound` so
    /// existence is not disclosed.
    pub async fn get_space(
        &self,
        who: &Principal,
        request: v1::GetSpaceRequest,
    ) -> Result<v1::Space, ApiError> {
        let space_id = ids::uuid_from_binary(&request.space_id)?;
        let space = visible_space(&self.ctx, who, space_id, Resource::Space).await?;
        Ok(convert::space_to_wire(&space))
    }

    /// Lists spaces with filters, sorting, and cursor pagination.
    ///
    /// When `next_token` is supplied, the token's embedded query shape wins
    /// and every other request parameter is ignored; the token is also
    /// bound to the principal it was minted for.
    pub async fn list_spaces(
        &self,
        who: &Principal,
        request: v1::ListSpacesRequest,
    ) -> Result<v1::ListSpacesResponse, ApiError> {
        let token = request
            .next_token
            .as_deref()
            .filter(|t| !t.is_empty())
            .map(|t| PageToken::decode(t, who.user_id))
            .transpose()?;

        let token = match token {
            Some(token) => token,
            None => {
                let owner_id = ids::optional_uuid_from_binary(request.owner_id.as_ref())?;
                let name_filter = request
                    .name_filter
                    .as_deref()
                    .map(super::glob_to_like)
                    .filter(|p| p != "%");
                let sort_by = request
                    .sort_by
                    .as_deref()
                    .map(sort_column)
                    .unwrap_or("created_at")
                    .to_string();
                let sort_ascending = convert::sort_ascending_from_wire(request.sort_order)?;
                PageToken {
                    offset: 0,
                    owner_id,
                    label_selectors: request
                        .label_selectors
                        .into_iter()
                        .collect::<BTreeMap<_, _>>(),
                    name_filter,
                    requestor_id: who.user_id,
                    sort_by,
                    sort_ascending,
                    page_size: clamp_page_size(request.max_results),
                }
            }
        };

        let unrestricted =
            who.has(Permission::new(Action::Display, Resource::Space, Scope::Any));
        let query = SpaceQuery {
            owner_filter: token.owner_id,
            label_selectors: token.label_selectors.clone().into_iter().collect(),
            name_like: token.name_filter.clone(),
            sort_by: token.sort_by.clone(),
            sort_ascending: token.sort_ascending,
            offset: token.offset,
            page_size: token.page_size,
            include_public: true,
            unrestricted,
            requestor_id: who.user_id,
        };

        let page = queries::spaces::query_spaces(&self.ctx.pool, &query).await?;

        let returned = page.rows.len() as i64;
        let next_token = if token.offset + returned < page.total_count {
            let next = PageToken {
                offset: token.offset + returned,
                ..token
            };
            Some(next.encode()?)
        } else {
            None
        };

        Ok(v1::ListSpacesResponse {
            spaces: page.rows.iter().map(convert::space_to_wire).collect(),
            next_token,
        })
    }

    /// Updates a space's name, visibility flag, and/or labels.
    ///
    /// `embedder_id` is immutable (the wire request has no field for it).
    /// A rename onto an existing `(owner, name)` pair is `AlreadyExists`.
    pub async fn update_space(
        &self,
        who: &Principal,
        request: v1::UpdateSpaceRequest,
    ) -> Result<v1::Space, ApiError> {
        let space_id = ids::uuid_from_binary(&request.space_id)?;
        let mut space = queries::spaces::find_by_id(&self.ctx.pool, space_id)
            .await?
            .ok_or_else(|| ApiError::not_found(format!("space {} not found", space_id)))?;

        who.require_scoped(Action::Update, Resource::Space, space.owner_id)?;

        if let Some(name) = request.name {
            if name.is_empty() || name.len() > SPACE_NAME_MAX_LEN {
                return Err(ApiError::invalid(format!(
                    "space name length must be between 1 and {} characters",
                    SPACE_NAME_MAX_LEN
                )));
            }
            space.name = name;
        }
        if let Some(public_read) = request.public_read {
            space.public_read = public_read;
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
        space.labels = strategy.apply(&space.labels);
        space.updated_by = who.user_id;

        queries::spaces::save_space(&self.ctx.pool, &space)
            .await
            .map_err(|err| match err {
                ApiError::AlreadyExists(_) => ApiError::conflict(format!(
                    "a space named {:?} already exists for this owner",
                    space.name
                )),
                other => other,
            })?;

        let updated = queries::spaces::find_by_id(&self.ctx.pool, space_id)
            .await?
            .ok_or_else(|| ApiError::internal("space vanished during update"))?;
        Ok(convert::space_to_wire(&updated))
    }

    /// Deletes a space and everything beneath it.
    pub async fn delete_space(
        &self,
        who: &Principal,
        request: v1::DeleteSpaceRequest,
    ) -> Result<v1::DeleteSpaceResponse, ApiError> {
        let space_id = ids::uuid_from_binary(&request.space_id)?;
        let space = queries::spaces::find_by_id(&self.ctx.pool, space_id)
            .await?
            .ok_or_else(|| ApiError::not_found(format!("space {} not found", space_id)))?;

        who.require_scoped(Action::Delete, Resource::Space, space.owner_id)?;

        queries::spaces::delete_space_cascade(&self.ctx.pool, space_id).await?;
        tracing::info!(space_id = %space_id, "space deleted with its memories and chunks");
        Ok(v1::DeleteSpaceResponse {})
    }
}

#[tonic::async_trait]
impl SpaceService for SpaceServiceImpl {
    async fn create_space(
        &self,
        request: Request<v1::CreateSpaceRequest>,
    ) -> Result<Response<v1::Space>, Status> {
        let who = principal_from_request(&request)?;
        let response = SpaceServiceImpl::create_space(self, &who, request.into_inner()).await?;
        Ok(Response::new(response))
    }

    async fn get_space(
        &self,
        request: Request<v1::GetSpaceRequest>,
    ) -> Result<Response<v1::Space>, Status> {
        let who = principal_from_request(&request)?;
        let response = SpaceServiceImpl::get_space(self, &who, request.into_inner()).await?;
        Ok(Response::new(response))
    }

    async fn list_spaces(
        &self,
        request: Request<v1::ListSpacesRequest>,
    ) -> Result<Response<v1::ListSpacesResponse>, Status> {
        let who = principal_from_request(&request)?;
        let response = SpaceServiceImpl::list_spaces(self, &who, request.into_inner()).await?;
        Ok(Response::new(response))
    }

    async fn update_space(
        &self,
        request: Request<v1::UpdateSpaceRequest>,
    ) -> Result<Response<v1::Space>, Status> {
        let who = principal_from_request(&request)?;
        let response = SpaceServiceImpl::update_space(self, &who, request.into_inner()).await?;
        Ok(Response::new(response))
    }

    async fn delete_space(
        &self,
        request: Request<v1::DeleteSpaceRequest>,
    ) -> Result<Response<v1::DeleteSpaceResponse>, Status> {
        let who = principal_from_request(&request)?;
        let response = SpaceServiceImpl::delete_space(self, &who, request.into_inner()).await?;
        Ok(Response::new(response))
    }
}
