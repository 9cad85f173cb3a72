//! System bootstrap: the one-time creation of the root user and its key.

use chrono::Utc;
use tonic::{Request, Response, Status};
use uuid::Uuid;

use crate::api::v1;
use crate::api::v1::system_service_server::SystemService;
use crate::database::queries;
use crate::error::ApiError;
use crate::ids;
use crate::keys;
use crate::models::{ApiKeyRecord, ApiKeyStatus, Labels, User};

use super::ServiceContext;

/// Fixed identity of the root user created by bootstrap.
pub const ROOT_EMAIL: &str = "root@goodmem.ai";
pub const ROOT_DISPLAY_NAME: &str = "System Root User";
pub const ROOT_USERNAME: &str = "root";

/// Implements `goodmem.v1.SystemService`.
#[derive(Clone)]
pub struct SystemServiceImpl {
    ctx: ServiceContext,
}

impl SystemServiceImpl {
    pub fn new(ctx: ServiceContext) -> Self {
        SystemServiceImpl { ctx }
    }

    /// Idempotent first-call initialization.
    ///
    /// Creates the root user, assigns the ROOT role, and mints the root API
    /// key in one transaction. The raw key appears in exactly one response:
    /// the call that actually performed the initialization. Racing callers
    /// are serialized by the database (see
    /// [`queries::users::initialize_root`]) and observe the
    /// already-initialized outcome with no key material.
    pub async fn initialize_system(
        &self,
        _request: v1::InitializeSystemRequest,
    ) -> Result<v1::InitializeSystemResponse, ApiError> {
        // Fast path: skip key generation and the transaction entirely when
        // a root binding is already visible.
        if queries::users::root_exists(&self.ctx.pool).await? {
            return Ok(already_initialized_response());
        }

        let now = Utc::now();
        let root = User {
            user_id: Uuid::new_v4(),
            username: Some(ROOT_USERNAME.to_string()),
            email: ROOT_EMAIL.to_string(),
            display_name: Some(ROOT_DISPLAY_NAME.to_string()),
            created_at: now,
            updated_at: now,
        };

        let generated = keys::new_key();
        let key = ApiKeyRecord {
            api_key_id: Uuid::new_v4(),
            user_id: root.user_id,
            key_prefix: generated.display_prefix.clone(),
            hashed_key_material: generated.hashed_material.to_vec(),
            status: ApiKeyStatus::Active,
            labels: Labels::new(),
            expires_at: None,
            last_used_at: None,
            created_at: now,
            updated_at: now,
            created_by: root.user_id,
            updated_by: root.user_id,
        };

        let created = queries::users::initialize_root(&self.ctx.pool, &root, &key).await?;

        if created {
            tracing::info!(user_id = %root.user_id, "system initialized, root user created");
            Ok(v1::InitializeSystemResponse {
                already_initialized: false,
                root_api_key: generated.raw,
                user_id: ids::binary_from_uuid(&root.user_id),
                message: "System initialized successfully".to_string(),
            })
        } else {
            Ok(already_initialized_response())
        }
    }
}

fn already_initialized_response() -> v1::InitializeSystemResponse {
    v1::InitializeSystemResponse {
        already_initialized: true,
        root_api_key: String::new(),
        user_id: Vec::new(),
        message: "System is already initialized".to_string(),
    }
}

#[tonic::async_trait]
impl SystemService for SystemServiceImpl {
    async fn initialize_system(
        &self,
        request: Request<v1::InitializeSystemRequest>,
    ) -> Result<Response<v1::InitializeSystemResponse>, Status> {
        let response = SystemServiceImpl::initialize_system(self, request.into_inner()).await?;
        Ok(Response::new(response))
    }
}
