//! # REST Adapter
//!
//! A 1:1 HTTP+JSON mapping of the gRPC surface. Paths follow
//! `/v1/<resource>[/<id>]`; identifiers are textual, timestamps are
//! millisecond integers, and label updates use `replaceLabels` /
//! `mergeLabels` body fields. The adapter shares the service handler
//! structs and the principal resolver with the gRPC listener, so there is
//! no independent business logic on this surface.

pub mod handlers;
pub mod models;

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::Method;
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;

use crate::auth::resolver::{PrincipalResolver, API_KEY_HEADER};
use crate::services::api_key::ApiKeyServiceImpl;
use crate::services::embedder::EmbedderServiceImpl;
use crate::services::memory::MemoryServiceImpl;
use crate::services::space::SpaceServiceImpl;
use crate::services::system::SystemServiceImpl;
use crate::services::user::UserServiceImpl;
use crate::services::ServiceContext;

/// Shared REST state: the service handlers plus the principal resolver.
pub struct RestState {
    pub system: SystemServiceImpl,
    pub users: UserServiceImpl,
    pub api_keys: ApiKeyServiceImpl,
    pub embedders: EmbedderServiceImpl,
    pub spaces: SpaceServiceImpl,
    pub memories: MemoryServiceImpl,
    pub resolver: PrincipalResolver,
}

impl RestState {
    pub fn new(ctx: ServiceContext, resolver: PrincipalResolver) -> Self {
        RestState {
            system: SystemServiceImpl::new(ctx.clone()),
            users: UserServiceImpl::new(ctx.clone()),
            api_keys: ApiKeyServiceImpl::new(ctx.clone()),
            embedders: EmbedderServiceImpl::new(ctx.clone()),
            spaces: SpaceServiceImpl::new(ctx.clone()),
            memories: MemoryServiceImpl::new(ctx),
            resolver,
        }
    }
}

/// Authentication middleware mirroring the gRPC interceptor.
///
/// `POST /v1/system/init` is the lone allow-listed route; everything else
/// requires a valid `x-api-key` and gets the resolved [`crate::auth::Principal`]
/// attached to its request extensions.
async fn require_principal(
    State(state): State<Arc<RestState>>,
    mut request: Request,
    next: Next,
) -> Response {
    if request.method() == Method::POST && request.uri().path() == "/v1/system/init" {
        return next.run(request).await;
    }

    let raw_key = request
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);

    match state.resolver.resolve(raw_key.as_deref()).await {
        Ok(principal) => {
            request.extensions_mut().insert(principal);
            next.run(request).await
        }
        Err(err) => err.into_response(),
    }
}

/// Builds the REST router.
pub fn router(state: Arc<RestState>, request_timeout: std::time::Duration) -> Router {
    Router::new()
        // System bootstrap - the only unauthenticated route.
        .route("/v1/system/init", post(handlers::initialize_system))
        // User lookup.
        .route("/v1/users", get(handlers::get_user))
        // API key management.
        .route(
            "/v1/apikeys",
            post(handlers::create_api_key).get(handlers::list_api_keys),
        )
        .route(
            "/v1/apikeys/:id",
            axum::routing::put(handlers::update_api_key).delete(handlers::delete_api_key),
        )
        // Embedder management.
        .route(
            "/v1/embedders",
            post(handlers::create_embedder).get(handlers::list_embedders),
        )
        .route(
            "/v1/embedders/:id",
            get(handlers::get_embedder)
                .put(handlers::update_embedder)
                .delete(handlers::delete_embedder),
        )
        // Space management.
        .route(
            "/v1/spaces",
            post(handlers::create_space).get(handlers::list_spaces),
        )
        .route(
            "/v1/spaces/:id",
            get(handlers::get_space)
                .put(handlers::update_space)
                .delete(handlers::delete_space),
        )
        // Memory management and similarity search.
        .route(
            "/v1/memories",
            post(handlers::create_memory).get(handlers::list_memories),
        )
        .route("/v1/memories/search", post(handlers::search_memory_chunks))
        .route(
            "/v1/memories/:id",
            get(handlers::get_memory).delete(handlers::delete_memory),
        )
        .layer(middleware::from_fn_with_state(
            Arc::clone(&state),
            require_principal,
        ))
        .layer(TimeoutLayer::new(request_timeout))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
