//! # Principal Resolver
//!
//! Wraps every service method. The flow per request:
//!
//! 1. If the method is on the unauthenticated allow-list (exactly
//!    `InitializeSystem`), proceed with no principal.
//! 2. Extract the `x-api-key` header; absent or unreadable is
//!    `Unauthenticated`.
//! 3. Validate the raw key's shape and compute its storage hash
//!    ([`crate::keys::verify`]); malformed is `Unauthenticated`.
//! 4. Look the hash up; unknown, inactive, or expired keys are
//!    `Unauthenticated`.
//! 5. Load the user and their roles, assemble a [`Principal`] (permission
//!    union; ROOT/ADMIN are unrestricted), attach it to the request
//!    extensions, and invoke the downstream handler.
//!
//! `last_used_at` is refreshed on a spawned task: it never blocks the
//! request path and its failures are logged, not surfaced.
//!
//! The resolver is stateless apart from the pool handle and is shared
//! freely across concurrent requests.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use chrono::Utc;
use http::{Request as HttpRequest, Response as HttpResponse};
use sqlx::PgPool;
use tonic::body::BoxBody;
use tower::{Layer, Service};

use crate::auth::Principal;
use crate::database::queries;
use crate::error::ApiError;
use crate::keys;

/// Header carrying the raw API key. Header-name matching is
/// case-insensitive by construction in HTTP/2.
pub const API_KEY_HEADER: &str = "x-api-key";

/// gRPC methods served without a principal.
pub const GRPC_ALLOW_LIST: &[&str] = &["/goodmem.v1.SystemService/InitializeSystem"];

/// Resolves raw API keys into [`Principal`]s. Shared by both transports.
#[derive(Clone)]
pub struct PrincipalResolver {
    pool: PgPool,
}

impl PrincipalResolver {
    pub fn new(pool: PgPool) -> Self {
        PrincipalResolver { pool }
    }

    /// Authenticates one request from its extracted `x-api-key` value.
    ///
    /// The transports extract the header themselves (they sit on different
    /// `http` crate versions); `None` means the header was absent or
    /// unreadable. One indexed database lookup on the hash, plus the
    /// user/role load. Every key-related failure collapses into
    /// `Unauthenticated`; the precise reason is logged, not returned, so
    /// probing clients learn nothing about which stage rejected them.
    pub async fn resolve(&self, raw_key: Option<&str>) -> Result<Principal, ApiError> {
        let raw = raw_key.ok_or_else(|| ApiError::unauthenticated("no API key provided"))?;

        let hash = keys::verify(raw)
            .map_err(|_| ApiError::unauthenticated("invalid API key"))?;

        let record = queries::api_keys::find_by_hash(&self.pool, &hash)
            .await?
            .ok_or_else(|| ApiError::unauthenticated("invalid API key"))?;

        if !record.authenticates_at(Utc::now()) {
            tracing::debug!(prefix = %record.key_prefix, "rejected inactive or expired API key");
            return Err(ApiError::unauthenticated("invalid API key"));
        }

        let user = queries::users::find_user_by_id(&self.pool, record.user_id)
            .await?
            .ok_or_else(|| {
                tracing::error!(user_id = %record.user_id, "api key references a missing user");
                ApiError::unauthenticated("invalid API key")
            })?;
        let roles = queries::users::roles_for_user(&self.pool, user.user_id).await?;

        // Fire-and-forget usage stamp; must never fail the request.
        let pool = self.pool.clone();
        let api_key_id = record.api_key_id;
        tokio::spawn(async move {
            if let Err(err) = queries::api_keys::touch_last_used(&pool, api_key_id).await {
                tracing::warn!(api_key_id = %api_key_id, error = %err, "failed to stamp last_used_at");
            }
        });

        Ok(Principal::from_roles(
            user.user_id,
            user.email,
            user.display_name,
            &roles,
        ))
    }
}

/// Tower layer installing the resolver in front of the tonic services.
#[derive(Clone)]
pub struct GrpcAuthLayer {
    resolver: PrincipalResolver,
}

impl GrpcAuthLayer {
    pub fn new(resolver: PrincipalResolver) -> Self {
        GrpcAuthLayer { resolver }
    }
}

impl<S> Layer<S> for GrpcAuthLayer {
    type Service = GrpcAuth<S>;

    fn layer(&self, inner: S) -> Self::Service {
        GrpcAuth {
            inner,
            resolver: self.resolver.clone(),
        }
    }
}

/// The middleware service produced by [`GrpcAuthLayer`].
#[derive(Clone)]
pub struct GrpcAuth<S> {
    inner: S,
    resolver: PrincipalResolver,
}

impl<S, ReqBody> Service<HttpRequest<ReqBody>> for GrpcAuth<S>
where
    S: Service<HttpRequest<ReqBody>, Response = HttpResponse<BoxBody>> + Clone + Send + 'static,
    S::Future: Send + 'static,
    ReqBody: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future =
        Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send + 'static>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: HttpRequest<ReqBody>) -> Self::Future {
        // Swap in the ready service and keep the clone for later calls.
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);
        let resolver = self.resolver.clone();

        Box::pin(async move {
            if GRPC_ALLOW_LIST.contains(&req.uri().path()) {
                return inner.call(req).await;
            }

            let raw_key = req
                .headers()
                .get(API_KEY_HEADER)
                .and_then(|value| value.to_str().ok())
                .map(str::to_string);

            match resolver.resolve(raw_key.as_deref()).await {
                Ok(principal) => {
                    req.extensions_mut().insert(principal);
                    inner.call(req).await
                }
                Err(err) => Ok(unauthenticated_response(err)),
            }
        })
    }
}

/// Builds the trailers-only gRPC error response for a rejected request.
fn unauthenticated_response(err: ApiError) -> HttpResponse<BoxBody> {
    let status: tonic::Status = err.into();
    HttpResponse::builder()
        .status(200)
        .header("content-type", "application/grpc")
        .header("grpc-status", (status.code() as i32).to_string())
        .header("grpc-message", status.message())
        .body(tonic::codegen::empty_body())
        .expect("static response parts are valid")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allow_list_contains_exactly_initialize_system() {
        assert_eq!(GRPC_ALLOW_LIST.len(), 1);
        assert!(GRPC_ALLOW_LIST.contains(&"/goodmem.v1.SystemService/InitializeSystem"));
        assert!(!GRPC_ALLOW_LIST.contains(&"/goodmem.v1.UserService/GetUser"));
    }

    #[test]
    fn rejected_requests_get_trailers_only_unauthenticated() {
        let response = unauthenticated_response(ApiError::unauthenticated("no API key provided"));
        assert_eq!(response.status(), 200);
        let code = tonic::Code::Unauthenticated as i32;
        assert_eq!(
            response
                .headers()
                .get("grpc-status")
                .unwrap()
                .to_str()
                .unwrap(),
            code.to_string()
        );
        assert_eq!(
            response
                .headers()
                .get("grpc-message")
                .unwrap()
                .to_str()
                .unwrap(),
            "no API key provided"
        );
    }
}
