//! # gRPC Listener
//!
//! Assembles the tonic server: optional TLS, the per-request deadline, the
//! principal-resolver layer, and the six `goodmem.v1` services.

use std::error::Error;

use tonic::transport::{Identity, Server, ServerTlsConfig};

use crate::api::v1::api_key_service_server::ApiKeyServiceServer;
use crate::api::v1::embedder_service_server::EmbedderServiceServer;
use crate::api::v1::memory_service_server::MemoryServiceServer;
use crate::api::v1::space_service_server::SpaceServiceServer;
use crate::api::v1::system_service_server::SystemServiceServer;
use crate::api::v1::user_service_server::UserServiceServer;
use crate::auth::resolver::{GrpcAuthLayer, PrincipalResolver};
use crate::config::Config;
use crate::services::api_key::ApiKeyServiceImpl;
use crate::services::embedder::EmbedderServiceImpl;
use crate::services::memory::MemoryServiceImpl;
use crate::services::space::SpaceServiceImpl;
use crate::services::system::SystemServiceImpl;
use crate::services::user::UserServiceImpl;
use crate::services::ServiceContext;

/// Serves the gRPC API until the process is stopped.
///
/// TLS is enabled when both PEM paths are configured (self-signed
/// certificates work for development); otherwise the listener speaks plain
/// HTTP/2. Requests that exceed the configured deadline surface as
/// DeadlineExceeded/Cancelled to the client.
pub async fn serve(
    ctx: ServiceContext,
    resolver: PrincipalResolver,
    config: &Config,
) -> Result<(), Box<dyn Error>> {
    let mut builder = Server::builder();

    if let Some(tls) = &config.tls {
        let cert = tokio::fs::read(&tls.cert_path).await?;
        let key = tokio::fs::read(&tls.key_path).await?;
        let identity = Identity::from_pem(cert, key);
        builder = builder.tls_config(ServerTlsConfig::new().identity(identity))?;
        tracing::info!("gRPC listener TLS enabled");
    }

    tracing::info!(addr = %config.grpc_addr, "gRPC listener starting");

    builder
        .timeout(config.request_timeout)
        .layer(GrpcAuthLayer::new(resolver))
        .add_service(SystemServiceServer::new(SystemServiceImpl::new(ctx.clone())))
        .add_service(UserServiceServer::new(UserServiceImpl::new(ctx.clone())))
        .add_service(ApiKeyServiceServer::new(ApiKeyServiceImpl::new(ctx.clone())))
        .add_service(EmbedderServiceServer::new(EmbedderServiceImpl::new(ctx.clone())))
        .add_service(SpaceServiceServer::new(SpaceServiceImpl::new(ctx.clone())))
        .add_service(MemoryServiceServer::new(MemoryServiceImpl::new(ctx)))
        .serve(config.grpc_addr)
        .await?;

    Ok(())
}
