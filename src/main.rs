//! # GoodMem Server Binary
//!
//! Entry point for the memory store. The startup sequence:
//!
//! 1. **Environment**: load `.env`, initialize structured logging
//! 2. **Configuration**: parse the typed [`Config`] from the environment
//! 3. **Database**: build the bounded PostgreSQL pool and run migrations
//! 4. **Wiring**: shared service context + principal resolver
//! 5. **Listeners**: the gRPC server and the REST adapter run side by
//!    side until either fails
//!
//! ```bash
//! # Start with defaults (gRPC :9090, REST :8080, local PostgreSQL)
//! cargo run
//!
//! # Point at a different database
//! DATABASE_URL=postgres://user:pass@db/goodmem cargo run
//! ```

use std::sync::Arc;

use goodmem_server::auth::resolver::PrincipalResolver;
use goodmem_server::config::Config;
use goodmem_server::database;
use goodmem_server::grpc;
use goodmem_server::rest::{self, RestState};
use goodmem_server::services::ServiceContext;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Arc::new(Config::from_env()?);

    let pool = database::init_database(&config).await?;
    let ctx = ServiceContext::new(pool.clone(), Arc::clone(&config));
    let resolver = PrincipalResolver::new(pool);

    let rest_state = Arc::new(RestState::new(ctx.clone(), resolver.clone()));
    let rest_app = rest::router(rest_state, config.request_timeout);
    let rest_addr = config.rest_addr;

    tracing::info!(addr = %rest_addr, "REST listener starting");

    let rest_server = async move {
        let listener = tokio::net::TcpListener::bind(rest_addr).await?;
        axum::serve(listener, rest_app).await?;
        Ok::<(), Box<dyn std::error::Error>>(())
    };

    let grpc_server = grpc::serve(ctx, resolver, &config);

    tokio::try_join!(rest_server, grpc_server)?;

    Ok(())
}
