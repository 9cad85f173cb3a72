//! # Configuration Module
//!
//! All runtime configuration is read from the environment at startup (the
//! binary loads a `.env` file first via `dotenv`, so local development can
//! keep settings in a file). Parsing happens once into a typed [`Config`]
//! that is shared read-only across the server.
//!
//! ## Variables
//!
//! - `GOODMEM_GRPC_ADDR` - gRPC listen address (default `0.0.0.0:9090`)
//! - `GOODMEM_REST_ADDR` - REST listen address (default `0.0.0.0:8080`)
//! - `DATABASE_URL` - PostgreSQL URL (default `postgres://localhost/goodmem`)
//! - `GOODMEM_DB_POOL_SIZE` - max pool connections (default 10)
//! - `GOODMEM_DB_ACQUIRE_TIMEOUT_SECS` - pool wait timeout (default 5)
//! - `GOODMEM_REQUEST_TIMEOUT_SECS` - per-request deadline (default 30)
//! - `GOODMEM_TLS_CERT` / `GOODMEM_TLS_KEY` - PEM paths; both must be set
//!   to enable TLS on the gRPC listener, otherwise plain HTTP/2 is served
//! - `GOODMEM_CREDENTIALS_KEY` - base64 256-bit AES key for embedder
//!   credential encryption; an ephemeral key is generated when absent

use std::net::SocketAddr;
use std::time::Duration;

use crate::crypto;

/// Typed server configuration, resolved once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// gRPC listen address.
    pub grpc_addr: SocketAddr,
    /// REST listen address.
    pub rest_addr: SocketAddr,
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// Maximum number of pooled database connections.
    pub db_pool_size: u32,
    /// How long a request may wait for a pooled connection.
    pub db_acquire_timeout: Duration,
    /// Per-request deadline applied on both listeners.
    pub request_timeout: Duration,
    /// TLS certificate/key PEM paths; `None` serves plain HTTP/2.
    pub tls: Option<TlsConfig>,
    /// Base64-encoded AES-256 key protecting embedder credentials at rest.
    pub credentials_key: String,
}

/// TLS material for the gRPC listener.
#[derive(Debug, Clone)]
pub struct TlsConfig {
    pub cert_path: String,
    pub key_path: String,
}

impl Config {
    /// Reads the configuration from the environment.
    ///
    /// # Errors
    ///
    /// Fails when an address or numeric variable is present but cannot be
    /// parsed, or when only one of the two TLS paths is set.
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        let grpc_addr: SocketAddr = env_or("GOODMEM_GRPC_ADDR", "0.0.0.0:9090").parse()?;
        let rest_addr: SocketAddr = env_or("GOODMEM_REST_ADDR", "0.0.0.0:8080").parse()?;
        let database_url = env_or("DATABASE_URL", "postgres://localhost/goodmem");
        let db_pool_size: u32 = env_or("GOODMEM_DB_POOL_SIZE", "10").parse()?;
        let db_acquire_timeout =
            Duration::from_secs(env_or("GOODMEM_DB_ACQUIRE_TIMEOUT_SECS", "5").parse()?);
        let request_timeout =
            Duration::from_secs(env_or("GOODMEM_REQUEST_TIMEOUT_SECS", "30").parse()?);

        let tls = match (
            std::env::var("GOODMEM_TLS_CERT").ok(),
            std::env::var("GOODMEM_TLS_KEY").ok(),
        ) {
            (Some(cert_path), Some(key_path)) => Some(TlsConfig {
                cert_path,
                key_path,
            }),
            (None, None) => None,
            _ => {
                return Err("GOODMEM_TLS_CERT and GOODMEM_TLS_KEY must be set together".into())
            }
        };

        let credentials_key = match std::env::var("GOODMEM_CREDENTIALS_KEY") {
            Ok(key) => key,
            Err(_) => {
                tracing::warn!(
                    "GOODMEM_CREDENTIALS_KEY is not set; using an ephemeral key. \
                     Stored embedder credentials will not survive a restart."
                );
                crypto::generate_key()
            }
        };

        Ok(Config {
            grpc_addr,
            rest_addr,
            database_url,
            db_pool_size,
            db_acquire_timeout,
            request_timeout,
            tls,
            credentials_key,
        })
    }
}

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_or_falls_back_to_default() {
        assert_eq!(env_or("GOODMEM_TEST_UNSET_VARIABLE", "fallback"), "fallback");
    }
}
