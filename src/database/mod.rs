//! # Database Module
//!
//! The sole reader/writer of persistent state. This module owns the
//! PostgreSQL connection pool, the idempotent schema migrations, and the
//! marshalling helpers shared by the per-entity query modules in
//! [`queries`]. It performs no authorization; every failure surfaces as a
//! tagged [`ApiError`].
//!
//! ## Database Schema
//!
//! Seven entity tables plus one bookkeeping row:
//!
//! - `"user"`: accounts (unique email)
//! - `user_role`: role bindings, with a partial unique index guaranteeing
//!   at most one `ROOT` binding across the whole deployment
//! - `apikey`: API key metadata (unique 32-byte hash, display prefix)
//! - `embedder`: embedding service configurations (unique display name per
//!   owner, encrypted credentials)
//! - `space`: memory containers (unique name per owner)
//! - `memory`: content blobs with a processing status
//! - `memory_chunk`: indexed text with a pgvector embedding (unique
//!   sequence number per memory)
//! - `system_state`: single-row record of the bootstrap outcome
//!
//! Required extensions: `vector` (pgvector) and `uuid-ossp`.
//!
//! ## Conventions
//!
//! - Identifiers are native `UUID` columns; timestamps are `TIMESTAMPTZ`.
//! - Labels and metadata are `JSONB`; a NULL column and an empty object are
//!   equivalent at the read boundary.
//! - Embedding vectors travel through the pgvector textual form
//!   (`[v1,v2,…]`) with explicit `::vector` casts, so no custom sqlx type
//!   registration is needed.
//! - Multi-row writes (bootstrap, cascade deletes, status transitions) run
//!   in REPEATABLE READ transactions and commit or roll back as a unit.

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::collections::BTreeMap;
use std::error::Error;

use crate::config::Config;
use crate::error::ApiError;
use crate::models::Labels;

pub mod queries;

/// Initializes the PostgreSQL connection pool and runs migrations.
///
/// The pool is bounded by `config.db_pool_size` with an acquire timeout of
/// `config.db_acquire_timeout`; a request that cannot obtain a connection
/// within the timeout observes an `Internal` error rather than waiting
/// indefinitely.
///
/// # Errors
///
/// Fails when the database is unreachable or a migration statement is
/// rejected. Both are fatal at startup.
pub async fn init_database(config: &Config) -> Result<PgPool, Box<dyn Error>> {
    let pool = PgPoolOptions::new()
        .max_connections(config.db_pool_size)
        .acquire_timeout(config.db_acquire_timeout)
        .connect(&config.database_url)
        .await?;

    run_migrations(&pool).await?;

    Ok(pool)
}

/// Executes the idempotent schema migrations.
///
/// Every statement is `IF NOT EXISTS`-guarded, so running this on an
/// already-migrated database is a no-op. Ordering matters: extensions
/// first, then tables in foreign-key order.
async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::Error> {
    tracing::info!("running database migrations");

    sqlx::query(r#"CREATE EXTENSION IF NOT EXISTS vector"#)
        .execute(pool)
        .await?;
    sqlx::query(r#"CREATE EXTENSION IF NOT EXISTS "uuid-ossp""#)
        .execute(pool)
        .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS "user" (
            user_id UUID PRIMARY KEY,
            username TEXT,
            email TEXT NOT NULL UNIQUE,
            display_name TEXT,
            created_at TIMESTAMPTZ NOT NULL,
            updated_at TIMESTAMPTZ NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS user_role (
            user_id UUID NOT NULL REFERENCES "user"(user_id),
            role_name TEXT NOT NULL,
            PRIMARY KEY (user_id, role_name)
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Serializes bootstrap across replicas: only one ROOT binding can ever
    // be committed, no matter how many servers race through initialization.
    sqlx::query(
        r#"
        CREATE UNIQUE INDEX IF NOT EXISTS user_role_single_root
            ON user_role (role_name) WHERE role_name = 'ROOT'
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS apikey (
            api_key_id UUID PRIMARY KEY,
            user_id UUID NOT NULL REFERENCES "user"(user_id),
            key_prefix VARCHAR(16) NOT NULL,
            hashed_key_material BYTEA NOT NULL UNIQUE,
            status TEXT NOT NULL DEFAULT 'ACTIVE',
            labels JSONB,
            expires_at TIMESTAMPTZ,
            last_used_at TIMESTAMPTZ,
            created_at TIMESTAMPTZ NOT NULL,
            updated_at TIMESTAMPTZ NOT NULL,
            created_by UUID NOT NULL,
            updated_by UUID NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS embedder (
            embedder_id UUID PRIMARY KEY,
            display_name TEXT NOT NULL,
            description TEXT,
            provider_type TEXT NOT NULL,
            endpoint_url TEXT NOT NULL,
            api_path TEXT NOT NULL DEFAULT '/v1/embeddings',
            model_identifier TEXT NOT NULL,
            dimensionality INTEGER NOT NULL CHECK (dimensionality > 0),
            max_sequence_length INTEGER,
            supported_modalities TEXT[] NOT NULL DEFAULT ARRAY['TEXT'],
            credentials TEXT NOT NULL,
            labels JSONB,
            version TEXT,
            monitoring_endpoint TEXT,
            owner_id UUID NOT NULL REFERENCES "user"(user_id),
            created_at TIMESTAMPTZ NOT NULL,
            updated_at TIMESTAMPTZ NOT NULL,
            created_by UUID NOT NULL,
            updated_by UUID NOT NULL,
            UNIQUE (owner_id, display_name)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS space (
            space_id UUID PRIMARY KEY,
            name VARCHAR(255) NOT NULL,
            labels JSONB,
            embedder_id UUID NOT NULL REFERENCES embedder(embedder_id),
            owner_id UUID NOT NULL REFERENCES "user"(user_id),
            public_read BOOLEAN NOT NULL DEFAULT FALSE,
            created_at TIMESTAMPTZ NOT NULL,
            updated_at TIMESTAMPTZ NOT NULL,
            created_by UUID NOT NULL,
            updated_by UUID NOT NULL,
            UNIQUE (owner_id, name)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS memory (
            memory_id UUID PRIMARY KEY,
            space_id UUID NOT NULL REFERENCES space(space_id),
            original_content_ref TEXT NOT NULL,
            content_type TEXT NOT NULL,
            metadata JSONB,
            processing_status TEXT NOT NULL DEFAULT 'PENDING',
            created_at TIMESTAMPTZ NOT NULL,
            updated_at TIMESTAMPTZ NOT NULL,
            created_by UUID NOT NULL,
            updated_by UUID NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    // The vector column is declared without a fixed dimension because each
    // space's embedder sets its own; the access layer enforces the
    // per-space dimension invariant instead.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS memory_chunk (
            chunk_id UUID PRIMARY KEY,
            memory_id UUID NOT NULL REFERENCES memory(memory_id),
            chunk_sequence_number INTEGER NOT NULL,
            chunk_text TEXT NOT NULL,
            embedding_vector vector,
            vector_status TEXT NOT NULL DEFAULT 'PENDING',
            start_offset INTEGER,
            end_offset INTEGER,
            created_at TIMESTAMPTZ NOT NULL,
            updated_at TIMESTAMPTZ NOT NULL,
            UNIQUE (memory_id, chunk_sequence_number)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS system_state (
            id INTEGER PRIMARY KEY CHECK (id = 1),
            initialized BOOLEAN NOT NULL,
            initialized_at TIMESTAMPTZ
        )
        "#,
    )
    .execute(pool)
    .await?;

    tracing::info!("database migrations complete");
    Ok(())
}

/// Serializes a label map for a JSONB column.
///
/// Keys are emitted in sorted order so the stored form is stable for a
/// given map, which keeps `@>` containment checks and test fixtures
/// deterministic.
pub fn labels_to_json(labels: &Labels) -> serde_json::Value {
    let ordered: BTreeMap<&String, &String> = labels.iter().collect();
    serde_json::to_value(ordered).unwrap_or_else(|_| serde_json::json!({}))
}

/// Deserializes a JSONB labels column.
///
/// A NULL column, JSON null, and an empty object are all the empty map;
/// any other object of string -> string is accepted.
pub fn labels_from_json(value: Option<serde_json::Value>) -> Result<Labels, ApiError> {
    match value {
        None | Some(serde_json::Value::Null) => Ok(Labels::new()),
        Some(serde_json::Value::Object(map)) => {
            let mut labels = Labels::new();
            for (k, v) in map {
                match v {
                    serde_json::Value::String(s) => {
                        labels.insert(k, s);
                    }
                    other => {
                        return Err(ApiError::internal(format!(
                            "label value for {:?} is not a string: {}",
                            k, other
                        )))
                    }
                }
            }
            Ok(labels)
        }
        Some(other) => Err(ApiError::internal(format!(
            "labels column is not an object: {}",
            other
        ))),
    }
}

/// Renders a float vector in the pgvector textual form `[v1,v2,…]`.
///
/// The rendered string is bound as text and cast with `::vector` in SQL.
pub fn vector_to_pg(vector: &[f32]) -> String {
    let mut out = String::with_capacity(vector.len() * 8 + 2);
    out.push('[');
    for (i, v) in vector.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        out.push_str(&v.to_string());
    }
    out.push(']');
    out
}

/// Parses the pgvector textual form back into a float vector.
pub fn vector_from_pg(text: &str) -> Result<Vec<f32>, ApiError> {
    let inner = text
        .strip_prefix('[')
        .and_then(|s| s.strip_suffix(']'))
        .ok_or_else(|| ApiError::internal(format!("malformed vector literal: {}", text)))?;
    if inner.trim().is_empty() {
        return Ok(Vec::new());
    }
    inner
        .split(',')
        .map(|part| {
            part.trim()
                .parse::<f32>()
                .map_err(|_| ApiError::internal(format!("malformed vector component: {}", part)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_round_trip_through_json() {
        let mut labels = Labels::new();
        labels.insert("env".to_string(), "prod".to_string());
        labels.insert("team".to_string(), "search".to_string());
        let json = labels_to_json(&labels);
        let back = labels_from_json(Some(json)).unwrap();
        assert_eq!(back, labels);
    }

    #[test]
    fn null_and_empty_labels_are_equivalent() {
        assert_eq!(labels_from_json(None).unwrap(), Labels::new());
        assert_eq!(
            labels_from_json(Some(serde_json::Value::Null)).unwrap(),
            Labels::new()
        );
        assert_eq!(
            labels_from_json(Some(serde_json::json!({}))).unwrap(),
            Labels::new()
        );
    }

    #[test]
    fn labels_serialization_is_stable() {
        let mut labels = Labels::new();
        labels.insert("b".to_string(), "2".to_string());
        labels.insert("a".to_string(), "1".to_string());
        labels.insert("c".to_string(), "3".to_string());
        let a = serde_json::to_string(&labels_to_json(&labels)).unwrap();
        let b = serde_json::to_string(&labels_to_json(&labels)).unwrap();
        assert_eq!(a, b);
        assert_eq!(a, r#"{"a":"1","b":"2","c":"3"}"#);
    }

    #[test]
    fn rejects_non_string_label_values() {
        let json = serde_json::json!({"count": 3});
        assert!(labels_from_json(Some(json)).is_err());
        let json = serde_json::json!(["a", "b"]);
        assert!(labels_from_json(Some(json)).is_err());
    }

    #[test]
    fn vector_round_trip() {
        let vector = vec![0.25, -1.5, 3.0];
        let text = vector_to_pg(&vector);
        assert_eq!(text, "[0.25,-1.5,3]");
        assert_eq!(vector_from_pg(&text).unwrap(), vector);
    }

    #[test]
    fn empty_vector_round_trip() {
        assert_eq!(vector_to_pg(&[]), "[]");
        assert_eq!(vector_from_pg("[]").unwrap(), Vec::<f32>::new());
    }

    #[test]
    fn rejects_malformed_vector_literals() {
        assert!(vector_from_pg("1,2,3").is_err());
        assert!(vector_from_pg("[1,abc]").is_err());
        assert!(vector_from_pg("").is_err());
    }
}
