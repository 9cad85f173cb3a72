//! API key queries.
//!
//! Only hashed key material flows through this module; raw keys never reach
//! the access layer.

use sqlx::postgres::PgRow;
use sqlx::{PgPool, Postgres, Row, Transaction};
use uuid::Uuid;

use crate::database::{labels_from_json, labels_to_json};
use crate::error::ApiError;
use crate::models::{ApiKeyRecord, ApiKeyStatus};

fn api_key_from_row(row: &PgRow) -> Result<ApiKeyRecord, ApiError> {
    let status: String = row.try_get("status")?;
    Ok(ApiKeyRecord {
        api_key_id: row.try_get("api_key_id")?,
        user_id: row.try_get("user_id")?,
        key_prefix: row.try_get("key_prefix")?,
        hashed_key_material: row.try_get("hashed_key_material")?,
        status: ApiKeyStatus::parse(&status)?,
        labels: labels_from_json(row.try_get("labels")?)?,
        expires_at: row.try_get("expires_at")?,
        last_used_at: row.try_get("last_used_at")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
        created_by: row.try_get("created_by")?,
        updated_by: row.try_get("updated_by")?,
    })
}

/// Inserts a key row inside an existing transaction.
///
/// Used by the bootstrap operation, which must create the root user, the
/// role binding, and the key atomically.
pub(crate) async fn insert_api_key_tx(
    tx: &mut Transaction<'_, Postgres>,
    key: &ApiKeyRecord,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO apikey (
            api_key_id, user_id, key_prefix, hashed_key_material, status,
            labels, expires_at, last_used_at, created_at, updated_at,
            created_by, updated_by
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $9, $10, $11)
        "#,
    )
    .bind(key.api_key_id)
    .bind(key.user_id)
    .bind(&key.key_prefix)
    .bind(&key.hashed_key_material)
    .bind(key.status.as_str())
    .bind(labels_to_json(&key.labels))
    .bind(key.expires_at)
    .bind(key.last_used_at)
    .bind(key.created_at)
    .bind(key.created_by)
    .bind(key.updated_by)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

/// Upserts a key by primary key; `updated_at` always advances to now.
///
/// Returns the number of rows affected.
pub async fn save_api_key(pool: &PgPool, key: &ApiKeyRecord) -> Result<u64, ApiError> {
    let result = sqlx::query(
        r#"
        INSERT INTO apikey (
            api_key_id, user_id, key_prefix, hashed_key_material, status,
            labels, expires_at, last_used_at, created_at, updated_at,
            created_by, updated_by
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, now(), $10, $11)
        ON CONFLICT (api_key_id) DO UPDATE SET
            status = EXCLUDED.status,
            labels = EXCLUDED.labels,
            expires_at = EXCLUDED.expires_at,
            updated_at = now(),
            updated_by = EXCLUDED.updated_by
        "#,
    )
    .bind(key.api_key_id)
    .bind(key.user_id)
    .bind(&key.key_prefix)
    .bind(&key.hashed_key_material)
    .bind(key.status.as_str())
    .bind(labels_to_json(&key.labels))
    .bind(key.expires_at)
    .bind(key.last_used_at)
    .bind(key.created_at)
    .bind(key.created_by)
    .bind(key.updated_by)
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}

/// Looks a key up by its 32-byte storage hash.
///
/// This is the authentication path: it runs once per request, so it stays
/// a single indexed lookup.
pub async fn find_by_hash(pool: &PgPool, hash: &[u8]) -> Result<Option<ApiKeyRecord>, ApiError> {
    let row = sqlx::query(r#"SELECT * FROM apikey WHERE hashed_key_material = $1"#)
        .bind(hash)
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(api_key_from_row).transpose()
}

/// Finds a key by its identifier.
pub async fn find_by_id(pool: &PgPool, api_key_id: Uuid) -> Result<Option<ApiKeyRecord>, ApiError> {
    let row = sqlx::query(r#"SELECT * FROM apikey WHERE api_key_id = $1"#)
        .bind(api_key_id)
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(api_key_from_row).transpose()
}

/// Lists the keys owned by a user, newest first.
pub async fn list_by_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<ApiKeyRecord>, ApiError> {
    let rows = sqlx::query(
        r#"SELECT * FROM apikey WHERE user_id = $1 ORDER BY created_at DESC, api_key_id ASC"#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    rows.iter().map(api_key_from_row).collect()
}

/// Hard-deletes a key. Returns the number of rows removed.
pub async fn delete_api_key(pool: &PgPool, api_key_id: Uuid) -> Result<u64, ApiError> {
    let result = sqlx::query(r#"DELETE FROM apikey WHERE api_key_id = $1"#)
        .bind(api_key_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

/// Stamps `last_used_at` with the current time.
///
/// Called fire-and-forget from the principal resolver; failures are logged
/// by the caller and never affect the request being authenticated.
pub async fn touch_last_used(pool: &PgPool, api_key_id: Uuid) -> Result<(), ApiError> {
    sqlx::query(r#"UPDATE apikey SET last_used_at = now() WHERE api_key_id = $1"#)
        .bind(api_key_id)
        .execute(pool)
        .await?;
    Ok(())
}
