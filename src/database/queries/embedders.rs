//! Embedder queries.

use sqlx::postgres::PgRow;
use sqlx::{PgPool, Postgres, QueryBuilder, Row};
use uuid::Uuid;

use crate::database::{labels_from_json, labels_to_json};
use crate::error::ApiError;
use crate::models::{Embedder, Labels, Modality, ProviderType};

fn embedder_from_row(row: &PgRow) -> Result<Embedder, ApiError> {
    let provider: String = row.try_get("provider_type")?;
    let modalities: Vec<String> = row.try_get("supported_modalities")?;
    let supported_modalities = modalities
        .iter()
        .map(|m| Modality::parse(m))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Embedder {
        embedder_id: row.try_get("embedder_id")?,
        display_name: row.try_get("display_name")?,
        description: row.try_get("description")?,
        provider_type: ProviderType::parse(&provider)?,
        endpoint_url: row.try_get("endpoint_url")?,
        api_path: row.try_get("api_path")?,
        model_identifier: row.try_get("model_identifier")?,
        dimensionality: row.try_get("dimensionality")?,
        max_sequence_length: row.try_get("max_sequence_length")?,
        supported_modalities,
        credentials: row.try_get("credentials")?,
        labels: labels_from_json(row.try_get("labels")?)?,
        version: row.try_get("version")?,
        monitoring_endpoint: row.try_get("monitoring_endpoint")?,
        owner_id: row.try_get("owner_id")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
        created_by: row.try_get("created_by")?,
        updated_by: row.try_get("updated_by")?,
    })
}

/// Upserts an embedder by primary key.
///
/// `provider_type` is deliberately absent from the conflict update list:
/// it is immutable after creation and the handlers reject attempts to
/// change it before this statement ever runs. Returns rows affected.
pub async fn save_embedder(pool: &PgPool, embedder: &Embedder) -> Result<u64, ApiError> {
    let modalities: Vec<String> = embedder
        .supported_modalities
        .iter()
        .map(|m| m.as_str().to_string())
        .collect();

    let result = sqlx::query(
        r#"
        INSERT INTO embedder (
            embedder_id, display_name, description, provider_type,
            endpoint_url, api_path, model_identifier, dimensionality,
            max_sequence_length, supported_modalities, credentials, labels,
            version, monitoring_endpoint, owner_id, created_at, updated_at,
            created_by, updated_by
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14,
                $15, $16, now(), $17, $18)
        ON CONFLICT (embedder_id) DO UPDATE SET
            display_name = EXCLUDED.display_name,
            description = EXCLUDED.description,
            endpoint_url = EXCLUDED.endpoint_url,
            api_path = EXCLUDED.api_path,
            model_identifier = EXCLUDED.model_identifier,
            dimensionality = EXCLUDED.dimensionality,
            max_sequence_length = EXCLUDED.max_sequence_length,
            supported_modalities = EXCLUDED.supported_modalities,
            credentials = EXCLUDED.credentials,
            labels = EXCLUDED.labels,
            version = EXCLUDED.version,
            monitoring_endpoint = EXCLUDED.monitoring_endpoint,
            updated_at = now(),
            updated_by = EXCLUDED.updated_by
        "#,
    )
    .bind(embedder.embedder_id)
    .bind(&embedder.display_name)
    .bind(&embedder.description)
    .bind(embedder.provider_type.as_str())
    .bind(&embedder.endpoint_url)
    .bind(&embedder.api_path)
    .bind(&embedder.model_identifier)
    .bind(embedder.dimensionality)
    .bind(embedder.max_sequence_length)
    .bind(&modalities)
    .bind(&embedder.credentials)
    .bind(labels_to_json(&embedder.labels))
    .bind(&embedder.version)
    .bind(&embedder.monitoring_endpoint)
    .bind(embedder.owner_id)
    .bind(embedder.created_at)
    .bind(embedder.created_by)
    .bind(embedder.updated_by)
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}

/// Finds an embedder by its identifier.
pub async fn find_by_id(pool: &PgPool, embedder_id: Uuid) -> Result<Option<Embedder>, ApiError> {
    let row = sqlx::query(r#"SELECT * FROM embedder WHERE embedder_id = $1"#)
        .bind(embedder_id)
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(embedder_from_row).transpose()
}

/// Lists embedders matching the given filters.
///
/// - `owner_filter` restricts to a single owner when present.
/// - `provider_type` restricts to one provider family when present.
/// - `label_selectors` is a subset match: every pair must appear in the
///   row's labels (JSONB `@>` containment).
///
/// Ordering is `display_name` ascending with `embedder_id` as tie-break.
pub async fn list_embedders(
    pool: &PgPool,
    owner_filter: Option<Uuid>,
    provider_type: Option<ProviderType>,
    label_selectors: &Labels,
) -> Result<Vec<Embedder>, ApiError> {
    let mut qb: QueryBuilder<Postgres> = QueryBuilder::new("SELECT * FROM embedder WHERE TRUE");

    if let Some(owner) = owner_filter {
        qb.push(" AND owner_id = ");
        qb.push_bind(owner);
    }
    if let Some(provider) = provider_type {
        qb.push(" AND provider_type = ");
        qb.push_bind(provider.as_str());
    }
    if !label_selectors.is_empty() {
        qb.push(" AND COALESCE(labels, '{}'::jsonb) @> ");
        qb.push_bind(labels_to_json(label_selectors));
    }
    qb.push(" ORDER BY display_name ASC, embedder_id ASC");

    let rows = qb.build().fetch_all(pool).await?;
    rows.iter().map(embedder_from_row).collect()
}

/// Deletes an embedder. Returns the number of rows removed.
///
/// Spaces reference embedders with a plain foreign key, so deleting an
/// embedder that still backs a space fails at the database and surfaces as
/// `Internal`; the handler checks for dependent spaces first to produce the
/// proper `FailedPrecondition`.
pub async fn delete_embedder(pool: &PgPool, embedder_id: Uuid) -> Result<u64, ApiError> {
    let result = sqlx::query(r#"DELETE FROM embedder WHERE embedder_id = $1"#)
        .bind(embedder_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

/// Counts the spaces currently configured with this embedder.
pub async fn space_count(pool: &PgPool, embedder_id: Uuid) -> Result<i64, ApiError> {
    let row = sqlx::query(r#"SELECT COUNT(*) AS n FROM space WHERE embedder_id = $1"#)
        .bind(embedder_id)
        .fetch_one(pool)
        .await?;
    Ok(row.try_get("n")?)
}
