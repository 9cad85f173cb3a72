//! Space queries: CRUD, the paginated list query, and the cascade delete.

use sqlx::postgres::PgRow;
use sqlx::{PgPool, Postgres, QueryBuilder, Row};
use uuid::Uuid;

use crate::database::{labels_from_json, labels_to_json};
use crate::error::ApiError;
use crate::models::{Labels, Space};

/// Filter and paging parameters of the space list query.
///
/// The service layer builds this either from a fresh request or from a
/// decoded pagination token; the access layer treats both identically.
#[derive(Debug, Clone)]
pub struct SpaceQuery {
    /// Restrict to a single owner when present.
    pub owner_filter: Option<Uuid>,
    /// Subset match against the row's labels.
    pub label_selectors: Labels,
    /// SQL LIKE pattern (already converted from the caller's glob),
    /// escaped with backslash.
    pub name_like: Option<String>,
    /// Requested sort field; mapped through [`sort_column`].
    pub sort_by: String,
    pub sort_ascending: bool,
    pub offset: i64,
    pub page_size: i64,
    /// Whether rows with `public_read` are visible beyond their owner.
    pub include_public: bool,
    /// Set when the caller holds the `DISPLAY_SPACE_ANY` permission; the
    /// per-row visibility predicate is skipped entirely.
    pub unrestricted: bool,
    /// The caller; visibility is evaluated against this id.
    pub requestor_id: Uuid,
}

/// One page of the space list query.
#[derive(Debug)]
pub struct SpacePage {
    pub rows: Vec<Space>,
    /// Count after filters but before paging; used to decide "has more".
    pub total_count: i64,
}

/// Maps a requested sort field onto the allow-listed column set.
///
/// Aliases `created_time`/`updated_time` are accepted; anything else falls
/// back to `created_at` so a hostile sort field can never reach the SQL
/// text.
pub fn sort_column(requested: &str) -> &'static str {
    match requested {
        "name" => "name",
        "created_at" | "created_time" => "created_at",
        "updated_at" | "updated_time" => "updated_at",
        _ => "created_at",
    }
}

fn space_from_row(row: &PgRow) -> Result<Space, ApiError> {
    Ok(Space {
        space_id: row.try_get("space_id")?,
        name: row.try_get("name")?,
        labels: labels_from_json(row.try_get("labels")?)?,
        embedder_id: row.try_get("embedder_id")?,
        owner_id: row.try_get("owner_id")?,
        public_read: row.try_get("public_read")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
        created_by: row.try_get("created_by")?,
        updated_by: row.try_get("updated_by")?,
    })
}

/// Upserts a space by primary key.
///
/// `embedder_id` is immutable and therefore absent from the conflict
/// update list. `updated_at` always advances to now; `updated_by` is set
/// by the caller. Returns rows affected. A `(owner_id, name)` collision
/// surfaces as `AlreadyExists`.
pub async fn save_space(pool: &PgPool, space: &Space) -> Result<u64, ApiError> {
    let result = sqlx::query(
        r#"
        INSERT INTO space (
            space_id, name, labels, embedder_id, owner_id, public_read,
            created_at, updated_at, created_by, updated_by
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, now(), $8, $9)
        ON CONFLICT (space_id) DO UPDATE SET
            name = EXCLUDED.name,
            labels = EXCLUDED.labels,
            public_read = EXCLUDED.public_read,
            updated_at = now(),
            updated_by = EXCLUDED.updated_by
        "#,
    )
    .bind(space.space_id)
    .bind(&space.name)
    .bind(labels_to_json(&space.labels))
    .bind(space.embedder_id)
    .bind(space.owner_id)
    .bind(space.public_read)
    .bind(space.created_at)
    .bind(space.created_by)
    .bind(space.updated_by)
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}

/// Finds a space by its identifier. No visibility applied here; the
/// handler decides what the caller may see.
pub async fn find_by_id(pool: &PgPool, space_id: Uuid) -> Result<Option<Space>, ApiError> {
    let row = sqlx::query(r#"SELECT * FROM space WHERE space_id = $1"#)
        .bind(space_id)
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(space_from_row).transpose()
}

/// Appends the visibility and filter predicates shared by the page and the
/// count queries.
fn push_filters(qb: &mut QueryBuilder<Postgres>, query: &SpaceQuery) {
    if query.unrestricted {
        qb.push(" WHERE TRUE");
    } else {
        qb.push(" WHERE (owner_id = ");
        qb.push_bind(query.requestor_id);
        if query.include_public {
            qb.push(" OR public_read");
        }
        qb.push(")");
    }

    if let Some(owner) = query.owner_filter {
        qb.push(" AND owner_id = ");
        qb.push_bind(owner);
    }
    if !query.label_selectors.is_empty() {
        qb.push(" AND COALESCE(labels, '{}'::jsonb) @> ");
        qb.push_bind(labels_to_json(&query.label_selectors));
    }
    if let Some(pattern) = &query.name_like {
        qb.push(" AND name LIKE ");
        qb.push_bind(pattern.clone());
        qb.push(" ESCAPE '\\'");
    }
}

/// Runs the paginated space list query.
///
/// A row is eligible iff the requestor owns it, or `include_public` is set
/// and the row is `public_read`. Label selectors are a subset match; the
/// name filter is a LIKE pattern prepared by the caller. Ordering is the
/// allow-listed sort column with an always-ascending `space_id` tie-break,
/// so enumeration under a token is stable. `total_count` is computed with
/// the same filters but without paging.
pub async fn query_spaces(pool: &PgPool, query: &SpaceQuery) -> Result<SpacePage, ApiError> {
    let mut count_qb: QueryBuilder<Postgres> =
        QueryBuilder::new("SELECT COUNT(*) AS total FROM space");
    push_filters(&mut count_qb, query);
    let total_count: i64 = count_qb
        .build()
        .fetch_one(pool)
        .await?
        .try_get("total")?;

    let mut page_qb: QueryBuilder<Postgres> = QueryBuilder::new("SELECT * FROM space");
    push_filters(&mut page_qb, query);

    let column = sort_column(&query.sort_by);
    let direction = if query.sort_ascending { "ASC" } else { "DESC" };
    page_qb.push(format!(" ORDER BY {} {}, space_id ASC", column, direction));

    page_qb.push(" LIMIT ");
    page_qb.push_bind(query.page_size);
    page_qb.push(" OFFSET ");
    page_qb.push_bind(query.offset);

    let rows = page_qb.build().fetch_all(pool).await?;
    let rows = rows
        .iter()
        .map(space_from_row)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(SpacePage { rows, total_count })
}

/// Deletes a space together with its memories and their chunks.
///
/// Runs as one REPEATABLE READ transaction: either the space and every
/// descendant row disappear, or nothing does. Returns the number of space
/// rows removed (0 when the space did not exist).
pub async fn delete_space_cascade(pool: &PgPool, space_id: Uuid) -> Result<u64, ApiError> {
    let mut tx = pool.begin().await?;
    sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ")
        .execute(&mut *tx)
        .await?;

    sqlx::query(
        r#"
        DELETE FROM memory_chunk
        WHERE memory_id IN (SELECT memory_id FROM memory WHERE space_id = $1)
        "#,
    )
    .bind(space_id)
    .execute(&mut *tx)
    .await?;

    sqlx::query(r#"DELETE FROM memory WHERE space_id = $1"#)
        .bind(space_id)
        .execute(&mut *tx)
        .await?;

    let result = sqlx::query(r#"DELETE FROM space WHERE space_id = $1"#)
        .bind(space_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(result.rows_affected())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sort_column_allow_list() {
        assert_eq!(sort_column("name"), "name");
        assert_eq!(sort_column("created_at"), "created_at");
        assert_eq!(sort_column("updated_at"), "updated_at");
        // Aliases.
        assert_eq!(sort_column("created_time"), "created_at");
        assert_eq!(sort_column("updated_time"), "updated_at");
        // Anything else silently falls back; injection attempts never reach
        // the SQL text.
        assert_eq!(sort_column(""), "created_at");
        assert_eq!(sort_column("name; DROP TABLE space"), "created_at");
        assert_eq!(sort_column("owner_id"), "created_at");
    }
}
