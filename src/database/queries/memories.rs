//! Memory and memory-chunk queries.
//!
//! Includes the operations the external chunking/embedding worker calls to
//! honor its contract: chunk upserts and the processing-status transition,
//! both validated against the state machines in [`crate::models`].

use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::database::{labels_from_json, labels_to_json, vector_from_pg, vector_to_pg};
use crate::error::ApiError;
use crate::models::{Memory, MemoryChunk, ProcessingStatus, VectorStatus};

fn memory_from_row(row: &PgRow) -> Result<Memory, ApiError> {
    let status: String = row.try_get("processing_status")?;
    Ok(Memory {
        memory_id: row.try_get("memory_id")?,
        space_id: row.try_get("space_id")?,
        original_content_ref: row.try_get("original_content_ref")?,
        content_type: row.try_get("content_type")?,
        metadata: labels_from_json(row.try_get("metadata")?)?,
        processing_status: ProcessingStatus::parse(&status)?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
        created_by: row.try_get("created_by")?,
        updated_by: row.try_get("updated_by")?,
    })
}

fn chunk_from_row(row: &PgRow) -> Result<MemoryChunk, ApiError> {
    let status: String = row.try_get("vector_status")?;
    let embedding_text: Option<String> = row.try_get("embedding_text")?;
    let embedding_vector = match embedding_text {
        Some(text) => Some(vector_from_pg(&text)?),
        None => None,
    };

    Ok(MemoryChunk {
        chunk_id: row.try_get("chunk_id")?,
        memory_id: row.try_get("memory_id")?,
        chunk_sequence_number: row.try_get("chunk_sequence_number")?,
        chunk_text: row.try_get("chunk_text")?,
        embedding_vector,
        vector_status: VectorStatus::parse(&status)?,
        start_offset: row.try_get("start_offset")?,
        end_offset: row.try_get("end_offset")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

/// Upserts a memory by primary key. Returns rows affected.
pub async fn save_memory(pool: &PgPool, memory: &Memory) -> Result<u64, ApiError> {
    let result = sqlx::query(
        r#"
        INSERT INTO memory (
            memory_id, space_id, original_content_ref, content_type,
            metadata, processing_status, created_at, updated_at,
            created_by, updated_by
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, now(), $8, $9)
        ON CONFLICT (memory_id) DO UPDATE SET
            original_content_ref = EXCLUDED.original_content_ref,
            content_type = EXCLUDED.content_type,
            metadata = EXCLUDED.metadata,
            processing_status = EXCLUDED.processing_status,
            updated_at = now(),
            updated_by = EXCLUDED.updated_by
        "#,
    )
    .bind(memory.memory_id)
    .bind(memory.space_id)
    .bind(&memory.original_content_ref)
    .bind(&memory.content_type)
    .bind(labels_to_json(&memory.metadata))
    .bind(memory.processing_status.as_str())
    .bind(memory.created_at)
    .bind(memory.created_by)
    .bind(memory.updated_by)
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}

/// Finds a memory by its identifier.
pub async fn find_by_id(pool: &PgPool, memory_id: Uuid) -> Result<Option<Memory>, ApiError> {
    let row = sqlx::query(r#"SELECT * FROM memory WHERE memory_id = $1"#)
        .bind(memory_id)
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(memory_from_row).transpose()
}

/// Lists the memories of a space, newest first with a stable tie-break.
pub async fn list_by_space(pool: &PgPool, space_id: Uuid) -> Result<Vec<Memory>, ApiError> {
    let rows = sqlx::query(
        r#"SELECT * FROM memory WHERE space_id = $1 ORDER BY created_at DESC, memory_id ASC"#,
    )
    .bind(space_id)
    .fetch_all(pool)
    .await?;

    rows.iter().map(memory_from_row).collect()
}

/// Deletes a memory together with its chunks in one transaction.
///
/// Returns the number of memory rows removed.
pub async fn delete_memory_cascade(pool: &PgPool, memory_id: Uuid) -> Result<u64, ApiError> {
    let mut tx = pool.begin().await?;
    sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ")
        .execute(&mut *tx)
        .await?;

    sqlx::query(r#"DELETE FROM memory_chunk WHERE memory_id = $1"#)
        .bind(memory_id)
        .execute(&mut *tx)
        .await?;

    let result = sqlx::query(r#"DELETE FROM memory WHERE memory_id = $1"#)
        .bind(memory_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(result.rows_affected())
}

/// Advances a memory's processing status on behalf of the worker.
///
/// The current row is locked, the transition validated against the
/// `PENDING -> PROCESSING -> {COMPLETED, FAILED}` machine, and the update
/// committed; an illegal transition rolls back with `FailedPrecondition`.
pub async fn update_processing_status(
    pool: &PgPool,
    memory_id: Uuid,
    next: ProcessingStatus,
) -> Result<(), ApiError> {
    let mut tx = pool.begin().await?;
    sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ")
        .execute(&mut *tx)
        .await?;

    let row = sqlx::query(
        r#"SELECT processing_status FROM memory WHERE memory_id = $1 FOR UPDATE"#,
    )
    .bind(memory_id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or_else(|| ApiError::not_found(format!("memory {} not found", memory_id)))?;

    let current = ProcessingStatus::parse(row.try_get::<String, _>("processing_status")?.as_str())?;
    if !current.can_transition_to(next) {
        return Err(ApiError::precondition(format!(
            "illegal processing status transition {} -> {}",
            current.as_str(),
            next.as_str()
        )));
    }

    sqlx::query(
        r#"UPDATE memory SET processing_status = $2, updated_at = now() WHERE memory_id = $1"#,
    )
    .bind(memory_id)
    .bind(next.as_str())
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(())
}

/// Upserts a chunk by primary key on behalf of the worker.
///
/// A `GENERATED` chunk must carry a vector; a vector-less `GENERATED` row
/// would poison similarity search, so it is rejected before any SQL runs.
/// A `(memory_id, chunk_sequence_number)` collision with a different chunk
/// id surfaces as `AlreadyExists`. Returns rows affected.
pub async fn save_chunk(pool: &PgPool, chunk: &MemoryChunk) -> Result<u64, ApiError> {
    if chunk.vector_status == VectorStatus::Generated && chunk.embedding_vector.is_none() {
        return Err(ApiError::invalid(
            "a GENERATED chunk must carry an embedding vector",
        ));
    }

    let vector_text = chunk.embedding_vector.as_deref().map(vector_to_pg);

    let result = sqlx::query(
        r#"
        INSERT INTO memory_chunk (
            chunk_id, memory_id, chunk_sequence_number, chunk_text,
            embedding_vector, vector_status, start_offset, end_offset,
            created_at, updated_at
        )
        VALUES ($1, $2, $3, $4, $5::vector, $6, $7, $8, $9, now())
        ON CONFLICT (chunk_id) DO UPDATE SET
            chunk_text = EXCLUDED.chunk_text,
            embedding_vector = EXCLUDED.embedding_vector,
            vector_status = EXCLUDED.vector_status,
            start_offset = EXCLUDED.start_offset,
            end_offset = EXCLUDED.end_offset,
            updated_at = now()
        "#,
    )
    .bind(chunk.chunk_id)
    .bind(chunk.memory_id)
    .bind(chunk.chunk_sequence_number)
    .bind(&chunk.chunk_text)
    .bind(vector_text)
    .bind(chunk.vector_status.as_str())
    .bind(chunk.start_offset)
    .bind(chunk.end_offset)
    .bind(chunk.created_at)
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}

/// Finds the `k` chunks nearest to the query vector within a space.
///
/// Only chunks whose memory belongs to the space and whose vector status is
/// `GENERATED` participate. Ordering is L2 distance ascending with
/// `chunk_id` as tie-break.
pub async fn nearest_chunks(
    pool: &PgPool,
    space_id: Uuid,
    query_vector: &[f32],
    k: i64,
) -> Result<Vec<MemoryChunk>, ApiError> {
    let rows = sqlx::query(
        r#"
        SELECT mc.chunk_id, mc.memory_id, mc.chunk_sequence_number,
               mc.chunk_text, mc.embedding_vector::text AS embedding_text,
               mc.vector_status, mc.start_offset, mc.end_offset,
               mc.created_at, mc.updated_at
        FROM memory_chunk mc
        JOIN memory m ON m.memory_id = mc.memory_id
        WHERE m.space_id = $1 AND mc.vector_status = 'GENERATED'
        ORDER BY mc.embedding_vector <-> $2::vector ASC, mc.chunk_id ASC
        LIMIT $3
        "#,
    )
        .bind(space_id)
        .bind(vector_to_pg(query_vector))
        .bind(k)
        .fetch_all(pool)
        .await?;

    rows.iter().map(chunk_from_row).collect()
}
