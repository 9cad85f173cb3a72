//! User and role queries, including the bootstrap transaction.

use chrono::Utc;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::auth::Role;
use crate::error::{is_unique_violation, ApiError};
use crate::models::{ApiKeyRecord, User};

use super::api_keys;

fn user_from_row(row: &PgRow) -> Result<User, ApiError> {
    Ok(User {
        user_id: row.try_get("user_id")?,
        username: row.try_get("username")?,
        email: row.try_get("email")?,
        display_name: row.try_get("display_name")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

/// Finds a user by their identifier.
pub async fn find_user_by_id(pool: &PgPool, user_id: Uuid) -> Result<Option<User>, ApiError> {
    let row = sqlx::query(r#"SELECT * FROM "user" WHERE user_id = $1"#)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(user_from_row).transpose()
}

/// Finds a user by email. The match is case-sensitive.
pub async fn find_user_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, ApiError> {
    let row = sqlx::query(r#"SELECT * FROM "user" WHERE email = $1"#)
        .bind(email)
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(user_from_row).transpose()
}

/// Loads the roles bound to a user.
pub async fn roles_for_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<Role>, ApiError> {
    let rows = sqlx::query(r#"SELECT role_name FROM user_role WHERE user_id = $1"#)
        .bind(user_id)
        .fetch_all(pool)
        .await?;

    let mut roles = Vec::with_capacity(rows.len());
    for row in rows {
        let name: String = row.try_get("role_name")?;
        roles.push(Role::parse(&name)?);
    }
    Ok(roles)
}

/// Whether any user holds the ROOT role.
pub async fn root_exists(pool: &PgPool) -> Result<bool, ApiError> {
    let row = sqlx::query(r#"SELECT EXISTS(SELECT 1 FROM user_role WHERE role_name = 'ROOT') AS present"#)
        .fetch_one(pool)
        .await?;
    Ok(row.try_get("present")?)
}

/// Creates the root user, its ROOT binding, and its API key in one
/// transaction.
///
/// Returns `true` when this call created the root, `false` when the system
/// was already initialized. Concurrency is resolved by the database: the
/// partial unique index on `user_role (role_name) WHERE role_name = 'ROOT'`
/// (and the unique root email) let at most one caller commit; every loser
/// observes `false`. An in-process lock would not survive multiple server
/// replicas, so none is used.
pub async fn initialize_root(
    pool: &PgPool,
    root: &User,
    key: &ApiKeyRecord,
) -> Result<bool, ApiError> {
    let mut tx = pool.begin().await?;
    sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ")
        .execute(&mut *tx)
        .await?;

    let row = sqlx::query(
        r#"SELECT EXISTS(SELECT 1 FROM user_role WHERE role_name = 'ROOT') AS present"#,
    )
    .fetch_one(&mut *tx)
    .await?;
    let already: bool = row.try_get("present")?;
    if already {
        tx.commit().await?;
        return Ok(false);
    }

    let outcome: Result<(), sqlx::Error> = async {
        sqlx::query(
            r#"
            INSERT INTO "user" (user_id, username, email, display_name, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $5)
            "#,
        )
        .bind(root.user_id)
        .bind(&root.username)
        .bind(&root.email)
        .bind(&root.display_name)
        .bind(root.created_at)
        .execute(&mut *tx)
        .await?;

        sqlx::query(r#"INSERT INTO user_role (user_id, role_name) VALUES ($1, $2)"#)
            .bind(root.user_id)
            .bind(Role::Root.as_str())
            .execute(&mut *tx)
            .await?;

        api_keys::insert_api_key_tx(&mut tx, key).await?;

        sqlx::query(
            r#"
            INSERT INTO system_state (id, initialized, initialized_at)
            VALUES (1, TRUE, $1)
            ON CONFLICT (id) DO UPDATE SET initialized = TRUE, initialized_at = $1
            "#,
        )
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;

        Ok(())
    }
    .await;

    match outcome {
        Ok(()) => {
            tx.commit().await?;
            Ok(true)
        }
        Err(err) if is_unique_violation(&err) => {
            // A concurrent bootstrap won the race; roll back and report the
            // initialized outcome.
            tx.rollback().await?;
            Ok(false)
        }
        Err(err) => Err(err.into()),
    }
}
