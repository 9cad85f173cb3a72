//! # Error Taxonomy
//!
//! Every failure that crosses a handler boundary is expressed as one of the
//! variants of [`ApiError`]. The access layer and the codecs produce these
//! directly; the transport adapters convert them at the very edge:
//!
//! - gRPC: [`ApiError`] -> [`tonic::Status`] (one status code per variant)
//! - REST: [`ApiError`] -> HTTP status + JSON `{"error": "..."}` body
//!
//! Internal details (database error chains, pool diagnostics) are logged via
//! `tracing` and never serialized into a client-visible message.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

/// The bounded error taxonomy surfaced at every handler boundary.
///
/// Each variant carries a one-line human-readable message. Messages are safe
/// to return to clients; anything sensitive stays in the logs.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed identifier, missing required field, unknown enum value,
    /// conflicting one-of, or a cursor token bound to another principal.
    #[error("{0}")]
    InvalidArgument(String),

    /// Missing, malformed, inactive, expired, or unknown API key.
    #[error("{0}")]
    Unauthenticated(String),

    /// The caller lacks the `*_ANY` permission needed to act on another
    /// principal's resources and has no `*_OWN` overlap.
    #[error("{0}")]
    PermissionDenied(String),

    /// Target row absent, or hidden from a caller holding only `*_OWN`.
    #[error("{0}")]
    NotFound(String),

    /// Uniqueness violation (email, name per owner, etc.).
    #[error("{0}")]
    AlreadyExists(String),

    /// State-machine violation or mutation of an immutable field.
    #[error("{0}")]
    FailedPrecondition(String),

    /// Unexpected access-layer failure or exhausted shared resource.
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    /// Shorthand constructors; the call sites read better with these than
    /// with the variant paths.
    pub fn invalid(msg: impl Into<String>) -> Self {
        ApiError::InvalidArgument(msg.into())
    }

    pub fn unauthenticated(msg: impl Into<String>) -> Self {
        ApiError::Unauthenticated(msg.into())
    }

    pub fn denied(msg: impl Into<String>) -> Self {
        ApiError::PermissionDenied(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        ApiError::NotFound(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        ApiError::AlreadyExists(msg.into())
    }

    pub fn precondition(msg: impl Into<String>) -> Self {
        ApiError::FailedPrecondition(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        ApiError::Internal(msg.into())
    }
}

/// Returns true when a sqlx error is a PostgreSQL unique-constraint
/// violation (SQLSTATE 23505).
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .and_then(|db| db.code())
        .map(|code| code == "23505")
        .unwrap_or(false)
}

impl From<sqlx::Error> for ApiError {
    /// Maps an access-layer failure into the taxonomy.
    ///
    /// Uniqueness violations become `AlreadyExists` so handlers can surface
    /// name/email conflicts without inspecting SQLSTATEs themselves. Pool
    /// exhaustion past the configured wait timeout is an `Internal` outcome.
    /// Everything else is logged and collapsed into a generic `Internal`.
    fn from(err: sqlx::Error) -> Self {
        if is_unique_violation(&err) {
            return ApiError::AlreadyExists("resource already exists".to_string());
        }
        match err {
            sqlx::Error::RowNotFound => ApiError::NotFound("not found".to_string()),
            sqlx::Error::PoolTimedOut => {
                tracing::error!("database connection pool exhausted");
                ApiError::Internal("connection pool exhausted".to_string())
            }
            other => {
                tracing::error!(error = %other, "database operation failed");
                ApiError::Internal("database operation failed".to_string())
            }
        }
    }
}

impl From<ApiError> for tonic::Status {
    fn from(err: ApiError) -> Self {
        let msg = err.to_string();
        match err {
            ApiError::InvalidArgument(_) => tonic::Status::invalid_argument(msg),
            ApiError::Unauthenticated(_) => tonic::Status::unauthenticated(msg),
            ApiError::PermissionDenied(_) => tonic::Status::permission_denied(msg),
            ApiError::NotFound(_) => tonic::Status::not_found(msg),
            ApiError::AlreadyExists(_) => tonic::Status::already_exists(msg),
            ApiError::FailedPrecondition(_) => tonic::Status::failed_precondition(msg),
            ApiError::Internal(_) => tonic::Status::internal(msg),
        }
    }
}

impl IntoResponse for ApiError {
    /// REST mapping of the taxonomy. `FailedPrecondition` follows the
    /// HTTP 412 convention; everything else maps onto the usual verbs.
    fn into_response(self) -> Response {
        let status = match self {
            ApiError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            ApiError::PermissionDenied(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::AlreadyExists(_) => StatusCode::CONFLICT,
            ApiError::FailedPrecondition(_) => StatusCode::PRECONDITION_FAILED,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = Json(serde_json::json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sqlx_row_not_found_maps_to_not_found() {
        let err: ApiError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[test]
    fn grpc_codes_match_taxonomy() {
        let status: tonic::Status = ApiError::conflict("space exists").into();
        assert_eq!(status.code(), tonic::Code::AlreadyExists);
        assert_eq!(status.message(), "space exists");

        let status: tonic::Status = ApiError::unauthenticated("no API key provided").into();
        assert_eq!(status.code(), tonic::Code::Unauthenticated);
    }

    #[test]
    fn rest_status_codes_match_taxonomy() {
        let resp = ApiError::denied("not yours").into_response();
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);

        let resp = ApiError::precondition("provider_type is immutable").into_response();
        assert_eq!(resp.status(), StatusCode::PRECONDITION_FAILED);
    }
}
