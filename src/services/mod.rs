//! # Service Handlers
//!
//! One handler struct per resource, each following the same skeleton:
//! validate inputs, authorize against the caller's [`Principal`], call the
//! access layer, map the result onto the wire model.
//!
//! The real logic lives in inherent async methods that take the principal
//! and the wire request explicitly — the tonic trait implementations and
//! the REST handlers are both thin shims over those methods, which keeps
//! the two transports behaviorally identical.

pub mod api_key;
pub mod convert;
pub mod embedder;
pub mod memory;
pub mod space;
pub mod system;
pub mod user;

use std::sync::Arc;

use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::{Action, Permission, Principal, Resource, Scope};
use crate::config::Config;
use crate::database::queries;
use crate::error::ApiError;
use crate::models::Space;

/// Shared dependencies of every service handler.
#[derive(Clone)]
pub struct ServiceContext {
    pub pool: PgPool,
    pub config: Arc<Config>,
}

impl ServiceContext {
    pub fn new(pool: PgPool, config: Arc<Config>) -> Self {
        ServiceContext { pool, config }
    }
}

/// Pulls the [`Principal`] the resolver middleware attached to the request.
///
/// Every method except `InitializeSystem` runs behind the resolver, so a
/// missing principal means the middleware was bypassed; that is refused,
/// not defaulted.
pub fn principal_from_request<T>(request: &tonic::Request<T>) -> Result<Principal, tonic::Status> {
    request
        .extensions()
        .get::<Principal>()
        .cloned()
        .ok_or_else(|| tonic::Status::unauthenticated("no principal attached to request"))
}

/// Converts a caller-facing glob into the SQL LIKE pattern used by the
/// access layer.
///
/// `*` matches any sequence and `?` exactly one character; literal `%`,
/// `_`, and `\` are backslash-escaped. An empty glob matches everything.
pub fn glob_to_like(glob: &str) -> String {
    if glob.is_empty() {
        return "%".to_string();
    }
    let mut out = String::with_capacity(glob.len() + 4);
    for c in glob.chars() {
        match c {
            '*' => out.push('%'),
            '?' => out.push('_'),
            '%' => out.push_str("\\%"),
            '_' => out.push_str("\\_"),
            '\\' => out.push_str("\\\\"),
            other => out.push(other),
        }
    }
    out
}

/// Resolves a space the caller is allowed to *see*, for the given resource
/// family (`Resource::Space` for space reads, `Resource::Memory` for
/// memory operations scoped to the space).
///
/// Hidden and absent spaces are indistinguishable: both come back as
/// `NotFound`, so existence is never disclosed across a permission
/// boundary.
pub(crate) async fn visible_space(
    ctx: &ServiceContext,
    who: &Principal,
    space_id: Uuid,
    resource: Resource,
) -> Result<Space, ApiError> {
    let space = queries::spaces::find_by_id(&ctx.pool, space_id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("space {} not found", space_id)))?;

    if space.public_read
        || who.has(Permission::new(Action::Display, resource, Scope::Any))
        || (space.owner_id == who.user_id
            && who.has(Permission::new(Action::Display, resource, Scope::Own)))
    {
        Ok(space)
    } else {
        Err(ApiError::not_found(format!("space {} not found", space_id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn glob_star_and_question_translate() {
        assert_eq!(glob_to_like("S*"), "S%");
        assert_eq!(glob_to_like("S?"), "S_");
        assert_eq!(glob_to_like("*alpha*"), "%alpha%");
    }

    #[test]
    fn glob_escapes_like_metacharacters() {
        assert_eq!(glob_to_like("100%"), "100\\%");
        assert_eq!(glob_to_like("a_b"), "a\\_b");
        assert_eq!(glob_to_like("a\\b"), "a\\\\b");
    }

    #[test]
    fn empty_glob_matches_everything() {
        assert_eq!(glob_to_like(""), "%");
    }
}
