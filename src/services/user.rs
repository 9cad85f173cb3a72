//! User lookups.

use tonic::{Request, Response, Status};

use crate::api::v1;
use crate::api::v1::user_service_server::UserService;
use crate::auth::{Action, Permission, Principal, Resource, Scope};
use crate::database::queries;
use crate::error::ApiError;
use crate::ids;

use super::{convert, principal_from_request, ServiceContext};

/// Implements `goodmem.v1.UserService`.
#[derive(Clone)]
pub struct UserServiceImpl {
    ctx: ServiceContext,
}

impl UserServiceImpl {
    pub fn new(ctx: ServiceContext) -> Self {
        UserServiceImpl { ctx }
    }

    /// Looks a user up by id, by email, or returns the caller.
    ///
    /// Lookup precedence: `user_id` wins; when both are present the email
    /// is ignored with a warning. With only `DISPLAY_USER_OWN` the target
    /// must be the caller — a mismatch is `PermissionDenied` before any
    /// database read, so foreign lookups reveal nothing.
    pub async fn get_user(
        &self,
        who: &Principal,
        request: v1::GetUserRequest,
    ) -> Result<v1::User, ApiError> {
        let display_any = who.has(Permission::new(Action::Display, Resource::User, Scope::Any));

        let user = if let Some(id_bytes) = request.user_id.as_ref() {
            if request.email.is_some() {
                tracing::warn!("GetUser received both user_id and email; email is ignored");
            }
            let target = ids::uuid_from_binary(id_bytes)?;
            if !display_any {
                who.require(Permission::new(Action::Display, Resource::User, Scope::Own))?;
                if target != who.user_id {
                    return Err(ApiError::denied(
                        "caller may only look up their own user record",
                    ));
                }
            }
            queries::users::find_user_by_id(&self.ctx.pool, target).await?
        } else if let Some(email) = request.email.as_deref() {
            if !display_any {
                who.require(Permission::new(Action::Display, Resource::User, Scope::Own))?;
                if email != who.email {
                    return Err(ApiError::denied(
                        "caller may only look up their own user record",
                    ));
                }
            }
            queries::users::find_user_by_email(&self.ctx.pool, email).await?
        } else {
            if !display_any {
                who.require(Permission::new(Action::Display, Resource::User, Scope::Own))?;
            }
            queries::users::find_user_by_id(&self.ctx.pool, who.user_id).await?
        };

        let user = user.ok_or_else(|| ApiError::not_found("user not found"))?;
        Ok(convert::user_to_wire(&user))
    }
}

#[tonic::async_trait]
impl UserService for UserServiceImpl {
    async fn get_user(
        &self,
        request: Request<v1::GetUserRequest>,
    ) -> Result<Response<v1::User>, Status> {
        let who = principal_from_request(&request)?;
        let user = UserServiceImpl::get_user(self, &who, request.into_inner()).await?;
        Ok(Response::new(user))
    }
}
