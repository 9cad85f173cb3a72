//! # Authorization Model
//!
//! Authorization is a pure function of the authenticated [`Principal`] and
//! the operation being attempted. The model has three layers:
//!
//! - [`Permission`] - an (action, resource, scope) triple such as
//!   `UPDATE_SPACE_OWN` or `DISPLAY_USER_ANY`;
//! - [`Role`] - a named bundle of permissions. `ROOT` and `ADMIN` are
//!   unrestricted; `USER` holds the `*_OWN` family for spaces, embedders,
//!   API keys, and memories plus `DISPLAY_USER_OWN`;
//! - [`Principal`] - the authenticated actor: user id, email, display name,
//!   and the union of their roles' permission sets.
//!
//! The uniform enforcement pattern at a handler is: if the caller targets
//! a different owner (or arbitrary rows), require the `*_ANY` permission;
//! otherwise require `*_OWN` and constrain the operation to rows owned by
//! the caller. [`Principal::require_scoped`] encodes exactly that.
//!
//! A `Principal` is a plain value, not a trait object: the database-backed
//! resolver, the bootstrap path, and tests all build one through ordinary
//! constructors.

pub mod resolver;

use std::collections::HashSet;
use std::fmt;

use uuid::Uuid;

use crate::error::ApiError;

/// What an operation does to a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Display,
    Create,
    Update,
    Delete,
}

/// The resource family a permission applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    User,
    Space,
    Embedder,
    ApiKey,
    Memory,
}

/// Whether a permission covers only the caller's own rows or any row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    Own,
    Any,
}

/// A single permission: `<ACTION>_<RESOURCE>_<SCOPE>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Permission {
    pub action: Action,
    pub resource: Resource,
    pub scope: Scope,
}

impl Permission {
    pub const fn new(action: Action, resource: Resource, scope: Scope) -> Self {
        Permission {
            action,
            resource,
            scope,
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let action = match self.action {
            Action::Display => "DISPLAY",
            Action::Create => "CREATE",
            Action::Update => "UPDATE",
            Action::Delete => "DELETE",
        };
        let resource = match self.resource {
            Resource::User => "USER",
            Resource::Space => "SPACE",
            Resource::Embedder => "EMBEDDER",
            Resource::ApiKey => "APIKEY",
            Resource::Memory => "MEMORY",
        };
        let scope = match self.scope {
            Scope::Own => "OWN",
            Scope::Any => "ANY",
        };
        write!(f, "{}_{}_{}", action, resource, scope)
    }
}

/// The named roles a user may hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Root,
    Admin,
    User,
}

impl Role {
    /// Database representation of the role name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Root => "ROOT",
            Role::Admin => "ADMIN",
            Role::User => "USER",
        }
    }

    /// Parses a stored role name.
    pub fn parse(name: &str) -> Result<Role, ApiError> {
        match name {
            "ROOT" => Ok(Role::Root),
            "ADMIN" => Ok(Role::Admin),
            "USER" => Ok(Role::User),
            other => Err(ApiError::internal(format!("unknown role: {}", other))),
        }
    }

    /// ROOT and ADMIN hold the universal permission.
    pub fn is_unrestricted(&self) -> bool {
        matches!(self, Role::Root | Role::Admin)
    }

    /// The permissions this role grants on its own.
    ///
    /// Unrestricted roles return the empty set here; their universality is
    /// carried by the [`PermissionSet::unrestricted`] flag instead of an
    /// enumeration.
    pub fn permissions(&self) -> HashSet<Permission> {
        let mut granted = HashSet::new();
        if let Role::User = self {
            for resource in [
                Resource::Space,
                Resource::Embedder,
                Resource::ApiKey,
                Resource::Memory,
            ] {
                for action in [
                    Action::Display,
                    Action::Create,
                    Action::Update,
                    Action::Delete,
                ] {
                    granted.insert(Permission::new(action, resource, Scope::Own));
                }
            }
            granted.insert(Permission::new(Action::Display, Resource::User, Scope::Own));
        }
        granted
    }
}

/// The union of the permissions granted by a set of roles.
#[derive(Debug, Clone, Default)]
pub struct PermissionSet {
    unrestricted: bool,
    granted: HashSet<Permission>,
}

impl PermissionSet {
    /// Builds the union over the given roles.
    pub fn from_roles(roles: &[Role]) -> Self {
        let mut set = PermissionSet::default();
        for role in roles {
            if role.is_unrestricted() {
                set.unrestricted = true;
            }
            set.granted.extend(role.permissions());
        }
        set
    }

    pub fn has(&self, perm: Permission) -> bool {
        self.unrestricted || self.granted.contains(&perm)
    }
}

/// The authenticated actor attached to every request.
#[derive(Debug, Clone)]
pub struct Principal {
    pub user_id: Uuid,
    pub email: String,
    pub display_name: Option<String>,
    pub permissions: PermissionSet,
}

impl Principal {
    /// Builds a principal from a resolved user row and their roles.
    pub fn from_roles(
        user_id: Uuid,
        email: String,
        display_name: Option<String>,
        roles: &[Role],
    ) -> Self {
        Principal {
            user_id,
            email,
            display_name,
            permissions: PermissionSet::from_roles(roles),
        }
    }

    /// The check primitive used by every handler.
    pub fn has(&self, perm: Permission) -> bool {
        self.permissions.has(perm)
    }

    /// Requires a single permission, failing with `PermissionDenied`.
    pub fn require(&self, perm: Permission) -> Result<(), ApiError> {
        if self.has(perm) {
            Ok(())
        } else {
            Err(ApiError::denied(format!("caller lacks {}", perm)))
        }
    }

    /// The uniform ownership check.
    ///
    /// When `target_owner` is the caller, `*_OWN` (or `*_ANY`) suffices;
    /// when it is some other principal, `*_ANY` is required.
    pub fn require_scoped(
        &self,
        action: Action,
        resource: Resource,
        target_owner: Uuid,
    ) -> Result<(), ApiError> {
        let any = Permission::new(action, resource, Scope::Any);
        if self.has(any) {
            return Ok(());
        }
        let own = Permission::new(action, resource, Scope::Own);
        if target_owner == self.user_id && self.has(own) {
            return Ok(());
        }
        if target_owner == self.user_id {
            Err(ApiError::denied(format!("caller lacks {}", own)))
        } else {
            Err(ApiError::denied(format!("caller lacks {}", any)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_principal() -> Principal {
        Principal::from_roles(
            Uuid::new_v4(),
            "user@example.com".to_string(),
            Some("Ordinary User".to_string()),
            &[Role::User],
        )
    }

    #[test]
    fn role_names_round_trip() {
        for role in [Role::Root, Role::Admin, Role::User] {
            assert_eq!(Role::parse(role.as_str()).unwrap(), role);
        }
        assert!(Role::parse("SUPERUSER").is_err());
    }

    #[test]
    fn user_role_grants_own_family_only() {
        let p = user_principal();
        assert!(p.has(Permission::new(Action::Create, Resource::Space, Scope::Own)));
        assert!(p.has(Permission::new(Action::Delete, Resource::Memory, Scope::Own)));
        assert!(p.has(Permission::new(Action::Display, Resource::User, Scope::Own)));
        assert!(!p.has(Permission::new(Action::Display, Resource::User, Scope::Any)));
        assert!(!p.has(Permission::new(Action::Update, Resource::Space, Scope::Any)));
    }

    #[test]
    fn root_and_admin_are_unrestricted() {
        for role in [Role::Root, Role::Admin] {
            let p = Principal::from_roles(
                Uuid::new_v4(),
                "admin@example.com".to_string(),
                None,
                &[role],
            );
            assert!(p.has(Permission::new(Action::Delete, Resource::Embedder, Scope::Any)));
            assert!(p.has(Permission::new(Action::Display, Resource::User, Scope::Any)));
        }
    }

    #[test]
    fn union_over_multiple_roles() {
        let p = Principal::from_roles(
            Uuid::new_v4(),
            "both@example.com".to_string(),
            None,
            &[Role::User, Role::Admin],
        );
        assert!(p.has(Permission::new(Action::Update, Resource::ApiKey, Scope::Any)));
    }

    #[test]
    fn scoped_check_distinguishes_own_and_any() {
        let p = user_principal();
        // Own rows pass with *_OWN.
        assert!(p
            .require_scoped(Action::Update, Resource::Space, p.user_id)
            .is_ok());
        // Foreign rows need *_ANY.
        let err = p
            .require_scoped(Action::Update, Resource::Space, Uuid::new_v4())
            .unwrap_err();
        assert!(matches!(err, ApiError::PermissionDenied(_)));
        assert!(err.to_string().contains("UPDATE_SPACE_ANY"));
    }

    #[test]
    fn permission_renders_spec_style_names() {
        let perm = Permission::new(Action::Delete, Resource::ApiKey, Scope::Any);
        assert_eq!(perm.to_string(), "DELETE_APIKEY_ANY");
    }
}
