//! # Resolver
//!
//! Effective access for an account: admin bypass first, then the account's
//! stored matrix, then its role template.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::actions::Action;
use crate::error::{AclError, AclResult};
use crate::matrix::PermissionMatrix;
use crate::modules::{Module, ModuleRegistry};
use crate::roles::Role;
use crate::templates::RoleTemplateStore;

/// Anything that carries a role and an optional permission override.
pub trait Grantee {
    /// Role of the account.
    fn role(&self) -> &Role;

    /// Stored permission override; `None` means "use the role template".
    fn permissions(&self) -> Option<&PermissionMatrix>;
}

/// Minimal grantee: the `{role, permissions}` pair an identity source hands
/// to the guard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// Role of the account.
    pub role: Role,

    /// Stored permission override.
    #[serde(default)]
    pub permissions: Option<PermissionMatrix>,
}

impl Principal {
    /// Principal relying on its role template.
    pub fn new(role: Role) -> Self {
        Self {
            role,
            permissions: None,
        }
    }

    /// Attach a stored permission matrix.
    pub fn with_permissions(mut self, permissions: PermissionMatrix) -> Self {
        self.permissions = Some(permissions);
        self
    }
}

impl Grantee for Principal {
    fn role(&self) -> &Role {
        &self.role
    }

    fn permissions(&self) -> Option<&PermissionMatrix> {
        self.permissions.as_ref()
    }
}

impl<G: Grantee + ?Sized> Grantee for &G {
    fn role(&self) -> &Role {
        (**self).role()
    }

    fn permissions(&self) -> Option<&PermissionMatrix> {
        (**self).permissions()
    }
}

/// Resolves effective access. Cheap to clone and safe to share across tasks.
///
/// # Example
///
/// ```
/// use opsdesk_acl::{Action, Module, PermissionMatrix, Principal, Resolver, Role};
///
/// let resolver = Resolver::standard();
///
/// // Admins bypass stored permissions entirely.
/// let admin = Principal::new(Role::Admin).with_permissions(PermissionMatrix::new());
/// assert!(resolver.resolve(&admin, Module::Companies, Action::Delete));
///
/// // Everyone else falls back to their role template.
/// let manager = Principal::new(Role::Manager);
/// assert!(!resolver.resolve(&manager, Module::Users, Action::Create));
/// ```
#[derive(Debug, Clone)]
pub struct Resolver {
    templates: Arc<RoleTemplateStore>,
}

impl Resolver {
    /// Create a resolver over a template store (and its registry).
    pub fn new(templates: Arc<RoleTemplateStore>) -> Self {
        Self { templates }
    }

    /// Resolver over the process-wide registry and templates.
    pub fn standard() -> Self {
        Self::new(RoleTemplateStore::standard())
    }

    /// The module registry.
    pub fn registry(&self) -> &Arc<ModuleRegistry> {
        self.templates.registry()
    }

    /// The role template store.
    pub fn templates(&self) -> &Arc<RoleTemplateStore> {
        &self.templates
    }

    /// Decide whether `grantee` may perform `action` in `module`.
    ///
    /// Admins are allowed before stored permissions are looked at, so an
    /// empty or stale matrix on an admin account never denies. Everyone else
    /// reads their stored matrix, or their role template when none is stored.
    pub fn resolve<G: Grantee + ?Sized>(&self, grantee: &G, module: Module, action: Action) -> bool {
        if grantee.role().is_admin() {
            return true;
        }

        let matrix = match grantee.permissions() {
            Some(stored) => stored,
            None => self.templates.template(grantee.role()),
        };
        matrix.get(self.registry(), module, action)
    }

    /// [`Resolver::resolve`] with module and action given by name.
    ///
    /// # Errors
    ///
    /// [`AclError::UnknownModule`] or [`AclError::UnknownAction`] when a name
    /// does not parse. These are wiring mistakes, not access decisions.
    pub fn resolve_named<G: Grantee + ?Sized>(&self, grantee: &G, module: &str, action: &str) -> AclResult<bool> {
        let module = self.registry().lookup(module)?;
        let action = Action::parse(action).ok_or_else(|| AclError::UnknownAction(action.to_string()))?;
        Ok(self.resolve(grantee, module, action))
    }

    /// The matrix that [`Resolver::resolve`] effectively consults.
    ///
    /// For admins this is the full grant, whatever is stored.
    pub fn effective_matrix<G: Grantee + ?Sized>(&self, grantee: &G) -> PermissionMatrix {
        if grantee.role().is_admin() {
            return self.templates.template_for(&Role::Admin);
        }
        match grantee.permissions() {
            Some(stored) => stored.sanitized(self.registry()),
            None => self.templates.template_for(grantee.role()),
        }
    }
}
