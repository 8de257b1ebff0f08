//! # Role Templates
//!
//! Default permission matrices per role. A new account starts from its
//! role's template, and a role change resets the account to the new one.
//!
//! The admin template is derived from the registry (every declared action
//! granted) through [`PermissionMatrix::set_all`], the same derivation the
//! editor's global "select all" uses. The other templates are curated grant
//! lists below.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use crate::actions::Action;
use crate::matrix::PermissionMatrix;
use crate::modules::{Module, ModuleRegistry};
use crate::roles::Role;

use crate::actions::Action::{Create, Delete, Edit, Export, Import, View};

/// Curated grants of the `manager` role.
const MANAGER_GRANTS: &[(Module, &[Action])] = &[
    (Module::Companies, &[View]),
    (Module::Locations, &[View, Edit]),
    (Module::Providers, &[View]),
    (Module::Cabinets, &[View]),
    (Module::GameMixes, &[View]),
    (Module::Slots, &[View, Create, Edit, Export]),
    (Module::Warehouse, &[View, Edit]),
    (Module::Metrology, &[View]),
    (Module::Jackpots, &[View, Edit]),
    (Module::Invoices, &[View]),
    (Module::LegalDocuments, &[View]),
    (Module::Marketing, &[View]),
    (Module::Users, &[View]),
];

/// Curated grants of the `user` role, also the fallback for unknown roles.
const USER_GRANTS: &[(Module, &[Action])] = &[
    (Module::Companies, &[View]),
    (Module::Locations, &[View]),
    (Module::Providers, &[View]),
    (Module::Cabinets, &[View]),
    (Module::GameMixes, &[View]),
    (Module::Slots, &[View]),
    (Module::Jackpots, &[View]),
];

/// Curated grants of the `marketing` role.
const MARKETING_GRANTS: &[(Module, &[Action])] = &[
    (Module::Companies, &[View]),
    (Module::Locations, &[View]),
    (Module::Slots, &[View]),
    (Module::Jackpots, &[View, Create, Edit]),
    (Module::Marketing, &[View, Create, Edit, Delete]),
];

/// Curated grants of the `operational` role.
const OPERATIONAL_GRANTS: &[(Module, &[Action])] = &[
    (Module::Locations, &[View, Edit]),
    (Module::Providers, &[View]),
    (Module::Cabinets, &[View, Create, Edit]),
    (Module::GameMixes, &[View, Create, Edit]),
    (Module::Slots, &[View, Create, Edit, Import]),
    (Module::Warehouse, &[View, Create, Edit, Delete]),
    (Module::Metrology, &[View, Create, Edit]),
];

/// Curated grants of the `financiar` role.
const FINANCIAR_GRANTS: &[(Module, &[Action])] = &[
    (Module::Companies, &[View, Edit]),
    (Module::Locations, &[View]),
    (Module::Slots, &[View, Export]),
    (Module::Metrology, &[View, Export]),
    (Module::Invoices, &[View, Create, Edit, Delete, Export]),
    (Module::OnjnReports, &[View, Export]),
    (Module::LegalDocuments, &[View]),
];

fn curated_grants(role: &Role) -> Option<&'static [(Module, &'static [Action])]> {
    match role {
        Role::Manager => Some(MANAGER_GRANTS),
        Role::User => Some(USER_GRANTS),
        Role::Marketing => Some(MARKETING_GRANTS),
        Role::Operational => Some(OPERATIONAL_GRANTS),
        Role::Financiar => Some(FINANCIAR_GRANTS),
        Role::Admin | Role::Other(_) => None,
    }
}

/// Role name -> default permission matrix.
///
/// Every template is computed once at construction against the registry
/// and never changes afterwards.
///
/// # Example
///
/// ```
/// use opsdesk_acl::{Action, Module, Role, RoleTemplateStore};
///
/// let templates = RoleTemplateStore::standard();
/// let registry = templates.registry();
///
/// let manager = templates.template_for(&Role::Manager);
/// assert!(manager.get(registry, Module::Slots, Action::Edit));
/// assert!(!manager.get(registry, Module::Users, Action::Create));
///
/// // Unknown roles get the `user` template.
/// let unknown = templates.template_for_name("nonexistent-role");
/// assert_eq!(unknown, templates.template_for(&Role::User));
/// ```
#[derive(Debug, Clone)]
pub struct RoleTemplateStore {
    registry: Arc<ModuleRegistry>,
    templates: HashMap<Role, PermissionMatrix>,
}

static STANDARD: OnceLock<Arc<RoleTemplateStore>> = OnceLock::new();

impl RoleTemplateStore {
    /// Build every template against `registry`.
    pub fn new(registry: Arc<ModuleRegistry>) -> Self {
        let templates = Role::KNOWN
            .into_iter()
            .map(|role| {
                let matrix = match curated_grants(&role) {
                    Some(grants) => PermissionMatrix::from_grants(
                        &registry,
                        grants
                            .iter()
                            .flat_map(|(module, actions)| actions.iter().map(move |a| (*module, *a))),
                    ),
                    None => PermissionMatrix::set_all(&registry, true),
                };
                (role, matrix)
            })
            .collect();

        Self {
            registry,
            templates,
        }
    }

    /// The process-wide store built over [`ModuleRegistry::standard`].
    pub fn standard() -> Arc<RoleTemplateStore> {
        STANDARD
            .get_or_init(|| Arc::new(Self::new(ModuleRegistry::standard())))
            .clone()
    }

    /// The registry the templates were built against.
    pub fn registry(&self) -> &Arc<ModuleRegistry> {
        &self.registry
    }

    /// Recognized roles, in role-picker order.
    pub fn roles(&self) -> &'static [Role] {
        static KNOWN: [Role; 6] = Role::KNOWN;
        &KNOWN
    }

    /// Borrow the template of a role.
    ///
    /// Unknown roles borrow the `user` template.
    pub fn template(&self, role: &Role) -> &PermissionMatrix {
        if let Some(matrix) = self.templates.get(role) {
            return matrix;
        }
        if let Some(matrix) = role.canonical().and_then(|known| self.templates.get(&known)) {
            return matrix;
        }

        tracing::debug!(role = %role, "Unknown role, falling back to the user template");
        // User is always present: `new` builds every known role.
        match self.templates.get(&Role::User) {
            Some(matrix) => matrix,
            None => empty_matrix(),
        }
    }

    /// Get an owned copy of a role's template.
    pub fn template_for(&self, role: &Role) -> PermissionMatrix {
        self.template(role).clone()
    }

    /// Get the template for a stored role name.
    pub fn template_for_name(&self, name: &str) -> PermissionMatrix {
        self.template_for(&Role::from_name(name))
    }
}

fn empty_matrix() -> &'static PermissionMatrix {
    static EMPTY: OnceLock<PermissionMatrix> = OnceLock::new();
    EMPTY.get_or_init(PermissionMatrix::new)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_template_grants_every_declared_action() {
        let store = RoleTemplateStore::standard();
        let registry = store.registry();
        let admin = store.template_for(&Role::Admin);
        for (module, action) in registry.cells() {
            assert!(admin.get(registry, module, action), "{module}.{action}");
        }
        assert_eq!(admin, PermissionMatrix::set_all(registry, true));
    }

    #[test]
    fn test_admin_template_follows_custom_registry() {
        let registry = Arc::new(
            ModuleRegistry::builder()
                .module(Module::Slots, &[View, Import])
                .build()
                .unwrap(),
        );
        let store = RoleTemplateStore::new(registry.clone());
        let granted: Vec<_> = store.template(&Role::Admin).granted(&registry).collect();
        assert_eq!(granted, vec![(Module::Slots, View), (Module::Slots, Import)]);
    }

    #[test]
    fn test_manager_denies_user_creation() {
        let store = RoleTemplateStore::standard();
        let registry = store.registry();
        let manager = store.template(&Role::Manager);
        assert!(manager.get(registry, Module::Users, View));
        assert!(!manager.get(registry, Module::Users, Create));
        assert!(!manager.get(registry, Module::Users, Delete));
    }

    #[test]
    fn test_curated_templates_only_reference_declared_cells() {
        let registry = ModuleRegistry::standard();
        for role in Role::KNOWN.iter().filter(|r| !r.is_admin()) {
            if let Some(grants) = curated_grants(role) {
                for (module, actions) in grants {
                    for action in *actions {
                        assert!(
                            registry.declares(*module, *action),
                            "{role} grants undeclared {module}.{action}"
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn test_non_admin_templates_are_not_everything() {
        let store = RoleTemplateStore::standard();
        let registry = store.registry();
        let everything = PermissionMatrix::set_all(registry, true);
        for role in Role::KNOWN.iter().filter(|r| !r.is_admin()) {
            assert!(!store.template(role).equivalent(&everything, registry), "{role}");
        }
    }

    #[test]
    fn test_unknown_role_falls_back_to_user() {
        let store = RoleTemplateStore::standard();
        let registry = store.registry();
        let user = store.template_for(&Role::User);
        let unknown = store.template_for_name("nonexistent-role");
        for (module, action) in registry.cells() {
            assert_eq!(
                unknown.get(registry, module, action),
                user.get(registry, module, action)
            );
        }
    }

    #[test]
    fn test_templates_are_deterministic() {
        let first = RoleTemplateStore::new(ModuleRegistry::standard());
        let second = RoleTemplateStore::new(ModuleRegistry::standard());
        for role in Role::KNOWN {
            assert_eq!(first.template_for(&role), second.template_for(&role));
            assert_eq!(first.template_for(&role), first.template_for(&role));
        }
    }
}
