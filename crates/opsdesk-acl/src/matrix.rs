//! # Permission Matrix
//!
//! The module x action grant table stored on every account.
//! A matrix is a value: every update returns a new matrix and leaves the
//! original untouched, so matrices can be shared freely between threads.

use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

use crate::actions::Action;
use crate::modules::{Module, ModuleRegistry};

/// Sparse `Module -> Action -> bool` grant table.
///
/// Anything not explicitly `true` is denied, and a cell only counts when the
/// registry declares that action for that module. Stored `true` values on
/// undeclared cells (left behind by older catalogs) are inert.
///
/// Serialized as a plain JSON object, e.g.
/// `{"slots": {"view": true, "edit": false}}`. Reading is lenient: unknown
/// module names, unknown action names and non-boolean values are skipped.
///
/// # Example
///
/// ```
/// use opsdesk_acl::{Action, Module, ModuleRegistry, PermissionMatrix};
///
/// let registry = ModuleRegistry::standard();
/// let matrix = PermissionMatrix::new()
///     .set(&registry, Module::Slots, Action::View, true)
///     .set(&registry, Module::OnjnReports, Action::Delete, true); // undeclared, dropped
///
/// assert!(matrix.get(&registry, Module::Slots, Action::View));
/// assert!(!matrix.get(&registry, Module::Slots, Action::Edit));
/// assert!(!matrix.get(&registry, Module::OnjnReports, Action::Delete));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PermissionMatrix {
    cells: BTreeMap<Module, BTreeMap<Action, bool>>,
}

impl PermissionMatrix {
    /// Create an empty matrix (everything denied).
    pub fn new() -> Self {
        Self::default()
    }

    /// Matrix with every declared action of every registered module set to
    /// `granted`. This is the "select all / deselect all" bulk operation and
    /// the derivation of the admin template.
    pub fn set_all(registry: &ModuleRegistry, granted: bool) -> Self {
        let mut matrix = Self::new();
        for (module, action) in registry.cells() {
            matrix.put(registry, module, action, granted);
        }
        matrix
    }

    /// Matrix granting exactly the given cells. Undeclared cells are dropped.
    pub fn from_grants<I>(registry: &ModuleRegistry, grants: I) -> Self
    where
        I: IntoIterator<Item = (Module, Action)>,
    {
        let mut matrix = Self::new();
        for (module, action) in grants {
            matrix.put(registry, module, action, true);
        }
        matrix
    }

    /// Read one cell.
    ///
    /// Returns `false` when the module or action is absent, or when the
    /// registry does not declare the action for the module.
    pub fn get(&self, registry: &ModuleRegistry, module: Module, action: Action) -> bool {
        registry.declares(module, action) && self.stored(module, action) == Some(true)
    }

    /// Raw stored value, without registry filtering.
    pub fn stored(&self, module: Module, action: Action) -> Option<bool> {
        self.cells
            .get(&module)
            .and_then(|actions| actions.get(&action))
            .copied()
    }

    /// Return a copy with one cell set. No-op for undeclared actions.
    pub fn set(&self, registry: &ModuleRegistry, module: Module, action: Action, granted: bool) -> Self {
        let mut next = self.clone();
        next.put(registry, module, action, granted);
        next
    }

    /// Return a copy with every declared action of `module` set to `granted`.
    ///
    /// A module with no declared actions, or one missing from the registry,
    /// leaves the matrix unchanged.
    pub fn set_all_for_module(&self, registry: &ModuleRegistry, module: Module, granted: bool) -> Self {
        let mut next = self.clone();
        if let Ok(actions) = registry.actions(module) {
            for action in actions {
                next.put(registry, module, *action, granted);
            }
        }
        next
    }

    /// Effective grants, in registry order.
    pub fn granted<'a>(&'a self, registry: &'a ModuleRegistry) -> impl Iterator<Item = (Module, Action)> + 'a {
        registry
            .cells()
            .filter(move |(module, action)| self.get(registry, *module, *action))
    }

    /// Check whether every declared action of `module` is granted.
    ///
    /// `false` for modules with no declared actions.
    pub fn module_fully_granted(&self, registry: &ModuleRegistry, module: Module) -> bool {
        match registry.actions(module) {
            Ok(actions) if !actions.is_empty() => {
                actions.iter().all(|action| self.get(registry, module, *action))
            }
            _ => false,
        }
    }

    /// Copy without cells the registry does not declare.
    pub fn sanitized(&self, registry: &ModuleRegistry) -> Self {
        let mut clean = Self::new();
        for (module, actions) in &self.cells {
            for (action, granted) in actions {
                clean.put(registry, *module, *action, *granted);
            }
        }
        clean
    }

    /// Compare effective grants cell by cell over the registry.
    ///
    /// Two matrices can differ in storage (explicit `false` vs. missing,
    /// inert undeclared cells) and still be equivalent.
    pub fn equivalent(&self, other: &PermissionMatrix, registry: &ModuleRegistry) -> bool {
        registry
            .cells()
            .all(|(module, action)| self.get(registry, module, action) == other.get(registry, module, action))
    }

    /// Check if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.cells.values().all(|actions| actions.is_empty())
    }

    fn put(&mut self, registry: &ModuleRegistry, module: Module, action: Action, granted: bool) -> bool {
        if !registry.declares(module, action) {
            tracing::debug!(
                module = %module,
                action = %action,
                "Dropping write to undeclared permission cell"
            );
            return false;
        }
        self.cells.entry(module).or_default().insert(action, granted);
        true
    }
}

impl<'de> Deserialize<'de> for PermissionMatrix {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = match RawMatrix::deserialize(deserializer)? {
            RawMatrix::Modules(modules) => modules,
            RawMatrix::Other(_) => return Ok(Self::new()),
        };

        let mut cells: BTreeMap<Module, BTreeMap<Action, bool>> = BTreeMap::new();
        for (module_name, raw_actions) in raw {
            let (Some(module), RawActions::Actions(actions)) = (Module::parse(&module_name), raw_actions) else {
                tracing::debug!(module = %module_name, "Ignoring unreadable module entry in stored permissions");
                continue;
            };
            let entry = cells.entry(module).or_default();
            for (action_name, cell) in actions {
                match (Action::parse(&action_name), cell) {
                    (Some(action), RawCell::Flag(granted)) => {
                        entry.insert(action, granted);
                    }
                    _ => {
                        tracing::debug!(
                            module = %module_name,
                            action = %action_name,
                            "Ignoring unreadable permission cell"
                        );
                    }
                }
            }
        }
        Ok(Self { cells })
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawMatrix {
    Modules(BTreeMap<String, RawActions>),
    Other(IgnoredAny),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawActions {
    Actions(BTreeMap<String, RawCell>),
    Other(IgnoredAny),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawCell {
    Flag(bool),
    Other(IgnoredAny),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> std::sync::Arc<ModuleRegistry> {
        ModuleRegistry::standard()
    }

    #[test]
    fn test_empty_matrix_denies_everything() {
        let registry = registry();
        let matrix = PermissionMatrix::new();
        assert!(matrix.is_empty());
        for (module, action) in registry.cells() {
            assert!(!matrix.get(&registry, module, action));
        }
    }

    #[test]
    fn test_set_all() {
        let registry = registry();
        let all = PermissionMatrix::set_all(&registry, true);
        let none = PermissionMatrix::set_all(&registry, false);
        for (module, action) in registry.cells() {
            assert!(all.get(&registry, module, action));
            assert!(!none.get(&registry, module, action));
        }
        assert!(!none.is_empty());
    }

    #[test]
    fn test_set_is_immutable_update() {
        let registry = registry();
        let before = PermissionMatrix::new();
        let after = before.set(&registry, Module::Invoices, Action::Export, true);

        assert!(!before.get(&registry, Module::Invoices, Action::Export));
        assert!(after.get(&registry, Module::Invoices, Action::Export));
        assert!(!after.get(&registry, Module::Invoices, Action::Delete));
    }

    #[test]
    fn test_set_undeclared_is_noop() {
        let registry = registry();
        let matrix = PermissionMatrix::new();
        let after = matrix.set(&registry, Module::Users, Action::Import, true);
        assert_eq!(after, matrix);
        assert!(!after.get(&registry, Module::Users, Action::Import));
        assert_eq!(after.stored(Module::Users, Action::Import), None);
    }

    #[test]
    fn test_set_all_for_module_leaves_other_modules() {
        let registry = registry();
        let base = PermissionMatrix::new()
            .set(&registry, Module::Companies, Action::View, true)
            .set(&registry, Module::Invoices, Action::Edit, true);

        let on = base.set_all_for_module(&registry, Module::Slots, true);
        assert!(on.module_fully_granted(&registry, Module::Slots));

        let off = on.set_all_for_module(&registry, Module::Slots, false);
        for action in registry.actions(Module::Slots).unwrap() {
            assert!(!off.get(&registry, Module::Slots, *action));
        }
        for (module, action) in registry.cells().filter(|(m, _)| *m != Module::Slots) {
            assert_eq!(
                off.get(&registry, module, action),
                base.get(&registry, module, action)
            );
        }
    }

    #[test]
    fn test_set_all_for_module_without_actions() {
        let registry = ModuleRegistry::builder()
            .module(Module::Slots, &[Action::View])
            .module(Module::Marketing, &[])
            .build()
            .unwrap();
        let base = PermissionMatrix::new().set(&registry, Module::Slots, Action::View, true);

        let after = base.set_all_for_module(&registry, Module::Marketing, true);
        assert_eq!(after, base);
        assert!(!after.module_fully_granted(&registry, Module::Marketing));

        // Not registered at all: same outcome.
        let after = base.set_all_for_module(&registry, Module::Users, true);
        assert_eq!(after, base);
    }

    #[test]
    fn test_granted_in_registry_order() {
        let registry = registry();
        let matrix = PermissionMatrix::new()
            .set(&registry, Module::Users, Action::View, true)
            .set(&registry, Module::Companies, Action::Edit, true)
            .set(&registry, Module::Companies, Action::View, true)
            .set(&registry, Module::Slots, Action::Edit, false);

        let granted: Vec<_> = matrix.granted(&registry).collect();
        assert_eq!(
            granted,
            vec![
                (Module::Companies, Action::View),
                (Module::Companies, Action::Edit),
                (Module::Users, Action::View),
            ]
        );
    }

    #[test]
    fn test_deserialize_is_forward_compatible() {
        let registry = registry();
        let json = r#"{
            "slots": {"view": true, "edit": false, "teleport": true, "delete": "yes"},
            "casinos": {"view": true},
            "users": {"import": true, "view": true},
            "marketing": 42
        }"#;

        let matrix: PermissionMatrix = serde_json::from_str(json).unwrap();
        assert!(matrix.get(&registry, Module::Slots, Action::View));
        assert!(!matrix.get(&registry, Module::Slots, Action::Edit));
        assert!(!matrix.get(&registry, Module::Slots, Action::Delete));
        assert!(matrix.get(&registry, Module::Users, Action::View));

        // Stored but undeclared: kept in storage, inert on read.
        assert_eq!(matrix.stored(Module::Users, Action::Import), Some(true));
        assert!(!matrix.get(&registry, Module::Users, Action::Import));
        assert_eq!(matrix.sanitized(&registry).stored(Module::Users, Action::Import), None);
    }

    #[test]
    fn test_deserialize_non_object_is_empty() {
        let matrix: PermissionMatrix = serde_json::from_str("[1, 2, 3]").unwrap();
        assert!(matrix.is_empty());
    }

    #[test]
    fn test_serialize_shape() {
        let registry = registry();
        let matrix = PermissionMatrix::new()
            .set(&registry, Module::GameMixes, Action::View, true)
            .set(&registry, Module::GameMixes, Action::Delete, false);

        let value = serde_json::to_value(&matrix).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"game_mixes": {"view": true, "delete": false}})
        );

        let back: PermissionMatrix = serde_json::from_value(value).unwrap();
        assert_eq!(back, matrix);
    }

    #[test]
    fn test_equivalent_ignores_storage_shape() {
        let registry = registry();
        let explicit = PermissionMatrix::new()
            .set(&registry, Module::Slots, Action::View, true)
            .set(&registry, Module::Slots, Action::Edit, false);
        let sparse = PermissionMatrix::new().set(&registry, Module::Slots, Action::View, true);

        assert_ne!(explicit, sparse);
        assert!(explicit.equivalent(&sparse, &registry));
        assert!(!explicit.equivalent(&PermissionMatrix::new(), &registry));
    }
}
