//! # Modules
//!
//! Defines the functional areas of the dashboard and the registry that
//! declares which actions each area supports.
//!
//! The registry is immutable once built. Most callers share the process-wide
//! [`ModuleRegistry::standard`] instance; tests and tools can assemble their
//! own with [`ModuleRegistry::builder`].

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use crate::actions::Action;
use crate::error::{AclError, AclResult};

/// Functional areas of the operator dashboard that carry their own permissions.
///
/// The variant order matches the navigation order and the row order of the
/// permission editor.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Module {
    /// Operator companies and their legal details.
    Companies,
    /// Gaming halls.
    Locations,
    /// Slot and game providers.
    Providers,
    /// Cabinet models.
    Cabinets,
    /// Game mixes installed on cabinets.
    GameMixes,
    /// Installed slot machines.
    Slots,
    /// Equipment held in the warehouse.
    Warehouse,
    /// Metrology (CVT) certificates.
    Metrology,
    /// Jackpot configurations.
    Jackpots,
    /// Invoices.
    Invoices,
    /// ONJN regulator reports.
    OnjnReports,
    /// Legal documents and authorizations.
    LegalDocuments,
    /// Marketing campaigns and promotions.
    Marketing,
    /// Dashboard user accounts.
    Users,
}

impl Module {
    /// Every module in declaration order.
    pub const ALL: [Module; 14] = [
        Module::Companies,
        Module::Locations,
        Module::Providers,
        Module::Cabinets,
        Module::GameMixes,
        Module::Slots,
        Module::Warehouse,
        Module::Metrology,
        Module::Jackpots,
        Module::Invoices,
        Module::OnjnReports,
        Module::LegalDocuments,
        Module::Marketing,
        Module::Users,
    ];

    /// Get the string representation of the module.
    pub fn as_str(&self) -> &'static str {
        match self {
            Module::Companies => "companies",
            Module::Locations => "locations",
            Module::Providers => "providers",
            Module::Cabinets => "cabinets",
            Module::GameMixes => "game_mixes",
            Module::Slots => "slots",
            Module::Warehouse => "warehouse",
            Module::Metrology => "metrology",
            Module::Jackpots => "jackpots",
            Module::Invoices => "invoices",
            Module::OnjnReports => "onjn_reports",
            Module::LegalDocuments => "legal_documents",
            Module::Marketing => "marketing",
            Module::Users => "users",
        }
    }

    /// Human-readable label shown in navigation and in the permission editor.
    pub fn label(&self) -> &'static str {
        match self {
            Module::Companies => "Companies",
            Module::Locations => "Locations",
            Module::Providers => "Providers",
            Module::Cabinets => "Cabinets",
            Module::GameMixes => "Game mixes",
            Module::Slots => "Slots",
            Module::Warehouse => "Warehouse",
            Module::Metrology => "Metrology (CVT)",
            Module::Jackpots => "Jackpots",
            Module::Invoices => "Invoices",
            Module::OnjnReports => "ONJN reports",
            Module::LegalDocuments => "Legal documents",
            Module::Marketing => "Marketing",
            Module::Users => "Users",
        }
    }

    /// Parse module from its stored name.
    ///
    /// Accepts the snake_case name as well as the kebab-case form used in
    /// dashboard routes (`game-mixes`).
    ///
    /// # Example
    ///
    /// ```
    /// use opsdesk_acl::Module;
    ///
    /// assert_eq!(Module::parse("slots"), Some(Module::Slots));
    /// assert_eq!(Module::parse("game-mixes"), Some(Module::GameMixes));
    /// assert_eq!(Module::parse("casinos"), None);
    /// ```
    pub fn parse(s: &str) -> Option<Self> {
        let normalized = s.trim().to_lowercase().replace('-', "_");
        Module::ALL
            .into_iter()
            .find(|module| module.as_str() == normalized)
    }
}

impl std::fmt::Display for Module {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The standard catalog: every module with its ordered, declared actions.
pub const STANDARD_CATALOG: &[(Module, &[Action])] = &[
    (Module::Companies, &[Action::View, Action::Create, Action::Edit, Action::Delete]),
    (Module::Locations, &[Action::View, Action::Create, Action::Edit, Action::Delete]),
    (Module::Providers, &[Action::View, Action::Create, Action::Edit, Action::Delete]),
    (Module::Cabinets, &[Action::View, Action::Create, Action::Edit, Action::Delete]),
    (Module::GameMixes, &[Action::View, Action::Create, Action::Edit, Action::Delete]),
    (
        Module::Slots,
        &[
            Action::View,
            Action::Create,
            Action::Edit,
            Action::Delete,
            Action::Export,
            Action::Import,
        ],
    ),
    (Module::Warehouse, &[Action::View, Action::Create, Action::Edit, Action::Delete]),
    (
        Module::Metrology,
        &[Action::View, Action::Create, Action::Edit, Action::Delete, Action::Export],
    ),
    (Module::Jackpots, &[Action::View, Action::Create, Action::Edit, Action::Delete]),
    (
        Module::Invoices,
        &[Action::View, Action::Create, Action::Edit, Action::Delete, Action::Export],
    ),
    (Module::OnjnReports, &[Action::View, Action::Export]),
    (Module::LegalDocuments, &[Action::View, Action::Create, Action::Edit, Action::Delete]),
    (Module::Marketing, &[Action::View, Action::Create, Action::Edit, Action::Delete]),
    (Module::Users, &[Action::View, Action::Create, Action::Edit, Action::Delete]),
];

/// A registered module and the actions it declares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleSpec {
    /// The module.
    pub module: Module,
    /// Declared actions, in declaration order, without duplicates.
    pub actions: Vec<Action>,
}

impl ModuleSpec {
    /// Human label of the module.
    pub fn label(&self) -> &'static str {
        self.module.label()
    }

    /// Check whether the module declares an action.
    pub fn declares(&self, action: Action) -> bool {
        self.actions.contains(&action)
    }
}

/// Read-only catalog of modules and their declared actions.
///
/// # Example
///
/// ```
/// use opsdesk_acl::{Action, Module, ModuleRegistry};
///
/// let registry = ModuleRegistry::standard();
/// assert!(registry.declares(Module::Slots, Action::Import));
/// assert!(!registry.declares(Module::OnjnReports, Action::Delete));
/// ```
#[derive(Debug, Clone)]
pub struct ModuleRegistry {
    modules: Vec<ModuleSpec>,
    index: HashMap<Module, usize>,
}

static STANDARD: OnceLock<Arc<ModuleRegistry>> = OnceLock::new();

impl ModuleRegistry {
    /// The process-wide registry built from [`STANDARD_CATALOG`].
    ///
    /// Built on first use and shared afterwards; it is never mutated.
    pub fn standard() -> Arc<ModuleRegistry> {
        STANDARD
            .get_or_init(|| Arc::new(Self::from_catalog(STANDARD_CATALOG)))
            .clone()
    }

    /// Start building a custom registry.
    pub fn builder() -> ModuleRegistryBuilder {
        ModuleRegistryBuilder::default()
    }

    // The standard catalog has no duplicate rows (covered by tests), so it
    // bypasses builder validation.
    fn from_catalog(catalog: &[(Module, &[Action])]) -> Self {
        let specs = catalog
            .iter()
            .map(|(module, actions)| ModuleSpec {
                module: *module,
                actions: dedup_actions(actions),
            })
            .collect();
        Self::from_specs(specs)
    }

    fn from_specs(modules: Vec<ModuleSpec>) -> Self {
        let index = modules
            .iter()
            .enumerate()
            .map(|(i, spec)| (spec.module, i))
            .collect();
        Self { modules, index }
    }

    /// All registered modules with their actions, in declaration order.
    pub fn modules(&self) -> &[ModuleSpec] {
        &self.modules
    }

    /// Registered modules in declaration order.
    pub fn list_modules(&self) -> Vec<Module> {
        self.modules.iter().map(|spec| spec.module).collect()
    }

    /// Check whether a module is registered.
    pub fn contains(&self, module: Module) -> bool {
        self.index.contains_key(&module)
    }

    /// Get the registration entry of a module.
    ///
    /// # Errors
    ///
    /// [`AclError::UnknownModule`] if the module is not registered.
    pub fn spec(&self, module: Module) -> AclResult<&ModuleSpec> {
        self.index
            .get(&module)
            .map(|&i| &self.modules[i])
            .ok_or_else(|| AclError::UnknownModule(module.as_str().to_string()))
    }

    /// Get the declared actions of a module, in declaration order.
    ///
    /// # Errors
    ///
    /// [`AclError::UnknownModule`] if the module is not registered.
    pub fn actions(&self, module: Module) -> AclResult<&[Action]> {
        self.spec(module).map(|spec| spec.actions.as_slice())
    }

    /// Check whether `module` is registered and declares `action`.
    ///
    /// Never fails: unregistered modules declare nothing.
    pub fn declares(&self, module: Module, action: Action) -> bool {
        self.spec(module)
            .map(|spec| spec.declares(action))
            .unwrap_or(false)
    }

    /// Ensure a (module, action) pair can be granted.
    ///
    /// # Errors
    ///
    /// [`AclError::UnknownModule`] or [`AclError::UndeclaredAction`].
    pub fn ensure_declared(&self, module: Module, action: Action) -> AclResult<()> {
        if self.spec(module)?.declares(action) {
            Ok(())
        } else {
            Err(AclError::UndeclaredAction {
                module: module.as_str().to_string(),
                action: action.as_str().to_string(),
            })
        }
    }

    /// Resolve a module by name, requiring it to be registered.
    ///
    /// # Errors
    ///
    /// [`AclError::UnknownModule`] if the name does not parse or the module
    /// is not registered.
    pub fn lookup(&self, name: &str) -> AclResult<Module> {
        Module::parse(name)
            .filter(|module| self.contains(*module))
            .ok_or_else(|| AclError::UnknownModule(name.to_string()))
    }

    /// Every declared (module, action) cell, in declaration order.
    pub fn cells(&self) -> impl Iterator<Item = (Module, Action)> + '_ {
        self.modules
            .iter()
            .flat_map(|spec| spec.actions.iter().map(move |action| (spec.module, *action)))
    }
}

/// Builder for custom registries.
#[derive(Debug, Default)]
pub struct ModuleRegistryBuilder {
    modules: Vec<ModuleSpec>,
}

impl ModuleRegistryBuilder {
    /// Register a module with its declared actions.
    ///
    /// Repeated actions are kept once, at their first position. A module may
    /// declare no actions at all.
    pub fn module(mut self, module: Module, actions: &[Action]) -> Self {
        self.modules.push(ModuleSpec {
            module,
            actions: dedup_actions(actions),
        });
        self
    }

    /// Register every row of a catalog.
    pub fn catalog(self, catalog: &[(Module, &[Action])]) -> Self {
        catalog
            .iter()
            .fold(self, |builder, (module, actions)| builder.module(*module, actions))
    }

    /// Finish the registry.
    ///
    /// # Errors
    ///
    /// [`AclError::DuplicateModule`] if a module was registered twice.
    pub fn build(self) -> AclResult<ModuleRegistry> {
        let mut seen = Vec::with_capacity(self.modules.len());
        for spec in &self.modules {
            if seen.contains(&spec.module) {
                return Err(AclError::DuplicateModule(spec.module.as_str().to_string()));
            }
            seen.push(spec.module);
        }
        Ok(ModuleRegistry::from_specs(self.modules))
    }
}

fn dedup_actions(actions: &[Action]) -> Vec<Action> {
    let mut out = Vec::with_capacity(actions.len());
    for action in actions {
        if !out.contains(action) {
            out.push(*action);
        }
    }
    out
}
