//! # opsdesk ACL
//!
//! Capability-based access control for the opsdesk operator dashboard.
//!
//! ## Overview
//!
//! The opsdesk-acl crate handles:
//! - **Modules**: Functional areas (companies, locations, slots, invoices, ...)
//!   and the actions each one declares
//! - **Actions**: `view`, `create`, `edit`, `delete`, `export`, `import`
//! - **Permission matrices**: Per-account module x action grants
//! - **Role templates**: Default matrices per role
//! - **Resolution**: The admin bypass and the stored-matrix / template fallback
//!
//! ## Architecture
//!
//! ```text
//! ModuleRegistry ──► RoleTemplateStore ──► Resolver ◄── Grantee (role + permissions?)
//!        │                                    │
//!        └────────── PermissionMatrix ◄───────┘
//! ```
//!
//! Everything here is immutable after construction; matrix updates return
//! new matrices. The registry and template store are shared through `Arc`.
//!
//! ## Usage
//!
//! ```rust
//! use opsdesk_acl::{Action, Module, PermissionMatrix, Principal, Resolver, Role};
//!
//! let resolver = Resolver::standard();
//! let registry = resolver.registry();
//!
//! // Start from the role template and grant one extra cell.
//! let matrix = resolver
//!     .templates()
//!     .template_for(&Role::Manager)
//!     .set(registry, Module::Users, Action::Create, true);
//!
//! let account = Principal::new(Role::Manager).with_permissions(matrix);
//! assert!(resolver.resolve(&account, Module::Users, Action::Create));
//!
//! // Writes to undeclared cells are dropped.
//! let matrix = PermissionMatrix::new().set(registry, Module::Users, Action::Import, true);
//! assert!(!matrix.get(registry, Module::Users, Action::Import));
//! ```
//!
//! ## Deny by default
//!
//! A cell grants access only when it is explicitly `true` and the registry
//! declares that action for the module. Unknown roles resolve through the
//! `user` template.

pub mod actions;
pub mod error;
pub mod matrix;
pub mod modules;
pub mod resolver;
pub mod roles;
pub mod templates;

// Re-export main types for convenience
pub use actions::Action;
pub use error::{AclError, AclResult};
pub use matrix::PermissionMatrix;
pub use modules::{Module, ModuleRegistry, ModuleRegistryBuilder, ModuleSpec, STANDARD_CATALOG};
pub use resolver::{Grantee, Principal, Resolver};
pub use roles::Role;
pub use templates::RoleTemplateStore;
