//! # opsdesk Accounts
//!
//! Dashboard accounts and the permission editing workflow built on
//! `opsdesk-acl`.
//!
//! ## Overview
//!
//! The opsdesk-accounts crate handles:
//! - **Accounts**: Role, permission override, manager location, status
//! - **Permission editor**: An edit session over one account's draft matrix
//!   (cell toggles, per-module and global select-all, role-change reset)
//! - **Account store**: The persistence contract (whole-record atomic
//!   writes) plus an in-memory implementation
//!
//! ## Architecture
//!
//! ```text
//! AccountStore ──load──► UserAccount ──► PermissionEditor (draft)
//!      ▲                                        │
//!      └──────────────── save (one write) ◄─────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use opsdesk_acl::{Action, Module, Role, RoleTemplateStore};
//! use opsdesk_accounts::{AccountStore, InMemoryAccountStore, PermissionEditor, UserAccount};
//!
//! async fn promote() {
//!     let templates = RoleTemplateStore::standard();
//!     let store = InMemoryAccountStore::new();
//!
//!     let account = UserAccount::new("ana@example.com", "Ana", Role::User, &templates);
//!     let account = store.create(account).await.unwrap();
//!
//!     let mut editor = PermissionEditor::new(account, templates.clone());
//!     editor.change_role(Role::Financiar);
//!     editor.toggle(Module::Users, Action::View);
//!     editor.save(&store).await.unwrap();
//! }
//! ```

pub mod account;
pub mod editor;
pub mod error;
pub mod store;

// Re-export main types for convenience
pub use account::{AccountStatus, UserAccount};
pub use editor::{apply_role_change, PermissionEditor, Selection};
pub use error::{AccountError, AccountResult};
pub use store::{AccountChange, AccountStore, InMemoryAccountStore};
