//! # opsdesk Guard
//!
//! Route and operation guards for the opsdesk operator dashboard.
//!
//! ## Overview
//!
//! The opsdesk-guard crate handles:
//! - **Requirements**: An optional static role and an optional
//!   (module, action) a route demands
//! - **Evaluation**: Pending / Allowed / Denied with a reason code
//! - **Session boundary**: The identity collaborator the guard consults
//! - **Background checks**: Cancellable checks for routes that render while
//!   the session is still loading
//!
//! ## Usage
//!
//! ```rust
//! use opsdesk_acl::{Action, Module, Principal, Resolver, Role};
//! use opsdesk_guard::{AccessGuard, GuardRequirement, Guarded, Session};
//!
//! let guard = AccessGuard::new(
//!     Resolver::standard(),
//!     GuardRequirement::new().permission(Module::Invoices, Action::Export),
//! )
//! .unwrap();
//!
//! let session = Session::authenticated(Principal::new(Role::Financiar));
//! let outcome = guard.execute(&session, || "invoices-2026-09.csv");
//! assert_eq!(outcome, Guarded::Completed("invoices-2026-09.csv"));
//! ```
//!
//! ## Denial reasons
//!
//! | Reason                 | Status | When                                   |
//! |------------------------|--------|----------------------------------------|
//! | `UNAUTHENTICATED`      | 401    | Nobody signed in, or the lookup failed |
//! | `FORBIDDEN_ROLE`       | 403    | Role differs and is not `admin`        |
//! | `FORBIDDEN_PERMISSION` | 403    | Resolver denies the (module, action)   |

pub mod config;
pub mod error;
pub mod guard;
pub mod handle;
pub mod session;

// Re-export main types for convenience
pub use config::{ConfigError, GuardConfig};
pub use error::{SessionError, SessionResult};
pub use guard::{AccessGuard, DenyReason, GuardRequirement, GuardState, Guarded};
pub use handle::GuardHandle;
pub use session::{Session, SessionSource};
