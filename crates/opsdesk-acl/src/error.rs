//! Error types for access-control configuration
//!
//! Only configuration mistakes are errors here. Resolution itself never
//! fails: undeclared writes are dropped and unknown roles fall back to the
//! `user` template.

use thiserror::Error;

/// Access-control configuration errors.
///
/// These indicate a programming or wiring mistake (a route guarding a module
/// that is not registered, a typo in a module name) and are expected to be
/// caught by tests rather than handled at runtime.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AclError {
    /// Module is not present in the registry
    #[error("Unknown module: {0}")]
    UnknownModule(String),

    /// Action name could not be parsed
    #[error("Unknown action: {0}")]
    UnknownAction(String),

    /// Module does not declare the action
    #[error("Action '{action}' is not declared for module '{module}'")]
    UndeclaredAction {
        /// Module name
        module: String,
        /// Action name
        action: String,
    },

    /// Module registered twice while building a registry
    #[error("Module registered more than once: {0}")]
    DuplicateModule(String),
}

/// Result type for access-control configuration.
pub type AclResult<T> = Result<T, AclError>;

impl AclError {
    /// Get error code for diagnostics and API responses.
    pub fn error_code(&self) -> &'static str {
        match self {
            AclError::UnknownModule(_) => "UNKNOWN_MODULE",
            AclError::UnknownAction(_) => "UNKNOWN_ACTION",
            AclError::UndeclaredAction { .. } => "UNDECLARED_ACTION",
            AclError::DuplicateModule(_) => "DUPLICATE_MODULE",
        }
    }
}
