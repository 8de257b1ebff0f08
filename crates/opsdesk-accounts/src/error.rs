//! Error types for account operations

use thiserror::Error;
use uuid::Uuid;

/// Account and account-store errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccountError {
    /// No account with this ID
    #[error("Account not found: {0}")]
    NotFound(Uuid),

    /// Account ID already taken on create
    #[error("Account already exists: {0}")]
    AlreadyExists(Uuid),

    /// A location was assigned to a non-manager account
    #[error("Only manager accounts can be bound to a location")]
    LocationRequiresManager,

    /// Backing store failure
    #[error("Storage error: {0}")]
    Storage(String),
}

/// Result type for account operations.
pub type AccountResult<T> = Result<T, AccountError>;

impl AccountError {
    /// Get HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            AccountError::NotFound(_) => 404,
            AccountError::AlreadyExists(_) => 409,
            AccountError::LocationRequiresManager => 422,
            AccountError::Storage(_) => 500,
        }
    }

    /// Get error code for API responses.
    pub fn error_code(&self) -> &'static str {
        match self {
            AccountError::NotFound(_) => "ACCOUNT_NOT_FOUND",
            AccountError::AlreadyExists(_) => "ACCOUNT_EXISTS",
            AccountError::LocationRequiresManager => "LOCATION_REQUIRES_MANAGER",
            AccountError::Storage(_) => "STORAGE_ERROR",
        }
    }
}
