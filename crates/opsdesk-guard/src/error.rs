//! Error types for session lookups
//!
//! Access denials are not errors: they are [`crate::GuardState`] values.
//! These errors only describe a failing identity collaborator.

use thiserror::Error;

/// Session lookup errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// Identity source could not be reached or answered with garbage
    #[error("Session source unavailable: {0}")]
    Unavailable(String),

    /// Lookup did not settle in time
    #[error("Session lookup timed out")]
    Timeout,
}

/// Result type for session lookups.
pub type SessionResult<T> = Result<T, SessionError>;

impl SessionError {
    /// Check if this error should be logged at error level.
    pub fn is_server_error(&self) -> bool {
        matches!(self, SessionError::Unavailable(_))
    }

    /// Get error code for API responses.
    pub fn error_code(&self) -> &'static str {
        match self {
            SessionError::Unavailable(_) => "SESSION_UNAVAILABLE",
            SessionError::Timeout => "SESSION_TIMEOUT",
        }
    }
}
