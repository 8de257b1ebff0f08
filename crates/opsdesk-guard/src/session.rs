//! Authentication/session boundary
//!
//! The guard performs no authentication. It consumes what the identity
//! collaborator knows: whether the authentication status has been
//! established yet, and if so, who is signed in.

use async_trait::async_trait;
use opsdesk_acl::Principal;
use serde::{Deserialize, Serialize};

use crate::error::SessionResult;

/// Snapshot of the current authentication state.
///
/// # Examples
///
/// ```
/// use opsdesk_acl::{Principal, Role};
/// use opsdesk_guard::Session;
///
/// assert!(!Session::pending().auth_status_known);
/// assert!(Session::anonymous().user.is_none());
///
/// let session = Session::authenticated(Principal::new(Role::Manager));
/// assert!(session.is_authenticated());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Signed-in user, if any
    pub user: Option<Principal>,

    /// Whether the authentication status has been established
    pub auth_status_known: bool,
}

impl Session {
    /// Status not established yet (token refresh in flight, etc.).
    pub fn pending() -> Self {
        Self {
            user: None,
            auth_status_known: false,
        }
    }

    /// Status established, nobody signed in.
    pub fn anonymous() -> Self {
        Self {
            user: None,
            auth_status_known: true,
        }
    }

    /// Status established, `user` signed in.
    pub fn authenticated(user: Principal) -> Self {
        Self {
            user: Some(user),
            auth_status_known: true,
        }
    }

    /// Check if a user is known to be signed in.
    pub fn is_authenticated(&self) -> bool {
        self.auth_status_known && self.user.is_some()
    }
}

/// Identity collaborator consulted by [`crate::AccessGuard::check`].
///
/// Implementations may answer with a pending session while a lookup is in
/// flight; the guard polls again until the status is known or its timeout
/// elapses.
#[async_trait]
pub trait SessionSource: Send + Sync {
    /// Current session snapshot.
    async fn session(&self) -> SessionResult<Session>;
}
