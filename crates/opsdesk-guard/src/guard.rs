//! # Access Guard
//!
//! Enforcement point in front of a protected route or operation.
//!
//! ```text
//!              status unknown
//!   Session ─────────────────────► Pending
//!      │ no user ────────────────► Denied(UNAUTHENTICATED)
//!      │ role check fails ───────► Denied(FORBIDDEN_ROLE)
//!      │ permission check fails ─► Denied(FORBIDDEN_PERMISSION)
//!      └─────────────────────────► Allowed
//! ```
//!
//! The guard only reports the state and reason. Rendering a message or
//! redirecting is the caller's business.

use opsdesk_acl::{AclResult, Action, Grantee, Module, Resolver, Role};
use serde::{Deserialize, Serialize};
use std::future::Future;

use crate::config::GuardConfig;
use crate::error::SessionError;
use crate::session::{Session, SessionSource};

/// Why a guard denied access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DenyReason {
    /// Nobody is signed in
    Unauthenticated,

    /// Signed in, but the role is not the required one
    ForbiddenRole,

    /// Signed in, but the permission matrix denies the (module, action)
    ForbiddenPermission,
}

impl DenyReason {
    /// Get the reason code for API responses.
    pub fn code(&self) -> &'static str {
        match self {
            DenyReason::Unauthenticated => "UNAUTHENTICATED",
            DenyReason::ForbiddenRole => "FORBIDDEN_ROLE",
            DenyReason::ForbiddenPermission => "FORBIDDEN_PERMISSION",
        }
    }

    /// Get HTTP status code for this denial.
    pub fn status_code(&self) -> u16 {
        match self {
            DenyReason::Unauthenticated => 401,
            DenyReason::ForbiddenRole | DenyReason::ForbiddenPermission => 403,
        }
    }
}

impl std::fmt::Display for DenyReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// Outcome of one guard evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GuardState {
    /// Authentication status not known yet; show neither the operation nor a denial
    Pending,

    /// Every configured check passed
    Allowed,

    /// A check failed
    Denied(DenyReason),
}

impl GuardState {
    /// Check if the state is final (`Allowed` or `Denied`).
    pub fn is_terminal(&self) -> bool {
        !matches!(self, GuardState::Pending)
    }

    /// Check if access was granted.
    pub fn is_allowed(&self) -> bool {
        matches!(self, GuardState::Allowed)
    }

    /// Denial reason, if denied.
    pub fn reason(&self) -> Option<DenyReason> {
        match self {
            GuardState::Denied(reason) => Some(*reason),
            _ => None,
        }
    }
}

/// What a protected route requires.
///
/// # Examples
///
/// ```
/// use opsdesk_acl::{Action, Module, Role};
/// use opsdesk_guard::GuardRequirement;
///
/// // Module only: the action defaults to `view`.
/// let req = GuardRequirement::new().module(Module::Invoices);
/// assert_eq!(req.required_permission(), Some((Module::Invoices, Action::View)));
///
/// let req = GuardRequirement::new()
///     .role(Role::Manager)
///     .permission(Module::Slots, Action::Edit);
/// assert_eq!(req.required_role(), Some(&Role::Manager));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GuardRequirement {
    role: Option<Role>,
    permission: Option<(Module, Action)>,
}

impl GuardRequirement {
    /// Requirement that only demands a signed-in user.
    pub fn new() -> Self {
        Self::default()
    }

    /// Require a static role (admins always pass).
    pub fn role(mut self, role: Role) -> Self {
        self.role = Some(role);
        self
    }

    /// Require `view` on a module.
    pub fn module(self, module: Module) -> Self {
        self.permission(module, Action::default())
    }

    /// Require an action on a module.
    pub fn permission(mut self, module: Module, action: Action) -> Self {
        self.permission = Some((module, action));
        self
    }

    /// Required static role, if any.
    pub fn required_role(&self) -> Option<&Role> {
        self.role.as_ref()
    }

    /// Required (module, action), if any.
    pub fn required_permission(&self) -> Option<(Module, Action)> {
        self.permission
    }
}

/// Result of running an operation behind a guard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Guarded<T> {
    /// Status unknown; the operation did not run
    Pending,

    /// Access denied; the operation did not run
    Denied(DenyReason),

    /// The operation ran and returned this value
    Completed(T),
}

impl<T> Guarded<T> {
    /// The operation's value, if it ran.
    pub fn completed(self) -> Option<T> {
        match self {
            Guarded::Completed(value) => Some(value),
            _ => None,
        }
    }
}

/// Enforcement point for one protected route or operation.
///
/// # Examples
///
/// ```
/// use opsdesk_acl::{Action, Module, Principal, Resolver, Role};
/// use opsdesk_guard::{AccessGuard, DenyReason, GuardRequirement, GuardState, Session};
///
/// let guard = AccessGuard::new(
///     Resolver::standard(),
///     GuardRequirement::new().permission(Module::Users, Action::Create),
/// )
/// .unwrap();
///
/// let manager = Session::authenticated(Principal::new(Role::Manager));
/// assert_eq!(
///     guard.evaluate(&manager),
///     GuardState::Denied(DenyReason::ForbiddenPermission)
/// );
///
/// let admin = Session::authenticated(Principal::new(Role::Admin));
/// assert_eq!(guard.evaluate(&admin), GuardState::Allowed);
/// ```
#[derive(Debug, Clone)]
pub struct AccessGuard {
    resolver: Resolver,
    requirement: GuardRequirement,
    config: GuardConfig,
}

impl AccessGuard {
    /// Create a guard.
    ///
    /// # Errors
    ///
    /// [`opsdesk_acl::AclError::UnknownModule`] or
    /// [`opsdesk_acl::AclError::UndeclaredAction`] when the required
    /// (module, action) can never be granted by the resolver's registry.
    /// This is a wiring bug and surfaces when the route is set up.
    pub fn new(resolver: Resolver, requirement: GuardRequirement) -> AclResult<Self> {
        if let Some((module, action)) = requirement.permission {
            resolver.registry().ensure_declared(module, action)?;
        }
        Ok(Self {
            resolver,
            requirement,
            config: GuardConfig::default(),
        })
    }

    /// Replace the configuration.
    pub fn with_config(mut self, config: GuardConfig) -> Self {
        self.config = config;
        self
    }

    /// The guard's requirement.
    pub fn requirement(&self) -> &GuardRequirement {
        &self.requirement
    }

    /// The guard's configuration.
    pub fn config(&self) -> &GuardConfig {
        &self.config
    }

    /// Evaluate a session snapshot.
    pub fn evaluate(&self, session: &Session) -> GuardState {
        self.evaluate_user(session.user.as_ref(), session.auth_status_known)
    }

    /// Evaluate any grantee directly (e.g. a loaded account).
    ///
    /// The role check runs before the permission check; both must pass.
    pub fn evaluate_user<G: Grantee + ?Sized>(&self, user: Option<&G>, auth_status_known: bool) -> GuardState {
        if !auth_status_known {
            return GuardState::Pending;
        }

        let Some(user) = user else {
            return self.deny(DenyReason::Unauthenticated, None);
        };

        if let Some(required) = &self.requirement.role {
            if user.role().as_str() != required.as_str() && !user.role().is_admin() {
                return self.deny(DenyReason::ForbiddenRole, Some(user.role()));
            }
        }

        if let Some((module, action)) = self.requirement.permission {
            if !self.resolver.resolve(user, module, action) {
                return self.deny(DenyReason::ForbiddenPermission, Some(user.role()));
            }
        }

        GuardState::Allowed
    }

    /// Run `op` only if the session is allowed.
    pub fn execute<T, F>(&self, session: &Session, op: F) -> Guarded<T>
    where
        F: FnOnce() -> T,
    {
        match self.evaluate(session) {
            GuardState::Allowed => Guarded::Completed(op()),
            GuardState::Pending => Guarded::Pending,
            GuardState::Denied(reason) => Guarded::Denied(reason),
        }
    }

    /// Async variant of [`AccessGuard::execute`]. The future is only created
    /// once access is granted.
    pub async fn execute_async<T, F, Fut>(&self, session: &Session, op: F) -> Guarded<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        match self.evaluate(session) {
            GuardState::Allowed => Guarded::Completed(op().await),
            GuardState::Pending => Guarded::Pending,
            GuardState::Denied(reason) => Guarded::Denied(reason),
        }
    }

    /// Ask the identity collaborator and evaluate its answer.
    ///
    /// Polls while the source reports an unknown status. A source error or a
    /// lookup exceeding the configured timeout settles as unauthenticated.
    /// Dropping the returned future abandons the check with nothing to undo.
    pub async fn check<S>(&self, source: &S) -> GuardState
    where
        S: SessionSource + ?Sized,
    {
        let lookup = async {
            loop {
                let session = source.session().await?;
                if session.auth_status_known {
                    return Ok::<Session, SessionError>(session);
                }
                tokio::time::sleep(self.config.poll_interval()).await;
            }
        };

        match tokio::time::timeout(self.config.session_timeout(), lookup).await {
            Ok(Ok(session)) => self.evaluate(&session),
            Ok(Err(e)) => {
                tracing::warn!(error = %e, code = e.error_code(), "Session lookup failed");
                self.deny(DenyReason::Unauthenticated, None)
            }
            Err(_) => {
                tracing::warn!(
                    timeout_ms = self.config.session_timeout_ms,
                    "Session lookup timed out"
                );
                self.deny(DenyReason::Unauthenticated, None)
            }
        }
    }

    fn deny(&self, reason: DenyReason, role: Option<&Role>) -> GuardState {
        if self.config.log_denials {
            tracing::debug!(
                reason = reason.code(),
                role = role.map(Role::as_str).unwrap_or("-"),
                module = self.requirement.permission.map(|(m, _)| m.as_str()).unwrap_or("-"),
                action = self.requirement.permission.map(|(_, a)| a.as_str()).unwrap_or("-"),
                "Access denied"
            );
        }
        GuardState::Denied(reason)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use opsdesk_acl::{AclError, ModuleRegistry, PermissionMatrix, Principal, RoleTemplateStore};
    use std::sync::Arc;

    fn guard(requirement: GuardRequirement) -> AccessGuard {
        AccessGuard::new(Resolver::standard(), requirement).unwrap()
    }

    fn session(role: Role) -> Session {
        Session::authenticated(Principal::new(role))
    }

    #[test]
    fn test_pending_before_status_known() {
        let guard = guard(GuardRequirement::new().module(Module::Slots));
        assert_eq!(guard.evaluate(&Session::pending()), GuardState::Pending);

        // Even with a user attached, unknown status stays pending.
        let mut early = session(Role::Admin);
        early.auth_status_known = false;
        assert_eq!(guard.evaluate(&early), GuardState::Pending);
    }

    #[test]
    fn test_unauthenticated() {
        let guard = guard(GuardRequirement::new());
        let state = guard.evaluate(&Session::anonymous());
        assert_eq!(state, GuardState::Denied(DenyReason::Unauthenticated));
        assert_eq!(state.reason().unwrap().status_code(), 401);
    }

    #[test]
    fn test_no_requirement_allows_any_signed_in_user() {
        let guard = guard(GuardRequirement::new());
        assert_eq!(guard.evaluate(&session(Role::from_name("ghost"))), GuardState::Allowed);
    }

    #[test]
    fn test_role_check_with_admin_bypass() {
        let guard = guard(GuardRequirement::new().role(Role::Financiar));
        assert_eq!(guard.evaluate(&session(Role::Financiar)), GuardState::Allowed);
        assert_eq!(guard.evaluate(&session(Role::Admin)), GuardState::Allowed);
        assert_eq!(
            guard.evaluate(&session(Role::Manager)),
            GuardState::Denied(DenyReason::ForbiddenRole)
        );
    }

    #[test]
    fn test_role_names_match_exactly() {
        let guard = guard(GuardRequirement::new().role(Role::Manager));
        for name in ["ADMIN", "Manager", " manager "] {
            assert_eq!(
                guard.evaluate(&session(Role::from_name(name))),
                GuardState::Denied(DenyReason::ForbiddenRole),
                "{name:?}"
            );
        }
        assert_eq!(
            guard.evaluate(&session(Role::Other("manager".to_string()))),
            GuardState::Allowed
        );
    }

    #[test]
    fn test_manager_cannot_create_users() {
        let guard = guard(GuardRequirement::new().permission(Module::Users, Action::Create));
        assert_eq!(
            guard.evaluate(&session(Role::Manager)),
            GuardState::Denied(DenyReason::ForbiddenPermission)
        );
    }

    #[test]
    fn test_role_checked_before_permission() {
        let guard = guard(
            GuardRequirement::new()
                .role(Role::Manager)
                .permission(Module::Invoices, Action::Delete),
        );
        // Fails both checks: the role reason wins.
        assert_eq!(
            guard.evaluate(&session(Role::Marketing)),
            GuardState::Denied(DenyReason::ForbiddenRole)
        );
        // Passes role, fails permission.
        assert_eq!(
            guard.evaluate(&session(Role::Manager)),
            GuardState::Denied(DenyReason::ForbiddenPermission)
        );
    }

    #[test]
    fn test_stored_permissions_are_consulted() {
        let registry = ModuleRegistry::standard();
        let guard = guard(GuardRequirement::new().permission(Module::Users, Action::Create));
        let matrix = PermissionMatrix::new().set(&registry, Module::Users, Action::Create, true);
        let manager = Session::authenticated(Principal::new(Role::Manager).with_permissions(matrix));
        assert_eq!(guard.evaluate(&manager), GuardState::Allowed);
    }

    #[test]
    fn test_admin_with_empty_matrix_is_allowed() {
        let guard = guard(GuardRequirement::new().permission(Module::Companies, Action::Delete));
        let admin = Session::authenticated(Principal::new(Role::Admin).with_permissions(PermissionMatrix::new()));
        assert_eq!(guard.evaluate(&admin), GuardState::Allowed);
    }

    #[test]
    fn test_misconfigured_guard_fails_at_construction() {
        let result = AccessGuard::new(
            Resolver::standard(),
            GuardRequirement::new().permission(Module::OnjnReports, Action::Delete),
        );
        assert_eq!(
            result.unwrap_err(),
            AclError::UndeclaredAction {
                module: "onjn_reports".to_string(),
                action: "delete".to_string(),
            }
        );

        let registry = Arc::new(
            ModuleRegistry::builder()
                .module(Module::Slots, &[Action::View])
                .build()
                .unwrap(),
        );
        let resolver = Resolver::new(Arc::new(RoleTemplateStore::new(registry)));
        let result = AccessGuard::new(resolver, GuardRequirement::new().module(Module::Invoices));
        assert_eq!(result.unwrap_err(), AclError::UnknownModule("invoices".to_string()));
    }

    #[test]
    fn test_execute_runs_only_when_allowed() {
        let guard = guard(GuardRequirement::new().permission(Module::Invoices, Action::Export));
        let mut runs = 0;

        let outcome = guard.execute(&session(Role::Financiar), || {
            runs += 1;
            "report.pdf"
        });
        assert_eq!(outcome, Guarded::Completed("report.pdf"));

        let outcome = guard.execute(&session(Role::User), || {
            runs += 1;
            "report.pdf"
        });
        assert_eq!(outcome, Guarded::Denied(DenyReason::ForbiddenPermission));

        let outcome = guard.execute(&Session::pending(), || {
            runs += 1;
            "report.pdf"
        });
        assert_eq!(outcome, Guarded::Pending);

        assert_eq!(runs, 1);
    }

    #[tokio::test]
    async fn test_execute_async() {
        let guard = guard(GuardRequirement::new().module(Module::Slots));
        let outcome = guard
            .execute_async(&session(Role::User), || async { 42 })
            .await;
        assert_eq!(outcome.completed(), Some(42));

        let outcome = guard
            .execute_async(&Session::anonymous(), || async { 42 })
            .await;
        assert_eq!(outcome, Guarded::Denied(DenyReason::Unauthenticated));
    }

    #[test]
    fn test_deny_reason_codes() {
        assert_eq!(DenyReason::Unauthenticated.code(), "UNAUTHENTICATED");
        assert_eq!(DenyReason::ForbiddenRole.code(), "FORBIDDEN_ROLE");
        assert_eq!(DenyReason::ForbiddenPermission.code(), "FORBIDDEN_PERMISSION");
        assert_eq!(
            serde_json::to_string(&DenyReason::ForbiddenPermission).unwrap(),
            "\"FORBIDDEN_PERMISSION\""
        );
    }

    #[test]
    fn test_composition_table() {
        let registry = ModuleRegistry::standard();
        let resolver = Resolver::standard();
        let roles = [Some(Role::Manager), Some(Role::Financiar), None];
        let permissions = [
            Some((Module::Slots, Action::Edit)),
            Some((Module::Invoices, Action::Export)),
            Some((Module::Users, Action::Create)),
            None,
        ];

        for required_role in &roles {
            for required_permission in &permissions {
                let mut requirement = GuardRequirement::new();
                if let Some(role) = required_role {
                    requirement = requirement.role(role.clone());
                }
                if let Some((module, action)) = required_permission {
                    requirement = requirement.permission(*module, *action);
                }
                let guard = AccessGuard::new(resolver.clone(), requirement).unwrap();

                for user_role in Role::KNOWN {
                    let principal = Principal::new(user_role.clone());
                    let role_ok = required_role
                        .as_ref()
                        .map_or(true, |r| &user_role == r || user_role.is_admin());
                    let perm_ok = required_permission.map_or(true, |(m, a)| {
                        registry.declares(m, a) && resolver.resolve(&principal, m, a)
                    });

                    let state = guard.evaluate(&Session::authenticated(principal));
                    assert_eq!(state.is_allowed(), role_ok && perm_ok, "{user_role} {required_role:?} {required_permission:?}");
                }
            }
        }
    }
}
