//! Account domain model
//!
//! A dashboard account carries a role, an optional permission override and,
//! for managers, the location they run.

use chrono::{DateTime, Utc};
use opsdesk_acl::{Grantee, PermissionMatrix, Principal, Role, RoleTemplateStore};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AccountError, AccountResult};

/// Whether an account may sign in.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AccountStatus {
    /// Account can sign in
    Active,

    /// Account is disabled
    Inactive,
}

impl Default for AccountStatus {
    fn default() -> Self {
        Self::Active
    }
}

/// A dashboard user account.
///
/// `permissions` is stored as one serialized matrix alongside the rest of
/// the record and always written together with it.
///
/// # Examples
///
/// ```
/// use opsdesk_acl::{Role, RoleTemplateStore};
/// use opsdesk_accounts::UserAccount;
///
/// let templates = RoleTemplateStore::standard();
/// let account = UserAccount::new("ana@example.com", "Ana", Role::Financiar, &templates);
///
/// assert!(account.is_active());
/// assert_eq!(account.permissions, Some(templates.template_for(&Role::Financiar)));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserAccount {
    /// Unique account ID
    pub id: Uuid,

    /// Sign-in email
    pub email: String,

    /// Display name
    pub name: String,

    /// Role; selects the default permission template
    pub role: Role,

    /// Permission override; `None` resolves through the role template
    #[serde(default)]
    pub permissions: Option<PermissionMatrix>,

    /// Location run by this account (managers only)
    #[serde(default)]
    pub location_id: Option<Uuid>,

    /// Account status
    #[serde(default)]
    pub status: AccountStatus,

    /// When the account was created
    pub created_at: DateTime<Utc>,

    /// When the account was last updated
    pub updated_at: DateTime<Utc>,
}

impl UserAccount {
    /// Create an active account whose permissions start as the role template.
    pub fn new(
        email: impl Into<String>,
        name: impl Into<String>,
        role: Role,
        templates: &RoleTemplateStore,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            email: email.into(),
            name: name.into(),
            permissions: Some(templates.template_for(&role)),
            role,
            location_id: None,
            status: AccountStatus::Active,
            created_at: now,
            updated_at: now,
        }
    }

    /// Bind the account to a location.
    ///
    /// # Errors
    ///
    /// [`AccountError::LocationRequiresManager`] unless the role is `manager`.
    pub fn with_location(mut self, location_id: Uuid) -> AccountResult<Self> {
        if !self.role.is_manager() {
            return Err(AccountError::LocationRequiresManager);
        }
        self.location_id = Some(location_id);
        Ok(self)
    }

    /// Check if the account can sign in.
    pub fn is_active(&self) -> bool {
        self.status == AccountStatus::Active
    }

    /// Disable the account.
    pub fn deactivate(&mut self) {
        self.status = AccountStatus::Inactive;
        self.updated_at = Utc::now();
    }

    /// Re-enable the account.
    pub fn activate(&mut self) {
        self.status = AccountStatus::Active;
        self.updated_at = Utc::now();
    }

    /// Change the role.
    ///
    /// The permission matrix is replaced by the new role's template and any
    /// manual edits are discarded. Leaving `manager` clears the location.
    pub fn change_role(&mut self, role: Role, templates: &RoleTemplateStore) {
        self.permissions = Some(templates.template_for(&role));
        if !role.is_manager() {
            self.location_id = None;
        }
        tracing::info!(account_id = %self.id, from = %self.role, to = %role, "Account role changed");
        self.role = role;
        self.updated_at = Utc::now();
    }

    /// The `{role, permissions}` pair handed to the access guard.
    pub fn to_principal(&self) -> Principal {
        Principal {
            role: self.role.clone(),
            permissions: self.permissions.clone(),
        }
    }
}

impl Grantee for UserAccount {
    fn role(&self) -> &Role {
        &self.role
    }

    fn permissions(&self) -> Option<&PermissionMatrix> {
        self.permissions.as_ref()
    }
}
