//! Permission editing sessions
//!
//! [`PermissionEditor`] owns the in-memory draft of one account while an
//! administrator edits it. It knows nothing about any UI toolkit: a form
//! calls these methods in response to its own events and calls
//! [`PermissionEditor::save`] at the end.
//!
//! Saving writes the whole account, draft matrix included, in a single
//! store call. Two sessions editing the same account overwrite each other
//! (last write wins).

use opsdesk_acl::{Action, Module, PermissionMatrix, Role, RoleTemplateStore};
use std::sync::Arc;
use uuid::Uuid;

use crate::account::UserAccount;
use crate::error::{AccountError, AccountResult};
use crate::store::AccountStore;

/// Draft matrix after a role change: the new role's template.
///
/// The previous draft is discarded on purpose, including unsaved manual
/// edits.
pub fn apply_role_change(
    templates: &RoleTemplateStore,
    _draft: &PermissionMatrix,
    new_role: &Role,
) -> PermissionMatrix {
    templates.template_for(new_role)
}

/// State of a module's "select all" checkbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// Every declared action granted
    All,

    /// Some but not all declared actions granted
    Partial,

    /// Nothing granted (or nothing declared)
    None,
}

/// Edit session over one account's role, location and permission draft.
///
/// # Examples
///
/// ```
/// use opsdesk_acl::{Action, Module, Role, RoleTemplateStore};
/// use opsdesk_accounts::{PermissionEditor, UserAccount};
///
/// let templates = RoleTemplateStore::standard();
/// let account = UserAccount::new("ana@example.com", "Ana", Role::User, &templates);
///
/// let mut editor = PermissionEditor::new(account, templates.clone());
/// editor.toggle(Module::Invoices, Action::View);
/// assert!(editor.is_dirty());
///
/// // A role change throws the manual edit away.
/// editor.change_role(Role::Marketing);
/// assert_eq!(editor.draft(), &templates.template_for(&Role::Marketing));
/// ```
#[derive(Debug, Clone)]
pub struct PermissionEditor {
    templates: Arc<RoleTemplateStore>,
    original: UserAccount,
    role: Role,
    location_id: Option<Uuid>,
    draft: PermissionMatrix,
}

impl PermissionEditor {
    /// Open a session on `account`.
    ///
    /// An account without stored permissions starts from its role template.
    pub fn new(account: UserAccount, templates: Arc<RoleTemplateStore>) -> Self {
        let draft = account
            .permissions
            .clone()
            .unwrap_or_else(|| templates.template_for(&account.role));
        Self {
            role: account.role.clone(),
            location_id: account.location_id,
            draft,
            original: account,
            templates,
        }
    }

    /// ID of the edited account.
    pub fn account_id(&self) -> Uuid {
        self.original.id
    }

    /// Draft role.
    pub fn role(&self) -> &Role {
        &self.role
    }

    /// Draft location.
    pub fn location_id(&self) -> Option<Uuid> {
        self.location_id
    }

    /// Draft permission matrix.
    pub fn draft(&self) -> &PermissionMatrix {
        &self.draft
    }

    /// Read one draft cell.
    pub fn is_granted(&self, module: Module, action: Action) -> bool {
        self.draft.get(self.templates.registry(), module, action)
    }

    /// Change the draft role, replacing the draft matrix with the new role's
    /// template. Leaving `manager` clears the draft location.
    pub fn change_role(&mut self, role: Role) {
        self.draft = apply_role_change(&self.templates, &self.draft, &role);
        if !role.is_manager() {
            self.location_id = None;
        }
        self.role = role;
    }

    /// Flip one cell. Undeclared cells stay denied.
    pub fn toggle(&mut self, module: Module, action: Action) {
        let granted = self.is_granted(module, action);
        self.set_cell(module, action, !granted);
    }

    /// Set one cell.
    pub fn set_cell(&mut self, module: Module, action: Action, granted: bool) {
        self.draft = self.draft.set(self.templates.registry(), module, action, granted);
    }

    /// Select or clear every declared action of one module.
    pub fn set_module(&mut self, module: Module, granted: bool) {
        self.draft = self
            .draft
            .set_all_for_module(self.templates.registry(), module, granted);
    }

    /// Select or clear every declared action of every module.
    pub fn set_all(&mut self, granted: bool) {
        self.draft = PermissionMatrix::set_all(self.templates.registry(), granted);
    }

    /// Checkbox state for a module row.
    pub fn selection(&self, module: Module) -> Selection {
        let registry = self.templates.registry();
        let actions = registry.actions(module).unwrap_or(&[]);
        let granted = actions
            .iter()
            .filter(|action| self.draft.get(registry, module, **action))
            .count();

        match granted {
            0 => Selection::None,
            n if n == actions.len() => Selection::All,
            _ => Selection::Partial,
        }
    }

    /// Set or clear the draft location.
    ///
    /// # Errors
    ///
    /// [`AccountError::LocationRequiresManager`] when setting a location
    /// while the draft role is not `manager`.
    pub fn set_location(&mut self, location_id: Option<Uuid>) -> AccountResult<()> {
        if location_id.is_some() && !self.role.is_manager() {
            return Err(AccountError::LocationRequiresManager);
        }
        self.location_id = location_id;
        Ok(())
    }

    /// Check whether the draft differs from the loaded account.
    pub fn is_dirty(&self) -> bool {
        self.role != self.original.role
            || self.location_id != self.original.location_id
            || Some(&self.draft) != self.original.permissions.as_ref()
    }

    /// Throw away every unsaved change.
    pub fn reset(&mut self) {
        *self = Self::new(self.original.clone(), self.templates.clone());
    }

    /// The account as it would be saved.
    ///
    /// The draft is stored exactly as edited, admin accounts included.
    pub fn to_account(&self) -> UserAccount {
        let mut account = self.original.clone();
        account.role = self.role.clone();
        account.location_id = self.location_id;
        account.permissions = Some(self.draft.clone());
        account
    }

    /// Persist the draft in one atomic write and rebase the session on the
    /// saved record.
    pub async fn save<S>(&mut self, store: &S) -> AccountResult<UserAccount>
    where
        S: AccountStore + ?Sized,
    {
        let saved = store.save(self.to_account()).await?;
        tracing::info!(
            account_id = %saved.id,
            role = %saved.role,
            "Account permissions saved"
        );
        self.original = saved.clone();
        Ok(saved)
    }
}
