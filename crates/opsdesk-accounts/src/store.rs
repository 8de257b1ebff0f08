//! Account store boundary
//!
//! The dashboard persists accounts through its REST backend; this module
//! defines the contract the access-control code relies on and an in-memory
//! implementation for tests and single-process tools.
//!
//! The one hard requirement: an account, permission matrix included, is
//! always written as a single unit. There is no per-cell write.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};
use uuid::Uuid;

use crate::account::UserAccount;
use crate::error::{AccountError, AccountResult};

/// Persistence contract for accounts.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Insert a new account.
    async fn create(&self, account: UserAccount) -> AccountResult<UserAccount>;

    /// Fetch an account.
    async fn get(&self, id: Uuid) -> AccountResult<UserAccount>;

    /// Replace an existing account in one atomic write.
    ///
    /// Concurrent saves of the same account are last-write-wins.
    async fn save(&self, account: UserAccount) -> AccountResult<UserAccount>;

    /// Remove an account together with its permissions.
    async fn delete(&self, id: Uuid) -> AccountResult<()>;

    /// All accounts, oldest first.
    async fn list(&self) -> AccountResult<Vec<UserAccount>>;
}

/// Change notification published by [`InMemoryAccountStore`].
#[derive(Debug, Clone, PartialEq)]
pub enum AccountChange {
    /// Account created
    Created(Uuid),

    /// Account replaced (role, permissions, status, ...)
    Saved(Uuid),

    /// Account removed
    Deleted(Uuid),
}

impl AccountChange {
    /// ID of the affected account.
    pub fn account_id(&self) -> Uuid {
        match self {
            AccountChange::Created(id) | AccountChange::Saved(id) | AccountChange::Deleted(id) => *id,
        }
    }
}

/// In-memory account store.
///
/// Every write takes the map's write lock once and swaps the whole record,
/// so readers never observe a partially updated matrix.
pub struct InMemoryAccountStore {
    /// Accounts by ID
    accounts: Arc<RwLock<HashMap<Uuid, UserAccount>>>,
    /// Change notifications
    changes: broadcast::Sender<AccountChange>,
}

impl std::fmt::Debug for InMemoryAccountStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryAccountStore")
            .field("subscribers", &self.changes.receiver_count())
            .finish()
    }
}

impl InMemoryAccountStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::with_capacity(256)
    }

    /// Create with a custom change-notification buffer.
    pub fn with_capacity(capacity: usize) -> Self {
        let (changes, _) = broadcast::channel(capacity.max(1));
        Self {
            accounts: Arc::new(RwLock::new(HashMap::new())),
            changes,
        }
    }

    /// Subscribe to change notifications.
    ///
    /// Sessions holding a cached `{role, permissions}` pair use this to know
    /// when to reload it.
    pub fn subscribe(&self) -> broadcast::Receiver<AccountChange> {
        self.changes.subscribe()
    }

    /// Number of stored accounts.
    pub async fn len(&self) -> usize {
        self.accounts.read().await.len()
    }

    /// Check if the store is empty.
    pub async fn is_empty(&self) -> bool {
        self.accounts.read().await.is_empty()
    }

    fn notify(&self, change: AccountChange) {
        // No subscribers is fine.
        let _ = self.changes.send(change);
    }
}

impl Default for InMemoryAccountStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AccountStore for InMemoryAccountStore {
    async fn create(&self, account: UserAccount) -> AccountResult<UserAccount> {
        {
            let mut accounts = self.accounts.write().await;
            if accounts.contains_key(&account.id) {
                return Err(AccountError::AlreadyExists(account.id));
            }
            accounts.insert(account.id, account.clone());
        }

        tracing::info!(account_id = %account.id, role = %account.role, "Account created");
        self.notify(AccountChange::Created(account.id));
        Ok(account)
    }

    async fn get(&self, id: Uuid) -> AccountResult<UserAccount> {
        self.accounts
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(AccountError::NotFound(id))
    }

    async fn save(&self, mut account: UserAccount) -> AccountResult<UserAccount> {
        account.updated_at = Utc::now();
        {
            let mut accounts = self.accounts.write().await;
            let slot = accounts
                .get_mut(&account.id)
                .ok_or(AccountError::NotFound(account.id))?;
            *slot = account.clone();
        }

        tracing::debug!(account_id = %account.id, "Account saved");
        self.notify(AccountChange::Saved(account.id));
        Ok(account)
    }

    async fn delete(&self, id: Uuid) -> AccountResult<()> {
        let removed = self.accounts.write().await.remove(&id);
        if removed.is_none() {
            return Err(AccountError::NotFound(id));
        }

        tracing::info!(account_id = %id, "Account deleted");
        self.notify(AccountChange::Deleted(id));
        Ok(())
    }

    async fn list(&self) -> AccountResult<Vec<UserAccount>> {
        let mut accounts: Vec<UserAccount> = self.accounts.read().await.values().cloned().collect();
        accounts.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(accounts)
    }
}
