//! In-memory account store.
//!
//! Keeps committed records in a map and gives every account its own async
//! mutex acting as a row lock. A unit of work holds the owned guards of the
//! accounts it touched until it commits, rolls back or is dropped, and keeps
//! its writes in a private staging map until commit.
//!
//! The lock table only ever holds entries for committed accounts. Looking up
//! an unknown id takes no lock, and a freshly inserted account keeps its
//! mutex private until the inserting unit of work commits.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};

use super::{AccountStore, StoreError, UnitOfWork};
use crate::models::account::{Account, AccountId, NewAccount};
use crate::models::user::{User, UserId};

#[derive(Default)]
struct Shared {
    accounts: RwLock<HashMap<AccountId, Account>>,
    row_locks: Mutex<HashMap<AccountId, Arc<Mutex<()>>>>,
}

impl Shared {
    async fn row_lock(&self, id: AccountId) -> Option<Arc<Mutex<()>>> {
        self.row_locks.lock().await.get(&id).cloned()
    }
}

/// Process-local [`AccountStore`]. Cloning shares the same data.
#[derive(Clone, Default)]
pub struct MemoryAccountStore {
    shared: Arc<Shared>,
}

impl MemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of committed accounts.
    pub async fn len(&self) -> usize {
        self.shared.accounts.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    #[cfg(test)]
    pub(crate) async fn row_lock_count(&self) -> usize {
        self.shared.row_locks.lock().await.len()
    }
}

#[async_trait]
impl AccountStore for MemoryAccountStore {
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>, StoreError> {
        Ok(Box::new(MemoryUnitOfWork {
            shared: Arc::clone(&self.shared),
            guards: HashMap::new(),
            staged: HashMap::new(),
        }))
    }

    async fn find_by_id(&self, id: AccountId) -> Result<Option<Account>, StoreError> {
        Ok(self.shared.accounts.read().await.get(&id).cloned())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

struct MemoryUnitOfWork {
    shared: Arc<Shared>,
    guards: HashMap<AccountId, OwnedMutexGuard<()>>,
    staged: HashMap<AccountId, Account>,
}

impl MemoryUnitOfWork {
    /// Returns false when `id` names no committed account.
    async fn lock(&mut self, id: AccountId) -> bool {
        if self.guards.contains_key(&id) {
            return true;
        }
        let Some(row) = self.shared.row_lock(id).await else {
            return false;
        };
        let guard = row.lock_owned().await;
        self.guards.insert(id, guard);
        true
    }

    async fn current(&self, id: AccountId) -> Option<Account> {
        if let Some(account) = self.staged.get(&id) {
            return Some(account.clone());
        }
        self.shared.accounts.read().await.get(&id).cloned()
    }
}

#[async_trait]
impl UnitOfWork for MemoryUnitOfWork {
    async fn insert(&mut self, account: NewAccount) -> Result<Account, StoreError> {
        let now = Utc::now();
        let account = Account {
            id: AccountId::new_v4(),
            user: User {
                id: UserId::new_v4(),
                username: account.user.username().to_string(),
                email: account.user.email().to_string(),
            },
            balance: Decimal::ZERO,
            created_at: now,
            updated_at: now,
        };

        let guard = Arc::new(Mutex::new(())).lock_owned().await;
        self.guards.insert(account.id, guard);
        self.staged.insert(account.id, account.clone());
        Ok(account)
    }

    async fn find_by_id_for_update(
        &mut self,
        id: AccountId,
    ) -> Result<Option<Account>, StoreError> {
        if !self.lock(id).await {
            return Ok(None);
        }
        Ok(self.current(id).await)
    }

    async fn save(&mut self, account: &Account) -> Result<Account, StoreError> {
        if !self.guards.contains_key(&account.id) {
            return Err(StoreError::Unavailable(format!(
                "account {} is not locked by this unit of work",
                account.id
            )));
        }
        // mirrors the balance CHECK constraint of the SQL schema
        if account.balance < Decimal::ZERO {
            return Err(StoreError::Unavailable(format!(
                "balance of account {} must not be negative",
                account.id
            )));
        }
        let Some(mut stored) = self.current(account.id).await else {
            return Err(StoreError::Unavailable(format!(
                "account {} does not exist",
                account.id
            )));
        };

        stored.balance = account.balance;
        stored.updated_at = Utc::now();
        self.staged.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        let mut this = *self;
        let mut accounts = this.shared.accounts.write().await;
        let mut row_locks = this.shared.row_locks.lock().await;
        for (id, account) in this.staged.drain() {
            if let Some(guard) = this.guards.get(&id) {
                row_locks
                    .entry(id)
                    .or_insert_with(|| Arc::clone(OwnedMutexGuard::mutex(guard)));
            }
            accounts.insert(id, account);
        }
        drop(row_locks);
        drop(accounts);
        tracing::trace!(locks = this.guards.len(), "memory unit of work committed");
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), StoreError> {
        tracing::trace!(
            discarded = self.staged.len(),
            "memory unit of work rolled back"
        );
        Ok(())
    }
}
