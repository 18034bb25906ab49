//! Account persistence.
//!
//! The ledger talks to storage only through [`AccountStore`] and the
//! [`UnitOfWork`] it hands out. Two backends are provided:
//!
//! - [`postgres::PgAccountStore`]: PostgreSQL through sqlx, row locks via
//!   `SELECT ... FOR UPDATE`
//! - [`memory::MemoryAccountStore`]: process-local maps with per-account
//!   mutexes, used by tests and by `STORE_BACKEND=memory`
//!
//! # Unit of Work
//!
//! Every mutation runs inside a unit of work. Writes become visible to other
//! callers only on [`UnitOfWork::commit`]. Rolling back, or dropping the unit
//! of work without committing, discards them and releases every lock taken.

use async_trait::async_trait;

use crate::models::account::{Account, AccountId, NewAccount};

pub mod memory;
pub mod postgres;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Database operation failed (connection error, query error, constraint).
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Migrations could not be applied.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// The backend refused the operation for a reason of its own.
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Durable mapping from account id to account record.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Open a new unit of work.
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>, StoreError>;

    /// Read the committed state of an account without locking it.
    async fn find_by_id(&self, id: AccountId) -> Result<Option<Account>, StoreError>;

    /// Check that the backend is reachable.
    async fn ping(&self) -> Result<(), StoreError>;
}

/// A transactional scope over the account store.
#[async_trait]
pub trait UnitOfWork: Send {
    /// Persist a new account (and its user) with a zero balance.
    async fn insert(&mut self, account: NewAccount) -> Result<Account, StoreError>;

    /// Load an account and lock it until this unit of work ends.
    ///
    /// Locking the same id twice in one unit of work is allowed and returns
    /// the staged state.
    async fn find_by_id_for_update(&mut self, id: AccountId)
    -> Result<Option<Account>, StoreError>;

    /// Write the balance of a locked account, returning the stored record.
    async fn save(&mut self, account: &Account) -> Result<Account, StoreError>;

    async fn commit(self: Box<Self>) -> Result<(), StoreError>;

    async fn rollback(self: Box<Self>) -> Result<(), StoreError>;
}
