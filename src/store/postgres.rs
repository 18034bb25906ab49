//! PostgreSQL account store.
//!
//! Accounts live in the `accounts` table and reference their owning row in
//! `users`. Every unit of work is a database transaction; row locks are taken
//! with `SELECT ... FOR UPDATE` and released on commit or rollback. Dropping
//! an unfinished `sqlx::Transaction` rolls it back.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{Postgres, Transaction};

use super::{AccountStore, StoreError, UnitOfWork};
use crate::db::DbPool;
use crate::models::account::{Account, AccountId, NewAccount};
use crate::models::user::{User, UserId};

/// Columns selected for an account joined with its user, aliased `a` / `u`.
const ACCOUNT_COLUMNS: &str =
    "a.id, a.balance, a.created_at, a.updated_at, u.id AS user_id, u.username, u.email";

/// One row of `accounts` joined with `users`.
#[derive(Debug, sqlx::FromRow)]
struct AccountRow {
    id: AccountId,
    balance: Decimal,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    user_id: UserId,
    username: String,
    email: String,
}

impl From<AccountRow> for Account {
    fn from(row: AccountRow) -> Self {
        Self {
            id: row.id,
            user: User {
                id: row.user_id,
                username: row.username,
                email: row.email,
            },
            balance: row.balance,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// [`AccountStore`] backed by a PostgreSQL connection pool.
#[derive(Debug, Clone)]
pub struct PgAccountStore {
    pool: DbPool,
}

impl PgAccountStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccountStore for PgAccountStore {
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>, StoreError> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgUnitOfWork { tx }))
    }

    async fn find_by_id(&self, id: AccountId) -> Result<Option<Account>, StoreError> {
        let row = sqlx::query_as::<_, AccountRow>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts a JOIN users u ON u.id = a.user_id WHERE a.id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Account::from))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

struct PgUnitOfWork {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl UnitOfWork for PgUnitOfWork {
    async fn insert(&mut self, account: NewAccount) -> Result<Account, StoreError> {
        // User and account are written in the same statement so the pair can
        // never be half-created.
        let row = sqlx::query_as::<_, AccountRow>(&format!(
            r#"
            WITH u AS (
                INSERT INTO users (username, email)
                VALUES ($1, $2)
                RETURNING id, username, email
            ),
            a AS (
                INSERT INTO accounts (user_id, balance)
                SELECT id, 0 FROM u
                RETURNING id, user_id, balance, created_at, updated_at
            )
            SELECT {ACCOUNT_COLUMNS} FROM a JOIN u ON u.id = a.user_id
            "#
        ))
        .bind(account.user.username())
        .bind(account.user.email())
        .fetch_one(&mut *self.tx)
        .await?;

        Ok(row.into())
    }

    async fn find_by_id_for_update(
        &mut self,
        id: AccountId,
    ) -> Result<Option<Account>, StoreError> {
        // FOR UPDATE OF a locks only the account row, not the user row
        let row = sqlx::query_as::<_, AccountRow>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts a JOIN users u ON u.id = a.user_id WHERE a.id = $1 FOR UPDATE OF a"
        ))
        .bind(id)
        .fetch_optional(&mut *self.tx)
        .await?;

        Ok(row.map(Account::from))
    }

    async fn save(&mut self, account: &Account) -> Result<Account, StoreError> {
        let row = sqlx::query_as::<_, AccountRow>(&format!(
            r#"
            WITH a AS (
                UPDATE accounts
                SET balance = $1,
                    updated_at = NOW()
                WHERE id = $2
                RETURNING id, user_id, balance, created_at, updated_at
            )
            SELECT {ACCOUNT_COLUMNS} FROM a JOIN users u ON u.id = a.user_id
            "#
        ))
        .bind(account.balance)
        .bind(account.id)
        .fetch_optional(&mut *self.tx)
        .await?
        .ok_or(sqlx::Error::RowNotFound)?;

        Ok(row.into())
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        self.tx.commit().await?;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), StoreError> {
        self.tx.rollback().await?;
        Ok(())
    }
}
