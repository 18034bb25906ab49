//! Account data models and API request/response types.
//!
//! This module defines:
//! - `Account`: the ledger's view of an account record
//! - `NewAccount`: what the store needs to create one
//! - Query parameter types for the account endpoints
//! - `AccountResponse`: Response body returned to clients

use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::amount::Amount;
use crate::models::user::{NewUser, User, UserResponse};
use crate::services::error::LedgerError;

/// Opaque account identifier.
///
/// Assigned by the store on creation and never reused. The derived `Ord` is
/// the lock order used when a transfer needs two accounts at once.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[serde(transparent)]
#[sqlx(transparent)]
pub struct AccountId(pub Uuid);

impl AccountId {
    /// Generate a fresh random identifier.
    pub fn new_v4() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<Uuid> for AccountId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

/// An account together with the user that owns it.
///
/// # Balance
///
/// Balances are exact decimals, never floats. The balance is `>= 0` after
/// every completed operation; the only way to change it is through
/// [`Account::credit`] and [`Account::debit`].
#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    /// Unique identifier for this account
    pub id: AccountId,

    /// Owning user, stored with the account
    pub user: User,

    /// Current balance
    pub balance: Decimal,

    /// Timestamp when account was created
    pub created_at: DateTime<Utc>,

    /// Timestamp of last balance update
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// Add `amount` to the balance.
    ///
    /// Fails with `InvalidArgument` when the new balance cannot be
    /// represented exactly, either because it overflows `Decimal` or because
    /// it would need more than 28 significant digits and get rounded.
    pub fn credit(&mut self, amount: Amount) -> Result<(), LedgerError> {
        let balance = self
            .balance
            .checked_add(amount.value())
            .filter(|new| new.checked_sub(self.balance) == Some(amount.value()))
            .ok_or_else(|| self.unrepresentable(amount))?;
        self.balance = balance;
        Ok(())
    }

    /// Remove `amount` from the balance.
    ///
    /// Leaves the account untouched and returns `InsufficientBalance` when the
    /// balance is lower than `amount`. Draining to exactly zero is allowed.
    pub fn debit(&mut self, amount: Amount) -> Result<(), LedgerError> {
        if self.balance < amount.value() {
            return Err(LedgerError::InsufficientBalance {
                amount: amount.value(),
            });
        }
        let balance = self
            .balance
            .checked_sub(amount.value())
            .filter(|new| self.balance.checked_sub(*new) == Some(amount.value()))
            .ok_or_else(|| self.unrepresentable(amount))?;
        self.balance = balance;
        Ok(())
    }

    fn unrepresentable(&self, amount: Amount) -> LedgerError {
        LedgerError::InvalidArgument(format!(
            "Balance of account {} cannot represent a change of {amount} exactly",
            self.id
        ))
    }
}

/// Data needed to create an account. The store assigns ids and timestamps,
/// and every account starts with a zero balance.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub user: NewUser,
}

/// Query parameters for `POST /account/create`.
///
/// ```text
/// /account/create?email=test@mail.com&username=testUser
/// ```
#[derive(Debug, Deserialize)]
pub struct CreateAccountParams {
    pub email: String,
    pub username: String,
}

/// Query parameters for `PUT /account/withdraw` and `PUT /account/deposit`.
///
/// ```text
/// /account/deposit?amount=20.00&accountId=550e8400-e29b-41d4-a716-446655440000
/// ```
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AmountParams {
    pub amount: Decimal,
    pub account_id: AccountId,
}

/// Query parameters for `POST /account/transfer`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferParams {
    pub amount: Decimal,
    pub from_account: AccountId,
    pub to_account: AccountId,
}

/// Response body for account endpoints.
///
/// # JSON Example
///
/// ```json
/// {
///   "accountId": "550e8400-e29b-41d4-a716-446655440000",
///   "user": {
///     "userId": "660e8400-e29b-41d4-a716-446655440001",
///     "username": "testUser",
///     "email": "test@mail.com"
///   },
///   "balance": "10.00",
///   "createdAt": "2025-12-20T10:00:00Z",
///   "updatedAt": "2025-12-20T10:00:00Z"
/// }
/// ```
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountResponse {
    pub account_id: AccountId,
    pub user: UserResponse,
    pub balance: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Account> for AccountResponse {
    fn from(account: Account) -> Self {
        Self {
            account_id: account.id,
            user: account.user.into(),
            balance: account.balance,
            created_at: account.created_at,
            updated_at: account.updated_at,
        }
    }
}
