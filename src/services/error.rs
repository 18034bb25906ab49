//! Ledger error taxonomy.
//!
//! Closed set of failures the ledger core can report. Values only carry data
//! that is safe to show to a caller (account ids and amounts); translating
//! them to HTTP happens in [`crate::error`].

use rust_decimal::Decimal;

use crate::models::account::AccountId;
use crate::store::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// The referenced account has no record.
    #[error("Account does not exist: {id}")]
    AccountNotFound { id: AccountId },

    /// The withdrawal would drive the balance negative. Nothing was changed.
    #[error("There isn't enough balance: {amount}")]
    InsufficientBalance { amount: Decimal },

    /// Non-positive amount, malformed email, blank username or a
    /// self-transfer. Raised before the store is touched.
    #[error("{0}")]
    InvalidArgument(String),

    /// The store could not complete a read, write or commit.
    #[error("Store failure: {0}")]
    Store(#[from] StoreError),
}
