//! Ledger service - Core business logic for account balances.
//!
//! This service handles:
//! - Account creation
//! - Deposits and withdrawals with balance validation
//! - Transfers between two accounts
//!
//! # Atomicity Guarantees
//!
//! Every mutation runs inside one [`UnitOfWork`]. A transfer debits and
//! credits inside the same unit of work, so either both balance changes are
//! committed or neither is. Each account is locked for the whole of its
//! read-modify-write, which rules out lost updates between concurrent
//! callers. The service itself holds no mutable state.

use std::sync::Arc;

use rust_decimal::Decimal;

use crate::models::account::{Account, AccountId, NewAccount};
use crate::models::amount::Amount;
use crate::models::user::NewUser;
use crate::services::error::LedgerError;
use crate::store::{AccountStore, UnitOfWork};

/// Entry point to the ledger. Cheap to clone; all clones share the store.
#[derive(Clone)]
pub struct LedgerService {
    store: Arc<dyn AccountStore>,
}

impl LedgerService {
    pub fn new(store: Arc<dyn AccountStore>) -> Self {
        Self { store }
    }

    /// Create an account with a zero balance for a new user.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument`: malformed email or blank username
    /// - `Store`: the account could not be persisted
    pub async fn create_account(
        &self,
        email: &str,
        username: &str,
    ) -> Result<Account, LedgerError> {
        let user = NewUser::new(email, username)?;

        let mut uow = self.store.begin().await?;
        let result = uow
            .insert(NewAccount { user })
            .await
            .map_err(LedgerError::from);
        let account = finish(uow, result).await?;

        tracing::debug!(account_id = %account.id, "account created");
        Ok(account)
    }

    /// Remove `amount` from an account.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument`: amount is zero or negative
    /// - `AccountNotFound`: no account with this id
    /// - `InsufficientBalance`: balance is lower than `amount`; nothing changes
    /// - `Store`: read, write or commit failed
    pub async fn withdraw(
        &self,
        amount: Decimal,
        account_id: AccountId,
    ) -> Result<Account, LedgerError> {
        let amount = Amount::new(amount)?;

        let mut uow = self.store.begin().await?;
        let result = withdraw_in(uow.as_mut(), amount, account_id).await;
        finish(uow, result).await
    }

    /// Add `amount` to an account. No upper bound is enforced.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument`: amount is zero or negative
    /// - `AccountNotFound`: no account with this id
    /// - `Store`: read, write or commit failed
    pub async fn deposit(
        &self,
        amount: Decimal,
        account_id: AccountId,
    ) -> Result<Account, LedgerError> {
        let amount = Amount::new(amount)?;

        let mut uow = self.store.begin().await?;
        let result = deposit_in(uow.as_mut(), amount, account_id).await;
        finish(uow, result).await
    }

    /// Move `amount` from one account to another.
    ///
    /// Both accounts are locked in ascending id order before anything is
    /// read, so two transfers running in opposite directions cannot deadlock.
    /// The withdrawal is evaluated first: a missing or underfunded source
    /// fails the transfer before the destination is looked at.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument`: amount is zero or negative, or both ids are equal
    /// - `AccountNotFound`: source or destination does not exist
    /// - `InsufficientBalance`: source balance is lower than `amount`
    /// - `Store`: any read, write or the commit failed
    ///
    /// On every error both balances keep their previous values.
    pub async fn transfer(
        &self,
        amount: Decimal,
        from_account_id: AccountId,
        to_account_id: AccountId,
    ) -> Result<(), LedgerError> {
        let amount = Amount::new(amount)?;

        if from_account_id == to_account_id {
            return Err(LedgerError::InvalidArgument(
                "Cannot transfer to same account".to_string(),
            ));
        }

        let mut uow = self.store.begin().await?;
        let result = transfer_in(uow.as_mut(), amount, from_account_id, to_account_id).await;
        finish(uow, result).await?;

        tracing::debug!(
            from = %from_account_id,
            to = %to_account_id,
            %amount,
            "transfer committed"
        );
        Ok(())
    }

    /// Read the committed state of an account.
    pub async fn get_account(&self, account_id: AccountId) -> Result<Account, LedgerError> {
        self.store
            .find_by_id(account_id)
            .await?
            .ok_or(LedgerError::AccountNotFound { id: account_id })
    }

    /// Check that the underlying store is reachable.
    pub async fn ping(&self) -> Result<(), LedgerError> {
        Ok(self.store.ping().await?)
    }
}

async fn withdraw_in(
    uow: &mut dyn UnitOfWork,
    amount: Amount,
    account_id: AccountId,
) -> Result<Account, LedgerError> {
    let mut account = uow
        .find_by_id_for_update(account_id)
        .await?
        .ok_or(LedgerError::AccountNotFound { id: account_id })?;

    account.debit(amount)?;
    Ok(uow.save(&account).await?)
}

async fn deposit_in(
    uow: &mut dyn UnitOfWork,
    amount: Amount,
    account_id: AccountId,
) -> Result<Account, LedgerError> {
    let mut account = uow
        .find_by_id_for_update(account_id)
        .await?
        .ok_or(LedgerError::AccountNotFound { id: account_id })?;

    account.credit(amount)?;
    Ok(uow.save(&account).await?)
}

async fn transfer_in(
    uow: &mut dyn UnitOfWork,
    amount: Amount,
    from_account_id: AccountId,
    to_account_id: AccountId,
) -> Result<(), LedgerError> {
    let (first, second) = if from_account_id < to_account_id {
        (from_account_id, to_account_id)
    } else {
        (to_account_id, from_account_id)
    };
    uow.find_by_id_for_update(first).await?;
    uow.find_by_id_for_update(second).await?;

    withdraw_in(uow, amount, from_account_id).await?;
    deposit_in(uow, amount, to_account_id).await?;
    Ok(())
}

/// Commit on success, roll back on failure.
///
/// A failed rollback is only logged: the caller gets the error that caused
/// it, and the backend discards the unit of work anyway once it is dropped.
async fn finish<T>(
    uow: Box<dyn UnitOfWork>,
    result: Result<T, LedgerError>,
) -> Result<T, LedgerError> {
    match result {
        Ok(value) => {
            uow.commit().await?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = uow.rollback().await {
                tracing::warn!(error = %rollback_err, "rollback failed");
            }
            Err(err)
        }
    }
}
