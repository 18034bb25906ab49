//! Account management HTTP handlers.
//!
//! This module implements the account API endpoints:
//! - POST /account/create - Create new account
//! - PUT /account/withdraw - Remove money from an account
//! - PUT /account/deposit - Add money to an account
//! - POST /account/transfer - Move money between accounts
//! - GET /account/{id} - Get account by ID
//!
//! Every input arrives as a query-string parameter. Handlers only translate
//! HTTP into ledger calls; all rules live in [`LedgerService`].

use axum::{
    Json,
    extract::State,
    http::StatusCode,
};

use crate::{
    error::AppError,
    handlers::params::{Params, PathParam},
    models::account::{
        AccountId, AccountResponse, AmountParams, CreateAccountParams, TransferParams,
    },
    services::ledger_service::LedgerService,
};

/// Create a new account.
///
/// # Endpoint
///
/// `POST /account/create?email=test@mail.com&username=testUser`
///
/// # Response
///
/// - **Success (200 OK)**: Returns the created account with a zero balance
/// - **Error (400)**: Malformed email or blank username
/// - **Error (500)**: Store error
pub async fn create_account(
    State(ledger): State<LedgerService>,
    Params(params): Params<CreateAccountParams>,
) -> Result<Json<AccountResponse>, AppError> {
    tracing::info!(email = %params.email, "creating account");

    let account = ledger
        .create_account(&params.email, &params.username)
        .await?;

    Ok(Json(account.into()))
}

/// Withdraw money from an account.
///
/// # Endpoint
///
/// `PUT /account/withdraw?amount=10.00&accountId=<uuid>`
///
/// # Response
///
/// - **Success (200 OK)**: Returns the updated account
/// - **Error (400)**: Amount is not positive
/// - **Error (404)**: Account not found, or insufficient balance
pub async fn withdraw(
    State(ledger): State<LedgerService>,
    Params(params): Params<AmountParams>,
) -> Result<Json<AccountResponse>, AppError> {
    tracing::info!(
        amount = %params.amount,
        account_id = %params.account_id,
        "withdrawal"
    );

    let account = ledger.withdraw(params.amount, params.account_id).await?;

    Ok(Json(account.into()))
}

/// Deposit money into an account.
///
/// # Endpoint
///
/// `PUT /account/deposit?amount=20.00&accountId=<uuid>`
pub async fn deposit(
    State(ledger): State<LedgerService>,
    Params(params): Params<AmountParams>,
) -> Result<Json<AccountResponse>, AppError> {
    tracing::info!(
        amount = %params.amount,
        account_id = %params.account_id,
        "deposit"
    );

    let account = ledger.deposit(params.amount, params.account_id).await?;

    Ok(Json(account.into()))
}

/// Transfer money between accounts.
///
/// # Endpoint
///
/// `POST /account/transfer?amount=10.00&fromAccount=<uuid>&toAccount=<uuid>`
///
/// # Atomicity
///
/// Both accounts are updated in a single unit of work.
/// Either both succeed or both fail.
///
/// # Response
///
/// - **Success (200 OK)**: Empty body
/// - **Error (400)**: Amount is not positive, or both accounts are the same
/// - **Error (404)**: Either account not found, or insufficient balance
pub async fn transfer(
    State(ledger): State<LedgerService>,
    Params(params): Params<TransferParams>,
) -> Result<StatusCode, AppError> {
    tracing::info!(
        amount = %params.amount,
        from = %params.from_account,
        to = %params.to_account,
        "transfer"
    );

    ledger
        .transfer(params.amount, params.from_account, params.to_account)
        .await?;

    Ok(StatusCode::OK)
}

/// Get a specific account by ID.
///
/// # Endpoint
///
/// `GET /account/{id}`
///
/// # Response
///
/// - **Success (200 OK)**: Returns account details
/// - **Error (404)**: Account not found
pub async fn get_account(
    State(ledger): State<LedgerService>,
    PathParam(account_id): PathParam<AccountId>,
) -> Result<Json<AccountResponse>, AppError> {
    let account = ledger.get_account(account_id).await?;

    Ok(Json(account.into()))
}
