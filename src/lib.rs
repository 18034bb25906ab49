//! Money transfer service.
//!
//! A small bank-account API: create an account, deposit, withdraw and
//! transfer funds between two accounts. The ledger core lives in
//! [`services::ledger_service`]; persistence sits behind
//! [`store::AccountStore`] with PostgreSQL and in-memory backends.

pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod models;
pub mod services;
pub mod store;

use axum::{
    Router,
    routing::{get, post, put},
};
use tower_http::trace::TraceLayer;

use crate::services::ledger_service::LedgerService;

/// Build the HTTP router.
///
/// | Method | Path | Handler |
/// |--------|------|---------|
/// | POST | /account/create | `create_account` |
/// | PUT | /account/withdraw | `withdraw` |
/// | PUT | /account/deposit | `deposit` |
/// | POST | /account/transfer | `transfer` |
/// | GET | /account/{id} | `get_account` |
/// | GET | /health | `health_check` |
pub fn app(ledger: LedgerService) -> Router {
    Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/account/create", post(handlers::accounts::create_account))
        .route("/account/withdraw", put(handlers::accounts::withdraw))
        .route("/account/deposit", put(handlers::accounts::deposit))
        .route("/account/transfer", post(handlers::accounts::transfer))
        .route("/account/{id}", get(handlers::accounts::get_account))
        // Add distributed tracing middleware for observability
        .layer(TraceLayer::new_for_http())
        // Share the ledger with all handlers via State extraction
        .with_state(ledger)
}
