//! Data models for the ledger.
//!
//! This module contains the account and user records, the validated amount
//! type, and the request/response shapes of the HTTP API.

/// Account model, identifiers and API types
pub mod account;
/// Positive decimal amount
pub mod amount;
/// Owning user model and email validation
pub mod user;
