//! HTTP request handlers (route handlers).
//!
//! Each handler is an async function that:
//! 1. Receives HTTP request data (query parameters, URL params)
//! 2. Calls the ledger service
//! 3. Returns HTTP response (JSON, status code)

/// Account management endpoints
pub mod accounts;
/// Liveness endpoint
pub mod health;
/// Query parameter extraction
pub mod params;
