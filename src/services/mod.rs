//! Business logic services.
//!
//! Services contain core business logic separated from HTTP handlers.
//! They validate input, open units of work and apply balance rules.

pub mod error;
pub mod ledger_service;
