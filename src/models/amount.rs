//! Validated monetary amount.

use std::fmt;

use rust_decimal::Decimal;

use crate::services::error::LedgerError;

/// A strictly positive, exact decimal amount.
///
/// Every amount entering the ledger goes through [`Amount::new`], so zero and
/// negative values are rejected before any store access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Amount(Decimal);

impl Amount {
    /// # Errors
    ///
    /// `InvalidArgument` if `value <= 0`.
    pub fn new(value: Decimal) -> Result<Self, LedgerError> {
        if value <= Decimal::ZERO {
            return Err(LedgerError::InvalidArgument(format!(
                "Amount must be positive: {value}"
            )));
        }
        Ok(Self(value))
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
