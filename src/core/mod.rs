//! Core ledger logic, independent of the Discord layer.
//!
//! The registry, override table, distribution groups and payment ledger persist
//! through `SeaORM`; the balance calculator is a pure function over their rows.

pub mod balance;
pub mod expense;
pub mod frequency;
pub mod group;
pub mod migrate;
pub mod overrides;
pub mod payment;
pub mod period;
pub mod report;
pub mod split;

use crate::errors::{Error, Result};
use rust_decimal::Decimal;

/// Checks that `amount` is strictly positive and rounds it to cents.
pub(crate) fn positive_amount(amount: Decimal, what: &str) -> Result<Decimal> {
    let rounded = amount.round_dp(2);
    if rounded <= Decimal::ZERO {
        return Err(Error::validation(format!(
            "{what} must be greater than zero, got {amount}"
        )));
    }
    Ok(rounded)
}
