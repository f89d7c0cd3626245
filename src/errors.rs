//! Unified error types for the ledger.
//!
//! Validation, lookup and duplicate-payment failures are non-fatal and meant to be
//! shown back to the user. Storage failures are passed through untouched.

use crate::core::period::Period;
use thiserror::Error;

/// All errors produced by the ledger, its configuration and the bot layer.
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed or out-of-range input
    #[error("Validation error: {message}")]
    Validation {
        /// What was wrong with the input
        message: String,
    },

    /// Reference to an expense that does not exist
    #[error("Expense not found: {id}")]
    ExpenseNotFound {
        /// The unknown expense id
        id: i64,
    },

    /// Reference to a distribution group that does not exist or was deleted
    #[error("Distribution group not found: {id}")]
    GroupNotFound {
        /// The unknown group id
        id: i64,
    },

    /// The payer already paid this expense for this period
    #[error("{payer} already paid expense {expense_id} for {period}")]
    DuplicatePayment {
        /// Expense the payment was for
        expense_id: i64,
        /// Month the payment was for
        period: Period,
        /// Participant who tried to pay again
        payer: String,
    },

    /// The storage backend failed
    #[error("Storage error: {0}")]
    Storage(#[from] sea_orm::DbErr),

    /// Configuration could not be loaded or is inconsistent
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the problem
        message: String,
    },

    /// I/O failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A required environment variable is missing
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    /// Writing into a message buffer failed
    #[error("Formatting error: {0}")]
    Fmt(#[from] std::fmt::Error),

    /// Serenity/Poise framework error
    #[error("Serenity/Poise framework error: {0}")]
    Framework(Box<poise::serenity_prelude::Error>),
}

impl Error {
    /// Shorthand for building a [`Error::Validation`].
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }
}

impl From<poise::serenity_prelude::Error> for Error {
    fn from(value: poise::serenity_prelude::Error) -> Self {
        Self::Framework(Box::new(value))
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
