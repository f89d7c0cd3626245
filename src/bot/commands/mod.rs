//! Discord command implementations organized by category.

#![allow(clippy::too_long_first_doc_paragraph)]

/// Balance, report and history commands
pub mod balance;

/// Expense registry and monthly amount commands
pub mod expense;

/// General utility commands
pub mod general;

/// Distribution group commands
pub mod group;

/// Payment commands
pub mod payment;

// Export commands
pub use balance::*;
pub use expense::*;
pub use general::*;
pub use group::*;
pub use payment::*;
