//! Application configuration loaded from `config.toml`.
//!
//! ```toml
//! [ledger]
//! payment_tolerance = 0.01
//!
//! [[participants]]
//! name = "Ana"
//! discord_id = "123456789012345678"
//!
//! [[expenses]]
//! concept = "Rent"
//! total_amount = 600.00
//! ```
//!
//! The file path can be overridden with `LEDGER_CONFIG`. Without a file the
//! defaults apply: two equal participants and no seeded expenses.

/// Database configuration and connection management
pub mod database;

/// Expense seeds from config.toml
pub mod expenses;

/// Participants sharing the expenses
pub mod participants;

use crate::errors::{Error, Result};
use expenses::ExpenseSeed;
use participants::{Participant, Participants};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info};

/// Path used when `LEDGER_CONFIG` is not set.
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// The `[ledger]` table.
#[derive(Debug, Clone, Deserialize)]
pub struct LedgerSection {
    /// Largest accepted difference between a payment and the expected share
    #[serde(default = "default_tolerance")]
    pub payment_tolerance: Decimal,
}

impl Default for LedgerSection {
    fn default() -> Self {
        Self {
            payment_tolerance: default_tolerance(),
        }
    }
}

fn default_tolerance() -> Decimal {
    Decimal::new(1, 2)
}

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Ledger-wide settings
    #[serde(default)]
    pub ledger: LedgerSection,
    /// Participants in split order; the first one receives rounding remainders
    #[serde(default)]
    pub participants: Vec<Participant>,
    /// Expenses inserted when the registry is empty
    #[serde(default)]
    pub expenses: Vec<ExpenseSeed>,
}

/// Validated settings the ledger operations need.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerSettings {
    /// Participants sharing the expenses
    pub participants: Participants,
    /// Largest accepted difference between a payment and the expected share
    pub payment_tolerance: Decimal,
}

impl Default for LedgerSettings {
    fn default() -> Self {
        Self {
            participants: Participants::default(),
            payment_tolerance: default_tolerance(),
        }
    }
}

impl AppConfig {
    /// Validates the participants and tolerance into [`LedgerSettings`].
    ///
    /// An empty participant list means the default pair.
    ///
    /// # Errors
    /// Returns [`Error::Config`] for invalid participants or a negative tolerance.
    pub fn settings(&self) -> Result<LedgerSettings> {
        if self.ledger.payment_tolerance < Decimal::ZERO {
            return Err(Error::Config {
                message: "payment_tolerance cannot be negative".to_string(),
            });
        }

        let participants = if self.participants.is_empty() {
            Participants::default()
        } else {
            Participants::new(self.participants.clone())?
        };

        Ok(LedgerSettings {
            participants,
            payment_tolerance: self.ledger.payment_tolerance,
        })
    }
}

/// Loads the configuration from a TOML file
///
/// # Errors
/// Returns an error if the file cannot be read or is not valid configuration.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let path_ref = path.as_ref();
    debug!("Loading configuration from {:?}", path_ref);
    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read config file {}: {e}", path_ref.display()),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse {}: {e}", path_ref.display()),
    })
}

/// Loads the configuration from `LEDGER_CONFIG` or `./config.toml`.
///
/// A missing file yields the defaults; an unreadable or invalid one is an error.
pub fn load_default_config() -> Result<AppConfig> {
    let path = std::env::var("LEDGER_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    if Path::new(&path).exists() {
        load_config(&path)
    } else {
        info!("No configuration file at {}, using defaults", path);
        Ok(AppConfig::default())
    }
}
