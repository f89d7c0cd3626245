//! Shared test utilities for `HouseLedger`.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test entities with sensible defaults.

#![allow(clippy::unwrap_used)]

use crate::{
    config::{LedgerSettings, participants::Participants},
    core::{
        expense::{NewExpense, create_expense_at},
        period::Period,
    },
    entities,
    errors::Result,
};
use chrono::{TimeZone, Utc};
use rust_decimal::Decimal;
use sea_orm::DatabaseConnection;

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Two equal participants, "Ana" (designated) and "Ben".
pub fn test_participants() -> Participants {
    Participants::equal(["Ana", "Ben"]).unwrap()
}

/// Settings with [`test_participants`] and the default tolerance of one cent.
pub fn test_settings() -> LedgerSettings {
    LedgerSettings {
        participants: test_participants(),
        ..LedgerSettings::default()
    }
}

/// Shorthand for a valid period.
pub fn period(month: u32, year: i32) -> Period {
    Period::new(month, year).unwrap()
}

/// Creates a monthly, weighted expense with sensible defaults.
///
/// # Defaults
/// * `created_at`: 2020-01-01, so it applies to every period under test
/// * `frequency`: monthly
/// * `split`: weighted
pub async fn create_test_expense(
    db: &DatabaseConnection,
    concept: &str,
    amount: Decimal,
) -> Result<entities::expense::Model> {
    let created_at = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
    create_expense_at(
        db,
        &test_participants(),
        NewExpense::monthly(concept, amount),
        created_at,
    )
    .await
}
