//! Expense seeds from config.toml
//!
//! The `[[expenses]]` entries are inserted on startup only while the registry
//! is still empty, so editing the file later never duplicates or resurrects expenses.

use crate::{
    config::participants::Participants,
    core::{
        expense::{NewExpense, create_expense_at, list_expenses},
        frequency::Frequency,
        split::SplitRule,
    },
    errors::Result,
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{DatabaseConnection, TransactionTrait};
use serde::Deserialize;
use tracing::info;

/// Configuration for a single expense
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ExpenseSeed {
    /// Name of the expense
    pub concept: String,
    /// Amount per occurrence
    pub total_amount: Decimal,
    /// Billing frequency, monthly when omitted
    #[serde(default)]
    pub frequency: Frequency,
    /// Split rule, weighted when omitted
    #[serde(default)]
    pub split: SplitRule,
}

impl From<ExpenseSeed> for NewExpense {
    fn from(seed: ExpenseSeed) -> Self {
        Self {
            concept: seed.concept,
            total_amount: seed.total_amount,
            frequency: seed.frequency,
            split: seed.split,
        }
    }
}

/// Inserts the configured expenses if the registry has none yet.
///
/// Returns how many expenses were created. Either all seeds are inserted or none.
pub async fn seed_expenses(
    db: &DatabaseConnection,
    participants: &Participants,
    seeds: &[ExpenseSeed],
) -> Result<usize> {
    if seeds.is_empty() || !list_expenses(db, true).await?.is_empty() {
        return Ok(0);
    }

    let txn = db.begin().await?;
    let now = Utc::now();
    for seed in seeds {
        create_expense_at(&txn, participants, seed.clone().into(), now).await?;
    }
    txn.commit().await?;

    info!("Seeded {} expenses from configuration", seeds.len());
    Ok(seeds.len())
}
