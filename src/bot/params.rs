//! Turns the raw values Discord hands to commands into ledger types.

use crate::{
    config::LedgerSettings,
    core::{
        expense,
        group::{self, Group},
        period::Period,
        split::SplitRule,
    },
    entities::ExpenseModel,
    errors::{Error, Result},
};
use rust_decimal::{Decimal, prelude::FromPrimitive};
use sea_orm::DatabaseConnection;

/// Converts a Discord number option into a cent-rounded amount.
pub fn parse_amount(amount: f64) -> Result<Decimal> {
    if !amount.is_finite() {
        return Err(Error::validation("Amount must be a valid number"));
    }
    Decimal::from_f64(amount)
        .map(|d| d.round_dp(2))
        .ok_or_else(|| Error::validation(format!("Amount {amount} is out of range")))
}

/// The period named by optional month/year options.
///
/// Nothing given means the current month; a month alone means that month of the current year.
pub fn period_or_current(month: Option<u32>, year: Option<i32>) -> Result<Period> {
    let current = Period::current();
    match (month, year) {
        (None, None) => Ok(current),
        (Some(month), None) => Period::new(month, current.year()),
        (Some(month), Some(year)) => Period::new(month, year),
        (None, Some(_)) => Err(Error::validation("Give a month along with the year")),
    }
}

/// Builds a split rule from the optional split options of `/expense_manage`.
///
/// Returns `None` when no split option was given.
pub fn split_from_options(
    participant: Option<String>,
    fixed_amount: Option<f64>,
    percent: Option<f64>,
) -> Result<Option<SplitRule>> {
    match (participant, fixed_amount, percent) {
        (None, None, None) => Ok(None),
        (Some(participant), Some(amount), None) => Ok(Some(SplitRule::Fixed {
            participant,
            amount: parse_amount(amount)?,
        })),
        (Some(participant), None, Some(percent)) => Ok(Some(SplitRule::Percent {
            participant,
            percent: parse_amount(percent)?,
        })),
        (Some(_), Some(_), Some(_)) => Err(Error::validation(
            "Use either a fixed amount or a percentage, not both",
        )),
        (Some(_), None, None) => Err(Error::validation(
            "Give a fixed amount or a percentage for the split participant",
        )),
        (None, _, _) => Err(Error::validation(
            "Name the participant the split amount applies to",
        )),
    }
}

/// Finds the active expense a command refers to, by concept or by `#id`.
pub async fn resolve_expense(db: &DatabaseConnection, reference: &str) -> Result<ExpenseModel> {
    if let Some(found) = expense::find_expense_by_concept(db, reference).await? {
        return Ok(found);
    }

    let id = reference
        .trim()
        .trim_start_matches('#')
        .parse::<i64>()
        .map_err(|_| Error::validation(format!("No active expense named '{reference}'")))?;
    expense::require_expense(db, id).await
}

/// Resolves a comma-separated list of expense references (e.g. "Electricity, Water, #4").
pub async fn resolve_expenses(
    db: &DatabaseConnection,
    references: &str,
) -> Result<Vec<ExpenseModel>> {
    let mut expenses = Vec::new();
    for reference in references.split(',').map(str::trim).filter(|r| !r.is_empty()) {
        expenses.push(resolve_expense(db, reference).await?);
    }
    if expenses.is_empty() {
        return Err(Error::validation("Name at least one expense"));
    }
    Ok(expenses)
}

/// Finds the active group a command refers to, by name or by `#id`.
pub async fn resolve_group(db: &DatabaseConnection, reference: &str) -> Result<Group> {
    if let Some(found) = group::find_group_by_name(db, reference).await? {
        return Ok(found);
    }

    let id = reference
        .trim()
        .trim_start_matches('#')
        .parse::<i64>()
        .map_err(|_| Error::validation(format!("No group named '{reference}'")))?;
    group::require_group(db, id).await
}

/// The configured participant a command acts for.
///
/// Uses the explicit name when given, otherwise the participant linked to the
/// invoking Discord user.
pub fn resolve_participant(
    settings: &LedgerSettings,
    name: Option<&str>,
    discord_id: &str,
) -> Result<String> {
    match name {
        Some(name) => settings
            .participants
            .resolve(name)
            .map(|p| p.name.clone())
            .ok_or_else(|| Error::validation(format!("'{name}' is not a participant"))),
        None => settings
            .participants
            .for_discord_user(discord_id)
            .map(|p| p.name.clone())
            .ok_or_else(|| {
                Error::validation("You are not linked to a participant; say who is paying")
            }),
    }
}
