//! Monthly override table - Per-month amounts that replace an expense's stored amount.
//!
//! There is at most one override per (expense, month, year); setting it again
//! replaces the amount. Overrides never touch other months.

use crate::{
    core::{expense::get_expense, frequency::Frequency, period::Period, positive_amount},
    entities::{MonthlyOverride, monthly_override},
    errors::{Error, Result},
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use tracing::{info, instrument};

async fn find_override<C>(
    db: &C,
    expense_id: i64,
    period: Period,
) -> Result<Option<monthly_override::Model>>
where
    C: ConnectionTrait,
{
    MonthlyOverride::find()
        .filter(monthly_override::Column::ExpenseId.eq(expense_id))
        .filter(monthly_override::Column::Month.eq(period.month_number()))
        .filter(monthly_override::Column::Year.eq(period.year()))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Sets the amount of an expense for one month, replacing any previous override.
///
/// The amount must be positive and the expense must exist and be active.
#[instrument(skip(db))]
pub async fn set_override(
    db: &DatabaseConnection,
    expense_id: i64,
    period: Period,
    amount: Decimal,
) -> Result<monthly_override::Model> {
    let amount = positive_amount(amount, "Override amount")?;

    let txn = db.begin().await?;

    let expense = get_expense(&txn, expense_id)
        .await?
        .ok_or_else(|| Error::validation(format!("Expense {expense_id} does not exist")))?;
    if !expense.active {
        return Err(Error::validation(format!(
            "Expense '{}' is no longer active",
            expense.concept
        )));
    }

    let now = Utc::now();
    let result = match find_override(&txn, expense_id, period).await? {
        Some(existing) => {
            let mut active: monthly_override::ActiveModel = existing.into();
            active.amount = Set(amount);
            active.updated_at = Set(now);
            active.update(&txn).await?
        }
        None => {
            monthly_override::ActiveModel {
                expense_id: Set(expense_id),
                month: Set(period.month_number()),
                year: Set(period.year()),
                amount: Set(amount),
                updated_at: Set(now),
                ..Default::default()
            }
            .insert(&txn)
            .await?
        }
    };

    txn.commit().await?;

    info!(
        "Set {} amount of '{}' to {}",
        period, expense.concept, result.amount
    );
    Ok(result)
}

/// The override of an expense for a month, if any.
pub async fn get_override(
    db: &DatabaseConnection,
    expense_id: i64,
    period: Period,
) -> Result<Option<monthly_override::Model>> {
    find_override(db, expense_id, period).await
}

/// All overrides set for a month, ordered by expense.
pub async fn list_overrides<C>(db: &C, period: Period) -> Result<Vec<monthly_override::Model>>
where
    C: ConnectionTrait,
{
    MonthlyOverride::find()
        .filter(monthly_override::Column::Month.eq(period.month_number()))
        .filter(monthly_override::Column::Year.eq(period.year()))
        .order_by_asc(monthly_override::Column::ExpenseId)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Removes the override of an expense for a month. Returns whether one existed.
#[instrument(skip(db))]
pub async fn clear_override(
    db: &DatabaseConnection,
    expense_id: i64,
    period: Period,
) -> Result<bool> {
    let result = MonthlyOverride::delete_many()
        .filter(monthly_override::Column::ExpenseId.eq(expense_id))
        .filter(monthly_override::Column::Month.eq(period.month_number()))
        .filter(monthly_override::Column::Year.eq(period.year()))
        .exec(db)
        .await?;

    let cleared = result.rows_affected > 0;
    if cleared {
        info!("Cleared {} override of expense {}", period, expense_id);
    }
    Ok(cleared)
}

/// The override for the month if present, otherwise the stored amount.
pub async fn get_base_amount(
    db: &DatabaseConnection,
    expense_id: i64,
    period: Period,
) -> Result<Decimal> {
    let expense = get_expense(db, expense_id)
        .await?
        .ok_or(Error::ExpenseNotFound { id: expense_id })?;

    Ok(find_override(db, expense_id, period)
        .await?
        .map_or(expense.total_amount, |o| o.amount))
}

/// The base amount normalized to the month by the expense's frequency.
///
/// For monthly expenses this is the base amount itself.
pub async fn get_effective_amount(
    db: &DatabaseConnection,
    expense_id: i64,
    period: Period,
) -> Result<Decimal> {
    let expense = get_expense(db, expense_id)
        .await?
        .ok_or(Error::ExpenseNotFound { id: expense_id })?;
    let base = get_base_amount(db, expense_id, period).await?;

    Ok(Frequency::from_stored(&expense.frequency).monthly_amount(base, period))
}
