//! Expense registry - Handles creating, listing, updating and deactivating expenses.
//!
//! Expenses are soft-deleted only. Deactivation stamps `deactivated_at` so past
//! months that were already reconciled keep counting the expense.

use crate::{
    config::participants::Participants,
    core::{frequency::Frequency, period::Period, positive_amount, split::SplitRule},
    entities::{Expense, expense},
    errors::{Error, Result},
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{QueryOrder, Set, prelude::*};
use tracing::{info, instrument};

/// Input for registering an expense.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewExpense {
    /// Human-readable name
    pub concept: String,
    /// Amount per occurrence
    pub total_amount: Decimal,
    /// Billing frequency
    pub frequency: Frequency,
    /// How the amount is divided
    pub split: SplitRule,
}

impl NewExpense {
    /// A monthly expense split by weight.
    #[must_use]
    pub fn monthly(concept: impl Into<String>, total_amount: Decimal) -> Self {
        Self {
            concept: concept.into(),
            total_amount,
            frequency: Frequency::Monthly,
            split: SplitRule::Weighted,
        }
    }
}

/// Partial update of an expense; `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpenseUpdate {
    /// New name
    pub concept: Option<String>,
    /// New amount per occurrence
    pub total_amount: Option<Decimal>,
    /// New billing frequency
    pub frequency: Option<Frequency>,
    /// New split rule
    pub split: Option<SplitRule>,
}

impl ExpenseUpdate {
    /// Whether the update changes nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.concept.is_none()
            && self.total_amount.is_none()
            && self.frequency.is_none()
            && self.split.is_none()
    }
}

fn clean_concept(concept: &str) -> Result<String> {
    let trimmed = concept.trim();
    if trimmed.is_empty() {
        return Err(Error::validation("Expense concept cannot be empty"));
    }
    Ok(trimmed.to_string())
}

/// Registers a new active expense created now.
pub async fn create_expense(
    db: &DatabaseConnection,
    participants: &Participants,
    new: NewExpense,
) -> Result<expense::Model> {
    create_expense_at(db, participants, new, Utc::now()).await
}

/// Registers a new active expense with an explicit creation time.
///
/// The concept is trimmed and the amount rounded to cents. A split rule naming
/// an unknown participant is rejected.
#[instrument(skip(db, participants))]
pub async fn create_expense_at<C>(
    db: &C,
    participants: &Participants,
    new: NewExpense,
    created_at: DateTime<Utc>,
) -> Result<expense::Model>
where
    C: ConnectionTrait,
{
    let concept = clean_concept(&new.concept)?;
    let total_amount = positive_amount(new.total_amount, "Expense amount")?;
    let split = new.split.validated(participants)?;
    let (split_kind, split_participant, split_value) = split.to_columns();

    let expense = expense::ActiveModel {
        concept: Set(concept),
        total_amount: Set(total_amount),
        frequency: Set(new.frequency.as_str().to_string()),
        split_kind: Set(split_kind),
        split_participant: Set(split_participant),
        split_value: Set(split_value),
        active: Set(true),
        created_at: Set(created_at),
        deactivated_at: Set(None),
        ..Default::default()
    };

    let result = expense.insert(db).await?;
    info!(
        "Registered expense {} '{}' ({} {})",
        result.id, result.concept, result.total_amount, result.frequency
    );
    Ok(result)
}

/// Lists expenses in creation order, optionally including deactivated ones.
pub async fn list_expenses<C>(db: &C, include_inactive: bool) -> Result<Vec<expense::Model>>
where
    C: ConnectionTrait,
{
    let mut query = Expense::find();
    if !include_inactive {
        query = query.filter(expense::Column::Active.eq(true));
    }
    query
        .order_by_asc(expense::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Finds an expense by id, active or not.
pub async fn get_expense<C>(db: &C, expense_id: i64) -> Result<Option<expense::Model>>
where
    C: ConnectionTrait,
{
    Expense::find_by_id(expense_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Like [`get_expense`], but an unknown id is an [`Error::ExpenseNotFound`].
pub async fn require_expense<C>(db: &C, expense_id: i64) -> Result<expense::Model>
where
    C: ConnectionTrait,
{
    get_expense(db, expense_id)
        .await?
        .ok_or(Error::ExpenseNotFound { id: expense_id })
}

/// Finds an active expense by concept, ignoring case and surrounding whitespace.
pub async fn find_expense_by_concept(
    db: &DatabaseConnection,
    concept: &str,
) -> Result<Option<expense::Model>> {
    let wanted = concept.trim().to_lowercase();
    Ok(list_expenses(db, false)
        .await?
        .into_iter()
        .find(|e| e.concept.to_lowercase() == wanted))
}

/// Applies a partial update to an expense.
///
/// Applies the same validation as [`create_expense`] to every provided field.
#[instrument(skip(db, participants))]
pub async fn update_expense(
    db: &DatabaseConnection,
    participants: &Participants,
    expense_id: i64,
    update: ExpenseUpdate,
) -> Result<expense::Model> {
    let existing = require_expense(db, expense_id).await?;
    if update.is_empty() {
        return Ok(existing);
    }

    let mut active: expense::ActiveModel = existing.into();
    if let Some(concept) = update.concept {
        active.concept = Set(clean_concept(&concept)?);
    }
    if let Some(amount) = update.total_amount {
        active.total_amount = Set(positive_amount(amount, "Expense amount")?);
    }
    if let Some(frequency) = update.frequency {
        active.frequency = Set(frequency.as_str().to_string());
    }
    if let Some(split) = update.split {
        let (kind, participant, value) = split.validated(participants)?.to_columns();
        active.split_kind = Set(kind);
        active.split_participant = Set(participant);
        active.split_value = Set(value);
    }

    let result = active.update(db).await?;
    info!("Updated expense {} '{}'", result.id, result.concept);
    Ok(result)
}

/// Deactivates an expense so it stops applying to new months.
///
/// Deactivating twice keeps the original `deactivated_at`.
#[instrument(skip(db))]
pub async fn deactivate_expense(
    db: &DatabaseConnection,
    expense_id: i64,
) -> Result<expense::Model> {
    let existing = require_expense(db, expense_id).await?;
    if !existing.active {
        return Ok(existing);
    }

    let deactivated_at = existing.deactivated_at.unwrap_or_else(Utc::now);
    let mut active: expense::ActiveModel = existing.into();
    active.active = Set(false);
    active.deactivated_at = Set(Some(deactivated_at));

    let result = active.update(db).await?;
    info!("Deactivated expense {} '{}'", result.id, result.concept);
    Ok(result)
}

/// Whether an expense counts toward `period`.
///
/// Active expenses apply to every month, including months before they were
/// registered. An inactive one still applies to the months before its
/// deactivation and to any month where someone already paid it.
#[must_use]
pub fn applies_to(expense: &expense::Model, period: Period, has_payment: bool) -> bool {
    if expense.active || has_payment {
        return true;
    }
    expense
        .deactivated_at
        .is_some_and(|at| period < Period::of(&at))
}
