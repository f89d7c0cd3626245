//! Payment ledger - Records which participant paid their share of which expense, per month.
//!
//! A participant pays each expense at most once per month. The check is backed
//! by a unique index on (expense, month, year, payer), so a concurrent duplicate
//! fails on insert instead of creating a second row.

use crate::{
    config::LedgerSettings,
    core::{
        balance::monthly_balance,
        expense::{applies_to, require_expense},
        period::Period,
    },
    entities::{Payment, payment},
    errors::{Error, Result},
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{PaginatorTrait, QueryOrder, Select, Set, SqlErr, prelude::*};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{info, instrument, warn};

/// Input for recording a payment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPayment {
    /// Expense being paid
    pub expense_id: i64,
    /// Month being paid
    pub period: Period,
    /// Participant paying
    pub payer: String,
    /// Amount paid; must match the payer's share within the configured tolerance
    pub amount: Decimal,
}

/// What each payer paid in one month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PeriodTotals {
    /// The month
    pub period: Period,
    /// Sum of `amount_paid` per payer, ordered by payer name
    pub by_payer: Vec<(String, Decimal)>,
    /// Sum over all payers
    pub total: Decimal,
}

fn period_payments(expense_id: i64, period: Period) -> Select<Payment> {
    Payment::find()
        .filter(payment::Column::ExpenseId.eq(expense_id))
        .filter(payment::Column::Month.eq(period.month_number()))
        .filter(payment::Column::Year.eq(period.year()))
}

/// Whether `payer` already paid the expense for `period`.
pub async fn has_paid<C>(db: &C, expense_id: i64, period: Period, payer: &str) -> Result<bool>
where
    C: ConnectionTrait,
{
    let count = period_payments(expense_id, period)
        .filter(payment::Column::Payer.eq(payer))
        .count(db)
        .await?;
    Ok(count > 0)
}

/// The share `payer` owes for the expense in `period`, taking groups into account.
///
/// Zero when the expense does not apply to the month.
///
/// # Errors
/// [`Error::ExpenseNotFound`] for an unknown expense, [`Error::Validation`] for
/// a payer that is not a configured participant.
pub async fn expected_share<C>(
    db: &C,
    settings: &LedgerSettings,
    expense_id: i64,
    period: Period,
    payer: &str,
) -> Result<Decimal>
where
    C: ConnectionTrait,
{
    let expense = require_expense(db, expense_id).await?;
    let participant = settings
        .participants
        .resolve(payer)
        .ok_or_else(|| Error::validation(format!("'{payer}' is not a participant")))?;

    let balance = monthly_balance(db, settings, period).await?;
    Ok(balance
        .share_of(expense.id, &participant.name)
        .map_or(Decimal::ZERO, |s| s.share))
}

/// Records that a participant paid their share of an expense for a month.
///
/// # Errors
/// - [`Error::ExpenseNotFound`] if the expense does not exist
/// - [`Error::Validation`] if the payer is unknown, the expense does not apply to
///   the month, or the amount differs from the share by more than the tolerance
/// - [`Error::DuplicatePayment`] if the payer already paid it that month
#[instrument(skip(db, settings))]
pub async fn record_payment(
    db: &DatabaseConnection,
    settings: &LedgerSettings,
    new: NewPayment,
) -> Result<payment::Model> {
    let NewPayment {
        expense_id,
        period,
        payer,
        amount,
    } = new;

    let expense = require_expense(db, expense_id).await?;
    let payer = settings
        .participants
        .resolve(&payer)
        .map(|p| p.name.clone())
        .ok_or_else(|| Error::validation(format!("'{payer}' is not a participant")))?;

    if has_paid(db, expense_id, period, &payer).await? {
        return Err(Error::DuplicatePayment {
            expense_id,
            period,
            payer,
        });
    }

    let anyone_paid = period_payments(expense_id, period).count(db).await? > 0;
    if !applies_to(&expense, period, anyone_paid) {
        return Err(Error::validation(format!(
            "Expense '{}' does not apply to {}",
            expense.concept, period
        )));
    }

    let amount = amount.round_dp(2);
    if amount < Decimal::ZERO {
        return Err(Error::validation("Payment amount cannot be negative"));
    }
    let expected = expected_share(db, settings, expense_id, period, &payer).await?;
    if (amount - expected).abs() > settings.payment_tolerance {
        return Err(Error::validation(format!(
            "{payer} owes ${expected:.2} for '{}' in {period}, not ${amount:.2}",
            expense.concept
        )));
    }

    let inserted = payment::ActiveModel {
        expense_id: Set(expense_id),
        month: Set(period.month_number()),
        year: Set(period.year()),
        payer: Set(payer.clone()),
        amount_paid: Set(amount),
        paid_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await;

    match inserted {
        Ok(model) => {
            info!(
                "{} paid {} for '{}' ({})",
                model.payer, model.amount_paid, expense.concept, period
            );
            Ok(model)
        }
        Err(err) => match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => {
                warn!(
                    "Concurrent duplicate payment by {} for expense {} ({})",
                    payer, expense_id, period
                );
                Err(Error::DuplicatePayment {
                    expense_id,
                    period,
                    payer,
                })
            }
            _ => Err(err.into()),
        },
    }
}

/// All payments recorded for a month, oldest first.
pub async fn list_payments<C>(db: &C, period: Period) -> Result<Vec<payment::Model>>
where
    C: ConnectionTrait,
{
    Payment::find()
        .filter(payment::Column::Month.eq(period.month_number()))
        .filter(payment::Column::Year.eq(period.year()))
        .order_by_asc(payment::Column::PaidAt)
        .order_by_asc(payment::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Amounts paid per month and payer, oldest month first.
pub async fn payment_history(db: &DatabaseConnection) -> Result<Vec<PeriodTotals>> {
    let payments = Payment::find()
        .order_by_asc(payment::Column::Year)
        .order_by_asc(payment::Column::Month)
        .all(db)
        .await?;

    let mut by_period: BTreeMap<Period, BTreeMap<String, Decimal>> = BTreeMap::new();
    for payment in payments {
        let Ok(period) = Period::from_stored(payment.month, payment.year) else {
            warn!(
                "Skipping payment {} with invalid period {}/{}",
                payment.id, payment.month, payment.year
            );
            continue;
        };
        *by_period
            .entry(period)
            .or_default()
            .entry(payment.payer)
            .or_default() += payment.amount_paid;
    }

    Ok(by_period
        .into_iter()
        .map(|(period, payers)| {
            let total = payers.values().copied().sum();
            PeriodTotals {
                period,
                by_payer: payers.into_iter().collect(),
                total,
            }
        })
        .collect())
}
