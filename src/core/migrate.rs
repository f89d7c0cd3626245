//! Copying a whole ledger from one database to another.
//!
//! Used to move the ledger to a new storage URL. The target must be empty;
//! rows keep their ids so payments, overrides and group memberships still point
//! at their expense.

use crate::{
    config::database::create_tables,
    entities::{
        DistributionGroup, Expense, GroupMember, MonthlyOverride, Payment, distribution_group,
        expense, group_member, monthly_override, payment,
    },
    errors::{Error, Result},
};
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, EntityTrait, IntoActiveModel, PaginatorTrait, QueryOrder,
    TransactionTrait,
};
use std::fmt;
use tracing::{info, instrument};

const CHUNK_SIZE: usize = 200;

/// Number of rows copied per table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MigrationReport {
    /// Expenses copied
    pub expenses: usize,
    /// Monthly overrides copied
    pub overrides: usize,
    /// Payments copied
    pub payments: usize,
    /// Distribution groups copied, deleted ones included
    pub groups: usize,
    /// Group memberships copied
    pub group_members: usize,
}

impl fmt::Display for MigrationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} expenses, {} overrides, {} payments, {} groups ({} memberships)",
            self.expenses, self.overrides, self.payments, self.groups, self.group_members
        )
    }
}

async fn target_is_empty(target: &DatabaseConnection) -> Result<bool> {
    Ok(Expense::find().count(target).await? == 0
        && MonthlyOverride::find().count(target).await? == 0
        && Payment::find().count(target).await? == 0
        && DistributionGroup::find().count(target).await? == 0
        && GroupMember::find().count(target).await? == 0)
}

/// Copies every expense, override, payment and group from `source` into `target`.
///
/// Tables are created on the target if needed. Nothing is written unless the
/// whole copy succeeds.
///
/// # Errors
/// Returns [`Error::Validation`] if the target already holds ledger rows.
#[instrument(skip(source, target))]
pub async fn copy_ledger(
    source: &DatabaseConnection,
    target: &DatabaseConnection,
) -> Result<MigrationReport> {
    create_tables(target).await?;
    if !target_is_empty(target).await? {
        return Err(Error::validation(
            "Target database already contains ledger data",
        ));
    }

    let expenses = Expense::find()
        .order_by_asc(expense::Column::Id)
        .all(source)
        .await?;
    let overrides = MonthlyOverride::find()
        .order_by_asc(monthly_override::Column::Id)
        .all(source)
        .await?;
    let payments = Payment::find()
        .order_by_asc(payment::Column::Id)
        .all(source)
        .await?;
    let groups = DistributionGroup::find()
        .order_by_asc(distribution_group::Column::Id)
        .all(source)
        .await?;
    let members = GroupMember::find()
        .order_by_asc(group_member::Column::Id)
        .all(source)
        .await?;

    let report = MigrationReport {
        expenses: expenses.len(),
        overrides: overrides.len(),
        payments: payments.len(),
        groups: groups.len(),
        group_members: members.len(),
    };

    let txn = target.begin().await?;

    for chunk in expenses.chunks(CHUNK_SIZE) {
        Expense::insert_many(
            chunk
                .iter()
                .cloned()
                .map(|m| m.into_active_model().reset_all()),
        )
        .exec(&txn)
        .await?;
    }
    for chunk in overrides.chunks(CHUNK_SIZE) {
        MonthlyOverride::insert_many(
            chunk
                .iter()
                .cloned()
                .map(|m| m.into_active_model().reset_all()),
        )
        .exec(&txn)
        .await?;
    }
    for chunk in payments.chunks(CHUNK_SIZE) {
        Payment::insert_many(
            chunk
                .iter()
                .cloned()
                .map(|m| m.into_active_model().reset_all()),
        )
        .exec(&txn)
        .await?;
    }

    for chunk in groups.chunks(CHUNK_SIZE) {
        DistributionGroup::insert_many(
            chunk
                .iter()
                .cloned()
                .map(|m| m.into_active_model().reset_all()),
        )
        .exec(&txn)
        .await?;
    }
    for chunk in members.chunks(CHUNK_SIZE) {
        GroupMember::insert_many(
            chunk
                .iter()
                .cloned()
                .map(|m| m.into_active_model().reset_all()),
        )
        .exec(&txn)
        .await?;
    }

    txn.commit().await?;

    info!("Copied ledger: {}", report);
    Ok(report)
}
