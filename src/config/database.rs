//! Database configuration module for `HouseLedger`.
//!
//! This module handles `SQLite` database connection and table creation using `SeaORM`.
//! Tables are generated from the entity definitions with `Schema::create_table_from_entity`,
//! plus the unique indexes the ledger relies on: one override per expense and month,
//! one payment per expense, month and payer, and at most one group per expense.

use crate::entities::{
    DistributionGroup, Expense, GroupMember, GroupMemberColumn, MonthlyOverride,
    MonthlyOverrideColumn, Payment, PaymentColumn,
};
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema, sea_query::Index};
use tracing::info;

/// Database used when `DATABASE_URL` is not set.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://data/house_ledger.sqlite?mode=rwc";

/// Gets the database URL from environment variable or returns default `SQLite` path.
#[must_use]
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string())
}

/// Establishes a connection to the database named by `DATABASE_URL`.
///
/// Falls back to a local `SQLite` file if no environment variable is set.
pub async fn create_connection() -> Result<DatabaseConnection> {
    connect(&get_database_url()).await
}

/// Establishes a connection to the given database URL.
pub async fn connect(database_url: &str) -> Result<DatabaseConnection> {
    let db = Database::connect(database_url).await?;
    info!("Connected to database");
    Ok(db)
}

/// Creates all ledger tables and indexes that do not exist yet.
///
/// Safe to call on every startup.
pub async fn create_tables<C>(db: &C) -> Result<()>
where
    C: ConnectionTrait,
{
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let expense_table = schema
        .create_table_from_entity(Expense)
        .if_not_exists()
        .to_owned();
    let override_table = schema
        .create_table_from_entity(MonthlyOverride)
        .if_not_exists()
        .to_owned();
    let payment_table = schema
        .create_table_from_entity(Payment)
        .if_not_exists()
        .to_owned();

    let group_table = schema
        .create_table_from_entity(DistributionGroup)
        .if_not_exists()
        .to_owned();
    let member_table = schema
        .create_table_from_entity(GroupMember)
        .if_not_exists()
        .to_owned();

    db.execute(builder.build(&expense_table)).await?;
    db.execute(builder.build(&override_table)).await?;
    db.execute(builder.build(&payment_table)).await?;
    db.execute(builder.build(&group_table)).await?;
    db.execute(builder.build(&member_table)).await?;

    let override_index = Index::create()
        .name("idx_monthly_overrides_expense_period")
        .table(MonthlyOverride)
        .col(MonthlyOverrideColumn::ExpenseId)
        .col(MonthlyOverrideColumn::Month)
        .col(MonthlyOverrideColumn::Year)
        .unique()
        .if_not_exists()
        .to_owned();
    let payment_index = Index::create()
        .name("idx_payments_expense_period_payer")
        .table(Payment)
        .col(PaymentColumn::ExpenseId)
        .col(PaymentColumn::Month)
        .col(PaymentColumn::Year)
        .col(PaymentColumn::Payer)
        .unique()
        .if_not_exists()
        .to_owned();

    let member_index = Index::create()
        .name("idx_group_members_expense")
        .table(GroupMember)
        .col(GroupMemberColumn::ExpenseId)
        .unique()
        .if_not_exists()
        .to_owned();

    db.execute(builder.build(&override_index)).await?;
    db.execute(builder.build(&payment_index)).await?;
    db.execute(builder.build(&member_index)).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::entities::{
        DistributionGroupModel, ExpenseModel, GroupMemberModel, MonthlyOverrideModel,
        PaymentModel, payment,
    };
    use chrono::Utc;
    use rust_decimal_macros::dec;
    use sea_orm::{ActiveModelTrait, EntityTrait, QuerySelect, Set};

    #[tokio::test]
    async fn test_create_tables() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;

        let _: Vec<ExpenseModel> = Expense::find().limit(1).all(&db).await?;
        let _: Vec<MonthlyOverrideModel> = MonthlyOverride::find().limit(1).all(&db).await?;
        let _: Vec<PaymentModel> = Payment::find().limit(1).all(&db).await?;
        let _: Vec<DistributionGroupModel> = DistributionGroup::find().limit(1).all(&db).await?;
        let _: Vec<GroupMemberModel> = GroupMember::find().limit(1).all(&db).await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_create_tables_is_idempotent() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;
        create_tables(&db).await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_payment_index_rejects_duplicates() -> Result<()> {
        let db = crate::test_utils::setup_test_db().await?;
        let expense = crate::test_utils::create_test_expense(&db, "Rent", dec!(600.00)).await?;

        let row = || payment::ActiveModel {
            expense_id: Set(expense.id),
            month: Set(3),
            year: Set(2026),
            payer: Set("Ana".to_string()),
            amount_paid: Set(dec!(300.00)),
            paid_at: Set(Utc::now()),
            ..Default::default()
        };

        row().insert(&db).await?;
        let duplicate = row().insert(&db).await;
        assert!(matches!(
            duplicate.unwrap_err().sql_err(),
            Some(sea_orm::SqlErr::UniqueConstraintViolation(_))
        ));
        Ok(())
    }
}
