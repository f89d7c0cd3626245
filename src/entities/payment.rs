//! Payment entity - One participant paying their share of an expense for a month.
//!
//! Payments are append-only. A unique index on
//! (`expense_id`, `month`, `year`, `payer`) guarantees a share is paid at most once.
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Payment database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "payments")]
pub struct Model {
    /// Unique identifier for the payment
    #[sea_orm(primary_key)]
    pub id: i64,
    /// ID of the expense this payment settles
    pub expense_id: i64,
    /// Month number, 1-12
    pub month: i32,
    /// Calendar year
    pub year: i32,
    /// Name of the participant who paid
    pub payer: String,
    /// Amount handed over
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub amount_paid: Decimal,
    /// When the payment was recorded
    pub paid_at: DateTimeUtc,
}

/// Defines relationships between Payment and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each payment belongs to one expense
    #[sea_orm(
        belongs_to = "super::expense::Entity",
        from = "Column::ExpenseId",
        to = "super::expense::Column::Id"
    )]
    Expense,
}

impl Related<super::expense::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Expense.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
