//! Monthly override entity - Replaces an expense's amount for one specific month.
//!
//! Used for bills that vary month to month. At most one row exists per
//! (`expense_id`, `month`, `year`), enforced by a unique index.

use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Monthly override database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "monthly_overrides")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// ID of the overridden expense
    pub expense_id: i64,
    /// Month number, 1-12
    pub month: i32,
    /// Calendar year
    pub year: i32,
    /// Amount used instead of the expense's `total_amount` for this month
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub amount: Decimal,
    /// When the override was last written
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between `MonthlyOverride` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each override belongs to one expense
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
