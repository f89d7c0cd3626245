//! Expense entity - A recurring household expense shared between participants.
//!
//! Expenses are never hard-deleted: deactivation flips `active` and stamps
//! `deactivated_at` so historical payments keep their reference.

use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Expense database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "expenses")]
pub struct Model {
    /// Unique identifier for the expense
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Human-readable name (e.g., "Rent", "Electricity")
    pub concept: String,
    /// Stored amount per occurrence, before monthly overrides and frequency normalization
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub total_amount: Decimal,
    /// Billing frequency: `"monthly"`, `"weekly"`, `"biweekly"` or `"annual"`
    pub frequency: String,
    /// How the amount is divided: `"weighted"`, `"fixed"` or `"percent"`
    pub split_kind: String,
    /// Participant the `fixed`/`percent` rule refers to
    pub split_participant: Option<String>,
    /// Fixed amount or percentage for the `fixed`/`percent` rule
    #[sea_orm(column_type = "Decimal(Some((12, 2)))", nullable)]
    pub split_value: Option<Decimal>,
    /// Soft delete flag - inactive expenses stop contributing to new months
    pub active: bool,
    /// When the expense was created; it counts in full from that month on
    pub created_at: DateTimeUtc,
    /// When the expense was deactivated, if it was
    pub deactivated_at: Option<DateTimeUtc>,
}

/// Defines relationships between Expense and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One expense has many monthly overrides
    #[sea_orm(has_many = "super::monthly_override::Entity")]
    MonthlyOverrides,
    /// One expense has many payments
    #[sea_orm(has_many = "super::payment::Entity")]
    Payments,
}

impl Related<super::monthly_override::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MonthlyOverrides.def()
    }
}

impl Related<super::payment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Payments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
