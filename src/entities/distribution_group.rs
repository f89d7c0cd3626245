//! Distribution group entity - Several expenses split as one.
//!
//! One participant pays a fixed amount toward the combined monthly total of the
//! member expenses; the others cover the rest. Membership lives in
//! [`super::group_member`].

use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Distribution group database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "distribution_groups")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Display name (e.g., "Utilities")
    pub name: String,
    /// Free-form note
    pub description: Option<String>,
    /// Participant paying the fixed amount
    pub participant: String,
    /// Amount that participant pays each month, capped at the group total
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub fixed_amount: Decimal,
    /// Deleted groups are kept inactive
    pub active: bool,
    /// When the group was created
    pub created_at: DateTimeUtc,
}

/// Defines relationships between `DistributionGroup` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// A group has many member expenses
    #[sea_orm(has_many = "super::group_member::Entity")]
    GroupMember,
}

impl Related<super::group_member::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::GroupMember.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
