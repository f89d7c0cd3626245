//! Group member entity - Links an expense to its distribution group.
//!
//! An expense belongs to at most one group, enforced by a unique index on `expense_id`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Group member database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "group_members")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// ID of the group
    pub group_id: i64,
    /// ID of the grouped expense
    pub expense_id: i64,
}

/// Defines relationships between `GroupMember` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each membership belongs to one group
    #[sea_orm(
        belongs_to = "super::distribution_group::Entity",
        from = "Column::GroupId",
        to = "super::distribution_group::Column::Id"
    )]
    DistributionGroup,
    /// Each membership refers to one expense
    #[sea_orm(
        belongs_to = "super::expense::Entity",
        from = "Column::ExpenseId",
        to = "super::expense::Column::Id"
    )]
    Expense,
}

impl Related<super::distribution_group::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DistributionGroup.def()
    }
}

impl Related<super::expense::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Expense.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
