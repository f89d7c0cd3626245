//! Entity module - SeaORM entity definitions for the ledger tables.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod distribution_group;
pub mod expense;
pub mod group_member;
pub mod monthly_override;
pub mod payment;

// Re-export specific types to avoid conflicts
pub use distribution_group::{
    Column as DistributionGroupColumn, Entity as DistributionGroup,
    Model as DistributionGroupModel,
};
pub use expense::{Column as ExpenseColumn, Entity as Expense, Model as ExpenseModel};
pub use group_member::{
    Column as GroupMemberColumn, Entity as GroupMember, Model as GroupMemberModel,
};
pub use monthly_override::{
    Column as MonthlyOverrideColumn, Entity as MonthlyOverride, Model as MonthlyOverrideModel,
};
pub use payment::{Column as PaymentColumn, Entity as Payment, Model as PaymentModel};
