//! Distribution groups - Several expenses split as one.
//!
//! A group names one participant who pays a fixed amount toward the combined
//! monthly total of its expenses; the other participants cover the rest by
//! weight. The member expenses' own split rules are ignored while they are
//! grouped. The group's shares are spread back over its expenses, so each
//! expense keeps per-participant shares that payments are checked against.

use crate::{
    config::participants::Participants,
    core::{
        expense::require_expense,
        positive_amount,
        split::{Share, SplitRule, split_amount, split_around},
    },
    entities::{DistributionGroup, GroupMember, distribution_group, group_member},
    errors::{Error, Result},
};
use chrono::Utc;
use rust_decimal::{Decimal, RoundingStrategy};
use sea_orm::{QueryOrder, Set, SqlErr, TransactionTrait, prelude::*};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use tracing::{info, instrument, warn};

/// Input for creating a group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewGroup {
    /// Display name
    pub name: String,
    /// Optional note
    pub description: Option<String>,
    /// Participant paying the fixed amount
    pub participant: String,
    /// Amount that participant pays each month
    pub fixed_amount: Decimal,
    /// Expenses to group; at least one
    pub expense_ids: Vec<i64>,
}

/// Partial update of a group; `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupUpdate {
    /// New name
    pub name: Option<String>,
    /// New note
    pub description: Option<String>,
    /// New participant paying the fixed amount
    pub participant: Option<String>,
    /// New fixed amount
    pub fixed_amount: Option<Decimal>,
}

impl GroupUpdate {
    /// Whether the update changes nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.participant.is_none()
            && self.fixed_amount.is_none()
    }
}

/// A group with the ids of its member expenses.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Group {
    /// The group row
    pub group: distribution_group::Model,
    /// Member expenses, in the order they were added
    pub expense_ids: Vec<i64>,
}

fn clean_name(name: &str) -> Result<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(Error::validation("Group name cannot be empty"));
    }
    Ok(trimmed.to_string())
}

fn canonical_participant(participants: &Participants, name: &str) -> Result<String> {
    participants
        .resolve(name)
        .map(|p| p.name.clone())
        .ok_or_else(|| Error::validation(format!("Unknown participant '{name}'")))
}

async fn add_member<C>(db: &C, group_id: i64, expense_id: i64) -> Result<group_member::Model>
where
    C: ConnectionTrait,
{
    let expense = require_expense(db, expense_id).await?;
    if !expense.active {
        return Err(Error::validation(format!(
            "Expense '{}' is no longer active",
            expense.concept
        )));
    }

    let inserted = group_member::ActiveModel {
        group_id: Set(group_id),
        expense_id: Set(expense_id),
        ..Default::default()
    }
    .insert(db)
    .await;

    match inserted {
        Ok(member) => Ok(member),
        Err(err) => match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => Err(Error::validation(format!(
                "Expense '{}' already belongs to a group",
                expense.concept
            ))),
            _ => Err(err.into()),
        },
    }
}

async fn member_ids<C>(db: &C, group_id: i64) -> Result<Vec<i64>>
where
    C: ConnectionTrait,
{
    Ok(GroupMember::find()
        .filter(group_member::Column::GroupId.eq(group_id))
        .order_by_asc(group_member::Column::Id)
        .all(db)
        .await?
        .into_iter()
        .map(|m| m.expense_id)
        .collect())
}

/// Creates a group and moves the given expenses into it, all or nothing.
///
/// # Errors
/// [`Error::Validation`] for a blank name, an unknown participant, a
/// non-positive fixed amount, no expenses, or an expense that is inactive or
/// already grouped. [`Error::ExpenseNotFound`] for an unknown expense.
#[instrument(skip(db, participants))]
pub async fn create_group(
    db: &DatabaseConnection,
    participants: &Participants,
    new: NewGroup,
) -> Result<Group> {
    let name = clean_name(&new.name)?;
    let participant = canonical_participant(participants, &new.participant)?;
    let fixed_amount = positive_amount(new.fixed_amount, "Fixed amount")?;

    let mut seen = HashSet::new();
    let mut expense_ids = new.expense_ids;
    expense_ids.retain(|id| seen.insert(*id));
    if expense_ids.is_empty() {
        return Err(Error::validation("A group needs at least one expense"));
    }

    let txn = db.begin().await?;

    let group = distribution_group::ActiveModel {
        name: Set(name),
        description: Set(new.description.filter(|d| !d.trim().is_empty())),
        participant: Set(participant),
        fixed_amount: Set(fixed_amount),
        active: Set(true),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    for expense_id in &expense_ids {
        add_member(&txn, group.id, *expense_id).await?;
    }

    txn.commit().await?;

    info!(
        "Created group {} '{}' with {} expenses, {} pays {}",
        group.id,
        group.name,
        expense_ids.len(),
        group.participant,
        group.fixed_amount
    );
    Ok(Group { group, expense_ids })
}

/// Finds an active group by id.
pub async fn get_group<C>(db: &C, group_id: i64) -> Result<Option<Group>>
where
    C: ConnectionTrait,
{
    let Some(group) = DistributionGroup::find_by_id(group_id)
        .filter(distribution_group::Column::Active.eq(true))
        .one(db)
        .await?
    else {
        return Ok(None);
    };
    let expense_ids = member_ids(db, group.id).await?;
    Ok(Some(Group { group, expense_ids }))
}

/// Like [`get_group`], but an unknown or deleted group is an [`Error::GroupNotFound`].
pub async fn require_group<C>(db: &C, group_id: i64) -> Result<Group>
where
    C: ConnectionTrait,
{
    get_group(db, group_id)
        .await?
        .ok_or(Error::GroupNotFound { id: group_id })
}

/// Active groups ordered by name, with their members.
pub async fn list_groups<C>(db: &C) -> Result<Vec<Group>>
where
    C: ConnectionTrait,
{
    let groups = DistributionGroup::find()
        .filter(distribution_group::Column::Active.eq(true))
        .order_by_asc(distribution_group::Column::Name)
        .all(db)
        .await?;

    let mut members: HashMap<i64, Vec<i64>> = HashMap::new();
    for member in GroupMember::find()
        .order_by_asc(group_member::Column::Id)
        .all(db)
        .await?
    {
        members
            .entry(member.group_id)
            .or_default()
            .push(member.expense_id);
    }

    Ok(groups
        .into_iter()
        .map(|group| {
            let expense_ids = members.remove(&group.id).unwrap_or_default();
            Group { group, expense_ids }
        })
        .collect())
}

/// Finds an active group by name, ignoring case and surrounding whitespace.
pub async fn find_group_by_name(db: &DatabaseConnection, name: &str) -> Result<Option<Group>> {
    let wanted = name.trim().to_lowercase();
    Ok(list_groups(db)
        .await?
        .into_iter()
        .find(|g| g.group.name.to_lowercase() == wanted))
}

/// Applies a partial update to a group.
#[instrument(skip(db, participants))]
pub async fn update_group(
    db: &DatabaseConnection,
    participants: &Participants,
    group_id: i64,
    update: GroupUpdate,
) -> Result<Group> {
    let Group { group, expense_ids } = require_group(db, group_id).await?;
    if update.is_empty() {
        return Ok(Group { group, expense_ids });
    }

    let mut active: distribution_group::ActiveModel = group.into();
    if let Some(name) = update.name {
        active.name = Set(clean_name(&name)?);
    }
    if let Some(description) = update.description {
        let description = description.trim();
        active.description = Set((!description.is_empty()).then(|| description.to_string()));
    }
    if let Some(participant) = update.participant {
        active.participant = Set(canonical_participant(participants, &participant)?);
    }
    if let Some(amount) = update.fixed_amount {
        active.fixed_amount = Set(positive_amount(amount, "Fixed amount")?);
    }

    let group = active.update(db).await?;
    info!("Updated group {} '{}'", group.id, group.name);
    Ok(Group { group, expense_ids })
}

/// Adds an active, ungrouped expense to a group.
#[instrument(skip(db))]
pub async fn add_expense_to_group(
    db: &DatabaseConnection,
    group_id: i64,
    expense_id: i64,
) -> Result<Group> {
    require_group(db, group_id).await?;
    add_member(db, group_id, expense_id).await?;
    info!("Added expense {} to group {}", expense_id, group_id);
    require_group(db, group_id).await
}

/// Takes an expense out of a group; it goes back to its own split rule.
/// Returns whether it was a member.
#[instrument(skip(db))]
pub async fn remove_expense_from_group(
    db: &DatabaseConnection,
    group_id: i64,
    expense_id: i64,
) -> Result<bool> {
    require_group(db, group_id).await?;
    let result = GroupMember::delete_many()
        .filter(group_member::Column::GroupId.eq(group_id))
        .filter(group_member::Column::ExpenseId.eq(expense_id))
        .exec(db)
        .await?;

    let removed = result.rows_affected > 0;
    if removed {
        info!("Removed expense {} from group {}", expense_id, group_id);
    }
    Ok(removed)
}

/// Deletes a group: its expenses are released and the group is kept inactive.
#[instrument(skip(db))]
pub async fn delete_group(
    db: &DatabaseConnection,
    group_id: i64,
) -> Result<distribution_group::Model> {
    let txn = db.begin().await?;
    let Group { group, .. } = require_group(&txn, group_id).await?;

    GroupMember::delete_many()
        .filter(group_member::Column::GroupId.eq(group_id))
        .exec(&txn)
        .await?;
    let mut active: distribution_group::ActiveModel = group.into();
    active.active = Set(false);
    let group = active.update(&txn).await?;

    txn.commit().await?;

    info!("Deleted group {} '{}'", group.id, group.name);
    Ok(group)
}

/// Splits the monthly amounts of a group's expenses.
///
/// `participant` pays `fixed_amount` (capped at the combined total), spread
/// over the expenses in proportion to their amounts; every expense's remaining
/// part is split by weight among the others. Returns one share list per amount,
/// each summing exactly to its amount.
#[must_use]
pub fn split_group(
    participant: &str,
    fixed_amount: Decimal,
    amounts: &[Decimal],
    participants: &Participants,
) -> Vec<Vec<Share>> {
    let Some(chosen) = participants.resolve(participant) else {
        warn!(
            "Group refers to unknown participant '{}', using weighted split",
            participant
        );
        return amounts
            .iter()
            .map(|amount| split_amount(*amount, &SplitRule::Weighted, participants))
            .collect();
    };

    let total: Decimal = amounts.iter().copied().sum();
    let fixed = fixed_amount.min(total);

    let mut portions: Vec<Decimal> = amounts
        .iter()
        .map(|amount| {
            if total.is_zero() {
                Decimal::ZERO
            } else {
                (fixed * *amount / total).round_dp_with_strategy(2, RoundingStrategy::ToZero)
            }
        })
        .collect();

    // Truncation leaves a few cents of the fixed amount unassigned
    let mut left = fixed - portions.iter().copied().sum::<Decimal>();
    for (portion, amount) in portions.iter_mut().zip(amounts) {
        if left <= Decimal::ZERO {
            break;
        }
        let room = (*amount - *portion).min(left);
        *portion += room;
        left -= room;
    }

    amounts
        .iter()
        .zip(portions)
        .map(|(amount, portion)| split_around(*amount, chosen, portion, participants))
        .collect()
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::{core::expense::deactivate_expense, test_utils::*};
    use rust_decimal_macros::dec;

    fn new_group(name: &str, participant: &str, fixed: Decimal, ids: Vec<i64>) -> NewGroup {
        NewGroup {
            name: name.to_string(),
            description: None,
            participant: participant.to_string(),
            fixed_amount: fixed,
            expense_ids: ids,
        }
    }

    fn totals(split: &[Vec<Share>], participant: &str) -> Decimal {
        split
            .iter()
            .flatten()
            .filter(|s| s.participant == participant)
            .map(|s| s.amount)
            .sum()
    }

    #[test]
    fn test_split_group_fixed_amount_across_expenses() {
        let amounts = [dec!(120.00), dec!(60.00)];
        let split = split_group("Ben", dec!(100.00), &amounts, &test_participants());

        assert_eq!(totals(&split, "Ben"), dec!(100.00));
        assert_eq!(totals(&split, "Ana"), dec!(80.00));
        for (shares, amount) in split.iter().zip(amounts) {
            let sum: Decimal = shares.iter().map(|s| s.amount).sum();
            assert_eq!(sum, amount);
        }
        // 100 spread 2:1 over 120 and 60, the truncated cent lands on the first expense
        assert_eq!(split[0][1].amount, dec!(66.67));
        assert_eq!(split[1][1].amount, dec!(33.33));
        assert_eq!(split[0][0].amount, dec!(53.33));
        assert_eq!(split[1][0].amount, dec!(26.67));
    }

    #[test]
    fn test_split_group_caps_fixed_amount_at_total() {
        let split = split_group(
            "Ana",
            dec!(500.00),
            &[dec!(30.00), dec!(20.00)],
            &test_participants(),
        );
        assert_eq!(totals(&split, "Ana"), dec!(50.00));
        assert_eq!(totals(&split, "Ben"), dec!(0));
    }

    #[test]
    fn test_split_group_unknown_participant_uses_weights() {
        let split = split_group("Carla", dec!(10.00), &[dec!(40.00)], &test_participants());
        assert_eq!(totals(&split, "Ana"), dec!(20.00));
        assert_eq!(totals(&split, "Ben"), dec!(20.00));
    }

    #[tokio::test]
    async fn test_create_and_list_groups() -> Result<()> {
        let db = setup_test_db().await?;
        let electricity = create_test_expense(&db, "Electricity", dec!(120.00)).await?;
        let water = create_test_expense(&db, "Water", dec!(60.00)).await?;

        let created = create_group(
            &db,
            &test_participants(),
            new_group(" Utilities ", "ben", dec!(100), vec![electricity.id, water.id]),
        )
        .await?;
        assert_eq!(created.group.name, "Utilities");
        assert_eq!(created.group.participant, "Ben");
        assert_eq!(created.group.fixed_amount, dec!(100.00));
        assert_eq!(created.expense_ids, vec![electricity.id, water.id]);

        let groups = list_groups(&db).await?;
        assert_eq!(groups, vec![created.clone()]);
        let found = find_group_by_name(&db, "utilities").await?.unwrap();
        assert_eq!(found.group.id, created.group.id);
        Ok(())
    }

    #[tokio::test]
    async fn test_create_group_validation() -> Result<()> {
        let db = setup_test_db().await?;
        let participants = test_participants();
        let rent = create_test_expense(&db, "Rent", dec!(600.00)).await?;
        let old = create_test_expense(&db, "Old", dec!(10.00)).await?;
        deactivate_expense(&db, old.id).await?;

        let cases = [
            new_group(" ", "Ana", dec!(10), vec![rent.id]),
            new_group("G", "Carla", dec!(10), vec![rent.id]),
            new_group("G", "Ana", dec!(0), vec![rent.id]),
            new_group("G", "Ana", dec!(10), Vec::new()),
            new_group("G", "Ana", dec!(10), vec![rent.id, old.id]),
        ];
        for case in cases {
            let result = create_group(&db, &participants, case).await;
            assert!(matches!(result, Err(Error::Validation { .. })));
        }

        let missing =
            create_group(&db, &participants, new_group("G", "Ana", dec!(10), vec![99])).await;
        assert!(matches!(missing, Err(Error::ExpenseNotFound { id: 99 })));

        // Failed creations leave nothing behind
        assert!(list_groups(&db).await?.is_empty());
        assert!(GroupMember::find().all(&db).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_expense_belongs_to_one_group() -> Result<()> {
        let db = setup_test_db().await?;
        let participants = test_participants();
        let rent = create_test_expense(&db, "Rent", dec!(600.00)).await?;
        let water = create_test_expense(&db, "Water", dec!(60.00)).await?;

        let first =
            create_group(&db, &participants, new_group("A", "Ana", dec!(10), vec![rent.id])).await?;
        let second =
            create_group(&db, &participants, new_group("B", "Ana", dec!(10), vec![water.id]))
                .await?;

        let moved = add_expense_to_group(&db, second.group.id, rent.id).await;
        assert!(matches!(moved, Err(Error::Validation { .. })));
        assert_eq!(require_group(&db, first.group.id).await?.expense_ids, vec![rent.id]);
        Ok(())
    }

    #[tokio::test]
    async fn test_add_remove_and_delete() -> Result<()> {
        let db = setup_test_db().await?;
        let participants = test_participants();
        let rent = create_test_expense(&db, "Rent", dec!(600.00)).await?;
        let water = create_test_expense(&db, "Water", dec!(60.00)).await?;

        let group = create_group(
            &db,
            &participants,
            new_group("Home", "Ana", dec!(200), vec![rent.id]),
        )
        .await?;
        let id = group.group.id;

        let grown = add_expense_to_group(&db, id, water.id).await?;
        assert_eq!(grown.expense_ids, vec![rent.id, water.id]);

        assert!(remove_expense_from_group(&db, id, rent.id).await?);
        assert!(!remove_expense_from_group(&db, id, rent.id).await?);
        assert_eq!(require_group(&db, id).await?.expense_ids, vec![water.id]);

        let updated = update_group(
            &db,
            &participants,
            id,
            GroupUpdate {
                participant: Some("ben".to_string()),
                fixed_amount: Some(dec!(25)),
                ..Default::default()
            },
        )
        .await?;
        assert_eq!(updated.group.participant, "Ben");
        assert_eq!(updated.group.fixed_amount, dec!(25.00));

        let deleted = delete_group(&db, id).await?;
        assert!(!deleted.active);
        assert!(get_group(&db, id).await?.is_none());
        assert!(matches!(
            delete_group(&db, id).await,
            Err(Error::GroupNotFound { .. })
        ));

        // Released expenses can be grouped again
        create_group(
            &db,
            &participants,
            new_group("Again", "Ana", dec!(5), vec![water.id]),
        )
        .await?;
        Ok(())
    }
}
