//! Balance calculator - Who owes what for a month, and what is still pending.
//!
//! [`calculate_balance`] is pure: it takes the registry, group, override and
//! payment rows and derives every figure from them. [`monthly_balance`] loads
//! those rows from the database first.

use crate::{
    config::{LedgerSettings, participants::Participants},
    core::{
        expense::{applies_to, list_expenses},
        frequency::Frequency,
        group::{Group, list_groups, split_group},
        overrides::list_overrides,
        payment::list_payments,
        period::Period,
        split::{Share, SplitRule, split_amount},
    },
    entities::{expense, monthly_override, payment},
    errors::Result,
};
use rust_decimal::Decimal;
use sea_orm::ConnectionTrait;
use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// One participant's part of one expense or group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShareStatus {
    /// Participant name
    pub participant: String,
    /// Amount owed for this expense this month
    pub share: Decimal,
    /// Whether the participant recorded a payment for it. For grouped
    /// expenses, whether they paid every expense of the group.
    pub paid: bool,
    /// Zero when paid, otherwise the share
    pub outstanding: Decimal,
}

impl ShareStatus {
    fn new(participant: String, share: Decimal, paid: bool) -> Self {
        Self {
            participant,
            share,
            paid,
            outstanding: if paid { Decimal::ZERO } else { share },
        }
    }
}

/// An expense as it stands in a given month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BalanceRow {
    /// Expense id
    pub expense_id: i64,
    /// Expense name
    pub concept: String,
    /// Billing frequency
    pub frequency: Frequency,
    /// Override for the month, or the stored amount
    pub base_amount: Decimal,
    /// Base amount normalized to the month
    pub effective_amount: Decimal,
    /// Whether the base amount comes from a monthly override
    pub overridden: bool,
    /// Distribution group splitting this expense, if any
    pub group_id: Option<i64>,
    /// One entry per participant, in configuration order
    pub shares: Vec<ShareStatus>,
}

/// A distribution group as it stands in a given month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupRow {
    /// Group id
    pub group_id: i64,
    /// Group name
    pub name: String,
    /// Participant paying the fixed amount
    pub participant: String,
    /// Configured fixed amount
    pub fixed_amount: Decimal,
    /// Member expenses that apply to the month
    pub concepts: Vec<String>,
    /// Sum of the member expenses' effective amounts
    pub total: Decimal,
    /// Per participant, the sum of their shares of the member expenses
    pub shares: Vec<ShareStatus>,
}

/// Totals of one participant for the month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParticipantSummary {
    /// Participant name
    pub participant: String,
    /// Sum of all shares
    pub total_owed: Decimal,
    /// Sum of the shares marked as paid
    pub total_paid: Decimal,
    /// `total_owed - total_paid`
    pub total_pending: Decimal,
}

/// Full balance of a month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyBalance {
    /// Month the balance is for
    pub period: Period,
    /// Applicable expenses, in creation order
    pub rows: Vec<BalanceRow>,
    /// Groups with at least one applicable expense, ordered by name
    pub groups: Vec<GroupRow>,
    /// One summary per participant, in configuration order
    pub summaries: Vec<ParticipantSummary>,
    /// Sum of the effective amounts
    pub total: Decimal,
}

impl MonthlyBalance {
    /// Summary of the named participant, ignoring case.
    #[must_use]
    pub fn summary_for(&self, participant: &str) -> Option<&ParticipantSummary> {
        let wanted = participant.trim().to_lowercase();
        self.summaries
            .iter()
            .find(|s| s.participant.to_lowercase() == wanted)
    }

    /// Share of `participant` in the expense, if the expense applies to the month.
    #[must_use]
    pub fn share_of(&self, expense_id: i64, participant: &str) -> Option<&ShareStatus> {
        self.rows
            .iter()
            .find(|r| r.expense_id == expense_id)
            .and_then(|r| r.shares.iter().find(|s| s.participant == participant))
    }

    /// Whether nobody has anything pending.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        self.summaries.iter().all(|s| s.total_pending.is_zero())
    }

    /// Total still pending across all participants.
    #[must_use]
    pub fn total_pending(&self) -> Decimal {
        self.summaries.iter().map(|s| s.total_pending).sum()
    }
}

/// Amounts of one expense in `period`: base, effective, and the split by its own rule.
#[must_use]
pub fn price_expense(
    expense: &expense::Model,
    override_amount: Option<Decimal>,
    participants: &Participants,
    period: Period,
) -> (Decimal, Decimal, Vec<Share>) {
    let base = override_amount.unwrap_or(expense.total_amount).round_dp(2);
    let effective = Frequency::from_stored(&expense.frequency)
        .monthly_amount(base, period)
        .round_dp(2);
    let shares = split_amount(effective, &SplitRule::from_model(expense), participants);
    (base, effective, shares)
}

fn in_period(month: i32, year: i32, period: Period) -> bool {
    month == period.month_number() && year == period.year()
}

/// Computes the balance of `period` from already loaded rows.
///
/// Overrides and payments for other months are ignored, as are payments by
/// payers that are not configured participants. Expenses that do not apply to
/// the month are left out. Expenses in an active group are split by the group
/// and count as paid for a participant only once that participant paid every
/// applicable expense of the group.
#[must_use]
pub fn calculate_balance(
    participants: &Participants,
    expenses: &[expense::Model],
    groups: &[Group],
    overrides: &[monthly_override::Model],
    payments: &[payment::Model],
    period: Period,
) -> MonthlyBalance {
    let override_by_expense: HashMap<i64, Decimal> = overrides
        .iter()
        .filter(|o| in_period(o.month, o.year, period))
        .map(|o| (o.expense_id, o.amount))
        .collect();

    let mut paid: HashSet<(i64, String)> = HashSet::new();
    for payment in payments.iter().filter(|p| in_period(p.month, p.year, period)) {
        if let Some(participant) = participants.resolve(&payment.payer) {
            paid.insert((payment.expense_id, participant.name.clone()));
        }
    }
    let has_payment = |expense_id: i64| paid.iter().any(|(id, _)| *id == expense_id);

    let mut rows: Vec<BalanceRow> = expenses
        .iter()
        .filter(|e| applies_to(e, period, has_payment(e.id)))
        .map(|e| {
            let override_amount = override_by_expense.get(&e.id).copied();
            let (base_amount, effective_amount, shares) =
                price_expense(e, override_amount, participants, period);
            let shares = shares
                .into_iter()
                .map(|Share { participant, amount }| {
                    let is_paid = paid.contains(&(e.id, participant.clone()));
                    ShareStatus::new(participant, amount, is_paid)
                })
                .collect();

            BalanceRow {
                expense_id: e.id,
                concept: e.concept.clone(),
                frequency: Frequency::from_stored(&e.frequency),
                base_amount,
                effective_amount,
                overridden: override_amount.is_some(),
                group_id: None,
                shares,
            }
        })
        .collect();

    let mut group_rows = Vec::new();
    for Group { group, expense_ids } in groups.iter().filter(|g| g.group.active) {
        let members: Vec<&mut BalanceRow> = rows
            .iter_mut()
            .filter(|r| r.group_id.is_none() && expense_ids.contains(&r.expense_id))
            .collect();
        if members.is_empty() {
            continue;
        }

        let fully_paid: HashSet<&str> = participants
            .iter()
            .map(|p| p.name.as_str())
            .filter(|name| {
                members
                    .iter()
                    .all(|r| paid.contains(&(r.expense_id, (*name).to_string())))
            })
            .collect();

        let amounts: Vec<Decimal> = members.iter().map(|r| r.effective_amount).collect();
        let split = split_group(&group.participant, group.fixed_amount, &amounts, participants);

        let mut concepts = Vec::with_capacity(members.len());
        let mut owed: HashMap<String, Decimal> = HashMap::new();
        for (row, shares) in members.into_iter().zip(split) {
            row.group_id = Some(group.id);
            row.shares = shares
                .into_iter()
                .map(|Share { participant, amount }| {
                    *owed.entry(participant.clone()).or_default() += amount;
                    let is_paid = fully_paid.contains(participant.as_str());
                    ShareStatus::new(participant, amount, is_paid)
                })
                .collect();
            concepts.push(row.concept.clone());
        }

        group_rows.push(GroupRow {
            group_id: group.id,
            name: group.name.clone(),
            participant: group.participant.clone(),
            fixed_amount: group.fixed_amount,
            concepts,
            total: amounts.iter().copied().sum(),
            shares: participants
                .iter()
                .map(|p| {
                    let share = owed.get(&p.name).copied().unwrap_or_default();
                    ShareStatus::new(p.name.clone(), share, fully_paid.contains(p.name.as_str()))
                })
                .collect(),
        });
    }

    let summaries = participants
        .iter()
        .map(|p| {
            let mine = rows
                .iter()
                .flat_map(|r| r.shares.iter())
                .filter(|s| s.participant == p.name);
            let (total_owed, total_paid) =
                mine.fold((Decimal::ZERO, Decimal::ZERO), |(owed, paid), s| {
                    (
                        owed + s.share,
                        if s.paid { paid + s.share } else { paid },
                    )
                });
            ParticipantSummary {
                participant: p.name.clone(),
                total_owed,
                total_paid,
                total_pending: total_owed - total_paid,
            }
        })
        .collect();

    let total = rows.iter().map(|r| r.effective_amount).sum();

    MonthlyBalance {
        period,
        rows,
        groups: group_rows,
        summaries,
        total,
    }
}

/// Loads the rows relevant to `period` and computes its balance.
pub async fn monthly_balance<C>(
    db: &C,
    settings: &LedgerSettings,
    period: Period,
) -> Result<MonthlyBalance>
where
    C: ConnectionTrait,
{
    let expenses = list_expenses(db, true).await?;
    let groups = list_groups(db).await?;
    let overrides = list_overrides(db, period).await?;
    let payments = list_payments(db, period).await?;

    Ok(calculate_balance(
        &settings.participants,
        &expenses,
        &groups,
        &overrides,
        &payments,
        period,
    ))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::{
        core::{
            expense::{NewExpense, create_expense, create_expense_at, deactivate_expense},
            group::{NewGroup, create_group},
            overrides::set_override,
            payment::{NewPayment, record_payment},
        },
        test_utils::*,
    };
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;
    use sea_orm::DatabaseConnection;

    fn row<'a>(balance: &'a MonthlyBalance, concept: &str) -> &'a BalanceRow {
        balance.rows.iter().find(|r| r.concept == concept).unwrap()
    }

    async fn pay(
        db: &DatabaseConnection,
        expense_id: i64,
        period: Period,
        payer: &str,
        amount: Decimal,
    ) -> Result<()> {
        record_payment(
            db,
            &test_settings(),
            NewPayment {
                expense_id,
                period,
                payer: payer.to_string(),
                amount,
            },
        )
        .await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_balance_with_partial_payments() -> Result<()> {
        let db = setup_test_db().await?;
        let march = period(3, 2026);
        let rent = create_test_expense(&db, "Rent", dec!(600.00)).await?;
        create_test_expense(&db, "Electricity", dec!(120.00)).await?;
        let internet = create_test_expense(&db, "Internet", dec!(60.00)).await?;

        pay(&db, rent.id, march, "Ana", dec!(300.00)).await?;
        pay(&db, internet.id, march, "Ana", dec!(30.00)).await?;

        let balance = monthly_balance(&db, &test_settings(), march).await?;
        assert_eq!(balance.total, dec!(780.00));

        let ana = balance.summary_for("Ana").unwrap();
        assert_eq!(ana.total_owed, dec!(390.00));
        assert_eq!(ana.total_paid, dec!(330.00));
        assert_eq!(ana.total_pending, dec!(60.00));

        let ben = balance.summary_for("Ben").unwrap();
        assert_eq!(ben.total_owed, dec!(390.00));
        assert_eq!(ben.total_paid, dec!(0));
        assert_eq!(ben.total_pending, dec!(390.00));
        assert!(!balance.is_settled());

        let rent_row = row(&balance, "Rent");
        assert!(rent_row.shares[0].paid);
        assert_eq!(rent_row.shares[0].outstanding, dec!(0));
        assert!(!rent_row.shares[1].paid);
        assert_eq!(rent_row.shares[1].outstanding, dec!(300.00));
        Ok(())
    }

    #[tokio::test]
    async fn test_override_changes_only_its_month() -> Result<()> {
        let db = setup_test_db().await?;
        let electricity = create_test_expense(&db, "Electricity", dec!(120.00)).await?;
        set_override(&db, electricity.id, period(3, 2026), dec!(150.00)).await?;

        let march = monthly_balance(&db, &test_settings(), period(3, 2026)).await?;
        let row_march = row(&march, "Electricity");
        assert!(row_march.overridden);
        assert_eq!(row_march.effective_amount, dec!(150.00));
        assert_eq!(row_march.shares[0].share, dec!(75.00));
        assert_eq!(row_march.shares[1].share, dec!(75.00));

        let february = monthly_balance(&db, &test_settings(), period(2, 2026)).await?;
        let row_february = row(&february, "Electricity");
        assert!(!row_february.overridden);
        assert_eq!(row_february.effective_amount, dec!(120.00));
        Ok(())
    }

    #[tokio::test]
    async fn test_shares_sum_exactly_to_odd_amount() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_expense(&db, "Water", dec!(120.01)).await?;

        let balance = monthly_balance(&db, &test_settings(), period(3, 2026)).await?;
        let water = row(&balance, "Water");
        let sum: Decimal = water.shares.iter().map(|s| s.share).sum();
        assert_eq!(sum, dec!(120.01));
        assert_eq!(water.shares[0].share, dec!(60.01));
        assert_eq!(water.shares[1].share, dec!(60.00));
        Ok(())
    }

    #[tokio::test]
    async fn test_deactivation_keeps_reconciled_months() -> Result<()> {
        let db = setup_test_db().await?;
        let settings = test_settings();
        let created_at = Utc.with_ymd_and_hms(2026, 1, 10, 9, 0, 0).unwrap();
        let netflix = create_expense_at(
            &db,
            &settings.participants,
            NewExpense::monthly("Netflix", dec!(16.00)),
            created_at,
        )
        .await?;
        pay(&db, netflix.id, period(2, 2026), "Ana", dec!(8.00)).await?;
        pay(&db, netflix.id, period(2, 2026), "Ben", dec!(8.00)).await?;

        let before = monthly_balance(&db, &settings, period(2, 2026)).await?;
        deactivate_expense(&db, netflix.id).await?;
        let after = monthly_balance(&db, &settings, period(2, 2026)).await?;
        assert_eq!(before, after);
        assert!(after.is_settled());

        // No payment this month, so it no longer applies going forward
        let current = monthly_balance(&db, &settings, Period::current()).await?;
        assert!(current.rows.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_weekly_expense_in_balance() -> Result<()> {
        let db = setup_test_db().await?;
        let created_at = Utc.with_ymd_and_hms(2025, 12, 1, 0, 0, 0).unwrap();
        let mut new = NewExpense::monthly("Groceries", dec!(25.00));
        new.frequency = Frequency::Weekly;
        create_expense_at(&db, &test_participants(), new, created_at).await?;

        let february = monthly_balance(&db, &test_settings(), period(2, 2026)).await?;
        assert_eq!(row(&february, "Groceries").effective_amount, dec!(100.00));

        let march = monthly_balance(&db, &test_settings(), period(3, 2026)).await?;
        let groceries = row(&march, "Groceries");
        assert_eq!(groceries.base_amount, dec!(25.00));
        assert_eq!(groceries.effective_amount, dec!(125.00));
        assert_eq!(groceries.shares[0].share, dec!(62.50));
        Ok(())
    }

    #[tokio::test]
    async fn test_new_expense_counts_in_earlier_months() -> Result<()> {
        let db = setup_test_db().await?;
        let settings = test_settings();
        let electricity = create_expense(
            &db,
            &settings.participants,
            NewExpense::monthly("Electricity", dec!(120.00)),
        )
        .await?;
        let march = period(3, 2026);
        set_override(&db, electricity.id, march, dec!(150.00)).await?;

        let in_march = monthly_balance(&db, &settings, march).await?;
        assert_eq!(in_march.total, dec!(150.00));
        assert_eq!(row(&in_march, "Electricity").shares[0].share, dec!(75.00));
        assert_eq!(row(&in_march, "Electricity").shares[1].share, dec!(75.00));

        let in_february = monthly_balance(&db, &settings, period(2, 2026)).await?;
        assert_eq!(in_february.total, dec!(120.00));

        pay(&db, electricity.id, march, "Ana", dec!(75.00)).await?;
        let paid = monthly_balance(&db, &settings, march).await?;
        assert_eq!(paid.summary_for("Ana").unwrap().total_paid, dec!(75.00));
        Ok(())
    }

    #[tokio::test]
    async fn test_household_scenario() -> Result<()> {
        let db = setup_test_db().await?;
        let settings = test_settings();
        let march = period(3, 2026);
        let electricity = create_test_expense(&db, "Electricity", dec!(120.00)).await?;
        let water = create_test_expense(&db, "Water", dec!(60.00)).await?;
        let rent = create_test_expense(&db, "Rent", dec!(600.00)).await?;

        pay(&db, electricity.id, march, "Ana", dec!(60.00)).await?;
        pay(&db, water.id, march, "Ana", dec!(30.00)).await?;
        pay(&db, rent.id, march, "Ben", dec!(300.00)).await?;

        let balance = monthly_balance(&db, &settings, march).await?;
        assert_eq!(balance.total, dec!(780.00));

        let ana = balance.summary_for("Ana").unwrap();
        assert_eq!(ana.total_owed, dec!(390.00));
        assert_eq!(ana.total_paid, dec!(90.00));
        assert_eq!(ana.total_pending, dec!(300.00));

        let ben = balance.summary_for("Ben").unwrap();
        assert_eq!(ben.total_owed, dec!(390.00));
        assert_eq!(ben.total_paid, dec!(300.00));
        assert_eq!(ben.total_pending, dec!(90.00));
        Ok(())
    }

    #[tokio::test]
    async fn test_group_is_paid_only_when_every_expense_is_paid() -> Result<()> {
        let db = setup_test_db().await?;
        let settings = test_settings();
        let march = period(3, 2026);
        let electricity = create_test_expense(&db, "Electricity", dec!(120.00)).await?;
        let water = create_test_expense(&db, "Water", dec!(60.00)).await?;
        create_test_expense(&db, "Rent", dec!(600.00)).await?;
        create_group(
            &db,
            &settings.participants,
            NewGroup {
                name: "Utilities".to_string(),
                description: None,
                participant: "Ben".to_string(),
                fixed_amount: dec!(100.00),
                expense_ids: vec![electricity.id, water.id],
            },
        )
        .await?;

        let balance = monthly_balance(&db, &settings, march).await?;
        assert_eq!(balance.total, dec!(780.00));
        assert_eq!(balance.groups.len(), 1);
        let group = &balance.groups[0];
        assert_eq!(group.concepts, vec!["Electricity", "Water"]);
        assert_eq!(group.total, dec!(180.00));
        assert_eq!(group.shares[0].share, dec!(80.00));
        assert_eq!(group.shares[1].share, dec!(100.00));
        assert_eq!(row(&balance, "Electricity").group_id, Some(group.group_id));
        assert_eq!(row(&balance, "Rent").group_id, None);

        // Ana owes 80 for the group plus half the rent
        assert_eq!(balance.summary_for("Ana").unwrap().total_owed, dec!(380.00));
        assert_eq!(balance.summary_for("Ben").unwrap().total_owed, dec!(400.00));

        let ana_electricity = balance.share_of(electricity.id, "Ana").unwrap().share;
        let ana_water = balance.share_of(water.id, "Ana").unwrap().share;
        pay(&db, electricity.id, march, "Ana", ana_electricity).await?;

        let half_paid = monthly_balance(&db, &settings, march).await?;
        assert!(!half_paid.groups[0].shares[0].paid);
        assert!(!half_paid.share_of(electricity.id, "Ana").unwrap().paid);
        assert_eq!(half_paid.summary_for("Ana").unwrap().total_paid, dec!(0));

        pay(&db, water.id, march, "Ana", ana_water).await?;
        let all_paid = monthly_balance(&db, &settings, march).await?;
        assert!(all_paid.groups[0].shares[0].paid);
        assert_eq!(all_paid.groups[0].shares[0].outstanding, dec!(0));
        assert_eq!(all_paid.summary_for("Ana").unwrap().total_paid, dec!(80.00));
        assert!(!all_paid.groups[0].shares[1].paid);
        Ok(())
    }

    #[test]
    fn test_calculate_balance_is_pure() {
        let participants = test_participants();
        let march = period(3, 2026);
        let created_at = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let (split_kind, split_participant, split_value) = SplitRule::Fixed {
            participant: "Ben".to_string(),
            amount: dec!(200.00),
        }
        .to_columns();
        let expenses = vec![expense::Model {
            id: 1,
            concept: "Rent".to_string(),
            total_amount: dec!(500.00),
            frequency: "monthly".to_string(),
            split_kind,
            split_participant,
            split_value,
            active: true,
            created_at,
            deactivated_at: None,
        }];
        let payments = vec![
            payment::Model {
                id: 1,
                expense_id: 1,
                month: 3,
                year: 2026,
                payer: "Ben".to_string(),
                amount_paid: dec!(200.00),
                paid_at: created_at,
            },
            // Unknown payer, ignored
            payment::Model {
                id: 2,
                expense_id: 1,
                month: 3,
                year: 2026,
                payer: "Mallory".to_string(),
                amount_paid: dec!(300.00),
                paid_at: created_at,
            },
            // Other month, ignored
            payment::Model {
                id: 3,
                expense_id: 1,
                month: 2,
                year: 2026,
                payer: "Ana".to_string(),
                amount_paid: dec!(300.00),
                paid_at: created_at,
            },
        ];

        let balance = calculate_balance(&participants, &expenses, &[], &[], &payments, march);
        let ana = balance.summary_for("Ana").unwrap();
        assert_eq!(ana.total_owed, dec!(300.00));
        assert_eq!(ana.total_paid, dec!(0));
        let ben = balance.summary_for("Ben").unwrap();
        assert_eq!(ben.total_owed, dec!(200.00));
        assert_eq!(ben.total_paid, dec!(200.00));
        assert_eq!(ben.total_pending, dec!(0));
        assert_eq!(balance.total_pending(), dec!(300.00));

        let again = calculate_balance(&participants, &expenses, &[], &[], &payments, march);
        assert_eq!(balance, again);
    }
}
