//! Report formatting - Plain-text renderings of balances and payment history.
//!
//! These functions only format already computed data; the bot layer decides
//! where the text goes.

use crate::{
    core::{
        balance::{BalanceRow, GroupRow, MonthlyBalance, ShareStatus},
        frequency::Frequency,
        payment::PeriodTotals,
    },
    errors::Result,
};
use rust_decimal::Decimal;
use std::fmt::Write;

/// Formats an amount as dollars with thousands separators, e.g. `$1,234.50`.
#[must_use]
pub fn format_money(amount: Decimal) -> String {
    let rounded = amount.round_dp(2);
    let text = format!("{:.2}", rounded.abs());
    let (whole, cents) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    format!("{sign}${grouped}.{cents}")
}

/// Who still owes money for the month, or a confirmation that everything is paid.
#[must_use]
pub fn settlement_message(balance: &MonthlyBalance) -> String {
    let debtors: Vec<String> = balance
        .summaries
        .iter()
        .filter(|s| s.total_pending > Decimal::ZERO)
        .map(|s| {
            format!(
                "{} still owes {}",
                s.participant,
                format_money(s.total_pending)
            )
        })
        .collect();

    if debtors.is_empty() {
        format!("Everything is paid for {} ✅", balance.period)
    } else {
        debtors.join("\n")
    }
}

fn row_heading(row: &BalanceRow) -> Result<String> {
    let mut heading = format!(
        "**{}**: {}",
        row.concept,
        format_money(row.effective_amount)
    );
    if row.frequency != Frequency::Monthly {
        write!(
            heading,
            " ({} × {})",
            row.frequency,
            format_money(row.base_amount)
        )?;
    }
    if row.overridden {
        heading.push_str(" *(adjusted this month)*");
    }
    Ok(heading)
}

fn write_shares(out: &mut String, shares: &[ShareStatus]) -> Result<()> {
    for share in shares {
        let status = if share.paid { "✅" } else { "⏳" };
        writeln!(
            out,
            "  • {}: {} {status}",
            share.participant,
            format_money(share.share)
        )?;
    }
    Ok(())
}

fn group_heading(group: &GroupRow) -> String {
    format!(
        "📦 **{}** ({}): {}, {} pays {}",
        group.name,
        group.concepts.join(" + "),
        format_money(group.total),
        group.participant,
        format_money(group.fixed_amount.min(group.total))
    )
}

/// Full text report of a month: ungrouped expenses and groups with their shares,
/// then per-participant totals.
pub fn format_balance_report(balance: &MonthlyBalance) -> Result<String> {
    let mut out = String::new();
    writeln!(out, "📊 **Balance for {}**", balance.period)?;

    if balance.rows.is_empty() {
        writeln!(out, "No expenses apply to {}.", balance.period)?;
        return Ok(out);
    }

    writeln!(out, "Total: {}", format_money(balance.total))?;
    writeln!(out)?;

    for row in balance.rows.iter().filter(|r| r.group_id.is_none()) {
        writeln!(out, "{}", row_heading(row)?)?;
        write_shares(&mut out, &row.shares)?;
    }
    for group in &balance.groups {
        writeln!(out, "{}", group_heading(group))?;
        write_shares(&mut out, &group.shares)?;
    }

    writeln!(out)?;
    for summary in &balance.summaries {
        writeln!(
            out,
            "**{}**: owes {}, paid {}, pending {}",
            summary.participant,
            format_money(summary.total_owed),
            format_money(summary.total_paid),
            format_money(summary.total_pending)
        )?;
    }

    writeln!(out)?;
    write!(out, "{}", settlement_message(balance))?;
    Ok(out)
}

/// One line per month with what each payer paid.
pub fn format_history(history: &[PeriodTotals]) -> Result<String> {
    if history.is_empty() {
        return Ok("No payments recorded yet.".to_string());
    }

    let mut out = String::from("📈 **Payment history**\n");
    for totals in history {
        let payers = totals
            .by_payer
            .iter()
            .map(|(payer, amount)| format!("{payer} {}", format_money(*amount)))
            .collect::<Vec<_>>()
            .join(", ");
        writeln!(
            out,
            "{}: {payers} (total {})",
            totals.period,
            format_money(totals.total)
        )?;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::{
        core::{balance::ParticipantSummary, period::Period},
        test_utils::period,
    };
    use rust_decimal_macros::dec;

    fn summary(name: &str, owed: Decimal, paid: Decimal) -> ParticipantSummary {
        ParticipantSummary {
            participant: name.to_string(),
            total_owed: owed,
            total_paid: paid,
            total_pending: owed - paid,
        }
    }

    fn sample_balance() -> MonthlyBalance {
        MonthlyBalance {
            period: period(3, 2026),
            rows: vec![BalanceRow {
                expense_id: 1,
                concept: "Electricity".to_string(),
                frequency: Frequency::Monthly,
                base_amount: dec!(150.00),
                effective_amount: dec!(150.00),
                overridden: true,
                group_id: None,
                shares: vec![
                    ShareStatus {
                        participant: "Ana".to_string(),
                        share: dec!(75.00),
                        paid: true,
                        outstanding: dec!(0),
                    },
                    ShareStatus {
                        participant: "Ben".to_string(),
                        share: dec!(75.00),
                        paid: false,
                        outstanding: dec!(75.00),
                    },
                ],
            }],
            summaries: vec![
                summary("Ana", dec!(75.00), dec!(75.00)),
                summary("Ben", dec!(75.00), dec!(0)),
            ],
            groups: Vec::new(),
            total: dec!(150.00),
        }
    }

    #[test]
    fn test_format_money() {
        assert_eq!(format_money(dec!(390)), "$390.00");
        assert_eq!(format_money(dec!(1234.5)), "$1,234.50");
        assert_eq!(format_money(dec!(1234567.891)), "$1,234,567.89");
        assert_eq!(format_money(dec!(0)), "$0.00");
        assert_eq!(format_money(dec!(-12.3)), "-$12.30");
        assert_eq!(format_money(dec!(999.999)), "$1,000.00");
    }

    #[test]
    fn test_settlement_message() {
        let balance = sample_balance();
        assert_eq!(settlement_message(&balance), "Ben still owes $75.00");

        let mut settled = sample_balance();
        settled.summaries = vec![
            summary("Ana", dec!(75.00), dec!(75.00)),
            summary("Ben", dec!(75.00), dec!(75.00)),
        ];
        assert_eq!(
            settlement_message(&settled),
            "Everything is paid for March 2026 ✅"
        );
    }

    #[test]
    fn test_format_balance_report() {
        let report = format_balance_report(&sample_balance()).unwrap();
        assert!(report.starts_with("📊 **Balance for March 2026**"));
        assert!(report.contains("**Electricity**: $150.00 *(adjusted this month)*"));
        assert!(report.contains("  • Ana: $75.00 ✅"));
        assert!(report.contains("  • Ben: $75.00 ⏳"));
        assert!(report.contains("**Ben**: owes $75.00, paid $0.00, pending $75.00"));
        assert!(report.ends_with("Ben still owes $75.00"));
    }

    #[test]
    fn test_format_balance_report_with_group() {
        let mut balance = sample_balance();
        balance.rows[0].group_id = Some(4);
        balance.groups = vec![GroupRow {
            group_id: 4,
            name: "Utilities".to_string(),
            participant: "Ben".to_string(),
            fixed_amount: dec!(100.00),
            concepts: vec!["Electricity".to_string()],
            total: dec!(150.00),
            shares: vec![
                ShareStatus {
                    participant: "Ana".to_string(),
                    share: dec!(50.00),
                    paid: false,
                    outstanding: dec!(50.00),
                },
                ShareStatus {
                    participant: "Ben".to_string(),
                    share: dec!(100.00),
                    paid: true,
                    outstanding: dec!(0),
                },
            ],
        }];

        let report = format_balance_report(&balance).unwrap();
        assert!(!report.contains("**Electricity**"));
        assert!(report.contains("📦 **Utilities** (Electricity): $150.00, Ben pays $100.00"));
        assert!(report.contains("  • Ana: $50.00 ⏳"));
        assert!(report.contains("  • Ben: $100.00 ✅"));
    }

    #[test]
    fn test_format_balance_report_without_expenses() {
        let empty = MonthlyBalance {
            period: period(1, 2026),
            rows: Vec::new(),
            groups: Vec::new(),
            summaries: Vec::new(),
            total: Decimal::ZERO,
        };
        let report = format_balance_report(&empty).unwrap();
        assert!(report.contains("No expenses apply to January 2026."));
    }

    #[test]
    fn test_format_history() {
        assert_eq!(format_history(&[]).unwrap(), "No payments recorded yet.");

        let history = vec![PeriodTotals {
            period: Period::new(2, 2026).unwrap(),
            by_payer: vec![
                ("Ana".to_string(), dec!(90.00)),
                ("Ben".to_string(), dec!(1300.00)),
            ],
            total: dec!(1390.00),
        }];
        let text = format_history(&history).unwrap();
        assert!(text.contains("February 2026: Ana $90.00, Ben $1,300.00 (total $1,390.00)"));
    }
}
