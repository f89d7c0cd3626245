//! Splitting an expense's effective amount into per-participant shares.
//!
//! Every split is exact: shares are truncated to cents and whatever is left over
//! goes to the designated participant, so the shares always add up to the amount.
//! When the designated participant is the one paying a fixed amount or a
//! percentage, the remainder of the others' part goes to the first of them.

use crate::{
    config::participants::{Participant, Participants},
    entities::expense,
    errors::{Error, Result},
};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;

const KIND_WEIGHTED: &str = "weighted";
const KIND_FIXED: &str = "fixed";
const KIND_PERCENT: &str = "percent";

/// How an expense is divided between participants.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SplitRule {
    /// Everyone pays in proportion to their configured weight
    #[default]
    Weighted,
    /// One participant pays a fixed amount (capped at the total), the others split the rest
    Fixed {
        /// Participant paying the fixed amount
        participant: String,
        /// Amount they pay each month
        amount: Decimal,
    },
    /// One participant pays a percentage, the others split the rest
    Percent {
        /// Participant paying the percentage
        participant: String,
        /// Percentage of the effective amount, 0-100
        percent: Decimal,
    },
}

impl SplitRule {
    /// Checks the rule against the configured participants and canonicalizes the participant name.
    ///
    /// # Errors
    /// Returns [`Error::Validation`] for an unknown participant, a non-positive fixed
    /// amount, or a percentage outside 0-100.
    pub fn validated(self, participants: &Participants) -> Result<Self> {
        let canonical = |name: &str| -> Result<String> {
            participants
                .resolve(name)
                .map(|p| p.name.clone())
                .ok_or_else(|| Error::validation(format!("Unknown participant '{name}'")))
        };

        match self {
            Self::Weighted => Ok(Self::Weighted),
            Self::Fixed {
                participant,
                amount,
            } => {
                if amount <= Decimal::ZERO {
                    return Err(Error::validation("Fixed split amount must be positive"));
                }
                Ok(Self::Fixed {
                    participant: canonical(&participant)?,
                    amount: amount.round_dp(2),
                })
            }
            Self::Percent {
                participant,
                percent,
            } => {
                if percent < Decimal::ZERO || percent > Decimal::from(100) {
                    return Err(Error::validation(
                        "Split percentage must be between 0 and 100",
                    ));
                }
                Ok(Self::Percent {
                    participant: canonical(&participant)?,
                    percent,
                })
            }
        }
    }

    /// Rebuilds the rule from the `split_*` columns of an expense row.
    ///
    /// Incomplete or unknown stored rules fall back to [`SplitRule::Weighted`].
    #[must_use]
    pub fn from_model(model: &expense::Model) -> Self {
        match (
            model.split_kind.as_str(),
            model.split_participant.clone(),
            model.split_value,
        ) {
            (KIND_WEIGHTED, _, _) => Self::Weighted,
            (KIND_FIXED, Some(participant), Some(amount)) => Self::Fixed {
                participant,
                amount,
            },
            (KIND_PERCENT, Some(participant), Some(percent)) => Self::Percent {
                participant,
                percent,
            },
            (kind, _, _) => {
                warn!(
                    "Expense {} has an incomplete split rule '{}', using weighted split",
                    model.id, kind
                );
                Self::Weighted
            }
        }
    }

    /// Values for the `split_kind`, `split_participant` and `split_value` columns.
    #[must_use]
    pub fn to_columns(&self) -> (String, Option<String>, Option<Decimal>) {
        match self {
            Self::Weighted => (KIND_WEIGHTED.to_string(), None, None),
            Self::Fixed {
                participant,
                amount,
            } => (
                KIND_FIXED.to_string(),
                Some(participant.clone()),
                Some(*amount),
            ),
            Self::Percent {
                participant,
                percent,
            } => (
                KIND_PERCENT.to_string(),
                Some(participant.clone()),
                Some(*percent),
            ),
        }
    }
}

impl fmt::Display for SplitRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Weighted => f.write_str("weighted"),
            Self::Fixed {
                participant,
                amount,
            } => write!(f, "{participant} pays ${amount:.2}"),
            Self::Percent {
                participant,
                percent,
            } => write!(f, "{participant} pays {percent}%"),
        }
    }
}

/// A participant's portion of an amount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Share {
    /// Participant name
    pub participant: String,
    /// Amount owed, in currency units with two decimals
    pub amount: Decimal,
}

/// Splits `amount` among `participants` following `rule`.
///
/// Returns one share per participant, in configuration order. The shares sum
/// exactly to `amount`.
#[must_use]
pub fn split_amount(amount: Decimal, rule: &SplitRule, participants: &Participants) -> Vec<Share> {
    let members = participants.as_slice();
    let designated = &participants.designated().name;

    let (chosen, chosen_share) = match rule {
        SplitRule::Weighted => return weighted(amount, members, designated),
        SplitRule::Fixed {
            participant,
            amount: fixed,
        } => (participant, (*fixed).min(amount)),
        SplitRule::Percent {
            participant,
            percent,
        } => (
            participant,
            (amount * *percent / Decimal::from(100))
                .round_dp_with_strategy(2, RoundingStrategy::ToZero),
        ),
    };

    let Some(chosen) = participants.resolve(chosen) else {
        warn!(
            "Split rule refers to unknown participant '{}', using weighted split",
            chosen
        );
        return weighted(amount, members, designated);
    };

    split_around(amount, chosen, chosen_share, participants)
}

/// `chosen` pays `chosen_share` of `amount`; the others split the rest by weight.
///
/// The remainder of the weighted part goes to the designated participant, or to
/// the first of the others when the designated one is `chosen`.
pub(crate) fn split_around(
    amount: Decimal,
    chosen: &Participant,
    chosen_share: Decimal,
    participants: &Participants,
) -> Vec<Share> {
    let members = participants.as_slice();
    let designated = &participants.designated().name;

    let others: Vec<Participant> = members
        .iter()
        .filter(|p| p.name != chosen.name)
        .cloned()
        .collect();
    if others.is_empty() {
        return weighted(amount, members, designated);
    }

    let mut rest = weighted(amount - chosen_share, &others, designated).into_iter();
    members
        .iter()
        .map(|p| {
            if p.name == chosen.name {
                Share {
                    participant: p.name.clone(),
                    amount: chosen_share,
                }
            } else {
                rest.next().unwrap_or_else(|| Share {
                    participant: p.name.clone(),
                    amount: Decimal::ZERO,
                })
            }
        })
        .collect()
}

/// Weighted split with truncation; the remainder goes to `receiver`, or to the
/// first member when `receiver` is not among them.
fn weighted(amount: Decimal, members: &[Participant], receiver: &str) -> Vec<Share> {
    let total_weight: Decimal = members.iter().map(|p| p.weight).sum();
    if total_weight.is_zero() {
        return members
            .iter()
            .map(|p| Share {
                participant: p.name.clone(),
                amount: Decimal::ZERO,
            })
            .collect();
    }

    let mut shares: Vec<Share> = members
        .iter()
        .map(|p| Share {
            participant: p.name.clone(),
            amount: (amount * p.weight / total_weight)
                .round_dp_with_strategy(2, RoundingStrategy::ToZero),
        })
        .collect();

    let assigned: Decimal = shares.iter().map(|s| s.amount).sum();
    let position = shares
        .iter()
        .position(|s| s.participant == receiver)
        .unwrap_or(0);
    if let Some(share) = shares.get_mut(position) {
        share.amount += amount - assigned;
    }
    shares
}
