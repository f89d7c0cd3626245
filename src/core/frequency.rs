//! Billing frequency of an expense and its normalization to a monthly amount.
//!
//! Stored amounts are per occurrence. A weekly expense is charged once per
//! week starting in the month (counted by Mondays), a biweekly one twice, and an
//! annual one contributes a twelfth of its amount.

use crate::{
    core::period::Period,
    errors::{Error, Result},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use tracing::warn;

/// How often an expense is billed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    /// Once per month
    #[default]
    Monthly,
    /// Once per week
    Weekly,
    /// Twice per month
    Biweekly,
    /// Once per year
    Annual,
}

impl Frequency {
    /// Every frequency, in display order.
    pub const ALL: [Self; 4] = [Self::Monthly, Self::Weekly, Self::Biweekly, Self::Annual];

    /// Value stored in the `frequency` column.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Monthly => "monthly",
            Self::Weekly => "weekly",
            Self::Biweekly => "biweekly",
            Self::Annual => "annual",
        }
    }

    /// Parses a stored column value, falling back to monthly for unknown values.
    #[must_use]
    pub fn from_stored(value: &str) -> Self {
        value.parse().unwrap_or_else(|_| {
            warn!("Unknown stored frequency '{}', treating as monthly", value);
            Self::Monthly
        })
    }

    /// Monthly amount owed for `period` given the per-occurrence `base` amount.
    ///
    /// Annual amounts are divided by twelve and rounded to cents.
    #[must_use]
    pub fn monthly_amount(self, base: Decimal, period: Period) -> Decimal {
        match self {
            Self::Monthly => base,
            Self::Weekly => base * Decimal::from(period.mondays()),
            Self::Biweekly => base * Decimal::from(2),
            Self::Annual => (base / Decimal::from(12)).round_dp(2),
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Frequency {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "monthly" => Ok(Self::Monthly),
            "weekly" => Ok(Self::Weekly),
            "biweekly" | "bi-weekly" => Ok(Self::Biweekly),
            "annual" | "yearly" => Ok(Self::Annual),
            other => Err(Error::validation(format!(
                "Unknown frequency '{other}' (expected monthly, weekly, biweekly or annual)"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_monthly_amount_is_stored_amount() {
        let march = Period::new(3, 2026).unwrap();
        assert_eq!(Frequency::Monthly.monthly_amount(dec!(120.00), march), dec!(120.00));
    }

    #[test]
    fn test_weekly_amount_multiplies_by_mondays() {
        let february = Period::new(2, 2026).unwrap();
        let march = Period::new(3, 2026).unwrap();
        assert_eq!(Frequency::Weekly.monthly_amount(dec!(25.00), february), dec!(100.00));
        assert_eq!(Frequency::Weekly.monthly_amount(dec!(25.00), march), dec!(125.00));
    }

    #[test]
    fn test_biweekly_and_annual_amounts() {
        let march = Period::new(3, 2026).unwrap();
        assert_eq!(Frequency::Biweekly.monthly_amount(dec!(40.50), march), dec!(81.00));
        assert_eq!(Frequency::Annual.monthly_amount(dec!(1200.00), march), dec!(100.00));
        // 100 / 12 = 8.333... rounds to cents
        assert_eq!(Frequency::Annual.monthly_amount(dec!(100.00), march), dec!(8.33));
    }

    #[test]
    fn test_parse_and_display() {
        assert_eq!("Weekly".parse::<Frequency>().unwrap(), Frequency::Weekly);
        assert_eq!("bi-weekly".parse::<Frequency>().unwrap(), Frequency::Biweekly);
        assert!(matches!(
            "daily".parse::<Frequency>(),
            Err(Error::Validation { .. })
        ));
        for frequency in Frequency::ALL {
            assert_eq!(frequency.to_string().parse::<Frequency>().unwrap(), frequency);
        }
    }

    #[test]
    fn test_from_stored_falls_back_to_monthly() {
        assert_eq!(Frequency::from_stored("annual"), Frequency::Annual);
        assert_eq!(Frequency::from_stored("garbage"), Frequency::Monthly);
    }
}
