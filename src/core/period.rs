//! Calendar month used as the reporting period of the ledger.

use crate::errors::{Error, Result};
use chrono::{DateTime, Datelike, Months, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A calendar month of a given year.
///
/// Periods order chronologically and display as `"March 2026"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Period {
    /// First day of the month; the only representation kept so every period is a valid date.
    first: NaiveDate,
}

impl Period {
    /// Builds the period for `month` (1-12) of `year`.
    ///
    /// # Errors
    /// Returns [`Error::Validation`] when the month is outside 1-12 or the year is out of range.
    pub fn new(month: u32, year: i32) -> Result<Self> {
        if !(1..=12).contains(&month) {
            return Err(Error::validation(format!(
                "Month must be between 1 and 12, got {month}"
            )));
        }

        NaiveDate::from_ymd_opt(year, month, 1)
            .map(|first| Self { first })
            .ok_or_else(|| Error::validation(format!("Year {year} is out of range")))
    }

    /// Builds a period from the integer month/year columns used by the storage layer.
    ///
    /// # Errors
    /// Returns [`Error::Validation`] when the stored values do not form a valid month.
    pub fn from_stored(month: i32, year: i32) -> Result<Self> {
        let month = u32::try_from(month)
            .map_err(|_| Error::validation(format!("Invalid stored month {month}")))?;
        Self::new(month, year)
    }

    /// The period containing `date`.
    #[must_use]
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            first: date.with_day(1).unwrap_or(date),
        }
    }

    /// The period containing the UTC instant `at`.
    #[must_use]
    pub fn of(at: &DateTime<Utc>) -> Self {
        Self::from_date(at.date_naive())
    }

    /// The current period (UTC).
    #[must_use]
    pub fn current() -> Self {
        Self::of(&Utc::now())
    }

    /// Month number, 1-12.
    #[must_use]
    pub fn month(self) -> u32 {
        self.first.month()
    }

    /// Month number as stored in the `month` columns.
    #[must_use]
    #[allow(clippy::cast_possible_wrap)] // month is always 1-12
    pub fn month_number(self) -> i32 {
        self.month() as i32
    }

    /// Calendar year.
    #[must_use]
    pub fn year(self) -> i32 {
        self.first.year()
    }

    /// First day of the month.
    #[must_use]
    pub const fn first_day(self) -> NaiveDate {
        self.first
    }

    /// Number of days in the month.
    #[must_use]
    pub fn days(self) -> u32 {
        match self.month() {
            4 | 6 | 9 | 11 => 30,
            2 if is_leap_year(self.year()) => 29,
            2 => 28,
            _ => 31,
        }
    }

    /// Number of Mondays falling inside the month.
    ///
    /// Weekly expenses are charged once per week starting in the month, and weeks start on Monday.
    #[must_use]
    pub fn mondays(self) -> u32 {
        let offset = (7 - self.first.weekday().num_days_from_monday()) % 7;
        (self.days() - offset - 1) / 7 + 1
    }

    /// The following month, if representable.
    #[must_use]
    pub fn next(self) -> Option<Self> {
        self.first
            .checked_add_months(Months::new(1))
            .map(|first| Self { first })
    }

    /// The preceding month, if representable.
    #[must_use]
    pub fn previous(self) -> Option<Self> {
        self.first
            .checked_sub_months(Months::new(1))
            .map(|first| Self { first })
    }

    /// Whether `date` falls inside this month.
    #[must_use]
    pub fn contains(self, date: NaiveDate) -> bool {
        Self::from_date(date) == self
    }
}

const fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.first.format("%B %Y"))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_new_rejects_invalid_month() {
        assert!(matches!(Period::new(0, 2026), Err(Error::Validation { .. })));
        assert!(matches!(Period::new(13, 2026), Err(Error::Validation { .. })));
        assert!(Period::new(12, 2026).is_ok());
    }

    #[test]
    fn test_display_and_accessors() {
        let period = Period::new(3, 2026).unwrap();
        assert_eq!(period.to_string(), "March 2026");
        assert_eq!(period.month(), 3);
        assert_eq!(period.year(), 2026);
        assert_eq!(
            period.first_day(),
            NaiveDate::from_ymd_opt(2026, 3, 1).unwrap()
        );
    }

    #[test]
    fn test_days_handles_leap_years() {
        assert_eq!(Period::new(2, 2024).unwrap().days(), 29);
        assert_eq!(Period::new(2, 2026).unwrap().days(), 28);
        assert_eq!(Period::new(4, 2026).unwrap().days(), 30);
        assert_eq!(Period::new(12, 2026).unwrap().days(), 31);
    }

    #[test]
    fn test_mondays_in_month() {
        // February 2026 starts on a Sunday: Mondays 2, 9, 16, 23
        assert_eq!(Period::new(2, 2026).unwrap().mondays(), 4);
        // March 2026 starts on a Sunday: Mondays 2, 9, 16, 23, 30
        assert_eq!(Period::new(3, 2026).unwrap().mondays(), 5);
        // June 2026 starts on a Monday: Mondays 1, 8, 15, 22, 29
        assert_eq!(Period::new(6, 2026).unwrap().mondays(), 5);
        // September 2026 starts on a Tuesday: Mondays 7, 14, 21, 28
        assert_eq!(Period::new(9, 2026).unwrap().mondays(), 4);
    }

    #[test]
    fn test_ordering_and_navigation() {
        let dec = Period::new(12, 2025).unwrap();
        let jan = Period::new(1, 2026).unwrap();
        assert!(dec < jan);
        assert_eq!(dec.next(), Some(jan));
        assert_eq!(jan.previous(), Some(dec));
    }

    #[test]
    fn test_from_date_and_contains() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 17).unwrap();
        let period = Period::from_date(date);
        assert_eq!(period, Period::new(3, 2026).unwrap());
        assert!(period.contains(date));
        assert!(!period.contains(NaiveDate::from_ymd_opt(2026, 4, 1).unwrap()));
    }
}
