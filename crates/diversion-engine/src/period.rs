//! Reporting Periods
//!
//! A reporting period is a validated, inclusive calendar range. Periods are
//! labels for independent record sets; nothing here reads a clock.

use crate::error::PeriodError;
use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// How a period was specified
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PeriodSpec {
    /// One calendar month
    Month {
        /// Calendar year
        year: i32,
        /// Month, 1..=12
        month: u32,
    },
    /// One calendar year
    Year {
        /// Calendar year
        year: i32,
    },
    /// Arbitrary inclusive range
    Custom {
        /// First day
        start: NaiveDate,
        /// Last day, inclusive
        end: NaiveDate,
    },
}

/// Validated reporting period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "PeriodSpec", into = "PeriodSpec")]
pub struct ReportingPeriod {
    spec: PeriodSpec,
    start: NaiveDate,
    end: NaiveDate,
}

impl TryFrom<PeriodSpec> for ReportingPeriod {
    type Error = PeriodError;

    fn try_from(spec: PeriodSpec) -> Result<Self, Self::Error> {
        Self::new(spec)
    }
}

impl From<ReportingPeriod> for PeriodSpec {
    fn from(period: ReportingPeriod) -> Self {
        period.spec
    }
}

impl ReportingPeriod {
    /// Validate a period specification.
    ///
    /// # Errors
    /// [`PeriodError`] for months outside 1..=12, years chrono cannot
    /// represent, or custom ranges that end before they start.
    pub fn new(spec: PeriodSpec) -> Result<Self, PeriodError> {
        let (start, end) = match spec {
            PeriodSpec::Month { year, month } => {
                let start = NaiveDate::from_ymd_opt(year, month, 1)
                    .ok_or(PeriodError::InvalidMonth { year, month })?;
                let end = start
                    .checked_add_months(Months::new(1))
                    .and_then(|next| next.pred_opt())
                    .ok_or(PeriodError::OutOfRange(year))?;
                (start, end)
            }
            PeriodSpec::Year { year } => {
                let start =
                    NaiveDate::from_ymd_opt(year, 1, 1).ok_or(PeriodError::OutOfRange(year))?;
                let end =
                    NaiveDate::from_ymd_opt(year, 12, 31).ok_or(PeriodError::OutOfRange(year))?;
                (start, end)
            }
            PeriodSpec::Custom { start, end } => {
                if end < start {
                    return Err(PeriodError::EndsBeforeStart { start, end });
                }
                (start, end)
            }
        };
        Ok(Self { spec, start, end })
    }

    /// One calendar month.
    ///
    /// # Errors
    /// See [`ReportingPeriod::new`].
    pub fn month(year: i32, month: u32) -> Result<Self, PeriodError> {
        Self::new(PeriodSpec::Month { year, month })
    }

    /// One calendar year.
    ///
    /// # Errors
    /// See [`ReportingPeriod::new`].
    pub fn year(year: i32) -> Result<Self, PeriodError> {
        Self::new(PeriodSpec::Year { year })
    }

    /// Inclusive custom range.
    ///
    /// # Errors
    /// See [`ReportingPeriod::new`].
    pub fn custom(start: NaiveDate, end: NaiveDate) -> Result<Self, PeriodError> {
        Self::new(PeriodSpec::Custom { start, end })
    }

    /// The twelve months of `year`, in order.
    ///
    /// # Errors
    /// See [`ReportingPeriod::new`].
    pub fn months_of(year: i32) -> Result<Vec<Self>, PeriodError> {
        (1..=12).map(|month| Self::month(year, month)).collect()
    }

    /// Original specification
    #[inline]
    #[must_use]
    pub fn spec(&self) -> PeriodSpec {
        self.spec
    }

    /// First day
    #[inline]
    #[must_use]
    pub fn start(&self) -> NaiveDate {
        self.start
    }

    /// Last day (inclusive)
    #[inline]
    #[must_use]
    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Number of days covered
    #[must_use]
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    /// True when `date` falls inside the period
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// True when the two periods share at least one day
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start <= other.end && other.start <= self.end
    }
}

impl fmt::Display for ReportingPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.spec {
            PeriodSpec::Month { year, month } => write!(f, "{year:04}-{month:02}"),
            PeriodSpec::Year { year } => write!(f, "{year:04}"),
            PeriodSpec::Custom { start, end } => write!(f, "{start}..{end}"),
        }
    }
}

/// First pair of overlapping periods, ordered by start date
pub(crate) fn first_overlap(periods: &[ReportingPeriod]) -> Option<(ReportingPeriod, ReportingPeriod)> {
    let mut sorted = periods.to_vec();
    sorted.sort_by_key(|p| (p.start, p.end));
    sorted
        .windows(2)
        .find(|pair| pair[0].overlaps(&pair[1]))
        .map(|pair| (pair[0], pair[1]))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn month_bounds() {
        let feb = ReportingPeriod::month(2024, 2).unwrap();
        assert_eq!(feb.start(), date(2024, 2, 1));
        assert_eq!(feb.end(), date(2024, 2, 29));
        assert_eq!(feb.days(), 29);

        let dec = ReportingPeriod::month(2023, 12).unwrap();
        assert_eq!(dec.end(), date(2023, 12, 31));
    }

    #[test]
    fn year_bounds() {
        let year = ReportingPeriod::year(2023).unwrap();
        assert_eq!(year.days(), 365);
        assert!(year.contains(date(2023, 7, 4)));
        assert!(!year.contains(date(2024, 1, 1)));
    }

    #[test]
    fn rejects_invalid_month() {
        assert_eq!(
            ReportingPeriod::month(2024, 13),
            Err(PeriodError::InvalidMonth {
                year: 2024,
                month: 13
            })
        );
        assert!(ReportingPeriod::month(2024, 0).is_err());
    }

    #[test]
    fn rejects_backwards_range() {
        let err = ReportingPeriod::custom(date(2024, 6, 30), date(2024, 1, 1)).unwrap_err();
        assert!(matches!(err, PeriodError::EndsBeforeStart { .. }));
    }

    #[test]
    fn single_day_custom_range() {
        let day = ReportingPeriod::custom(date(2024, 3, 15), date(2024, 3, 15)).unwrap();
        assert_eq!(day.days(), 1);
    }

    #[test]
    fn display_labels() {
        assert_eq!(ReportingPeriod::month(2024, 3).unwrap().to_string(), "2024-03");
        assert_eq!(ReportingPeriod::year(2024).unwrap().to_string(), "2024");
        let custom = ReportingPeriod::custom(date(2024, 1, 1), date(2024, 6, 30)).unwrap();
        assert_eq!(custom.to_string(), "2024-01-01..2024-06-30");
    }

    #[test]
    fn months_of_year_tile_the_year() {
        let months = ReportingPeriod::months_of(2024).unwrap();
        assert_eq!(months.len(), 12);
        assert_eq!(months.iter().map(ReportingPeriod::days).sum::<i64>(), 366);
        assert!(first_overlap(&months).is_none());
    }

    #[test]
    fn overlap_detection() {
        let q1 = ReportingPeriod::custom(date(2024, 1, 1), date(2024, 3, 31)).unwrap();
        let march = ReportingPeriod::month(2024, 3).unwrap();
        let april = ReportingPeriod::month(2024, 4).unwrap();

        assert!(q1.overlaps(&march));
        assert!(!q1.overlaps(&april));
        assert_eq!(first_overlap(&[april, march, q1]), Some((q1, march)));
    }

    #[test]
    fn serde_validates() {
        let json = r#"{"kind":"month","year":2024,"month":5}"#;
        let period: ReportingPeriod = serde_json::from_str(json).unwrap();
        assert_eq!(period.end(), date(2024, 5, 31));
        assert_eq!(serde_json::to_string(&period).unwrap(), json);

        let bad = r#"{"kind":"month","year":2024,"month":14}"#;
        assert!(serde_json::from_str::<ReportingPeriod>(bad).is_err());
    }
}
