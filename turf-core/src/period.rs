//! Contest Periods
//!
//! A contest period is one ISO-8601 calendar week (Monday start). The
//! period key pairs the ISO week number with the ISO week-based year, which
//! differs from the calendar year around year boundaries: late-December
//! days can belong to week 1 of the next year and early-January days to
//! week 52/53 of the previous one. Getting this wrong silently splits a
//! week's ledger across two keys, so the arithmetic is isolated here.

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Contest aggregation window: ISO week number + ISO week-based year
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PeriodKey {
    /// ISO week-based year
    pub iso_year: i32,
    /// ISO week number (1..=53)
    pub iso_week: u32,
}

impl PeriodKey {
    pub fn new(iso_year: i32, iso_week: u32) -> Self {
        Self { iso_year, iso_week }
    }

    /// Period containing the given date
    pub fn for_date(date: NaiveDate) -> Self {
        let week = date.iso_week();
        Self {
            iso_year: week.year(),
            iso_week: week.week(),
        }
    }

    /// Period currently accepting contributions
    pub fn current(now: DateTime<Utc>) -> Self {
        Self::for_date(now.date_naive())
    }

    /// Most recently concluded period: the week containing `now - 7 days`
    pub fn concluded(now: DateTime<Utc>) -> Self {
        Self::for_date(now.date_naive() - Duration::days(7))
    }

    /// Stable label, e.g. `2025-W42`
    pub fn label(&self) -> String {
        format!("{}-W{:02}", self.iso_year, self.iso_week)
    }
}

impl std::fmt::Display for PeriodKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_midyear_week() {
        let key = PeriodKey::for_date(date(2025, 10, 15));
        assert_eq!(key, PeriodKey::new(2025, 42));
        assert_eq!(key.label(), "2025-W42");
    }

    #[test]
    fn test_late_december_rolls_into_next_iso_year() {
        // 2024-12-31 is a Tuesday inside ISO week 1 of 2025
        assert_eq!(PeriodKey::for_date(date(2024, 12, 31)), PeriodKey::new(2025, 1));
        assert_eq!(PeriodKey::for_date(date(2024, 12, 30)), PeriodKey::new(2025, 1));
    }

    #[test]
    fn test_early_january_belongs_to_previous_iso_year() {
        // 2027-01-01 is a Friday inside ISO week 53 of 2026
        assert_eq!(PeriodKey::for_date(date(2027, 1, 1)), PeriodKey::new(2026, 53));
        assert_eq!(PeriodKey::for_date(date(2027, 1, 3)), PeriodKey::new(2026, 53));
        assert_eq!(PeriodKey::for_date(date(2027, 1, 4)), PeriodKey::new(2027, 1));
    }

    #[test]
    fn test_december_28_always_lands_in_the_final_week() {
        // ISO rule of thumb: Dec 28 is always in the year's last week
        assert_eq!(PeriodKey::for_date(date(2026, 12, 28)), PeriodKey::new(2026, 53));
        assert_eq!(PeriodKey::for_date(date(2025, 12, 28)), PeriodKey::new(2025, 52));
    }

    #[test]
    fn test_concluded_is_the_previous_week() {
        // Monday 00:30, just after the weekly rollover
        let now = Utc.with_ymd_and_hms(2025, 10, 13, 0, 30, 0).unwrap();
        assert_eq!(PeriodKey::current(now), PeriodKey::new(2025, 42));
        assert_eq!(PeriodKey::concluded(now), PeriodKey::new(2025, 41));
    }

    #[test]
    fn test_concluded_across_the_year_boundary() {
        // 2026-01-02 sits in 2026-W01 (the week starting Mon 2025-12-29);
        // seven days earlier is 2025-12-26, inside 2025-W52
        let now = Utc.with_ymd_and_hms(2026, 1, 2, 12, 0, 0).unwrap();
        assert_eq!(PeriodKey::current(now), PeriodKey::new(2026, 1));
        assert_eq!(PeriodKey::concluded(now), PeriodKey::new(2025, 52));
    }

    #[test]
    fn test_ordering_follows_time() {
        assert!(PeriodKey::new(2025, 52) < PeriodKey::new(2026, 1));
        assert!(PeriodKey::new(2025, 41) < PeriodKey::new(2025, 42));
    }
}
