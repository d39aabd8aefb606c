use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Month-granularity time bucket derived from record dates.
///
/// Derivation is monotonic: the same source date always maps to the same
/// period, and ordering follows calendar order.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Period {
    year: i32,
    month: u32,
}

impl Period {
    /// Bucket a date into its month period.
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Build a period directly from a year and 1-based month ordinal.
    pub fn new(year: i32, month: u32) -> Option<Self> {
        if (1..=12).contains(&month) {
            Some(Self { year, month })
        } else {
            None
        }
    }

    /// Calendar year.
    pub fn year(&self) -> i32 {
        self.year
    }

    /// 1-based month ordinal.
    pub fn month(&self) -> u32 {
        self.month
    }

    /// First calendar day of the period.
    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).expect("month ordinal in range")
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_date_maps_to_same_period() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 17).unwrap();
        assert_eq!(Period::from_date(date), Period::from_date(date));
        assert_eq!(Period::from_date(date), Period::new(2025, 3).unwrap());
    }

    #[test]
    fn ordering_follows_calendar_order() {
        let earlier = Period::new(2024, 12).unwrap();
        let later = Period::new(2025, 1).unwrap();
        assert!(earlier < later);
    }

    #[test]
    fn out_of_range_month_is_rejected() {
        assert!(Period::new(2025, 0).is_none());
        assert!(Period::new(2025, 13).is_none());
    }

    #[test]
    fn display_and_first_day_are_stable() {
        let period = Period::new(2025, 3).unwrap();
        assert_eq!(period.to_string(), "2025-03");
        assert_eq!(
            period.first_day(),
            NaiveDate::from_ymd_opt(2025, 3, 1).unwrap()
        );
    }
}
