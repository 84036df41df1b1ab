// Month arithmetic
// The menu asks for a bare month number; these helpers decide what that
// number means against TIMESTAMP columns.

use crate::model::Timestamp;
use chrono::{Datelike, TimeZone, Utc};

/// Months the calendar knows about
pub fn is_valid_month(month: i32) -> bool {
    (1..=12).contains(&month)
}

/// Whether `ts` falls in `month` (UTC), in any year
pub fn in_month(ts: &Timestamp, month: i32) -> bool {
    i32::try_from(ts.month()).is_ok_and(|m| m == month)
}

/// The first instant (00:00:00 UTC) of `month` in `year`
/// None for months outside 1-12
pub fn reference_date(year: i32, month: i32) -> Option<Timestamp> {
    let month = u32::try_from(month).ok()?;
    Utc.with_ymd_and_hms(year, month, 1, 0, 0, 0).single()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_date() {
        let date = reference_date(2024, 3).unwrap();
        assert_eq!(date, Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap());
        assert_eq!(reference_date(2024, 0), None);
        assert_eq!(reference_date(2024, 13), None);
        assert_eq!(reference_date(2024, -3), None);
    }

    #[test]
    fn test_in_month_ignores_year() {
        let ts = Utc.with_ymd_and_hms(2019, 7, 31, 23, 59, 59).unwrap();
        assert!(in_month(&ts, 7));
        assert!(!in_month(&ts, 8));
        assert!(!in_month(&ts, 19));
    }

    #[test]
    fn test_is_valid_month() {
        assert!(is_valid_month(1));
        assert!(is_valid_month(12));
        assert!(!is_valid_month(0));
        assert!(!is_valid_month(13));
    }
}
