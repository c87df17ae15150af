//! Calendar helpers.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};

/// Re-anchors the wall-clock time of `instant` onto `date` (UTC).
///
/// Schedule entries carry a calendar date plus start/end instants; the
/// instants are normalized so their date component always matches the entry.
pub fn anchor_on_date(date: NaiveDate, instant: DateTime<Utc>) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_time(instant.time()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anchor_on_date_keeps_time() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
        let instant = Utc.with_ymd_and_hms(2020, 1, 1, 9, 30, 15).unwrap();
        let anchored = anchor_on_date(date, instant);
        assert_eq!(anchored, Utc.with_ymd_and_hms(2024, 3, 4, 9, 30, 15).unwrap());
    }

    #[test]
    fn test_anchor_on_same_date_is_identity() {
        let instant = Utc.with_ymd_and_hms(2024, 3, 4, 17, 0, 0).unwrap();
        assert_eq!(anchor_on_date(instant.date_naive(), instant), instant);
    }
}
