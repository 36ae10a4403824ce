//! Date helpers for spreadsheet and Unix timestamps.
//!
//! Excel serial numbers count days from 1899-12-30 (so `45132` is 2023-07-25). The
//! 1900 leap-year bug is not emulated: serials before 61 map to the true calendar date.

use chrono::{DateTime, Datelike, NaiveDate, Utc};

/// `NaiveDate::num_days_from_ce` of 1899-12-30.
const EXCEL_EPOCH_DAYS_FROM_CE: i64 = 693_594;

/// Calendar date for an Excel serial day number, or `None` if out of range.
pub fn from_excel_serial(serial: i64) -> Option<NaiveDate> {
    let days = i32::try_from(EXCEL_EPOCH_DAYS_FROM_CE.checked_add(serial)?).ok()?;
    NaiveDate::from_num_days_from_ce_opt(days)
}

/// Excel serial day number for a calendar date.
pub fn to_excel_serial(date: NaiveDate) -> i64 {
    i64::from(date.num_days_from_ce()) - EXCEL_EPOCH_DAYS_FROM_CE
}

/// UTC instant for a Unix timestamp in seconds, or `None` if out of range.
pub fn from_unix_seconds(seconds: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(seconds, 0)
}

/// Whole seconds since the Unix epoch (sub-second parts are floored).
pub fn to_unix_seconds(instant: &DateTime<Utc>) -> i64 {
    instant.timestamp()
}

/// ISO `YYYY-MM-DD` string for a calendar date; `None` for impossible dates (no rollover).
pub fn iso_date(year: i32, month: u32, day: u32) -> Option<String> {
    NaiveDate::from_ymd_opt(year, month, day).map(|d| d.format("%Y-%m-%d").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn excel_serials_round_trip() {
        assert_eq!(from_excel_serial(45132), Some(ymd(2023, 7, 25)));
        assert_eq!(to_excel_serial(ymd(2023, 7, 25)), 45132);
        assert_eq!(from_excel_serial(0), Some(ymd(1899, 12, 30)));
        assert_eq!(to_excel_serial(ymd(1900, 3, 1)), 61);
        assert_eq!(from_excel_serial(i64::MAX), None);
    }

    #[test]
    fn unix_seconds_round_trip() {
        let instant = from_unix_seconds(1_690_243_200).unwrap();
        assert_eq!(instant.date_naive(), ymd(2023, 7, 25));
        assert_eq!(to_unix_seconds(&instant), 1_690_243_200);
        assert!(from_unix_seconds(i64::MAX).is_none());
    }

    #[test]
    fn iso_date_is_zero_padded_and_rejects_invalid_dates() {
        assert_eq!(iso_date(2023, 7, 5).as_deref(), Some("2023-07-05"));
        assert_eq!(iso_date(2023, 2, 30), None);
        assert_eq!(iso_date(2023, 13, 1), None);
    }
}
