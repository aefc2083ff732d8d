//! Date/time boundary helpers, grounded in
//! `original_source/meteostat/utils/parsers.py` and
//! `tests/unit/test_parsers_time.py`.
//!
//! Rust's `Option<T>` already rules out the "falsy sentinel" ambiguity the
//! Python version guards against (`0`, `""`), so these only need to decide
//! start-of-period vs end-of-period boundaries.

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime};

/// Expand a calendar date to the first or last instant of that day.
pub fn parse_time(date: NaiveDate, is_end: bool) -> NaiveDateTime {
    let time = if is_end {
        NaiveTime::from_hms_opt(23, 59, 59).unwrap()
    } else {
        NaiveTime::from_hms_opt(0, 0, 0).unwrap()
    };
    NaiveDateTime::new(date, time)
}

/// Expand a date to the first or last day of its month.
pub fn parse_month(date: NaiveDate, is_end: bool) -> NaiveDate {
    if !is_end {
        return NaiveDate::from_ymd_opt(date.year(), date.month(), 1).unwrap();
    }
    let (next_year, next_month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .unwrap()
        .pred_opt()
        .unwrap()
}

/// Expand a bare year to the first or last day of that year.
pub fn parse_year(year: i32, is_end: bool) -> NaiveDate {
    if is_end {
        NaiveDate::from_ymd_opt(year, 12, 31).unwrap()
    } else {
        NaiveDate::from_ymd_opt(year, 1, 1).unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_time_start_and_end_of_day() {
        let d = NaiveDate::from_ymd_opt(2020, 1, 15).unwrap();
        assert_eq!(parse_time(d, false).time(), NaiveTime::from_hms_opt(0, 0, 0).unwrap());
        assert_eq!(parse_time(d, true).time(), NaiveTime::from_hms_opt(23, 59, 59).unwrap());
    }

    #[test]
    fn parse_month_leap_year_february() {
        let d = NaiveDate::from_ymd_opt(2020, 2, 15).unwrap();
        assert_eq!(parse_month(d, true).day(), 29);
    }

    #[test]
    fn parse_month_non_leap_year_february() {
        let d = NaiveDate::from_ymd_opt(2021, 2, 15).unwrap();
        assert_eq!(parse_month(d, true).day(), 28);
    }

    #[test]
    fn parse_month_december_rolls_into_next_year_minus_one_day() {
        let d = NaiveDate::from_ymd_opt(2020, 12, 15).unwrap();
        let end = parse_month(d, true);
        assert_eq!(end.month(), 12);
        assert_eq!(end.day(), 31);
    }

    #[test]
    fn parse_year_boundaries() {
        assert_eq!(parse_year(2020, false), NaiveDate::from_ymd_opt(2020, 1, 1).unwrap());
        assert_eq!(parse_year(2020, true), NaiveDate::from_ymd_opt(2020, 12, 31).unwrap());
    }
}
