//! `DD-MM-YYYY` parsing and period-key derivation.
//!
//! Feed dates are day-first. They are split and reordered to year-month-day
//! before any calendar value is built; nothing here ever feeds the raw text
//! to a year-first parser.

use crate::domain::{CalendarDate, Granularity, NavRecord, PeriodKey};
use crate::error::NavError;

/// Parse `DD-MM-YYYY` (day and month 1–2 digits, year 4 digits).
///
/// The result must be a real calendar day: `31-02-2024` is malformed.
pub fn parse_date(s: &str) -> Result<CalendarDate, NavError> {
    let malformed = || NavError::MalformedDate { input: s.to_string() };

    let mut parts = s.split('-');
    let (Some(day), Some(month), Some(year), None) = (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(malformed());
    };

    if !is_digits(day, 1..=2) || !is_digits(month, 1..=2) || !is_digits(year, 4..=4) {
        return Err(malformed());
    }

    let day: u32 = day.parse().map_err(|_| malformed())?;
    let month: u32 = month.parse().map_err(|_| malformed())?;
    let year: i32 = year.parse().map_err(|_| malformed())?;

    CalendarDate::from_ymd(year, month, day).ok_or_else(malformed)
}

/// Week-of-month bucket: `ceil(day / 7)`, so days 29–31 land in week 5.
///
/// This is not an ISO week.
pub fn week_of_month(date: CalendarDate) -> u32 {
    date.day().div_ceil(7)
}

/// Bucket key for a validated record.
pub fn period_key(record: &NavRecord, granularity: Granularity) -> PeriodKey {
    key_for(record.date(), record.day(), granularity)
}

/// Bucket key for a date whose original text is `text`.
pub fn key_for(text: &str, date: CalendarDate, granularity: Granularity) -> PeriodKey {
    match granularity {
        Granularity::Daily => PeriodKey::Day {
            text: text.to_string(),
            date,
        },
        Granularity::Weekly => PeriodKey::Week {
            year: date.year(),
            month: date.month(),
            week: week_of_month(date),
        },
        Granularity::Monthly => PeriodKey::Month {
            year: date.year(),
            month: date.month(),
        },
        Granularity::Yearly => PeriodKey::Year { year: date.year() },
    }
}

fn is_digits(s: &str, len: std::ops::RangeInclusive<usize>) -> bool {
    len.contains(&s.len()) && s.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_day_first_components() {
        let d = parse_date("08-03-2024").unwrap();
        assert_eq!((d.year(), d.month(), d.day()), (2024, 3, 8));

        let short = parse_date("1-3-2024").unwrap();
        assert_eq!((short.year(), short.month(), short.day()), (2024, 3, 1));
    }

    #[test]
    fn round_trips_components_across_a_year() {
        let mut date = chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let end = chrono::NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        while date < end {
            let expected = CalendarDate::from_naive(date);
            assert_eq!(parse_date(&expected.to_dmy()).unwrap(), expected);
            date = date.succ_opt().unwrap();
        }
    }

    #[test]
    fn rejects_other_shapes() {
        for bad in [
            "2024-03-01",
            "01/03/2024",
            "01-03-24",
            "001-03-2024",
            "01-03-2024-1",
            " 01-03-2024",
            "aa-03-2024",
            "",
            "31-02-2024",
            "00-01-2024",
            "15-13-2024",
        ] {
            assert!(
                matches!(parse_date(bad), Err(NavError::MalformedDate { .. })),
                "expected '{bad}' to be malformed"
            );
        }
    }

    #[test]
    fn week_of_month_is_ceil_day_over_seven() {
        let cases = [(1, 1), (7, 1), (8, 2), (14, 2), (15, 3), (22, 4), (28, 4), (29, 5), (31, 5)];
        for (day, week) in cases {
            let d = CalendarDate::from_ymd(2024, 3, day).unwrap();
            assert_eq!(week_of_month(d), week, "day {day}");
        }
    }

    #[test]
    fn keys_render_per_granularity() {
        let record = NavRecord::new("1-3-2024", rust_decimal::Decimal::ONE).unwrap();
        assert_eq!(period_key(&record, Granularity::Daily).to_string(), "1-3-2024");
        assert_eq!(period_key(&record, Granularity::Weekly).to_string(), "2024-03-W1");
        assert_eq!(period_key(&record, Granularity::Monthly).to_string(), "2024-03");
        assert_eq!(period_key(&record, Granularity::Yearly).to_string(), "2024");

        let late = NavRecord::new("31-12-2024", rust_decimal::Decimal::ONE).unwrap();
        assert_eq!(period_key(&late, Granularity::Weekly).to_string(), "2024-12-W5");
    }
}
