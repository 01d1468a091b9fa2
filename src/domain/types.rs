//! Shared domain types.
//!
//! These types are kept small and serializable so they can be:
//!
//! - produced by any data source (HTTP feed, CSV, JSON snapshot, synthetic)
//! - fed through the series engine
//! - exported to JSON/CSV for the rendering side

use std::fmt;

use chrono::{Datelike, NaiveDate};
use clap::ValueEnum;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::NavError;

/// A calendar day with a total order over `(year, month, day)`.
///
/// Built only by the date normalizer (`series::date::parse_date`) or from a
/// valid `chrono::NaiveDate`, never by string surgery at call sites.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CalendarDate {
    year: i32,
    month: u32,
    day: u32,
}

impl CalendarDate {
    /// Build a date from components, rejecting days that do not exist.
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self::from_naive)
    }

    pub fn from_naive(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
            day: date.day(),
        }
    }

    /// Ordering-only constructor used for period representatives.
    ///
    /// Callers guarantee `month` in `1..=12` and `day` in `1..=29`.
    pub(crate) const fn representative(year: i32, month: u32, day: u32) -> Self {
        Self { year, month, day }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn day(&self) -> u32 {
        self.day
    }

    pub fn to_naive(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, self.day)
    }

    /// Canonical zero-padded `DD-MM-YYYY` text.
    pub fn to_dmy(&self) -> String {
        format!("{:02}-{:02}-{:04}", self.day, self.month, self.year)
    }
}

impl fmt::Display for CalendarDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

/// Largest NAV a record may carry.
///
/// Sums of a bucket stay far below `Decimal::MAX` with values under this bound.
pub const MAX_NAV: Decimal = Decimal::from_parts(0xA4C6_8000, 0x0003_8D7E, 0, false, 0);

/// A validated NAV observation.
///
/// `date` keeps the original text (used for daily period keys and for the
/// shared x-axis of aligned tables); `day` is its parsed calendar value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavRecord {
    date: String,
    day: CalendarDate,
    nav: Decimal,
}

impl NavRecord {
    /// Validate a `DD-MM-YYYY` date and a NAV in `0..=MAX_NAV`.
    pub fn new(date: &str, nav: Decimal) -> Result<Self, NavError> {
        let day = crate::series::date::parse_date(date)?;
        if nav < Decimal::ZERO || nav > MAX_NAV {
            return Err(NavError::InvalidNav {
                date: date.to_string(),
                value: nav.to_string(),
            });
        }
        Ok(Self {
            date: date.to_string(),
            day,
            nav,
        })
    }

    pub fn date(&self) -> &str {
        &self.date
    }

    pub fn day(&self) -> CalendarDate {
        self.day
    }

    pub fn nav(&self) -> Decimal {
        self.nav
    }
}

/// NAV value as it arrives in untyped payloads: usually a string, sometimes a number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NavValue {
    Text(String),
    Number(f64),
}

impl From<&str> for NavValue {
    fn from(value: &str) -> Self {
        NavValue::Text(value.to_string())
    }
}

impl fmt::Display for NavValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NavValue::Text(s) => write!(f, "{s}"),
            NavValue::Number(v) => write!(f, "{v}"),
        }
    }
}

/// A NAV record before validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawNavRecord {
    pub date: String,
    pub nav: NavValue,
}

impl RawNavRecord {
    pub fn new(date: impl Into<String>, nav: impl Into<NavValue>) -> Self {
        Self {
            date: date.into(),
            nav: nav.into(),
        }
    }
}

/// Stable fund key (`code`) plus a display name that may carry feed noise.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FundIdentity {
    pub code: String,
    pub name: String,
}

impl FundIdentity {
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
        }
    }
}

/// Descriptive fund metadata, passed through to the display layer untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FundMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fund_house: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheme_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheme_category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheme_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheme_name: Option<String>,
}

/// One fund's history exactly as a data source returned it.
///
/// This is also the on-disk JSON snapshot schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FundHistory {
    pub fund: FundIdentity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<FundMeta>,
    pub data: Vec<RawNavRecord>,
}

/// Aggregation period for the NAV history table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Daily,
    #[default]
    Weekly,
    Monthly,
    Yearly,
}

impl Granularity {
    pub const ALL: [Granularity; 4] = [
        Granularity::Daily,
        Granularity::Weekly,
        Granularity::Monthly,
        Granularity::Yearly,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            Granularity::Daily => "Daily",
            Granularity::Weekly => "Weekly",
            Granularity::Monthly => "Monthly",
            Granularity::Yearly => "Yearly",
        }
    }

    pub fn next(&self) -> Self {
        match self {
            Granularity::Daily => Granularity::Weekly,
            Granularity::Weekly => Granularity::Monthly,
            Granularity::Monthly => Granularity::Yearly,
            Granularity::Yearly => Granularity::Daily,
        }
    }

    pub fn prev(&self) -> Self {
        match self {
            Granularity::Daily => Granularity::Yearly,
            Granularity::Weekly => Granularity::Daily,
            Granularity::Monthly => Granularity::Weekly,
            Granularity::Yearly => Granularity::Monthly,
        }
    }
}

/// How records sharing the same date string feed a period average.
///
/// `CountAll` keeps the historical behavior where a duplicated date
/// contributes once per occurrence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum DuplicatePolicy {
    #[default]
    CountAll,
    KeepFirst,
    KeepLast,
}

/// Bucket identity for one aggregation period.
///
/// Renders as `DD-MM-YYYY` (original text), `YYYY-MM-W{n}`, `YYYY-MM` or `YYYY`.
/// Ordering is by [`PeriodKey::representative_date`], not by the string.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PeriodKey {
    Day { text: String, date: CalendarDate },
    Week { year: i32, month: u32, week: u32 },
    Month { year: i32, month: u32 },
    Year { year: i32 },
}

impl PeriodKey {
    /// The calendar day that stands for this bucket when ordering keys.
    ///
    /// Week `n` maps to day `(n - 1) * 7 + 1`, months to their 1st, years to 1 January.
    pub fn representative_date(&self) -> CalendarDate {
        match self {
            PeriodKey::Day { date, .. } => *date,
            PeriodKey::Week { year, month, week } => {
                CalendarDate::representative(*year, *month, (week - 1) * 7 + 1)
            }
            PeriodKey::Month { year, month } => CalendarDate::representative(*year, *month, 1),
            PeriodKey::Year { year } => CalendarDate::representative(*year, 1, 1),
        }
    }
}

impl fmt::Display for PeriodKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PeriodKey::Day { text, .. } => write!(f, "{text}"),
            PeriodKey::Week { year, month, week } => write!(f, "{year:04}-{month:02}-W{week}"),
            PeriodKey::Month { year, month } => write!(f, "{year:04}-{month:02}"),
            PeriodKey::Year { year } => write!(f, "{year:04}"),
        }
    }
}

/// One line of the period aggregate table.
///
/// Serializes as `{ "period": "...", "avgNav": "123.4500" }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PeriodRow {
    pub period: String,
    /// Mean NAV rounded to 4 decimal places, scale fixed at 4.
    #[serde(rename = "avgNav")]
    pub avg_nav: Decimal,
    #[serde(skip)]
    pub key: PeriodKey,
    /// Number of records that contributed to the mean.
    #[serde(skip)]
    pub count: usize,
}

/// A point of the single-fund chart series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub date: String,
    pub nav: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn calendar_date_orders_by_year_then_month_then_day() {
        let a = CalendarDate::from_ymd(2023, 12, 31).unwrap();
        let b = CalendarDate::from_ymd(2024, 1, 1).unwrap();
        let c = CalendarDate::from_ymd(2024, 1, 2).unwrap();
        assert!(a < b && b < c);
        assert!(CalendarDate::from_ymd(2023, 2, 29).is_none());
        assert_eq!(b.to_dmy(), "01-01-2024");
    }

    #[test]
    fn period_key_renders_and_orders_by_representative_date() {
        let week = PeriodKey::Week { year: 2024, month: 3, week: 5 };
        let month = PeriodKey::Month { year: 2024, month: 11 };
        let year = PeriodKey::Year { year: 2025 };
        assert_eq!(week.to_string(), "2024-03-W5");
        assert_eq!(month.to_string(), "2024-11");
        assert_eq!(year.to_string(), "2025");
        assert_eq!(week.representative_date(), CalendarDate::from_ymd(2024, 3, 29).unwrap());
        assert!(month.representative_date() < year.representative_date());
    }

    #[test]
    fn negative_nav_is_rejected() {
        let err = NavRecord::new("01-01-2024", Decimal::new(-5, 1)).unwrap_err();
        assert!(matches!(err, NavError::InvalidNav { .. }));
    }

    #[test]
    fn nav_above_the_bound_is_rejected() {
        assert_eq!(MAX_NAV, Decimal::new(1_000_000_000_000_000, 0));
        assert!(NavRecord::new("01-01-2024", MAX_NAV).is_ok());
        let err = NavRecord::new("01-01-2024", Decimal::MAX).unwrap_err();
        assert!(matches!(err, NavError::InvalidNav { .. }));
    }

    #[test]
    fn raw_record_accepts_text_or_number_nav() {
        let text: RawNavRecord = serde_json::from_str(r#"{"date":"01-01-2024","nav":"10.5"}"#).unwrap();
        let num: RawNavRecord = serde_json::from_str(r#"{"date":"01-01-2024","nav":10.5}"#).unwrap();
        assert_eq!(text.nav, NavValue::Text("10.5".to_string()));
        assert_eq!(num.nav, NavValue::Number(10.5));
    }
}
