//! Boundary validation of untyped NAV payloads.
//!
//! Each raw record yields either a `NavRecord` or a `NavError`. A bad record
//! never aborts the batch and never receives a fabricated date.

use std::str::FromStr;

use rust_decimal::Decimal;

use crate::domain::{NavRecord, NavValue, RawNavRecord};
use crate::error::NavError;

/// Validated records plus the ones that failed, in input order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidatedSeries {
    pub records: Vec<NavRecord>,
    pub rejected: Vec<RejectedRecord>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RejectedRecord {
    /// Position in the raw input.
    pub index: usize,
    pub raw: RawNavRecord,
    pub error: NavError,
}

impl TryFrom<&RawNavRecord> for NavRecord {
    type Error = NavError;

    fn try_from(raw: &RawNavRecord) -> Result<Self, Self::Error> {
        // Date first, so a record with both problems reports the date.
        crate::series::date::parse_date(&raw.date)?;
        let nav = parse_nav(&raw.nav).ok_or_else(|| NavError::InvalidNav {
            date: raw.date.clone(),
            value: raw.nav.to_string(),
        })?;
        NavRecord::new(&raw.date, nav)
    }
}

/// Validate a batch, skipping and collecting the records that fail.
pub fn validate(raw: &[RawNavRecord]) -> ValidatedSeries {
    let mut out = ValidatedSeries {
        records: Vec::with_capacity(raw.len()),
        rejected: Vec::new(),
    };

    for (index, item) in raw.iter().enumerate() {
        match NavRecord::try_from(item) {
            Ok(record) => out.records.push(record),
            Err(error) => out.rejected.push(RejectedRecord {
                index,
                raw: item.clone(),
                error,
            }),
        }
    }

    out
}

fn parse_nav(value: &NavValue) -> Option<Decimal> {
    let parsed = match value {
        NavValue::Text(s) => Decimal::from_str(s.trim()).ok()?,
        NavValue::Number(v) => {
            if !v.is_finite() {
                return None;
            }
            // `f64` Display is the shortest round-trip form, so 100.5 stays 100.5.
            Decimal::from_str(&v.to_string()).ok()?
        }
    };
    if parsed < Decimal::ZERO { None } else { Some(parsed) }
}
