//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - calendar values and validated NAV records (`CalendarDate`, `NavRecord`)
//! - raw payload shapes from data sources (`RawNavRecord`, `FundHistory`)
//! - aggregation settings and outputs (`Granularity`, `PeriodKey`, `PeriodRow`)

pub mod types;

pub use types::*;
