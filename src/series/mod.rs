//! NAV time-series engine.
//!
//! Pure, synchronous transformations over in-memory records:
//!
//! - `date`: `DD-MM-YYYY` parsing and period keys
//! - `record`: validation of raw payload records
//! - `sort`: chronological ordering, range filter, latest record
//! - `aggregate`: daily/weekly/monthly/yearly averages
//! - `align`: union-of-dates matrix across several funds
//!
//! Nothing here holds state between calls, so concurrent callers need no locking.

pub mod aggregate;
pub mod align;
pub mod date;
pub mod record;
pub mod sort;

pub use aggregate::aggregate;
pub use align::{AlignedRow, AlignedTable, ChartRow, DATE_KEY, FundSeries, align, is_reserved_code};
pub use date::{parse_date, period_key};
pub use record::{RejectedRecord, ValidatedSeries, validate};
pub use sort::{chart_points, filter_range, latest, sort_ascending};
