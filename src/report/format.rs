//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the series engine stays free of presentation concerns
//! - output changes are localized (important for snapshot-style tests)

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use crate::app::pipeline::{CompareRun, HistoryRun, LoadedFund};
use crate::domain::{FundIdentity, Granularity, PeriodRow};
use crate::report::palette::color_for;
use crate::series::AlignedTable;

/// Shown wherever a table or chart has nothing in it.
pub const NO_DATA: &str = "No data to display";

/// Percentage change from `first` to `last`.
///
/// `None` when `first` is zero or the ratio does not fit a `Decimal`.
pub fn change_pct(first: Decimal, last: Decimal) -> Option<f64> {
    if first.is_zero() {
        return None;
    }
    last.checked_sub(first)?
        .checked_div(first)?
        .checked_mul(Decimal::ONE_HUNDRED)?
        .to_f64()
}

/// Fund listing: one `code  name` line per fund.
pub fn format_fund_list(funds: &[FundIdentity]) -> String {
    if funds.is_empty() {
        return format!("{NO_DATA}\n");
    }
    let width = funds.iter().map(|f| f.code.len()).max().unwrap_or(0);
    let mut out = String::new();
    for f in funds {
        out.push_str(&format!("{:>width$}  {}\n", f.code, f.name));
    }
    out.push_str(&format!("({} funds)\n", funds.len()));
    out
}

/// Header block for a single fund: identity, metadata, current NAV and range.
pub fn format_fund_summary(loaded: &LoadedFund) -> String {
    let mut out = String::new();
    out.push_str(&format!("=== {} ({}) ===\n", loaded.fund.name, loaded.fund.code));

    if let Some(meta) = &loaded.meta {
        if let Some(house) = &meta.fund_house {
            out.push_str(&format!("Fund house: {house}\n"));
        }
        if let Some(category) = &meta.scheme_category {
            out.push_str(&format!("Category: {category}\n"));
        }
    }

    match loaded.latest() {
        Some(latest) => out.push_str(&format!("Current NAV: {} ({})\n", latest.nav(), latest.date())),
        None => out.push_str("Current NAV: -\n"),
    }

    if let (Some(first), Some(last)) = (loaded.records.first(), loaded.records.last()) {
        let change = change_pct(first.nav(), last.nav())
            .map(|c| format!("{c:+.2}%"))
            .unwrap_or_else(|| "-".to_string());
        out.push_str(&format!(
            "History: n={} | {} → {} | change {change}\n",
            loaded.records.len(),
            first.date(),
            last.date(),
        ));
    }

    if !loaded.rejected.is_empty() {
        out.push_str(&format!("Skipped {} malformed record(s).\n", loaded.rejected.len()));
    }

    out
}

/// The period aggregate table.
pub fn format_periods(rows: &[PeriodRow], granularity: Granularity) -> String {
    let mut out = format!("{} NAV history:\n", granularity.display_name());
    if rows.is_empty() {
        out.push_str(&format!("{NO_DATA}\n"));
        return out;
    }

    let period_w = rows.iter().map(|r| r.period.len()).max().unwrap_or(0).max("Period".len());
    let nav_w = rows.iter().map(|r| r.avg_nav.to_string().len()).max().unwrap_or(0).max("Avg NAV".len());

    out.push_str(&format!("{:<period_w$}  {:>nav_w$}  {:>5}\n", "Period", "Avg NAV", "n"));
    out.push_str(&format!("{}  {}  {}\n", "-".repeat(period_w), "-".repeat(nav_w), "-".repeat(5)));
    for r in rows {
        out.push_str(&format!(
            "{:<period_w$}  {:>nav_w$}  {:>5}\n",
            r.period,
            r.avg_nav.to_string(),
            r.count
        ));
    }
    out
}

/// Full single-fund report.
pub fn format_history_run(run: &HistoryRun) -> String {
    let mut out = format_fund_summary(&run.loaded);
    out.push('\n');
    out.push_str(&format_periods(&run.periods, run.granularity));
    out
}

/// Legend and load status for a comparison.
pub fn format_compare_summary(run: &CompareRun) -> String {
    let mut out = String::from("=== Fund comparison ===\n");
    if run.funds.is_empty() && run.failures.is_empty() {
        out.push_str("No funds selected.\n");
    }

    for (i, fund) in run.funds.iter().enumerate() {
        let latest = fund
            .latest()
            .map(|r| format!("{} ({})", r.nav(), r.date()))
            .unwrap_or_else(|| "-".to_string());
        out.push_str(&format!(
            "[{}] {} {} | n={} | latest {latest}\n",
            series_marker(i),
            color_for(i),
            fund.fund.name,
            fund.records.len(),
        ));
    }

    for (code, reason) in &run.failures {
        out.push_str(&format!("! {code}: {reason}\n"));
    }

    out.push_str(&format!("Aligned dates: {}\n", run.table.rows.len()));
    out
}

/// The last `max_rows` rows of the aligned matrix, `-` for missing values.
pub fn format_aligned(table: &AlignedTable, max_rows: usize) -> String {
    if table.is_empty() {
        return format!("{NO_DATA}\n");
    }

    let col_w = table
        .codes
        .iter()
        .map(|c| c.len())
        .chain(table.rows.iter().flat_map(|r| r.values.iter().flatten().map(|v| v.to_string().len())))
        .max()
        .unwrap_or(1);
    let date_w = table.rows.iter().map(|r| r.date.len()).max().unwrap_or(10).max(4);

    let mut out = format!("{:<date_w$}", "Date");
    for code in &table.codes {
        out.push_str(&format!("  {code:>col_w$}"));
    }
    out.push('\n');

    let skip = table.rows.len().saturating_sub(max_rows);
    if skip > 0 {
        out.push_str(&format!("… {skip} earlier row(s)\n"));
    }
    for row in table.rows.iter().skip(skip) {
        out.push_str(&format!("{:<date_w$}", row.date));
        for value in &row.values {
            let cell = value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string());
            out.push_str(&format!("  {cell:>col_w$}"));
        }
        out.push('\n');
    }
    out
}

/// Single-character marker of the `index`-th series in text plots.
pub fn series_marker(index: usize) -> char {
    const MARKERS: &[u8] = b"123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";
    MARKERS[index % MARKERS.len()] as char
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;
    use crate::domain::{DuplicatePolicy, NavRecord};
    use crate::series::{FundSeries, aggregate, align};

    #[test]
    fn empty_tables_say_no_data() {
        assert!(format_periods(&[], Granularity::Weekly).contains(NO_DATA));
        assert!(format_aligned(&AlignedTable::default(), 10).contains(NO_DATA));
        assert!(format_fund_list(&[]).contains(NO_DATA));
    }

    #[test]
    fn period_table_lists_rows_in_order() {
        let records = vec![
            NavRecord::new("01-03-2024", dec!(100.5)).unwrap(),
            NavRecord::new("08-03-2024", dec!(101)).unwrap(),
        ];
        let rows = aggregate(&records, Granularity::Weekly, DuplicatePolicy::CountAll);
        let text = format_periods(&rows, Granularity::Weekly);
        let w1 = text.find("2024-03-W1  100.5000").unwrap();
        let w2 = text.find("2024-03-W2  101.0000").unwrap();
        assert!(w1 < w2);
    }

    #[test]
    fn aligned_table_shows_gaps_and_truncates() {
        let table = align(&[
            FundSeries::new(
                "A",
                vec![
                    NavRecord::new("01-01-2024", dec!(1)).unwrap(),
                    NavRecord::new("02-01-2024", dec!(2)).unwrap(),
                ],
            ),
            FundSeries::new("B", vec![NavRecord::new("03-01-2024", dec!(3)).unwrap()]),
        ]);
        let text = format_aligned(&table, 2);
        assert!(text.contains("1 earlier row(s)"));
        assert!(!text.contains("01-01-2024"));
        assert!(text.contains("02-01-2024  2  -"));
        assert!(text.contains("03-01-2024  -  3"));
    }

    #[test]
    fn change_pct_handles_zero_start() {
        assert_eq!(change_pct(dec!(0), dec!(5)), None);
        assert!((change_pct(dec!(100), dec!(110)).unwrap() - 10.0).abs() < 1e-9);
    }

    #[test]
    fn change_pct_is_none_when_the_ratio_overflows() {
        assert_eq!(change_pct(dec!(0.0000001), Decimal::MAX), None);
        assert_eq!(change_pct(dec!(0.0000001), dec!(79228162514264337593543950)), None);
    }
}
