//! Shared "fetch → validate → sort → aggregate/align" logic used by both CLI and TUI front-ends.
//!
//! Keeping this in one place avoids duplicating the core workflow; the CLI
//! and the TUI only differ in presentation (printing vs widgets).

use rayon::prelude::*;

use crate::data::NavSource;
use crate::domain::{
    CalendarDate, DuplicatePolicy, FundHistory, FundIdentity, FundMeta, Granularity, NavRecord, PeriodRow,
};
use crate::error::AppError;
use crate::funds::{SanitizeRules, sanitize, sanitize_all};
use crate::series::{
    AlignedTable, DATE_KEY, FundSeries, RejectedRecord, aggregate, align, filter_range, is_reserved_code,
    sort_ascending, validate,
};

/// Optional inclusive date window applied after sorting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub from: Option<CalendarDate>,
    pub to: Option<CalendarDate>,
}

impl DateRange {
    pub fn is_open(&self) -> bool {
        self.from.is_none() && self.to.is_none()
    }
}

/// One fund's history after validation and ordering.
#[derive(Debug, Clone)]
pub struct LoadedFund {
    /// Identity with a display-ready name.
    pub fund: FundIdentity,
    pub meta: Option<FundMeta>,
    /// Ascending by date, restricted to the requested range.
    pub records: Vec<NavRecord>,
    pub rejected: Vec<RejectedRecord>,
}

impl LoadedFund {
    pub fn latest(&self) -> Option<&NavRecord> {
        crate::series::latest(&self.records)
    }

    pub fn as_series(&self) -> FundSeries {
        FundSeries::new(self.fund.code.clone(), self.records.clone())
    }
}

/// Outputs of a single-fund run.
#[derive(Debug, Clone)]
pub struct HistoryRun {
    pub loaded: LoadedFund,
    pub granularity: Granularity,
    pub periods: Vec<PeriodRow>,
}

/// Outputs of a comparison run.
#[derive(Debug, Clone)]
pub struct CompareRun {
    /// Funds that loaded, in request order.
    pub funds: Vec<LoadedFund>,
    /// Codes that failed to load, with the reason.
    pub failures: Vec<(String, String)>,
    pub table: AlignedTable,
}

/// Fetch the listing and keep only displayable, cleaned names.
pub fn list_funds(source: &dyn NavSource, rules: &SanitizeRules) -> Result<Vec<FundIdentity>, AppError> {
    let raw = source.list_funds()?;
    let cleaned = sanitize_all(&raw, rules);
    tracing::debug!(
        source = source.name(),
        raw = raw.len(),
        kept = cleaned.len(),
        "sanitized fund listing"
    );
    Ok(cleaned)
}

/// Fetch, validate, sort and range-filter one fund.
///
/// Malformed records are skipped (and logged); they never abort the load.
/// The code `date` is rejected because it names the date column of aligned output.
pub fn load_fund(source: &dyn NavSource, code: &str, range: DateRange) -> Result<LoadedFund, AppError> {
    if is_reserved_code(code) {
        return Err(AppError::new(
            2,
            format!("Fund code '{code}' is reserved for the '{DATE_KEY}' column."),
        ));
    }
    let history = source.fetch_history(code)?;
    Ok(prepare_fund(history, range))
}

/// Validate, sort and range-filter an already fetched history.
pub fn prepare_fund(history: FundHistory, range: DateRange) -> LoadedFund {
    let validated = validate(&history.data);

    for rejected in &validated.rejected {
        tracing::warn!(
            code = %history.fund.code,
            index = rejected.index,
            error = %rejected.error,
            "skipping NAV record"
        );
    }

    let sorted = sort_ascending(&validated.records);
    let records = if range.is_open() {
        sorted
    } else {
        filter_range(&sorted, range.from, range.to)
    };

    // A placeholder name is only hidden from listings; here we still need a label.
    let fund = sanitize(&history.fund, &SanitizeRules::default()).unwrap_or(history.fund);

    LoadedFund {
        fund,
        meta: history.meta,
        records,
        rejected: validated.rejected,
    }
}

/// Single-fund view: sorted series plus the period table.
pub fn run_history(
    source: &dyn NavSource,
    code: &str,
    range: DateRange,
    granularity: Granularity,
    duplicates: DuplicatePolicy,
) -> Result<HistoryRun, AppError> {
    let loaded = load_fund(source, code, range)?;
    Ok(summarize_history(loaded, granularity, duplicates))
}

/// Period table for a fund that is already loaded.
pub fn summarize_history(loaded: LoadedFund, granularity: Granularity, duplicates: DuplicatePolicy) -> HistoryRun {
    let periods = aggregate(&loaded.records, granularity, duplicates);
    HistoryRun {
        loaded,
        granularity,
        periods,
    }
}

/// Comparison view: fetch every code in parallel, then align.
///
/// A fund that fails to load is reported in `failures` and left out of the
/// table; the remaining funds are still aligned.
pub fn run_compare(source: &dyn NavSource, codes: &[String], range: DateRange) -> CompareRun {
    let results: Vec<(String, Result<LoadedFund, AppError>)> = unique_codes(codes)
        .into_par_iter()
        .map(|code| {
            let result = load_fund(source, &code, range);
            (code, result)
        })
        .collect();

    let mut funds = Vec::new();
    let mut failures = Vec::new();
    for (code, result) in results {
        match result {
            Ok(loaded) => funds.push(loaded),
            Err(err) => {
                tracing::warn!(%code, error = %err, "failed to load fund");
                failures.push((code, err.to_string()));
            }
        }
    }

    let table = align_loaded(&funds);
    CompareRun { funds, failures, table }
}

/// Align already-loaded funds (used when only the selection changed).
pub fn align_loaded(funds: &[LoadedFund]) -> AlignedTable {
    let series: Vec<FundSeries> = funds.iter().map(LoadedFund::as_series).collect();
    align(&series)
}

fn unique_codes(codes: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(codes.len());
    for code in codes {
        let code = code.trim();
        if !code.is_empty() && !out.iter().any(|c| c == code) {
            out.push(code.to_string());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::data::SampleSource;
    use crate::domain::{FundHistory, RawNavRecord};

    struct StubSource;

    impl NavSource for StubSource {
        fn name(&self) -> &str {
            "stub"
        }

        fn list_funds(&self) -> Result<Vec<FundIdentity>, AppError> {
            Ok(vec![
                FundIdentity::new("X", "as Axis Bluechip"),
                FundIdentity::new("Y", "Name"),
            ])
        }

        fn fetch_history(&self, code: &str) -> Result<FundHistory, AppError> {
            let data = match code {
                "X" => vec![
                    RawNavRecord::new("08-03-2024", "101.0"),
                    RawNavRecord::new("garbage", "1"),
                    RawNavRecord::new("01-03-2024", "100.5"),
                ],
                "Y" | "date" => vec![RawNavRecord::new("05-03-2024", "50")],
                _ => return Err(AppError::new(4, format!("no fund {code}"))),
            };
            Ok(FundHistory {
                fund: FundIdentity::new(code, format!("as Fund {code}")),
                meta: None,
                data,
            })
        }
    }

    #[test]
    fn listing_is_sanitized() {
        let funds = list_funds(&StubSource, &SanitizeRules::default()).unwrap();
        assert_eq!(funds, vec![FundIdentity::new("X", "Axis Bluechip")]);
    }

    #[test]
    fn history_skips_bad_records_and_aggregates() {
        let run = run_history(
            &StubSource,
            "X",
            DateRange::default(),
            Granularity::Weekly,
            DuplicatePolicy::CountAll,
        )
        .unwrap();
        assert_eq!(run.loaded.fund.name, "Fund X");
        assert_eq!(run.loaded.rejected.len(), 1);
        assert_eq!(run.loaded.records[0].date(), "01-03-2024");
        let periods: Vec<(&str, String)> = run
            .periods
            .iter()
            .map(|p| (p.period.as_str(), p.avg_nav.to_string()))
            .collect();
        assert_eq!(
            periods,
            vec![("2024-03-W1", "100.5000".to_string()), ("2024-03-W2", "101.0000".to_string())]
        );
        assert_eq!(run.loaded.latest().map(|r| r.date()), Some("08-03-2024"));
    }

    #[test]
    fn range_restricts_records() {
        let range = DateRange {
            from: CalendarDate::from_ymd(2024, 3, 2),
            to: None,
        };
        let loaded = load_fund(&StubSource, "X", range).unwrap();
        assert_eq!(loaded.records.len(), 1);
    }

    #[test]
    fn compare_reports_failures_and_aligns_the_rest() {
        let codes = vec!["X".to_string(), "missing".to_string(), "Y".to_string(), "X".to_string()];
        let run = run_compare(&StubSource, &codes, DateRange::default());
        assert_eq!(run.table.codes, vec!["X", "Y"]);
        assert_eq!(run.failures.len(), 1);
        assert_eq!(run.failures[0].0, "missing");
        let dates: Vec<&str> = run.table.rows.iter().map(|r| r.date.as_str()).collect();
        assert_eq!(dates, vec!["01-03-2024", "05-03-2024", "08-03-2024"]);
    }

    #[test]
    fn date_is_not_a_usable_fund_code() {
        let err = load_fund(&StubSource, "date", DateRange::default()).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.message().contains("reserved"));

        let codes = vec!["Y".to_string(), "Date".to_string()];
        let run = run_compare(&StubSource, &codes, DateRange::default());
        assert_eq!(run.table.codes, vec!["Y"]);
        assert_eq!(run.failures.len(), 1);
        assert_eq!(run.failures[0].0, "Date");

        let json = serde_json::to_value(&run.table.chart_rows()).unwrap();
        assert_eq!(json, serde_json::json!([{"date": "05-03-2024", "Y": 50.0}]));
    }

    #[test]
    fn compare_with_no_codes_is_empty() {
        let run = run_compare(&StubSource, &[], DateRange::default());
        assert!(run.table.is_empty());
        assert!(run.funds.is_empty());
    }

    #[test]
    fn sample_source_runs_end_to_end() {
        let source = SampleSource::new(1, NaiveDate::from_ymd_opt(2024, 6, 28).unwrap(), 120);
        let run = run_history(&source, "900002", DateRange::default(), Granularity::Monthly, DuplicatePolicy::CountAll)
            .unwrap();
        assert!(run.loaded.rejected.is_empty());
        assert!(run.periods.len() >= 6);
        assert!(run.periods.windows(2).all(|w| w[0].key.representative_date() < w[1].key.representative_date()));
    }
}
