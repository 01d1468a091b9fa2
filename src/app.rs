//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - picks a NAV source (mfapi, synthetic sample, or a local file)
//! - runs the history/compare pipelines
//! - prints reports/plots
//! - writes optional exports

use std::collections::BTreeMap;

use clap::Parser;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use crate::cli::{Command, CompareArgs, FundsArgs, HistoryArgs, RangeArgs, SourceArgs};
use crate::config::AppConfig;
use crate::data::{FileSource, MfapiClient, NavSource, SampleSource};
use crate::domain::{PeriodRow, SeriesPoint};
use crate::error::AppError;
use crate::funds::SanitizeRules;
use crate::series::{ChartRow, parse_date};

pub mod pipeline;

use pipeline::{CompareRun, DateRange, HistoryRun};

/// Entry point for the `nav` binary.
pub fn run() -> Result<(), AppError> {
    // We want bare `nav` (and `nav --sample ...`) to behave like `nav tui ...`.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);
    let config = AppConfig::from_env()?;

    // Log lines would tear through the alternate screen, so the TUI runs without a subscriber.
    if !matches!(cli.command, Command::Tui(_)) {
        init_logging(&config);
    }

    match cli.command {
        Command::Funds(args) => handle_funds(args, &config),
        Command::History(args) => handle_history(args, &config),
        Command::Compare(args) => handle_compare(args, &config),
        Command::Tui(args) => {
            let source = open_source(&args.source, &config)?;
            crate::tui::run(source, args.codes, args.granularity)
        }
    }
}

fn init_logging(config: &AppConfig) {
    let filter = EnvFilter::try_new(&config.log_filter).unwrap_or_else(|_| EnvFilter::new("warn"));
    // A second init (tests, embedding) is harmless; keep the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Build the NAV source selected on the command line.
pub fn open_source(args: &SourceArgs, config: &AppConfig) -> Result<Box<dyn NavSource>, AppError> {
    if let Some(path) = &args.file {
        return Ok(Box::new(FileSource::open(path)?));
    }
    if args.sample {
        let end = chrono::Local::now().date_naive();
        return Ok(Box::new(SampleSource::new(args.seed, end, args.sample_days)));
    }
    Ok(Box::new(MfapiClient::new(config)?))
}

/// Parse `--from/--to` (`DD-MM-YYYY`).
pub fn date_range(args: &RangeArgs) -> Result<DateRange, AppError> {
    let parse = |flag: &str, value: &Option<String>| -> Result<_, AppError> {
        value
            .as_deref()
            .map(|text| {
                parse_date(text.trim()).map_err(|e| AppError::new(2, format!("Invalid {flag}: {e}")))
            })
            .transpose()
    };

    let range = DateRange {
        from: parse("--from", &args.from)?,
        to: parse("--to", &args.to)?,
    };

    if let (Some(from), Some(to)) = (range.from, range.to) {
        if from > to {
            return Err(AppError::new(2, format!("--from {from} is after --to {to}.")));
        }
    }
    Ok(range)
}

fn handle_funds(args: FundsArgs, config: &AppConfig) -> Result<(), AppError> {
    let source = open_source(&args.source, config)?;
    let mut funds = pipeline::list_funds(source.as_ref(), &SanitizeRules::default())?;
    if let Some(limit) = args.limit {
        funds.truncate(limit);
    }

    if args.json {
        println!("{}", to_json(&funds)?);
    } else {
        print!("{}", crate::report::format_fund_list(&funds));
    }
    Ok(())
}

#[derive(Serialize)]
struct HistoryJson<'a> {
    code: &'a str,
    name: &'a str,
    series: Vec<SeriesPoint>,
    periods: &'a [PeriodRow],
}

impl<'a> HistoryJson<'a> {
    fn from_run(run: &'a HistoryRun) -> Self {
        Self {
            code: &run.loaded.fund.code,
            name: &run.loaded.fund.name,
            series: crate::series::chart_points(&run.loaded.records),
            periods: &run.periods,
        }
    }
}

fn handle_history(args: HistoryArgs, config: &AppConfig) -> Result<(), AppError> {
    let range = date_range(&args.range)?;

    let source = open_source(&args.source, config)?;
    // With `--file` the code is optional: the file names its own fund.
    let code = match (&args.code, &args.source.file) {
        (Some(code), _) => code.trim().to_string(),
        (None, Some(_)) => first_fund_code(source.as_ref())?,
        (None, None) => return Err(AppError::new(2, "Missing scheme code (e.g. `nav history 120465`).")),
    };

    let run = match &args.save {
        Some(path) => {
            let history = source.fetch_history(&code)?;
            crate::io::write_history_json(path, &history)?;
            tracing::info!(path = %path.display(), "saved history snapshot");
            let loaded = pipeline::prepare_fund(history, range);
            pipeline::summarize_history(loaded, args.granularity, args.duplicates)
        }
        None => pipeline::run_history(source.as_ref(), &code, range, args.granularity, args.duplicates)?,
    };

    if args.json {
        println!("{}", to_json(&HistoryJson::from_run(&run))?);
    } else {
        print!("{}", crate::report::format_history_run(&run));
        if args.plot {
            println!();
            print!(
                "{}",
                crate::plot::render_series_plot(&run.loaded.records, args.width, args.height)
            );
        }
    }

    if let Some(path) = &args.export {
        crate::io::write_periods_csv(path, &run.periods)?;
    }
    Ok(())
}

fn first_fund_code(source: &dyn NavSource) -> Result<String, AppError> {
    source
        .list_funds()?
        .into_iter()
        .next()
        .map(|f| f.code)
        .ok_or_else(|| AppError::new(2, "The file does not name a fund."))
}

#[derive(Serialize)]
struct CompareJson<'a> {
    codes: &'a [String],
    colors: BTreeMap<String, &'static str>,
    rows: Vec<ChartRow<'a>>,
    failures: BTreeMap<&'a str, &'a str>,
}

impl<'a> CompareJson<'a> {
    fn from_run(run: &'a CompareRun) -> Self {
        Self {
            codes: &run.table.codes,
            colors: crate::report::assign_colors(&run.table.codes).into_iter().collect(),
            rows: run.table.chart_rows(),
            failures: run.failures.iter().map(|(c, r)| (c.as_str(), r.as_str())).collect(),
        }
    }
}

fn handle_compare(args: CompareArgs, config: &AppConfig) -> Result<(), AppError> {
    let range = date_range(&args.range)?;
    let source = open_source(&args.source, config)?;
    let run = pipeline::run_compare(source.as_ref(), &args.codes, range);

    if run.funds.is_empty() && !run.failures.is_empty() {
        let detail = run
            .failures
            .iter()
            .map(|(code, reason)| format!("{code}: {reason}"))
            .collect::<Vec<_>>()
            .join("; ");
        return Err(AppError::new(4, format!("No fund could be loaded ({detail}).")));
    }

    if args.json {
        println!("{}", to_json(&CompareJson::from_run(&run))?);
    } else {
        print!("{}", crate::report::format_compare_summary(&run));
        println!();
        print!("{}", crate::report::format_aligned(&run.table, args.rows));
        if args.plot {
            println!();
            print!(
                "{}",
                crate::plot::render_aligned_plot(&run.table, args.width, args.height)
            );
        }
    }

    if let Some(path) = &args.export {
        crate::io::write_aligned_csv(path, &run.table)?;
    }
    Ok(())
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String, AppError> {
    serde_json::to_string_pretty(value).map_err(|e| AppError::new(4, format!("Failed to encode JSON: {e}")))
}

/// Rewrite argv so `nav` defaults to `nav tui`.
///
/// Rules:
/// - `nav`                      -> `nav tui`
/// - `nav --sample ...`         -> `nav tui --sample ...`
/// - `nav --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "funds" | "history" | "compare" | "tui");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "tui flags".
    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
        return argv;
    }

    // Otherwise, leave as-is.
    argv
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DuplicatePolicy, FundHistory, FundIdentity, Granularity, RawNavRecord};

    fn argv(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_invocation_runs_tui() {
        assert_eq!(rewrite_args(argv(&["nav"])), argv(&["nav", "tui"]));
        assert_eq!(
            rewrite_args(argv(&["nav", "--sample"])),
            argv(&["nav", "tui", "--sample"])
        );
    }

    #[test]
    fn subcommands_and_help_are_untouched() {
        assert_eq!(rewrite_args(argv(&["nav", "--help"])), argv(&["nav", "--help"]));
        assert_eq!(
            rewrite_args(argv(&["nav", "history", "1"])),
            argv(&["nav", "history", "1"])
        );
    }

    #[test]
    fn date_range_parses_and_checks_order() {
        let args = RangeArgs {
            from: Some("01-01-2024".to_string()),
            to: Some("31-01-2024".to_string()),
        };
        let range = date_range(&args).unwrap();
        assert_eq!(range.from.map(|d| d.day()), Some(1));
        assert_eq!(range.to.map(|d| d.day()), Some(31));

        let reversed = RangeArgs {
            from: args.to.clone(),
            to: args.from.clone(),
        };
        assert_eq!(date_range(&reversed).unwrap_err().exit_code(), 2);
    }

    #[test]
    fn malformed_range_is_a_usage_error() {
        let args = RangeArgs {
            from: Some("2024-01-01".to_string()),
            to: None,
        };
        let err = date_range(&args).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.message().contains("--from"));
    }

    fn loaded(code: &str, name: &str, rows: &[(&str, &str)]) -> pipeline::LoadedFund {
        let history = FundHistory {
            fund: FundIdentity::new(code, name),
            meta: None,
            data: rows.iter().map(|(d, n)| RawNavRecord::new(*d, *n)).collect(),
        };
        pipeline::prepare_fund(history, DateRange::default())
    }

    #[test]
    fn history_json_shape() {
        let fund = loaded("120465", "Axis Bluechip Fund", &[("08-03-2024", "101"), ("01-03-2024", "100.5")]);
        let run = pipeline::summarize_history(fund, Granularity::Monthly, DuplicatePolicy::CountAll);

        let json = serde_json::to_value(HistoryJson::from_run(&run)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "code": "120465",
                "name": "Axis Bluechip Fund",
                "series": [
                    {"date": "01-03-2024", "nav": 100.5},
                    {"date": "08-03-2024", "nav": 101.0}
                ],
                "periods": [{"period": "2024-03", "avgNav": "100.7500"}]
            })
        );
    }

    #[test]
    fn compare_json_shape() {
        let funds = vec![
            loaded("A", "Alpha Fund", &[("01-01-2024", "10.5")]),
            loaded("B", "Beta Fund", &[("02-01-2024", "20")]),
        ];
        let table = pipeline::align_loaded(&funds);
        let run = CompareRun {
            funds,
            failures: vec![("C".to_string(), "no fund C".to_string())],
            table,
        };

        let json = serde_json::to_value(CompareJson::from_run(&run)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "codes": ["A", "B"],
                "colors": {"A": "#8884d8", "B": "#82ca9d"},
                "rows": [
                    {"date": "01-01-2024", "A": 10.5, "B": null},
                    {"date": "02-01-2024", "A": null, "B": 20.0}
                ],
                "failures": {"C": "no fund C"}
            })
        );
    }
}
