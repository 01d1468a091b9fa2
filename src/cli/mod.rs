//! Command-line parsing for the NAV dashboard.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the series engine.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::{DuplicatePolicy, Granularity};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "nav", version, about = "Mutual fund NAV history and comparison")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// List funds (names cleaned of known feed noise).
    Funds(FundsArgs),
    /// Show one fund's current NAV and its periodic NAV table.
    History(HistoryArgs),
    /// Align several funds on a shared date axis.
    Compare(CompareArgs),
    /// Launch the interactive comparison TUI.
    Tui(TuiArgs),
}

/// Where NAV data comes from.
#[derive(Debug, Args, Clone)]
pub struct SourceArgs {
    /// Use deterministic synthetic funds instead of the live feed.
    #[arg(long, conflicts_with = "file")]
    pub sample: bool,

    /// Seed for `--sample` data.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Business days of history per synthetic fund.
    #[arg(long, default_value_t = 500)]
    pub sample_days: usize,

    /// Read a single fund's history from a CSV (`date,nav`) or JSON snapshot.
    #[arg(long, value_name = "PATH")]
    pub file: Option<PathBuf>,
}

/// Optional inclusive date window, `DD-MM-YYYY`.
#[derive(Debug, Args, Clone)]
pub struct RangeArgs {
    /// First date to include (DD-MM-YYYY).
    #[arg(long, value_name = "DD-MM-YYYY")]
    pub from: Option<String>,

    /// Last date to include (DD-MM-YYYY).
    #[arg(long, value_name = "DD-MM-YYYY")]
    pub to: Option<String>,
}

#[derive(Debug, Parser, Clone)]
pub struct FundsArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Show at most N funds.
    #[arg(long)]
    pub limit: Option<usize>,

    /// Print JSON instead of a table.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Parser, Clone)]
pub struct HistoryArgs {
    /// Scheme code (with `--file`, defaults to the file's fund).
    pub code: Option<String>,

    #[command(flatten)]
    pub source: SourceArgs,

    #[command(flatten)]
    pub range: RangeArgs,

    /// Aggregation period for the table.
    #[arg(short = 'g', long, value_enum, default_value_t = Granularity::Weekly)]
    pub granularity: Granularity,

    /// How records with the same date feed an average.
    #[arg(long, value_enum, default_value_t = DuplicatePolicy::CountAll)]
    pub duplicates: DuplicatePolicy,

    /// Render an ASCII plot of the series.
    #[arg(long)]
    pub plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,

    /// Print `{series, periods}` JSON instead of tables.
    #[arg(long)]
    pub json: bool,

    /// Export the period table to CSV.
    #[arg(long, value_name = "CSV")]
    pub export: Option<PathBuf>,

    /// Save the raw fetched history as a JSON snapshot.
    #[arg(long, value_name = "JSON")]
    pub save: Option<PathBuf>,
}

#[derive(Debug, Parser, Clone)]
pub struct CompareArgs {
    /// Scheme codes to compare, in column order.
    #[arg(required = true)]
    pub codes: Vec<String>,

    #[command(flatten)]
    pub source: SourceArgs,

    #[command(flatten)]
    pub range: RangeArgs,

    /// Rows of the aligned table to print (most recent).
    #[arg(long, default_value_t = 15)]
    pub rows: usize,

    /// Render an ASCII plot of all funds.
    #[arg(long)]
    pub plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,

    /// Print `{codes, colors, rows}` JSON instead of tables.
    #[arg(long)]
    pub json: bool,

    /// Export the aligned table to CSV.
    #[arg(long, value_name = "CSV")]
    pub export: Option<PathBuf>,
}

#[derive(Debug, Parser, Clone)]
pub struct TuiArgs {
    /// Scheme codes to start with.
    pub codes: Vec<String>,

    #[command(flatten)]
    pub source: SourceArgs,

    /// Initial aggregation period.
    #[arg(short = 'g', long, value_enum, default_value_t = Granularity::Weekly)]
    pub granularity: Granularity,
}
