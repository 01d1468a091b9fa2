//! CSV exports of computed tables.
//!
//! The exports are meant to be easy to consume in spreadsheets or downstream scripts.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::domain::PeriodRow;
use crate::error::AppError;
use crate::series::{AlignedTable, DATE_KEY};

/// Write the period aggregate table as `period,avg_nav,count`.
pub fn write_periods_csv(path: &Path, rows: &[PeriodRow]) -> Result<(), AppError> {
    let mut file = create(path)?;
    write_periods(&mut file, rows)?;
    tracing::info!(path = %path.display(), rows = rows.len(), "exported period table");
    Ok(())
}

/// Write the aligned matrix as `date,<code1>,<code2>,...`; missing values are empty cells.
pub fn write_aligned_csv(path: &Path, table: &AlignedTable) -> Result<(), AppError> {
    let mut file = create(path)?;
    write_aligned(&mut file, table)?;
    tracing::info!(path = %path.display(), rows = table.rows.len(), funds = table.codes.len(), "exported aligned table");
    Ok(())
}

fn create(path: &Path) -> Result<File, AppError> {
    File::create(path).map_err(|e| AppError::new(2, format!("Failed to create export CSV '{}': {e}", path.display())))
}

fn write_periods(out: impl Write, rows: &[PeriodRow]) -> Result<(), AppError> {
    let mut w = csv::Writer::from_writer(out);
    w.write_record(["period", "avg_nav", "count"]).map_err(write_err)?;
    for r in rows {
        w.write_record([r.period.clone(), r.avg_nav.to_string(), r.count.to_string()])
            .map_err(write_err)?;
    }
    w.flush().map_err(|e| AppError::new(2, format!("Failed to write export CSV: {e}")))
}

fn write_aligned(out: impl Write, table: &AlignedTable) -> Result<(), AppError> {
    let mut w = csv::Writer::from_writer(out);
    let header = std::iter::once(DATE_KEY).chain(table.codes.iter().map(String::as_str));
    w.write_record(header).map_err(write_err)?;

    for row in &table.rows {
        let cells = std::iter::once(row.date.clone())
            .chain(row.values.iter().map(|v| v.map(|d| d.to_string()).unwrap_or_default()));
        w.write_record(cells).map_err(write_err)?;
    }
    w.flush().map_err(|e| AppError::new(2, format!("Failed to write export CSV: {e}")))
}

fn write_err(e: csv::Error) -> AppError {
    AppError::new(2, format!("Failed to write export CSV: {e}"))
}
