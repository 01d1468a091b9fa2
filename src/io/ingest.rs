//! CSV ingest of a single NAV history.
//!
//! Expected shape: a header row containing `date` and `nav` columns (any
//! case, any position, extra columns ignored), one observation per row,
//! dates as `DD-MM-YYYY`. Rows are kept as raw records; validation happens
//! later, so a bad row is reported there rather than failing the load.

use std::collections::HashMap;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord};

use crate::domain::{FundHistory, FundIdentity, RawNavRecord};
use crate::error::AppError;

/// Load `path` as a NAV CSV. The fund code and name default to the file stem.
pub fn load_nav_csv(path: &Path) -> Result<FundHistory, AppError> {
    let mut reader = ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_path(path)
        .map_err(|e| AppError::new(2, format!("Failed to open CSV '{}': {e}", path.display())))?;

    let headers = reader
        .headers()
        .map_err(|e| AppError::new(2, format!("Failed to read CSV headers: {e}")))?
        .clone();
    let header_map = build_header_map(&headers);

    let date_idx = *header_map
        .get("date")
        .ok_or_else(|| AppError::new(2, "CSV is missing a 'date' column."))?;
    let nav_idx = *header_map
        .get("nav")
        .ok_or_else(|| AppError::new(2, "CSV is missing a 'nav' column."))?;

    let mut data = Vec::new();
    for (row, result) in reader.records().enumerate() {
        let record = result.map_err(|e| AppError::new(2, format!("CSV parse error on row {}: {e}", row + 2)))?;
        let date = record.get(date_idx).unwrap_or_default();
        let nav = record.get(nav_idx).unwrap_or_default();
        if date.is_empty() && nav.is_empty() {
            continue;
        }
        data.push(RawNavRecord::new(date, nav));
    }

    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("file")
        .to_string();

    Ok(FundHistory {
        fund: FundIdentity::new(stem.clone(), stem),
        meta: None,
        data,
    })
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(i, h)| (h.trim().to_ascii_lowercase(), i))
        .collect()
}
