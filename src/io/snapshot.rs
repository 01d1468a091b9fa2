//! Read/write fund history JSON snapshots.
//!
//! A snapshot is the raw `FundHistory` exactly as fetched, so a saved file can
//! be replayed later through the same validation and aggregation path:
//!
//! `{ "fund": {"code", "name"}, "meta": {...}?, "data": [{"date", "nav"}] }`

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::domain::FundHistory;
use crate::error::AppError;

pub fn write_history_json(path: &Path, history: &FundHistory) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create history JSON '{}': {e}", path.display())))?;
    serde_json::to_writer_pretty(file, history)
        .map_err(|e| AppError::new(2, format!("Failed to write history JSON: {e}")))?;
    tracing::info!(path = %path.display(), records = history.data.len(), "wrote history snapshot");
    Ok(())
}

pub fn read_history_json(path: &Path) -> Result<FundHistory, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open history JSON '{}': {e}", path.display())))?;
    let history: FundHistory = serde_json::from_reader(BufReader::new(file))
        .map_err(|e| AppError::new(2, format!("Invalid history JSON: {e}")))?;
    Ok(history)
}
