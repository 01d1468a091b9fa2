//! A single fund history read from disk.
//!
//! `.json` files are history snapshots (see `io::snapshot`); anything else is
//! read as a `date,nav` CSV (see `io::ingest`), with the file stem as the fund code.

use std::path::{Path, PathBuf};

use crate::data::NavSource;
use crate::domain::{FundHistory, FundIdentity};
use crate::error::AppError;

#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
    history: FundHistory,
}

impl FileSource {
    pub fn open(path: &Path) -> Result<Self, AppError> {
        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("json"));

        let history = if is_json {
            crate::io::snapshot::read_history_json(path)?
        } else {
            crate::io::ingest::load_nav_csv(path)?
        };

        tracing::info!(path = %path.display(), records = history.data.len(), "loaded NAV file");
        Ok(Self {
            path: path.to_path_buf(),
            history,
        })
    }

}

impl NavSource for FileSource {
    fn name(&self) -> &str {
        "file"
    }

    fn list_funds(&self) -> Result<Vec<FundIdentity>, AppError> {
        Ok(vec![self.history.fund.clone()])
    }

    fn fetch_history(&self, code: &str) -> Result<FundHistory, AppError> {
        if code != self.history.fund.code {
            return Err(AppError::new(
                2,
                format!(
                    "'{}' holds fund {}, not {code}.",
                    self.path.display(),
                    self.history.fund.code
                ),
            ));
        }
        Ok(self.history.clone())
    }
}
