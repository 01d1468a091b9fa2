//! Data sources feeding the series engine.
//!
//! Every source returns raw, unvalidated payloads (`FundHistory`); validation
//! and ordering happen in `app::pipeline`.
//!
//! - `mfapi`: the public mfapi.in scheme list and NAV history feed
//! - `sample`: deterministic synthetic funds for offline use and demos
//! - `file`: a single history loaded from CSV or a JSON snapshot

use crate::domain::{FundHistory, FundIdentity};
use crate::error::AppError;

pub mod file;
pub mod mfapi;
pub mod sample;

pub use file::FileSource;
pub use mfapi::MfapiClient;
pub use sample::SampleSource;

/// Where fund listings and NAV histories come from.
///
/// Implementations are `Sync` so several histories can be fetched in parallel.
pub trait NavSource: Sync {
    /// Short label for status lines and logs.
    fn name(&self) -> &str;

    /// All funds the source knows about, names unsanitized.
    fn list_funds(&self) -> Result<Vec<FundIdentity>, AppError>;

    /// Raw NAV history for one fund code.
    fn fetch_history(&self, code: &str) -> Result<FundHistory, AppError>;
}
