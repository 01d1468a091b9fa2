//! Fund listings: display-name sanitizing.

pub mod sanitize;

pub use sanitize::{SanitizeRules, sanitize, sanitize_all};
