//! Input/output helpers.
//!
//! - NAV CSV ingest (`ingest`)
//! - history JSON snapshots (`snapshot`)
//! - table exports to CSV (`export`)

pub mod export;
pub mod ingest;
pub mod snapshot;

pub use export::*;
pub use ingest::*;
pub use snapshot::*;
