//! Reporting utilities: terminal tables, summaries and chart colors.

pub mod format;
pub mod palette;

pub use format::*;
pub use palette::{PALETTE, assign_colors, color_for, hex_to_rgb};
