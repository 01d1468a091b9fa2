//! Terminal plots.

pub mod ascii;

pub use ascii::{render_aligned_plot, render_series_plot};
