//! `navscope` library crate.
//!
//! The binary (`nav`) is a thin wrapper around this library so that:
//!
//! - the series engine is testable without spawning processes
//! - data sources and front-ends stay swappable
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod cli;
pub mod config;
pub mod data;
pub mod domain;
pub mod error;
pub mod funds;
pub mod io;
pub mod plot;
pub mod report;
pub mod series;
pub mod tui;
