//! File export for run records.

pub mod export;

pub use export::{export_csv, write_csv};
