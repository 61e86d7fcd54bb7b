//! Reporting utilities: acquisition summaries and evaluation tables.

pub mod format;

pub use format::*;
