//! `tsa-demand` library crate.
//!
//! The binary (`tsa`) is a thin wrapper around this library so that:
//!
//! - the acquisition and evaluation workflow is testable without spawning processes
//! - the mock-server integration tests can drive the same code paths as the CLI

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod evaluate;
pub mod io;
pub mod math;
pub mod merge;
pub mod models;
pub mod plot;
pub mod report;
pub mod series;
pub mod split;
