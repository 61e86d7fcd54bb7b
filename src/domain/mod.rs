//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the schema-less cell/table model (`Value`, `Table`)
//! - CLI-facing enums (`RestDataset`, `ModelSpec`)
//! - run configuration (`AcquireConfig`, `EvalConfig`)

pub mod types;

pub use types::*;
