//! Baseline forecasting models.
//!
//! Models are deliberately simple; they exist to produce a predicted window
//! for the evaluator to score.

pub mod model;

pub use model::*;
