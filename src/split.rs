//! Chronological train / validate / test split.

use crate::domain::Table;
use crate::error::PipelineError;

/// Three contiguous windows of one table, in order.
#[derive(Debug, Clone, PartialEq)]
pub struct Splits {
    pub train: Table,
    pub validate: Table,
    pub test: Table,
}

impl Splits {
    pub fn sizes(&self) -> (usize, usize, usize) {
        (self.train.len(), self.validate.len(), self.test.len())
    }
}

/// Window sizes for a table of `len` rows: `floor(len * fraction)` for train
/// and validate, the remainder for test.
pub fn window_sizes(len: usize, train_fraction: f64, validate_fraction: f64) -> (usize, usize, usize) {
    let train = ((len as f64 * train_fraction).floor() as usize).min(len);
    let validate = ((len as f64 * validate_fraction).floor() as usize).min(len - train);
    (train, validate, len - train - validate)
}

/// Split `table` into train / validate / test by proportional index cuts.
///
/// The table must already be sorted by time ascending; it is neither sorted
/// nor checked here. Requires `0 < train_fraction`, `0 <= validate_fraction`
/// and `train_fraction + validate_fraction <= 1`.
pub fn split(table: &Table, train_fraction: f64, validate_fraction: f64) -> Result<Splits, PipelineError> {
    let valid = train_fraction.is_finite()
        && validate_fraction.is_finite()
        && train_fraction > 0.0
        && validate_fraction >= 0.0
        && train_fraction + validate_fraction <= 1.0 + 1e-9;
    if !valid {
        return Err(PipelineError::InvalidSplit {
            train: train_fraction,
            validate: validate_fraction,
        });
    }

    let (train, validate, _) = window_sizes(table.len(), train_fraction, validate_fraction);
    let end = train + validate;

    Ok(Splits {
        train: table.slice(0..train),
        validate: table.slice(train..end),
        test: table.slice(end..table.len()),
    })
}
