//! Forecast evaluation: RMSE and the per-run evaluation log.

use serde::Serialize;

use crate::domain::{Table, Value};
use crate::error::PipelineError;

/// Root-mean-squared error of `predicted` against `actual` on `column`,
/// rounded to the nearest whole number (halves go to the even neighbour).
pub fn rmse(actual: &Table, predicted: &Table, column: &str) -> Result<f64, PipelineError> {
    if actual.len() != predicted.len() {
        return Err(PipelineError::ShapeMismatch(format!(
            "actual window has {} rows but prediction has {}",
            actual.len(),
            predicted.len()
        )));
    }
    if actual.is_empty() {
        return Err(PipelineError::ShapeMismatch("cannot evaluate an empty window".to_string()));
    }
    for (label, table) in [("actual", actual), ("predicted", predicted)] {
        if !table.has_column(column) {
            return Err(PipelineError::ShapeMismatch(format!(
                "{label} window has no column `{column}`"
            )));
        }
    }

    let y = actual.numeric_column("actual", column)?;
    let yhat = predicted.numeric_column("predicted", column)?;
    let mse = y.iter().zip(&yhat).map(|(a, p)| (a - p).powi(2)).sum::<f64>() / y.len() as f64;
    Ok(mse.sqrt().round_ties_even())
}

/// One `(model_type, target_var, rmse)` row; field order is the export's column order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvalEntry {
    pub model_type: String,
    pub target_var: String,
    pub rmse: f64,
}

/// Ordered record of every (model, target) evaluation in a run.
#[derive(Debug, Clone, Default)]
pub struct EvalLog {
    entries: Vec<EvalEntry>,
}

impl EvalLog {
    pub fn append(&mut self, model_type: impl Into<String>, target_var: impl Into<String>, rmse: f64) {
        self.entries.push(EvalEntry {
            model_type: model_type.into(),
            target_var: target_var.into(),
            rmse,
        });
    }

    /// Score `predicted` against `actual` on `target` and log the result.
    pub fn record(
        &mut self,
        model_type: &str,
        actual: &Table,
        predicted: &Table,
        target: &str,
    ) -> Result<f64, PipelineError> {
        let score = rmse(actual, predicted, target)?;
        self.append(model_type, target, score);
        Ok(score)
    }

    pub fn entries(&self) -> &[EvalEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Lowest-RMSE entry for `target`; the earliest wins ties.
    pub fn best_for(&self, target: &str) -> Option<&EvalEntry> {
        self.entries
            .iter()
            .filter(|e| e.target_var == target)
            .fold(None, |best: Option<&EvalEntry>, e| match best {
                Some(b) if b.rmse <= e.rmse => Some(b),
                _ => Some(e),
            })
    }

    pub fn to_table(&self) -> Table {
        let mut table = Table::new(vec![
            "model_type".to_string(),
            "target_var".to_string(),
            "rmse".to_string(),
        ]);
        for e in &self.entries {
            table.push_record([
                ("model_type", Value::from(e.model_type.as_str())),
                ("target_var", Value::from(e.target_var.as_str())),
                ("rmse", Value::Float(e.rmse)),
            ]);
        }
        table
    }
}
