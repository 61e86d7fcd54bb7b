//! Export the evaluation log to CSV.
//!
//! The export is meant to be easy to consume in spreadsheets or downstream scripts.

use std::fs::File;
use std::path::Path;

use crate::error::PipelineError;
use crate::evaluate::EvalLog;

/// Write `model_type,target_var,rmse` rows to `path`.
pub fn write_eval_csv(path: &Path, log: &EvalLog) -> Result<(), PipelineError> {
    let export_err = |message: String| PipelineError::Snapshot {
        path: path.to_path_buf(),
        message,
    };

    let file = File::create(path).map_err(|e| export_err(format!("failed to create export CSV: {e}")))?;
    let mut writer = csv::Writer::from_writer(file);

    if log.is_empty() {
        writer
            .write_record(["model_type", "target_var", "rmse"])
            .map_err(|e| export_err(format!("failed to write export CSV header: {e}")))?;
    }
    for entry in log.entries() {
        writer
            .serialize(entry)
            .map_err(|e| export_err(format!("failed to write export CSV row: {e}")))?;
    }

    writer
        .flush()
        .map_err(|e| export_err(format!("failed to write export CSV: {e}")))
}
