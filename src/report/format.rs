//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the pipeline code stays clean and testable
//! - output changes are localized (and covered by the tests below)

use std::path::PathBuf;

use crate::domain::Table;
use crate::evaluate::EvalLog;
use crate::split::Splits;

/// Where an acquired table came from on this run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// Read back from an existing snapshot.
    Snapshot,
    /// Fetched from the remote source (and saved, if the write succeeded).
    Remote,
}

impl Origin {
    pub fn label(self) -> &'static str {
        match self {
            Origin::Snapshot => "snapshot",
            Origin::Remote => "remote",
        }
    }
}

/// One line of the `tsa acquire` summary.
#[derive(Debug, Clone)]
pub struct DatasetSummary {
    pub name: String,
    pub rows: usize,
    pub columns: Vec<String>,
    pub origin: Origin,
    pub path: PathBuf,
}

impl DatasetSummary {
    pub fn new(name: &str, table: &Table, origin: Origin, path: PathBuf) -> Self {
        Self {
            name: name.to_string(),
            rows: table.len(),
            columns: table.columns().to_vec(),
            origin,
            path,
        }
    }
}

/// Format the acquisition summary table.
pub fn format_acquire_summary(summaries: &[DatasetSummary]) -> String {
    let mut out = String::new();
    out.push_str("=== tsa - acquisition ===\n");
    push_row(&mut out, format!("{:<16} {:>8} {:<9} {}", "dataset", "rows", "source", "columns"));
    push_row(&mut out, format!("{:-<16} {:-<8} {:-<9} {:-<7}", "", "", "", ""));

    for s in summaries {
        push_row(
            &mut out,
            format!(
                "{:<16} {:>8} {:<9} {}",
                truncate(&s.name, 16),
                s.rows,
                s.origin.label(),
                s.columns.join(","),
            ),
        );
    }
    for s in summaries {
        out.push_str(&format!("  {} -> {}\n", s.name, s.path.display()));
    }
    out
}

/// Format the train/validate/test window sizes.
pub fn format_split_summary(dataset: &str, splits: &Splits) -> String {
    let (train, validate, test) = splits.sizes();
    let total = train + validate + test;
    format!("Dataset: {dataset} | rows={total} | train={train} validate={validate} test={test}\n")
}

/// Format the evaluation log, marking the best model per target with `*`.
pub fn format_eval_log(log: &EvalLog) -> String {
    let mut out = String::new();
    out.push_str("Evaluation (RMSE on validate):\n");
    push_row(&mut out, format!("  {:<24} {:<20} {:>12}", "model_type", "target_var", "rmse"));
    push_row(&mut out, format!("  {:-<24} {:-<20} {:-<12}", "", "", ""));

    for e in log.entries() {
        let chosen = match log.best_for(&e.target_var) {
            Some(best) if std::ptr::eq(best, e) => "*",
            _ => " ",
        };
        push_row(
            &mut out,
            format!(
                "{chosen} {:<24} {:<20} {:>12.0}",
                truncate(&e.model_type, 24),
                truncate(&e.target_var, 20),
                e.rmse
            ),
        );
    }
    out
}

fn push_row(out: &mut String, row: String) {
    out.push_str(row.trim_end());
    out.push('\n');
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}
