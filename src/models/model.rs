//! Baseline forecasters.
//!
//! Each forecaster learns from a history (the train window) and predicts a flat
//! or linear path over a horizon (the validate window):
//! - last observed value
//! - simple average
//! - moving average over the last `window` observations
//! - linear trend (OLS on row position)

use crate::domain::{ModelSpec, Table};
use crate::error::PipelineError;
use crate::math::fit_line;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Forecaster {
    LastObserved,
    SimpleAverage,
    MovingAverage { window: usize },
    LinearTrend,
}

impl Forecaster {
    /// Expand a CLI model selection into concrete forecasters.
    pub fn from_spec(spec: ModelSpec, window: usize) -> Vec<Forecaster> {
        match spec {
            ModelSpec::Last => vec![Forecaster::LastObserved],
            ModelSpec::Average => vec![Forecaster::SimpleAverage],
            ModelSpec::MovingAverage => vec![Forecaster::MovingAverage { window }],
            ModelSpec::Trend => vec![Forecaster::LinearTrend],
            ModelSpec::All => vec![
                Forecaster::LastObserved,
                Forecaster::SimpleAverage,
                Forecaster::MovingAverage { window },
                Forecaster::LinearTrend,
            ],
        }
    }

    /// `model_type` label used in the evaluation log.
    pub fn label(&self) -> String {
        match self {
            Forecaster::LastObserved => "last_observed_value".to_string(),
            Forecaster::SimpleAverage => "simple_average".to_string(),
            Forecaster::MovingAverage { window } => format!("{window}_period_moving_avg"),
            Forecaster::LinearTrend => "linear_trend".to_string(),
        }
    }

    /// Predict `horizon` values following `history`.
    pub fn forecast(&self, history: &[f64], horizon: usize) -> Result<Vec<f64>, PipelineError> {
        let Some(&last) = history.last() else {
            return Err(PipelineError::ShapeMismatch(format!(
                "{} needs a non-empty history",
                self.label()
            )));
        };

        let path = match *self {
            Forecaster::LastObserved => vec![last; horizon],
            Forecaster::SimpleAverage => vec![mean(history); horizon],
            Forecaster::MovingAverage { window } => {
                if window == 0 {
                    return Err(PipelineError::Config("moving-average window must be > 0".to_string()));
                }
                let tail = &history[history.len().saturating_sub(window)..];
                vec![mean(tail); horizon]
            }
            Forecaster::LinearTrend => {
                let xs: Vec<f64> = (0..history.len()).map(|i| i as f64).collect();
                match fit_line(&xs, history) {
                    Some((b0, b1)) => (history.len()..history.len() + horizon)
                        .map(|i| b0 + b1 * i as f64)
                        .collect(),
                    // A single observation has no slope; hold it flat.
                    None => vec![last; horizon],
                }
            }
        };

        Ok(path.into_iter().map(round2).collect())
    }

    /// Forecast every target column of `train` over `horizon` rows.
    ///
    /// The result has one column per target, in `targets` order.
    pub fn predict_table(&self, train: &Table, targets: &[String], horizon: usize) -> Result<Table, PipelineError> {
        let mut columns = Vec::with_capacity(targets.len());
        for target in targets {
            let history = train.numeric_column("train", target)?;
            columns.push(self.forecast(&history, horizon)?);
        }

        let mut out = Table::new(targets.to_vec());
        for row in 0..horizon {
            out.push_row(columns.iter().map(|c| c[row].into()).collect())?;
        }
        Ok(out)
    }
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round_ties_even() / 100.0
}
