//! Command-line parsing for the `tsa` demand pipeline.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the acquisition and modeling code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::data::api::DEFAULT_API_BASE;
use crate::data::csv_url::DEFAULT_POWER_URL;
use crate::data::sql::DEFAULT_DATABASE;
use crate::domain::{ModelSpec, RestDataset};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "tsa", version, about = "Retail demand acquisition and baseline forecasting")]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Options shared by every subcommand.
#[derive(Debug, Args, Clone)]
pub struct GlobalArgs {
    /// Directory holding the CSV snapshots.
    #[arg(long, env = "TSA_DATA_DIR", default_value = ".", global = true)]
    pub data_dir: PathBuf,

    /// Scheme and host of the paginated sales API.
    #[arg(long, env = "TSA_API_BASE", default_value = DEFAULT_API_BASE, global = true)]
    pub api_base: String,

    /// URL of the daily power CSV.
    #[arg(long, env = "TSA_POWER_URL", default_value = DEFAULT_POWER_URL, global = true)]
    pub power_url: String,

    /// Per-request HTTP timeout in seconds.
    #[arg(long, default_value_t = 30, global = true)]
    pub timeout_secs: u64,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Acquire REST datasets (items, stores, sales, merged) through the snapshot cache.
    Acquire(AcquireArgs),
    /// Acquire the daily power CSV through the snapshot cache.
    Power,
    /// Acquire the joined demand table from MySQL (requires the `mysql` feature).
    Sql(SqlArgs),
    /// Split a snapshot chronologically, forecast, score with RMSE and plot.
    Evaluate(EvalArgs),
}

#[derive(Debug, Args, Clone)]
pub struct AcquireArgs {
    /// Which dataset(s) to acquire.
    #[arg(long, value_enum, default_value_t = RestDataset::All)]
    pub dataset: RestDataset,
}

#[derive(Debug, Args, Clone)]
pub struct SqlArgs {
    /// Database name; also used as the snapshot name.
    #[arg(long, default_value = DEFAULT_DATABASE)]
    pub database: String,
}

/// Options for `tsa evaluate`.
#[derive(Debug, Args, Clone)]
pub struct EvalArgs {
    /// Snapshot to evaluate: `merged`, `power`, or any snapshot name.
    #[arg(long, default_value = "merged")]
    pub dataset: String,

    /// Timestamp column used for ordering.
    #[arg(long, default_value = "sale_date")]
    pub date_column: String,

    /// Target column(s) to forecast.
    #[arg(long = "target", required = true, num_args = 1..)]
    pub targets: Vec<String>,

    /// Sum every target per calendar day before splitting.
    #[arg(long)]
    pub daily: bool,

    /// Fraction of rows in the train window.
    #[arg(long = "train", default_value_t = 0.5)]
    pub train_fraction: f64,

    /// Fraction of rows in the validate window.
    #[arg(long = "validate", default_value_t = 0.3)]
    pub validate_fraction: f64,

    /// Which forecaster(s) to evaluate.
    #[arg(long, value_enum, default_value_t = ModelSpec::All)]
    pub model: ModelSpec,

    /// Window length for the moving average.
    #[arg(long, default_value_t = 30)]
    pub window: usize,

    /// Render an ASCII plot in the terminal (enabled by default).
    #[arg(long, default_value_t = true)]
    pub plot: bool,

    /// Disable the terminal plot.
    #[arg(long)]
    pub no_plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,

    /// Write an SVG chart; with several targets, the target name is appended to the file stem.
    #[arg(long = "plot-svg", value_name = "SVG")]
    pub plot_svg: Option<PathBuf>,

    /// Export the evaluation log to CSV.
    #[arg(long = "export-eval", value_name = "CSV")]
    pub export_eval: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evaluate_defaults() {
        let cli = Cli::try_parse_from(["tsa", "evaluate", "--target", "sale_amount"]).unwrap();
        let Command::Evaluate(args) = cli.command else {
            panic!("expected evaluate");
        };
        assert_eq!(args.dataset, "merged");
        assert_eq!(args.targets, vec!["sale_amount".to_string()]);
        assert_eq!(args.train_fraction, 0.5);
        assert_eq!(args.validate_fraction, 0.3);
        assert_eq!(args.model, ModelSpec::All);
        assert!(args.plot && !args.no_plot);
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["tsa", "acquire", "--dataset", "sales", "--data-dir", "/tmp/tsa"]).unwrap();
        assert_eq!(cli.global.data_dir, PathBuf::from("/tmp/tsa"));
        assert!(matches!(cli.command, Command::Acquire(AcquireArgs { dataset: RestDataset::Sales })));
    }

    #[test]
    fn evaluate_requires_a_target() {
        assert!(Cli::try_parse_from(["tsa", "evaluate"]).is_err());
    }
}
