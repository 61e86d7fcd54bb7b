//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and installs the log subscriber
//! - parses CLI arguments
//! - acquires datasets through the snapshot cache
//! - runs the split / forecast / evaluate workflow
//! - prints reports/plots and writes optional exports

use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

use crate::cli::{AcquireArgs, Cli, Command, EvalArgs, GlobalArgs, SqlArgs};
use crate::domain::{AcquireConfig, EvalConfig};
use crate::error::AppError;
use crate::plot::{ForecastSeries, render_forecast_plot, write_forecast_svg};
use crate::report::{format_acquire_summary, format_eval_log, format_split_summary};

pub mod pipeline;

use pipeline::{POWER, Pipeline, run_evaluation};

/// Pixel size of exported SVG charts.
const SVG_SIZE: (u32, u32) = (1024, 576);

/// Entry point for the `tsa` binary.
pub fn run() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_logging();

    let cli = Cli::parse();
    match cli.command {
        Command::Acquire(args) => handle_acquire(&cli.global, &args),
        Command::Power => handle_power(&cli.global),
        Command::Sql(args) => handle_sql(&cli.global, &args),
        Command::Evaluate(args) => handle_evaluate(&cli.global, &args),
    }
}

/// Install the fmt subscriber on stderr; `RUST_LOG` overrides the `info` default.
fn init_logging() {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .try_init();
}

fn handle_acquire(global: &GlobalArgs, args: &AcquireArgs) -> Result<(), AppError> {
    let pipeline = Pipeline::new(&acquire_config_from_args(global))?;
    let summaries = pipeline.acquire(args.dataset)?;
    print!("{}", format_acquire_summary(&summaries));
    Ok(())
}

fn handle_power(global: &GlobalArgs) -> Result<(), AppError> {
    let pipeline = Pipeline::new(&acquire_config_from_args(global))?;
    let summary = pipeline.summarize(POWER, || pipeline.power())?;
    print!("{}", format_acquire_summary(&[summary]));
    Ok(())
}

#[cfg(feature = "mysql")]
fn handle_sql(global: &GlobalArgs, args: &SqlArgs) -> Result<(), AppError> {
    let pipeline = Pipeline::new(&acquire_config_from_args(global))?;
    let summary = pipeline.summarize(&args.database, || pipeline.tsa_item_demand(&args.database))?;
    print!("{}", format_acquire_summary(&[summary]));
    Ok(())
}

#[cfg(not(feature = "mysql"))]
fn handle_sql(_global: &GlobalArgs, args: &SqlArgs) -> Result<(), AppError> {
    Err(crate::error::PipelineError::Config(format!(
        "cannot query database '{}': tsa was built without the `mysql` feature",
        args.database
    ))
    .into())
}

fn handle_evaluate(global: &GlobalArgs, args: &EvalArgs) -> Result<(), AppError> {
    let config = eval_config_from_args(args);
    let pipeline = Pipeline::new(&acquire_config_from_args(global))?;

    let table = pipeline.load_dataset(&config.dataset)?;
    let run = run_evaluation(table, &config)?;

    println!("{}", format_split_summary(&config.dataset, &run.splits));
    println!("{}", format_eval_log(&run.log));

    for target in &config.targets {
        let [train, validate, test] = run.windows(target)?;
        let best = run.best_prediction(target)?;
        let series = ForecastSeries {
            target: target.as_str(),
            train: &train,
            validate: &validate,
            test: &test,
            prediction: best.as_ref().map(|(label, values)| (label.as_str(), values.as_slice())),
        };

        if config.plot {
            println!("{}", render_forecast_plot(&series, config.plot_width, config.plot_height));
        }
        if let Some(path) = &config.plot_svg {
            let path = svg_path_for(path, target, config.targets.len());
            write_forecast_svg(&path, &series, SVG_SIZE)?;
            info!(target = %target, path = %path.display(), "wrote SVG plot");
        }
    }

    if let Some(path) = &config.export_eval {
        crate::io::export::write_eval_csv(path, &run.log)?;
        info!(path = %path.display(), entries = run.log.entries().len(), "exported evaluation log");
    }

    Ok(())
}

pub fn acquire_config_from_args(args: &GlobalArgs) -> AcquireConfig {
    AcquireConfig {
        api_base: args.api_base.clone(),
        power_url: args.power_url.clone(),
        data_dir: args.data_dir.clone(),
        timeout_secs: args.timeout_secs,
    }
}

pub fn eval_config_from_args(args: &EvalArgs) -> EvalConfig {
    EvalConfig {
        dataset: args.dataset.clone(),
        date_column: args.date_column.clone(),
        targets: args.targets.clone(),
        daily: args.daily,
        train_fraction: args.train_fraction,
        validate_fraction: args.validate_fraction,
        model_spec: args.model,
        window: args.window,
        plot: args.plot && !args.no_plot,
        plot_width: args.width,
        plot_height: args.height,
        plot_svg: args.plot_svg.clone(),
        export_eval: args.export_eval.clone(),
    }
}

/// With several targets each gets its own file: `plot.svg` -> `plot_<target>.svg`.
fn svg_path_for(path: &Path, target: &str, n_targets: usize) -> PathBuf {
    if n_targets <= 1 {
        return path.to_path_buf();
    }
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("plot");
    let ext = path.extension().and_then(|s| s.to_str()).unwrap_or("svg");
    path.with_file_name(format!("{stem}_{target}.{ext}"))
}
