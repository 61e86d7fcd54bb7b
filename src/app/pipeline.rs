//! Shared acquisition and evaluation workflow used by the CLI handlers.
//!
//! Acquisition: remote source -> snapshot cache gate -> Table.
//! Evaluation: Table -> time preparation -> split -> forecasters -> RMSE log.

use std::time::Duration;

use reqwest::blocking::Client;
use tracing::info;

use crate::data::{ApiClient, fetch_csv, http_client};
use crate::domain::{AcquireConfig, EvalConfig, RestDataset, Table};
use crate::error::PipelineError;
use crate::evaluate::EvalLog;
use crate::io::SnapshotStore;
use crate::merge::merge;
use crate::models::Forecaster;
use crate::report::{DatasetSummary, Origin};
use crate::series::{daily_totals, sort_by_time};
use crate::split::{Splits, split};

/// Snapshot names.
pub const ITEMS: &str = "items";
pub const STORES: &str = "stores";
pub const SALES: &str = "sales";
pub const MERGED: &str = "sales_data";
pub const POWER: &str = "power_data";

/// Remote sources wired to one snapshot directory.
pub struct Pipeline {
    api: ApiClient,
    http: Client,
    store: SnapshotStore,
    power_url: String,
}

impl Pipeline {
    pub fn new(config: &AcquireConfig) -> Result<Self, PipelineError> {
        let http = http_client(Duration::from_secs(config.timeout_secs))?;
        Ok(Self {
            api: ApiClient::new(http.clone(), &config.api_base)?,
            http,
            store: SnapshotStore::new(&config.data_dir),
            power_url: config.power_url.clone(),
        })
    }

    pub fn store(&self) -> &SnapshotStore {
        &self.store
    }

    pub fn items(&self) -> Result<Table, PipelineError> {
        self.store.load_or_fetch(ITEMS, || self.api.fetch_resource("items"))
    }

    pub fn stores(&self) -> Result<Table, PipelineError> {
        self.store.load_or_fetch(STORES, || self.api.fetch_resource("stores"))
    }

    pub fn sales(&self) -> Result<Table, PipelineError> {
        self.store.load_or_fetch(SALES, || self.api.fetch_resource("sales"))
    }

    /// Sales joined with stores and items. The three inputs go through their
    /// own snapshots, so a partially cached directory only fetches what is missing.
    pub fn merged(&self) -> Result<Table, PipelineError> {
        self.store.load_or_fetch(MERGED, || {
            let sales = self.sales()?;
            let items = self.items()?;
            let stores = self.stores()?;
            merge(&sales, &items, &stores)
        })
    }

    pub fn power(&self) -> Result<Table, PipelineError> {
        self.store.load_or_fetch(POWER, || fetch_csv(&self.http, &self.power_url))
    }

    /// The joined demand table straight from MySQL, cached under `database`.
    #[cfg(feature = "mysql")]
    pub fn tsa_item_demand(&self, database: &str) -> Result<Table, PipelineError> {
        use crate::data::sql::{DbCredentials, TSA_ITEM_DEMAND_QUERY, fetch_query};

        self.store.load_or_fetch(database, || {
            let url = DbCredentials::from_env()?.connection_url(database)?;
            fetch_query(&url, TSA_ITEM_DEMAND_QUERY)
        })
    }

    /// Acquire the REST dataset(s) selected by `dataset`.
    pub fn acquire(&self, dataset: RestDataset) -> Result<Vec<DatasetSummary>, PipelineError> {
        let mut out = Vec::new();
        if matches!(dataset, RestDataset::Items | RestDataset::All) {
            out.push(self.summarize(ITEMS, || self.items())?);
        }
        if matches!(dataset, RestDataset::Stores | RestDataset::All) {
            out.push(self.summarize(STORES, || self.stores())?);
        }
        if matches!(dataset, RestDataset::Sales | RestDataset::All) {
            out.push(self.summarize(SALES, || self.sales())?);
        }
        if matches!(dataset, RestDataset::Merged | RestDataset::All) {
            out.push(self.summarize(MERGED, || self.merged())?);
        }
        Ok(out)
    }

    /// Run `load` for snapshot `name` and describe the result.
    pub fn summarize<F>(&self, name: &str, load: F) -> Result<DatasetSummary, PipelineError>
    where
        F: FnOnce() -> Result<Table, PipelineError>,
    {
        let origin = if self.store.exists(name) { Origin::Snapshot } else { Origin::Remote };
        let table = load()?;
        Ok(DatasetSummary::new(name, &table, origin, self.store.path_for(name)))
    }

    /// Resolve a dataset name for evaluation.
    ///
    /// `merged` and `power` (and their snapshot names) go through the cache
    /// gate; any other name must already exist as a snapshot.
    pub fn load_dataset(&self, name: &str) -> Result<Table, PipelineError> {
        match name {
            "merged" | MERGED => self.merged(),
            "power" | POWER => self.power(),
            ITEMS => self.items(),
            STORES => self.stores(),
            SALES => self.sales(),
            other if self.store.exists(other) => self.store.read(other),
            other => Err(PipelineError::Config(format!(
                "unknown dataset '{other}' and no snapshot at {}",
                self.store.path_for(other).display()
            ))),
        }
    }
}

/// All computed outputs of a single `tsa evaluate` run.
#[derive(Debug, Clone)]
pub struct EvalRun {
    /// The table after time preparation (sorted, or one row per day).
    pub prepared: Table,
    pub splits: Splits,
    /// Each forecaster with its predicted validate window.
    pub predictions: Vec<(Forecaster, Table)>,
    pub log: EvalLog,
}

impl EvalRun {
    /// Train, validate and test values of `target`.
    pub fn windows(&self, target: &str) -> Result<[Vec<f64>; 3], PipelineError> {
        Ok([
            self.splits.train.numeric_column("train", target)?,
            self.splits.validate.numeric_column("validate", target)?,
            self.splits.test.numeric_column("test", target)?,
        ])
    }

    /// The lowest-RMSE model's label and predicted values for `target`.
    pub fn best_prediction(&self, target: &str) -> Result<Option<(String, Vec<f64>)>, PipelineError> {
        let Some(best) = self.log.best_for(target) else {
            return Ok(None);
        };
        let Some((_, predicted)) = self
            .predictions
            .iter()
            .find(|(f, _)| f.label() == best.model_type)
        else {
            return Ok(None);
        };
        let values = predicted.numeric_column("predicted", target)?;
        Ok(Some((best.model_type.clone(), values)))
    }
}

/// Prepare, split, forecast and score `table` per `config`.
pub fn run_evaluation(mut table: Table, config: &EvalConfig) -> Result<EvalRun, PipelineError> {
    let name = config.dataset.as_str();
    for target in &config.targets {
        table.require_column(name, target)?;
    }

    let prepared = if config.daily {
        daily_totals(&table, name, &config.date_column, &config.targets)?
    } else {
        sort_by_time(&mut table, name, &config.date_column)?;
        table
    };

    let splits = split(&prepared, config.train_fraction, config.validate_fraction)?;
    let (train, validate, test) = splits.sizes();
    info!(dataset = name, train, validate, test, "split dataset");

    let mut log = EvalLog::default();
    let mut predictions = Vec::new();
    for forecaster in Forecaster::from_spec(config.model_spec, config.window) {
        let predicted = forecaster.predict_table(&splits.train, &config.targets, validate)?;
        for target in &config.targets {
            let score = log.record(&forecaster.label(), &splits.validate, &predicted, target)?;
            info!(model = %forecaster.label(), target = %target, rmse = score, "evaluated");
        }
        predictions.push((forecaster, predicted));
    }

    Ok(EvalRun {
        prepared,
        splits,
        predictions,
        log,
    })
}
