//! Local snapshot store: one CSV file per dataset.
//!
//! The store is a plain "does the file exist" cache. There is no freshness
//! check and no invalidation; delete the file to force a re-fetch.

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::domain::Table;
use crate::error::PipelineError;
use crate::io::table_csv::{read_table, write_table};

#[derive(Debug, Clone)]
pub struct SnapshotStore {
    dir: PathBuf,
}

impl SnapshotStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.csv"))
    }

    pub fn exists(&self, name: &str) -> bool {
        self.path_for(name).is_file()
    }

    pub fn read(&self, name: &str) -> Result<Table, PipelineError> {
        let path = self.path_for(name);
        let file = File::open(&path).map_err(|e| PipelineError::Snapshot {
            path: path.clone(),
            message: format!("failed to open: {e}"),
        })?;
        read_table(file, true).map_err(|e| PipelineError::Snapshot {
            path,
            message: format!("failed to parse: {e}"),
        })
    }

    /// Persist `table` under `name`.
    ///
    /// The CSV is written to a sibling temp file and renamed into place, so a
    /// failed write never leaves a truncated snapshot behind.
    pub fn write(&self, name: &str, table: &Table) -> Result<PathBuf, PipelineError> {
        let path = self.path_for(name);
        let tmp = self.dir.join(format!("{name}.csv.tmp"));
        let snapshot_err = |message: String| PipelineError::Snapshot {
            path: path.clone(),
            message,
        };

        fs::create_dir_all(&self.dir).map_err(|e| snapshot_err(format!("failed to create directory: {e}")))?;

        let result = File::create(&tmp)
            .map_err(|e| snapshot_err(format!("failed to create: {e}")))
            .and_then(|file| {
                write_table(BufWriter::new(file), table, true)
                    .map_err(|e| snapshot_err(format!("failed to write: {e}")))
            })
            .and_then(|()| fs::rename(&tmp, &path).map_err(|e| snapshot_err(format!("failed to rename: {e}"))));

        if let Err(err) = result {
            let _ = fs::remove_file(&tmp);
            return Err(err);
        }
        Ok(path)
    }

    /// Return snapshot `name` if it exists, else run `fetch`, persist and return its table.
    ///
    /// Persisting is best-effort: a write failure is logged and the fetched
    /// table is still returned. A fetch failure propagates and nothing is written.
    pub fn load_or_fetch<F>(&self, name: &str, fetch: F) -> Result<Table, PipelineError>
    where
        F: FnOnce() -> Result<Table, PipelineError>,
    {
        if self.exists(name) {
            let table = self.read(name)?;
            info!(dataset = name, rows = table.len(), "loaded snapshot");
            return Ok(table);
        }

        let table = fetch()?;
        match self.write(name, &table) {
            Ok(path) => info!(dataset = name, rows = table.len(), path = %path.display(), "saved snapshot"),
            Err(err) => warn!(dataset = name, error = %err, "failed to save snapshot; continuing without cache"),
        }
        Ok(table)
    }
}
