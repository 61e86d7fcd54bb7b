//! Remote data sources.
//!
//! - paginated REST API (`api`)
//! - static CSV downloads (`csv_url`)
//! - relational database (`sql`, query execution behind the `mysql` feature)

use std::time::Duration;

use reqwest::blocking::Client;

use crate::error::PipelineError;

pub mod api;
pub mod csv_url;
pub mod sql;

pub use api::{ApiClient, Page};
pub use csv_url::fetch_csv;

/// Blocking HTTP client shared by every remote source.
pub fn http_client(timeout: Duration) -> Result<Client, PipelineError> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| PipelineError::Config(format!("failed to build HTTP client: {e}")))
}
