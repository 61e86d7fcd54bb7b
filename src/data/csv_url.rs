//! Static CSV downloads (Open Power Systems Data).

use reqwest::blocking::Client;
use tracing::info;

use crate::domain::Table;
use crate::error::PipelineError;
use crate::io::table_csv::read_table;

/// Germany daily electricity consumption, wind and solar production (2006-2017).
pub const DEFAULT_POWER_URL: &str =
    "https://raw.githubusercontent.com/jenfly/opsd/master/opsd_germany_daily.csv";

/// Download `url` and parse the body as a CSV table (first row is the header).
pub fn fetch_csv(client: &Client, url: &str) -> Result<Table, PipelineError> {
    let resp = client
        .get(url)
        .send()
        .map_err(|source| PipelineError::Transport {
            url: url.to_string(),
            source,
        })?;

    if !resp.status().is_success() {
        return Err(PipelineError::FetchFailed {
            status: resp.status(),
            url: url.to_string(),
        });
    }

    let body = resp.bytes().map_err(|source| PipelineError::Transport {
        url: url.to_string(),
        source,
    })?;

    let table = read_table(body.as_ref(), false).map_err(|e| PipelineError::MalformedPayload {
        url: url.to_string(),
        reason: format!("invalid CSV: {e}"),
    })?;

    info!(url, rows = table.len(), columns = table.columns().len(), "downloaded CSV");
    Ok(table)
}
