//! Paginated REST API client for the `items`, `stores` and `sales` resources.
//!
//! Every response looks like:
//!
//! ```text
//! { "payload": { "<resource>": [ {...}, ... ], "next_page": "/api/v1/<resource>?page=2", "max_page": 183 } }
//! ```
//!
//! `next_page` is a path on the same host; it is `null` on the last page.

use std::collections::HashSet;

use reqwest::Url;
use reqwest::blocking::Client;
use serde_json::{Map, Value as Json};
use tracing::{debug, info};

use crate::domain::{Table, Value};
use crate::error::PipelineError;

pub const DEFAULT_API_BASE: &str = "https://python.zgulde.net";
const API_PREFIX: &str = "/api/v1";

/// One decoded page of a paginated resource.
#[derive(Debug, Clone)]
pub struct Page {
    pub records: Vec<Map<String, Json>>,
    pub next_page: Option<String>,
    /// Informational only; the loop is bounded by `next_page`.
    pub max_page: Option<u64>,
}

impl Page {
    /// Decode a response body for `resource`.
    pub fn parse(body: Json, resource: &str) -> Result<Page, String> {
        let Json::Object(mut body) = body else {
            return Err("response body is not a JSON object".to_string());
        };
        let Some(Json::Object(mut payload)) = body.remove("payload") else {
            return Err("missing `payload` object".to_string());
        };

        let records = match payload.remove(resource) {
            Some(Json::Array(items)) => items
                .into_iter()
                .enumerate()
                .map(|(idx, item)| match item {
                    Json::Object(record) => Ok(record),
                    other => Err(format!("record {idx} of `{resource}` is not an object: {other}")),
                })
                .collect::<Result<Vec<_>, _>>()?,
            Some(_) => return Err(format!("`payload.{resource}` is not an array")),
            None => return Err(format!("missing `payload.{resource}`")),
        };

        let next_page = match payload.remove("next_page") {
            None | Some(Json::Null) => None,
            Some(Json::String(s)) if s.trim().is_empty() => None,
            Some(Json::String(s)) => Some(s),
            Some(other) => return Err(format!("`payload.next_page` is not a string: {other}")),
        };

        let max_page = payload.get("max_page").and_then(Json::as_u64);

        Ok(Page {
            records,
            next_page,
            max_page,
        })
    }
}

pub struct ApiClient {
    client: Client,
    base: Url,
}

impl ApiClient {
    /// Create a client for the API rooted at `api_base` (scheme + host).
    pub fn new(client: Client, api_base: &str) -> Result<Self, PipelineError> {
        let base = Url::parse(api_base)
            .map_err(|e| PipelineError::Config(format!("invalid API base URL '{api_base}': {e}")))?;
        Ok(Self { client, base })
    }

    /// URL of the first page of `resource`.
    pub fn resource_url(&self, resource: &str) -> Result<Url, PipelineError> {
        self.base
            .join(&format!("{API_PREFIX}/{resource}"))
            .map_err(|e| PipelineError::Config(format!("invalid resource '{resource}': {e}")))
    }

    /// Fetch every page of `resource` into one table.
    pub fn fetch_resource(&self, resource: &str) -> Result<Table, PipelineError> {
        let url = self.resource_url(resource)?;
        self.fetch_all_pages(&url, resource)
    }

    /// Follow `next_page` from `start` until it is null.
    ///
    /// Each page's records are appended before advancing, so the last page is
    /// never dropped. Any failed request aborts the whole fetch, and so does a
    /// `next_page` that points back at a page already fetched.
    pub fn fetch_all_pages(&self, start: &Url, resource: &str) -> Result<Table, PipelineError> {
        let mut table = Table::default();
        let mut url = start.clone();
        let mut visited = HashSet::from([url.clone()]);
        let mut pages = 0usize;

        loop {
            let page = self.fetch_page(&url, resource)?;
            pages += 1;
            debug!(
                resource,
                page = pages,
                max_page = ?page.max_page,
                records = page.records.len(),
                %url,
                "fetched page"
            );

            for record in page.records {
                table.push_record(record.iter().map(|(k, v)| (k.as_str(), Value::from_json(v))));
            }

            let Some(next) = page.next_page else { break };
            let next_url = start.join(&next).map_err(|e| PipelineError::MalformedPayload {
                url: url.to_string(),
                reason: format!("invalid next_page '{next}': {e}"),
            })?;
            if !visited.insert(next_url.clone()) {
                return Err(PipelineError::MalformedPayload {
                    url: url.to_string(),
                    reason: format!("next_page '{next}' was already fetched"),
                });
            }
            url = next_url;
        }

        info!(resource, pages, rows = table.len(), "fetched all pages");
        Ok(table)
    }

    fn fetch_page(&self, url: &Url, resource: &str) -> Result<Page, PipelineError> {
        let resp = self
            .client
            .get(url.clone())
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

        let body: Json = resp.json().map_err(|e| {
            if e.is_decode() {
                PipelineError::MalformedPayload {
                    url: url.to_string(),
                    reason: format!("invalid JSON: {e}"),
                }
            } else {
                PipelineError::Transport {
                    url: url.to_string(),
                    source: e,
                }
            }
        })?;

        Page::parse(body, resource).map_err(|reason| PipelineError::MalformedPayload {
            url: url.to_string(),
            reason,
        })
    }
}
