//! Cache-or-fetch retrieval of listings snapshots.
//!
//! Snapshots are cached on disk keyed by year and month. A missing cache
//! file is the expected first-run state: the client then performs one
//! blocking GET, persists the body to the cache path and decodes it.
//! There is no retry; every failure is fatal to the call.

use std::fs::{self, File};
use std::io::BufReader;
use std::path::PathBuf;
use std::time::Duration;

use chrono::{Datelike, NaiveDate};
use reqwest::blocking::Client;
use reqwest::StatusCode;
use tracing::{debug, info};

use crate::table::DataTable;

/// Public host serving the listings snapshots.
const DEFAULT_BASE_URL: &str = "http://data.insideairbnb.com/spain/catalonia/barcelona";

#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("request for {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("unexpected status {status} fetching {url}")]
    Status { url: String, status: StatusCode },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("csv decode failed: {0}")]
    Decode(#[from] csv::Error),

    #[error("failed to build http client: {0}")]
    Client(#[source] reqwest::Error),
}

/// Blocking client for listings snapshots with a local file cache.
pub struct ListingsClient {
    base_url: String,
    cache_dir: PathBuf,
    client: Client,
}

impl ListingsClient {
    pub fn new(cache_dir: impl Into<PathBuf>) -> Result<Self, DatasetError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(DatasetError::Client)?;
        Ok(Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            cache_dir: cache_dir.into(),
            client,
        })
    }

    /// Override the snapshot host; tests point this at a local origin.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        let base = base_url.into();
        self.base_url = base.trim_end_matches('/').to_string();
        self
    }

    /// Cache file for a snapshot month.
    pub fn cache_path(&self, date: NaiveDate) -> PathBuf {
        self.cache_dir
            .join(format!("listings_{}-{:02}.csv", date.year(), date.month()))
    }

    fn snapshot_url(&self, date: NaiveDate) -> String {
        format!(
            "{}/{}-{:02}-{:02}/data/listings.csv",
            self.base_url,
            date.year(),
            date.month(),
            date.day()
        )
    }

    /// Load the snapshot for `date`.
    ///
    /// One idempotent operation: read the cache, or on a miss fetch the
    /// snapshot, populate the cache and decode the fetched body.
    pub fn fetch(&self, date: NaiveDate) -> Result<DataTable, DatasetError> {
        let path = self.cache_path(date);
        if path.exists() {
            debug!(path = %path.display(), "listings cache hit");
            let file = File::open(&path)?;
            return Ok(DataTable::from_reader(BufReader::new(file))?);
        }

        let url = self.snapshot_url(date);
        info!(url = %url, "listings cache miss, fetching snapshot");
        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|source| DatasetError::Request {
                url: url.clone(),
                source,
            })?;
        let status = response.status();
        if !status.is_success() {
            return Err(DatasetError::Status { url, status });
        }
        let body = response.bytes().map_err(|source| DatasetError::Request {
            url: url.clone(),
            source,
        })?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, &body)?;
        debug!(path = %path.display(), bytes = body.len(), "snapshot cached");

        Ok(DataTable::from_reader(body.as_ref())?)
    }
}
