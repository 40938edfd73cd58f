//! The fan streaming-habits dataset behind the chat endpoint.

use std::{
    io::Read,
    path::{Path, PathBuf},
    sync::Arc,
};

use serde::Deserialize;
use thiserror::Error;
use tokio::sync::OnceCell;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum FanDataError {
    #[error("CSV file not found at: {}", .0.display())]
    NotFound(PathBuf),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}

/// One fan row. Columns missing from the file, empty cells and unparseable
/// numbers all read as `None`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct FanRecord {
    #[serde(rename = "COMMUNITY", default, deserialize_with = "csv::invalid_option")]
    pub community: Option<String>,
    #[serde(rename = "PRIMARY_MERCHANT", default, deserialize_with = "csv::invalid_option")]
    pub primary_merchant: Option<String>,
    #[serde(rename = "PRIMARY_SPEND", default, deserialize_with = "csv::invalid_option")]
    pub primary_spend: Option<f64>,
    #[serde(rename = "SECONDARY_SPEND", default, deserialize_with = "csv::invalid_option")]
    pub secondary_spend: Option<f64>,
    #[serde(rename = "WINS", default, deserialize_with = "csv::invalid_option")]
    pub wins: Option<f64>,
    #[serde(rename = "LOSSES", default, deserialize_with = "csv::invalid_option")]
    pub losses: Option<f64>,
    #[serde(rename = "NET", default, deserialize_with = "csv::invalid_option")]
    pub net: Option<f64>,
}

impl FanRecord {
    /// Primary plus secondary spend, counting absent values as zero.
    pub fn total_spend(&self) -> f64 {
        self.primary_spend.unwrap_or(0.0) + self.secondary_spend.unwrap_or(0.0)
    }

    pub fn in_community(&self, community: &str) -> bool {
        self.community.as_deref() == Some(community)
    }
}

/// Parse a headed CSV into fan records. Blank lines are skipped.
pub fn parse_fan_records<R: Read>(reader: R) -> Result<Vec<FanRecord>, csv::Error> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let headers = reader.headers()?.clone();
    debug!(columns = ?headers.iter().collect::<Vec<_>>(), "Fan CSV headers");

    reader.deserialize().collect()
}

/// Lazily loaded, process-lifetime copy of the fan CSV.
///
/// The file is read on first use. A failed load is not cached, so a later
/// request retries it.
#[derive(Debug)]
pub struct FanDataset {
    path: PathBuf,
    records: OnceCell<Arc<Vec<FanRecord>>>,
}

impl FanDataset {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            records: OnceCell::new(),
        }
    }

    /// A dataset that is already loaded.
    pub fn from_records(records: Vec<FanRecord>) -> Self {
        Self {
            path: PathBuf::new(),
            records: OnceCell::new_with(Some(Arc::new(records))),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_loaded(&self) -> bool {
        self.records.initialized()
    }

    pub async fn records(&self) -> Result<Arc<Vec<FanRecord>>, FanDataError> {
        if let Some(records) = self.records.get() {
            debug!(rows = records.len(), "Using cached fan data");
        }

        self.records
            .get_or_try_init(|| async {
                info!(path = %self.path.display(), "Loading fan data");
                if !tokio::fs::try_exists(&self.path).await.unwrap_or(false) {
                    return Err(FanDataError::NotFound(self.path.clone()));
                }

                let content = tokio::fs::read(&self.path).await?;
                let records = parse_fan_records(content.as_slice())?;
                info!(rows = records.len(), "Fan data cached");
                Ok(Arc::new(records))
            })
            .await
            .cloned()
    }
}
