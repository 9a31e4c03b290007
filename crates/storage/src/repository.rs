use async_trait::async_trait;
use quiz_core::model::Record;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

use crate::csv_source::CsvRecordSource;

/// Errors surfaced while loading records from a data source.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SourceError {
    #[error("need an 'idiom' column and a 'meaning' column, found {headers:?}")]
    InsufficientColumns { headers: Vec<String> },

    #[error("unsupported file format: .{extension}")]
    UnsupportedFormat { extension: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),
}

/// Supplies the raw idiom/meaning records a quiz is built from.
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Load every usable record, in source order.
    ///
    /// # Errors
    ///
    /// Returns `SourceError` if the source cannot be read or lacks the required columns.
    async fn load_records(&self) -> Result<Vec<Record>, SourceError>;
}

/// Fixed record list, for tests and for callers that ingest data themselves.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRecordSource {
    records: Arc<[Record]>,
}

impl InMemoryRecordSource {
    #[must_use]
    pub fn new(records: impl Into<Arc<[Record]>>) -> Self {
        Self {
            records: records.into(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl RecordSource for InMemoryRecordSource {
    async fn load_records(&self) -> Result<Vec<Record>, SourceError> {
        Ok(self.records.to_vec())
    }
}

/// Pick a source implementation from the file extension.
///
/// # Errors
///
/// Returns `SourceError::UnsupportedFormat` for anything other than `.csv`.
pub fn open_source(path: impl AsRef<Path>) -> Result<Arc<dyn RecordSource>, SourceError> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    match extension.as_str() {
        "csv" => Ok(Arc::new(CsvRecordSource::from_path(path))),
        _ => Err(SourceError::UnsupportedFormat { extension }),
    }
}
