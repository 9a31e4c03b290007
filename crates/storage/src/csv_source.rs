use async_trait::async_trait;
use csv::ReaderBuilder;
use quiz_core::model::Record;
use std::io::Read;
use std::path::PathBuf;
use tracing::{debug, warn};

use crate::repository::{RecordSource, SourceError};

/// Header positions of the idiom and meaning columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnMapping {
    pub idiom: usize,
    pub meaning: usize,
}

impl ColumnMapping {
    /// Find the first header containing "idiom" and the first containing
    /// "meaning", ignoring case.
    ///
    /// # Errors
    ///
    /// Returns `SourceError::InsufficientColumns` if either is missing.
    pub fn detect(headers: &[String]) -> Result<Self, SourceError> {
        let find = |needle: &str| {
            headers
                .iter()
                .position(|h| h.to_lowercase().contains(needle))
        };

        match (find("idiom"), find("meaning")) {
            (Some(idiom), Some(meaning)) => Ok(Self { idiom, meaning }),
            _ => Err(SourceError::InsufficientColumns {
                headers: headers.to_vec(),
            }),
        }
    }
}

#[derive(Debug, Clone)]
enum CsvInput {
    Path(PathBuf),
    Bytes(Vec<u8>),
}

/// Reads records from a CSV file with a header row.
#[derive(Debug, Clone)]
pub struct CsvRecordSource {
    input: CsvInput,
}

impl CsvRecordSource {
    #[must_use]
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self {
            input: CsvInput::Path(path.into()),
        }
    }

    #[must_use]
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            input: CsvInput::Bytes(bytes.into()),
        }
    }
}

#[async_trait]
impl RecordSource for CsvRecordSource {
    async fn load_records(&self) -> Result<Vec<Record>, SourceError> {
        match &self.input {
            CsvInput::Path(path) => {
                debug!(path = %path.display(), "loading records from csv");
                let bytes = tokio::fs::read(path).await?;
                parse_records(bytes.as_slice())
            }
            CsvInput::Bytes(bytes) => parse_records(bytes.as_slice()),
        }
    }
}

/// Parse records from CSV text.
///
/// Cells are trimmed. Rows with neither an idiom nor a meaning are skipped;
/// short rows read missing cells as empty.
///
/// # Errors
///
/// Returns `SourceError::InsufficientColumns` if the header lacks either column,
/// or `SourceError::Csv` on malformed input.
pub fn parse_records<R: Read>(reader: R) -> Result<Vec<Record>, SourceError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();
    let mapping = ColumnMapping::detect(&headers)?;

    let mut records = Vec::new();
    for (row, result) in reader.records().enumerate() {
        let row_data = result?;
        let cell = |idx: usize| row_data.get(idx).unwrap_or("").trim().to_string();
        let idiom = cell(mapping.idiom);
        let meaning = cell(mapping.meaning);

        if idiom.is_empty() && meaning.is_empty() {
            // +2: one for the header, one for 1-based numbering
            warn!(row = row + 2, "skipping blank row");
            continue;
        }
        records.push(Record { idiom, meaning });
    }

    debug!(count = records.len(), "parsed csv records");
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn detects_columns_by_substring_ignoring_case() {
        let mapping =
            ColumnMapping::detect(&headers(&["No.", "English Idiom", "Its MEANING"])).unwrap();
        assert_eq!(mapping, ColumnMapping { idiom: 1, meaning: 2 });
    }

    #[test]
    fn first_matching_header_wins() {
        let mapping =
            ColumnMapping::detect(&headers(&["meaning", "idiom", "idiom (alt)"])).unwrap();
        assert_eq!(mapping, ColumnMapping { idiom: 1, meaning: 0 });
    }

    #[test]
    fn missing_meaning_column_is_insufficient() {
        let err = ColumnMapping::detect(&headers(&["idiom", "notes"])).unwrap_err();
        assert!(matches!(err, SourceError::InsufficientColumns { .. }));
    }

    #[test]
    fn parses_rows_trimming_and_skipping_blanks() {
        let csv = "Idiom,Meaning,Example\n\
                   break the ice , to start a conversation,x\n\
                   ,,\n\
                   spill the beans,reveal a secret\n";

        let records = parse_records(csv.as_bytes()).unwrap();

        assert_eq!(
            records,
            vec![
                Record::new("break the ice", "to start a conversation"),
                Record::new("spill the beans", "reveal a secret"),
            ]
        );
    }

    #[test]
    fn header_only_file_yields_no_records() {
        let records = parse_records("idiom,meaning\n".as_bytes()).unwrap();
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn byte_source_loads_through_trait() {
        let source = CsvRecordSource::from_bytes("idiom,meaning\nbite the bullet,endure pain\n");
        let records = source.load_records().await.unwrap();
        assert_eq!(records, vec![Record::new("bite the bullet", "endure pain")]);
    }
}
