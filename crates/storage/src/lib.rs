#![forbid(unsafe_code)]

pub mod csv_source;
pub mod repository;

pub use csv_source::{ColumnMapping, CsvRecordSource, parse_records};
pub use repository::{InMemoryRecordSource, RecordSource, SourceError, open_source};
