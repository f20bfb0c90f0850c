mod export;
mod parser;

pub use export::{export_file_name, to_csv, CsvExport, ExportError};

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Label applied to exported artifacts when the caller supplies none.
pub const DEFAULT_EXPORT_LABEL: &str = "water_quality_data";

/// A loosely typed row; column order follows the source.
pub type Record = Map<String, Value>;

/// Ordered rows ingested from an upload or the built-in sample.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Dataset {
    records: Vec<Record>,
}

impl Dataset {
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn into_records(self) -> Vec<Record> {
        self.records
    }

    pub fn first(&self) -> Option<&Record> {
        self.records.first()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Column names taken from the first record.
    pub fn columns(&self) -> Vec<&str> {
        self.first()
            .map(|record| record.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }
}

impl From<Vec<Record>> for Dataset {
    fn from(records: Vec<Record>) -> Self {
        Self::new(records)
    }
}

/// Upload formats understood by the adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileFormat {
    Csv,
    Json,
}

impl FileFormat {
    /// Accepts `csv`, `.csv`, or a whole file name such as `batch.CSV`.
    pub fn from_extension(declared: &str) -> Option<Self> {
        let declared = declared.trim().to_ascii_lowercase();
        let extension = declared.rsplit('.').next().unwrap_or_default();
        match extension {
            "csv" => Some(FileFormat::Csv),
            "json" => Some(FileFormat::Json),
            _ => None,
        }
    }

    pub fn parse(self, bytes: &[u8]) -> Result<Dataset, ParseError> {
        match self {
            FileFormat::Csv => parser::parse_csv(bytes),
            FileFormat::Json => parser::parse_json(bytes),
        }
    }
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileFormat::Csv => f.write_str("CSV"),
            FileFormat::Json => f.write_str("JSON"),
        }
    }
}

/// Content could not be read as the declared format.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {format} content: {message}")]
pub struct ParseError {
    pub format: FileFormat,
    pub message: String,
}

impl ParseError {
    pub(crate) fn new(format: FileFormat, message: impl Into<String>) -> Self {
        Self {
            format,
            message: message.into(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("unsupported file type '{0}': expected .csv or .json")]
    UnsupportedFormat(String),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("failed to read dataset: {0}")]
    Io(#[from] std::io::Error),
}

/// Parses uploaded content according to its declared extension.
pub fn accept_file(bytes: &[u8], declared_extension: &str) -> Result<Dataset, DatasetError> {
    let format = FileFormat::from_extension(declared_extension)
        .ok_or_else(|| DatasetError::UnsupportedFormat(declared_extension.to_string()))?;
    let dataset = format.parse(bytes)?;
    debug!(%format, rows = dataset.len(), "dataset accepted");
    Ok(dataset)
}

/// Built-in two-row dataset for demos without an upload.
pub fn sample_dataset() -> Dataset {
    const ROWS: [[(&str, &str); 9]; 2] = [
        [
            ("ph", "7.5"),
            ("hardness", "200"),
            ("solids", "500"),
            ("chloramines", "2.5"),
            ("sulfate", "250"),
            ("conductivity", "400"),
            ("organic_carbon", "10"),
            ("trihalomethanes", "50"),
            ("turbidity", "3.5"),
        ],
        [
            ("ph", "6.8"),
            ("hardness", "180"),
            ("solids", "480"),
            ("chloramines", "2.8"),
            ("sulfate", "230"),
            ("conductivity", "380"),
            ("organic_carbon", "9.5"),
            ("trihalomethanes", "45"),
            ("turbidity", "3.2"),
        ],
    ];

    ROWS.iter()
        .map(|row| {
            row.iter()
                .map(|(key, value)| (key.to_string(), Value::String(value.to_string())))
                .collect::<Record>()
        })
        .collect::<Vec<_>>()
        .into()
}

/// Reads uploaded files from disk, one at a time.
///
/// A read that has started always runs to completion; a second caller waits
/// for the first read to finish before its own begins.
#[derive(Debug, Default)]
pub struct DatasetLoader {
    in_flight: Mutex<()>,
}

impl DatasetLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn load_path<P: AsRef<Path>>(&self, path: P) -> Result<Dataset, DatasetError> {
        let path = path.as_ref();
        let declared = path
            .extension()
            .and_then(|extension| extension.to_str())
            .unwrap_or_default();
        let format = FileFormat::from_extension(declared)
            .ok_or_else(|| DatasetError::UnsupportedFormat(path.display().to_string()))?;

        let _read = self.in_flight.lock().await;
        let bytes = tokio::fs::read(path).await?;
        let dataset = format.parse(&bytes)?;
        info!(path = %path.display(), rows = dataset.len(), "dataset loaded");
        Ok(dataset)
    }
}
