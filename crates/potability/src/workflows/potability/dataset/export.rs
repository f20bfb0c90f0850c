use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use super::super::domain::value_text;
use super::Dataset;

/// A named CSV artifact ready for download.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CsvExport {
    pub file_name: String,
    pub content: String,
}

impl CsvExport {
    pub fn build(
        dataset: &Dataset,
        label: &str,
        timestamp: DateTime<Utc>,
    ) -> Result<Self, ExportError> {
        Ok(Self {
            file_name: export_file_name(label, timestamp),
            content: to_csv(dataset)?,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("failed to write CSV row: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to finish CSV export: {0}")]
    Flush(String),
}

/// Serializes records to CSV text.
///
/// The header row comes from the first record's keys and is written bare.
/// Every data cell is double-quoted with embedded quotes escaped as `\"`.
/// Rows are joined by `\n` without a trailing newline; an empty dataset
/// yields empty text.
pub fn to_csv(dataset: &Dataset) -> Result<String, ExportError> {
    let columns = dataset.columns();
    if columns.is_empty() {
        return Ok(String::new());
    }

    let mut buffer = columns.join(",").into_bytes();
    buffer.push(b'\n');

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .quote_style(csv::QuoteStyle::Always)
        .double_quote(false)
        .escape(b'\\')
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(buffer);

    for record in dataset.records() {
        let cells = columns
            .iter()
            .map(|column| record.get(*column).map(value_text).unwrap_or_default());
        writer.write_record(cells)?;
    }

    let buffer = writer
        .into_inner()
        .map_err(|err| ExportError::Flush(err.to_string()))?;
    let mut content =
        String::from_utf8(buffer).map_err(|err| ExportError::Flush(err.to_string()))?;
    if content.ends_with('\n') {
        content.pop();
    }

    Ok(content)
}

/// `<label>_<ISO-8601 timestamp with ':' and '.' replaced by '-'>.csv`
///
/// Quotes, slashes, backslashes and control characters in the label become
/// `_`, so the name is safe in a `Content-Disposition` header and as a single
/// path segment.
pub fn export_file_name(label: &str, timestamp: DateTime<Utc>) -> String {
    let label = sanitize_label(label);
    let stamp = timestamp
        .to_rfc3339_opts(SecondsFormat::Millis, true)
        .replace([':', '.'], "-");
    format!("{label}_{stamp}.csv")
}

fn sanitize_label(label: &str) -> String {
    label
        .trim()
        .chars()
        .map(|c| {
            if c.is_control() || matches!(c, '"' | '\\' | '/') {
                '_'
            } else {
                c
            }
        })
        .collect()
}
