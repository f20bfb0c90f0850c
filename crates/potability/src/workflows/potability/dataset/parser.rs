use std::borrow::Cow;

use serde_json::Value;

use super::{Dataset, FileFormat, ParseError, Record};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Header-positional CSV ingestion.
///
/// The first non-blank line names the columns; each later non-blank line is
/// zipped against it by position. A line of bare commas is a row of empty
/// cells. Missing trailing cells read as empty and surplus cells are dropped.
/// Quoted cells and `\"` escapes are understood, but an unquoted cell
/// containing a comma still shifts every later column.
pub(crate) fn parse_csv(bytes: &[u8]) -> Result<Dataset, ParseError> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    let text = std::str::from_utf8(bytes).map_err(|err| {
        ParseError::new(FileFormat::Csv, format!("content is not valid UTF-8 ({err})"))
    })?;
    let text = normalize_quote_escapes(text);

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let mut rows = reader
        .records()
        .filter(|row| !matches!(row, Ok(record) if is_blank(record)));

    let header: Vec<String> = match rows.next() {
        Some(row) => row
            .map_err(csv_error)?
            .iter()
            .map(str::to_string)
            .collect(),
        None => return Err(ParseError::new(FileFormat::Csv, "missing header row")),
    };

    let mut records = Vec::new();
    for row in rows {
        let row = row.map_err(csv_error)?;
        records.push(zip_row(&header, &row));
    }

    Ok(Dataset::new(records))
}

/// JSON ingestion: an array of flat objects whose values are all scalars.
pub(crate) fn parse_json(bytes: &[u8]) -> Result<Dataset, ParseError> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    let root: Value = serde_json::from_slice(bytes)
        .map_err(|err| ParseError::new(FileFormat::Json, err.to_string()))?;

    let Value::Array(items) = root else {
        return Err(ParseError::new(
            FileFormat::Json,
            "expected an array of records",
        ));
    };

    let mut records = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        let Value::Object(record) = item else {
            return Err(ParseError::new(
                FileFormat::Json,
                format!("row {index} is not an object"),
            ));
        };

        if let Some((key, _)) = record
            .iter()
            .find(|(_, value)| value.is_array() || value.is_object())
        {
            return Err(ParseError::new(
                FileFormat::Json,
                format!("row {index} field '{key}' is not a scalar value"),
            ));
        }

        records.push(record);
    }

    Ok(Dataset::new(records))
}

/// Only a line with no delimiter and nothing but whitespace is blank.
fn is_blank(record: &csv::StringRecord) -> bool {
    record.len() <= 1 && record.iter().all(str::is_empty)
}

/// Rewrites `\"` inside quoted cells as `""` so the reader needs no escape
/// character and every other backslash stays literal.
///
/// Exports escape quotes but not backslashes, so `\"` right before a
/// delimiter or the end of input reads as a literal trailing backslash
/// followed by the closing quote. A cell whose text contains `",` is the one
/// shape that cannot be told apart and does not read back.
fn normalize_quote_escapes(text: &str) -> Cow<'_, str> {
    if !text.contains("\\\"") {
        return Cow::Borrowed(text);
    }

    let mut out = String::with_capacity(text.len() + 16);
    let mut chars = text.chars().peekable();
    let mut in_quotes = false;
    let mut field_start = true;

    while let Some(c) = chars.next() {
        if !in_quotes {
            if c == '"' && field_start {
                in_quotes = true;
            }
            field_start = matches!(c, ',' | '\n' | '\r');
            out.push(c);
            continue;
        }

        match c {
            '\\' if chars.peek() == Some(&'"') => {
                chars.next();
                if matches!(chars.peek(), None | Some(',' | '\n' | '\r')) {
                    out.push_str("\\\"");
                    in_quotes = false;
                } else {
                    out.push_str("\"\"");
                }
            }
            '"' if chars.peek() == Some(&'"') => {
                chars.next();
                out.push_str("\"\"");
            }
            '"' => {
                in_quotes = false;
                out.push(c);
            }
            _ => out.push(c),
        }
    }

    Cow::Owned(out)
}

fn zip_row(header: &[String], row: &csv::StringRecord) -> Record {
    header
        .iter()
        .enumerate()
        .map(|(index, column)| {
            let cell = row.get(index).unwrap_or_default();
            (column.clone(), Value::String(cell.to_string()))
        })
        .collect()
}

fn csv_error(err: csv::Error) -> ParseError {
    ParseError::new(FileFormat::Csv, err.to_string())
}
