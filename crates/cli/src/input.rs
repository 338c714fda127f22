// Table input: CSV/TSV with a header row, or a JSON array of objects.

use std::fs;
use std::io;
use std::path::Path;

use clap::ValueEnum;
use facetbar_engine::{FieldValue, Row};

use crate::CliError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Csv,
    Tsv,
    Json,
}

impl Format {
    fn delimiter(self) -> u8 {
        match self {
            Format::Tsv => b'\t',
            _ => b',',
        }
    }
}

pub fn infer_format(path: &Path) -> Result<Format, CliError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase());

    match ext.as_deref() {
        Some("csv") => Ok(Format::Csv),
        Some("tsv") | Some("tab") => Ok(Format::Tsv),
        Some("json") => Ok(Format::Json),
        _ => Err(CliError::args(format!(
            "cannot infer format from extension {:?}",
            ext.as_deref().unwrap_or("(none)")
        ))
        .with_hint("use --from with one of: csv, tsv, json")),
    }
}

/// Read every row of `path`. `infer` parses numbers and booleans in
/// delimited files; JSON keeps its own types.
pub fn load_rows(path: &Path, format: Option<Format>, infer: bool) -> Result<Vec<Row>, CliError> {
    let format = match format {
        Some(f) => f,
        None => infer_format(path)?,
    };

    let content = fs::read_to_string(path).map_err(|e| {
        let message = format!("{}: {}", path.display(), e);
        match e.kind() {
            io::ErrorKind::InvalidData => CliError::input(message),
            _ => CliError::args(message),
        }
    })?;

    let rows = match format {
        Format::Csv | Format::Tsv => parse_delimited(&content, format.delimiter(), infer),
        Format::Json => parse_json(&content),
    }
    .map_err(|e| CliError::input(format!("{}: {}", path.display(), e)))?;

    log::debug!("loaded {} rows from {}", rows.len(), path.display());
    Ok(rows)
}

fn parse_cell(raw: &str, infer: bool) -> FieldValue {
    if infer {
        FieldValue::infer(raw)
    } else if raw.is_empty() {
        FieldValue::Empty
    } else {
        FieldValue::Text(raw.to_string())
    }
}

pub(crate) fn parse_delimited(content: &str, delimiter: u8, infer: bool) -> Result<Vec<Row>, String> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| e.to_string())?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    if headers.iter().all(|h| h.is_empty()) {
        return Err("missing header row".to_string());
    }

    let mut rows = Vec::new();
    for (row_idx, result) in reader.records().enumerate() {
        // Line 1 is the header
        let record = result.map_err(|e| format!("line {}: {}", row_idx + 2, e))?;
        let row: Row = headers
            .iter()
            .enumerate()
            .filter(|(_, header)| !header.is_empty())
            .map(|(col, header)| {
                (header.clone(), parse_cell(record.get(col).unwrap_or(""), infer))
            })
            .collect();
        rows.push(row);
    }
    Ok(rows)
}

pub(crate) fn parse_json(content: &str) -> Result<Vec<Row>, String> {
    let value: serde_json::Value = serde_json::from_str(content).map_err(|e| e.to_string())?;
    let items = value
        .as_array()
        .ok_or_else(|| "expected a JSON array of objects".to_string())?;

    items
        .iter()
        .enumerate()
        .map(|(i, item)| Row::from_json(item).ok_or_else(|| format!("item {} is not an object", i)))
        .collect()
}

// ============================================================================
// Output
// ============================================================================

pub fn field_to_json(value: &FieldValue) -> serde_json::Value {
    match value {
        FieldValue::Empty => serde_json::Value::Null,
        FieldValue::Text(s) | FieldValue::Error(s) => serde_json::Value::String(s.clone()),
        FieldValue::Bool(b) => serde_json::Value::Bool(*b),
        FieldValue::Number(n) => serde_json::Number::from_f64(n.0)
            .map(serde_json::Value::Number)
            .unwrap_or_else(|| serde_json::Value::String(value.display_string())),
    }
}

pub fn row_to_json(row: &Row) -> serde_json::Value {
    let object: serde_json::Map<String, serde_json::Value> = row
        .fields()
        .map(|(column, value)| (column.to_string(), field_to_json(value)))
        .collect();
    serde_json::Value::Object(object)
}

/// Union of column names in first-seen order.
pub fn column_order(rows: &[Row]) -> Vec<String> {
    let mut columns: Vec<String> = Vec::new();
    for row in rows {
        for column in row.columns() {
            if !columns.iter().any(|c| c == column) {
                columns.push(column.to_string());
            }
        }
    }
    columns
}

/// Write `rows` as CSV under `columns`. Missing fields are empty.
pub fn write_csv<W: io::Write>(out: W, columns: &[String], rows: &[Row]) -> Result<(), CliError> {
    if columns.is_empty() {
        return Ok(());
    }
    let mut writer = csv::Writer::from_writer(out);
    let io_err = |e: csv::Error| CliError::io(e.to_string());

    writer.write_record(columns).map_err(io_err)?;
    for row in rows {
        let record: Vec<String> = columns
            .iter()
            .map(|c| row.display(c).unwrap_or_default())
            .collect();
        writer.write_record(&record).map_err(io_err)?;
    }
    writer.flush().map_err(|e| CliError::io(e.to_string()))
}
