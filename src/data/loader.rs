use std::io::ErrorKind;
use std::path::Path;
use std::sync::Arc;

use arrow::array::{Array, AsArray};
use arrow::datatypes::{DataType, Float32Type, Float64Type, Int32Type, Int64Type};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

use super::error::{DataError, Result};
use super::model::{Table, Value};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a statistics table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv` / `.tsv` / `.txt` – delimited text with a header row
/// * `.parquet` / `.pq`       – flat parquet file with scalar columns
///
/// Header names are trimmed in both cases.
pub fn load_file(path: &Path) -> Result<Table> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let table = match ext.as_str() {
        "parquet" | "pq" => load_parquet(path)?,
        "csv" | "tsv" | "txt" | "" => load_delimited(path)?,
        other => {
            return Err(DataError::parse(
                path,
                format!("unsupported file extension .{other}"),
            ))
        }
    };

    log::info!(
        "Loaded {} rows × {} columns from {}",
        table.len(),
        table.columns().len(),
        path.display()
    );
    Ok(table)
}

fn read_bytes(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => DataError::FileMissing {
            path: path.to_path_buf(),
        },
        _ => DataError::parse(path, e),
    })
}

// ---------------------------------------------------------------------------
// Delimited text loader
// ---------------------------------------------------------------------------

fn load_delimited(path: &Path) -> Result<Table> {
    let bytes = read_bytes(path)?;
    let text = String::from_utf8(bytes).map_err(|e| DataError::parse(path, e))?;
    parse_delimited(&text).map_err(|reason| DataError::parse(path, reason))
}

/// Parse delimited text: optional BOM, sniffed delimiter, header row first.
pub fn parse_delimited(text: &str) -> std::result::Result<Table, String> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let header_line = text.lines().next().unwrap_or("");
    if header_line.trim().is_empty() {
        return Err("missing header row".to_string());
    }

    let delimiter = sniff_delimiter(header_line);
    let decimal_comma = delimiter != b',';

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| format!("reading header row: {e}"))?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut table = Table::new(headers);
    // Region names and codes such as "07" are kept verbatim.
    let region_idx = table.region_column().and_then(|c| table.column_index(c));
    for (row_no, result) in reader.records().enumerate() {
        let record = result.map_err(|e| format!("row {}: {e}", row_no + 1))?;
        table.push_row(
            record
                .iter()
                .enumerate()
                .map(|(i, cell)| {
                    if Some(i) == region_idx {
                        text_cell(cell)
                    } else {
                        parse_cell(cell, decimal_comma)
                    }
                })
                .collect(),
        );
    }
    Ok(table)
}

/// Pick the most frequent of `;`, tab and `,` in the header line; comma when none occur.
fn sniff_delimiter(header_line: &str) -> u8 {
    [b';', b'\t', b',']
        .into_iter()
        .map(|d| (d, header_line.bytes().filter(|&b| b == d).count()))
        .filter(|&(_, n)| n > 0)
        .max_by_key(|&(_, n)| n)
        .map(|(d, _)| d)
        .unwrap_or(b',')
}

fn text_cell(raw: &str) -> Value {
    match raw.trim() {
        "" => Value::Null,
        s => Value::Text(s.to_string()),
    }
}

fn parse_cell(raw: &str, decimal_comma: bool) -> Value {
    let s = raw.trim();
    if s.is_empty() {
        return Value::Null;
    }
    if let Ok(i) = s.parse::<i64>() {
        return Value::Integer(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        return Value::Float(f);
    }
    if s.starts_with(|c: char| c.is_ascii_digit() || c == '-') {
        // "12 345,6" style numbers: grouping spaces and a decimal comma.
        let mut cleaned: String = s
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '\u{a0}')
            .collect();
        if decimal_comma {
            cleaned = cleaned.replace(',', ".");
        }
        if let Ok(i) = cleaned.parse::<i64>() {
            return Value::Integer(i);
        }
        if let Ok(f) = cleaned.parse::<f64>() {
            return Value::Float(f);
        }
    }
    Value::Text(s.to_string())
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a flat parquet file (one scalar column per statistic).
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`).
fn load_parquet(path: &Path) -> Result<Table> {
    let file = std::fs::File::open(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => DataError::FileMissing {
            path: path.to_path_buf(),
        },
        _ => DataError::parse(path, e),
    })?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).map_err(|e| DataError::parse(path, e))?;

    let mut table = Table::new(
        builder
            .schema()
            .fields()
            .iter()
            .map(|f| f.name().trim().to_string()),
    );
    let width = table.columns().len();
    let reader = builder.build().map_err(|e| DataError::parse(path, e))?;

    for batch_result in reader {
        let batch = batch_result.map_err(|e| DataError::parse(path, e))?;
        for row in 0..batch.num_rows() {
            table.push_row(
                (0..width.min(batch.num_columns()))
                    .map(|c| extract_value(batch.column(c), row))
                    .collect(),
            );
        }
    }

    Ok(table)
}

/// Extract a single cell from an Arrow column at a given row.
fn extract_value(col: &Arc<dyn Array>, row: usize) -> Value {
    if col.is_null(row) {
        return Value::Null;
    }
    match col.data_type() {
        DataType::Utf8 => Value::Text(col.as_string::<i32>().value(row).trim().to_string()),
        DataType::LargeUtf8 => Value::Text(col.as_string::<i64>().value(row).trim().to_string()),
        DataType::Int32 => Value::Integer(col.as_primitive::<Int32Type>().value(row) as i64),
        DataType::Int64 => Value::Integer(col.as_primitive::<Int64Type>().value(row)),
        DataType::Float32 => Value::Float(col.as_primitive::<Float32Type>().value(row) as f64),
        DataType::Float64 => Value::Float(col.as_primitive::<Float64Type>().value(row)),
        DataType::Boolean => Value::Text(col.as_boolean().value(row).to_string()),
        other => {
            log::debug!("Unsupported parquet column type {other:?}, reading as null");
            Value::Null
        }
    }
}
