use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;

use arrow::array::{Array, ArrayRef, AsArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Date32Type, Float64Type};
use calamine::{open_workbook_auto, Data, Reader};
use chrono::NaiveDate;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{Series, TimeSeriesTable};
use super::period::{parse_period_label, period_from_number};
use crate::error::{DataLoadError, LoadError, ParseError};

/// Name of the period column when none is configured.
pub const DEFAULT_INDEX_COLUMN: &str = "Quarter";

/// Text cells read as missing values, on top of blanks.
const MISSING_MARKERS: &[&str] = &["NA", "N/A", "#N/A", "NaN", "nan", "null", "-"];

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a time series table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.xlsx` / `.xlsm` / `.xls` / `.ods` – first worksheet, header row first
/// * `.csv`     – header row, one row per period
/// * `.json`    – `[{ "Quarter": "1988Q1", "Employment": 123.0, ... }, ...]`
/// * `.parquet` – one column per variable plus the index column
///
/// `index_column` names the column holding the period labels; every other
/// column is a variable. Rows come back sorted by period.
pub fn load_file(path: &Path, index_column: &str) -> Result<TimeSeriesTable, LoadError> {
    if !path.is_file() {
        return Err(DataLoadError::NotFound(path.to_path_buf()).into());
    }

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let sheet = match ext.as_str() {
        "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => read_workbook(path)?,
        "csv" => read_csv(path)?,
        "json" => read_json(path)?,
        "parquet" | "pq" => read_parquet(path)?,
        other => return Err(DataLoadError::UnsupportedFormat(other.to_string()).into()),
    };

    let table = assemble(sheet, index_column)?;
    log::info!(
        "Loaded {} periods x {} variables from {}",
        table.len(),
        table.width(),
        path.display()
    );
    if let Some((first, last)) = table.span() {
        log::debug!("period span {first} .. {last}");
    }
    Ok(table)
}

// ---------------------------------------------------------------------------
// Format-neutral intermediate: header + rows of cells
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
enum Cell {
    Empty,
    Number(f64),
    Text(String),
    Date(NaiveDate),
}

impl Cell {
    fn is_empty(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Empty => Ok(()),
            Cell::Number(n) => write!(f, "{n}"),
            Cell::Text(s) => write!(f, "{s}"),
            Cell::Date(d) => write!(f, "{d}"),
        }
    }
}

#[derive(Debug, Default)]
struct RawSheet {
    headers: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

fn unreadable(path: &Path, err: impl fmt::Display) -> DataLoadError {
    DataLoadError::Unreadable {
        path: path.to_path_buf(),
        message: err.to_string(),
    }
}

/// Turn a raw sheet into a validated table.
fn assemble(sheet: RawSheet, index_column: &str) -> Result<TimeSeriesTable, LoadError> {
    let index_pos = sheet
        .headers
        .iter()
        .position(|h| h.trim() == index_column)
        .ok_or_else(|| DataLoadError::MissingIndexColumn(index_column.to_string()))?;

    let data_cols: Vec<(usize, String)> = sheet
        .headers
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != index_pos)
        .filter_map(|(i, h)| {
            let name = h.trim();
            if name.is_empty() {
                log::warn!("skipping unnamed column {}", i + 1);
                None
            } else {
                Some((i, name.to_string()))
            }
        })
        .collect();

    if data_cols.is_empty() {
        return Err(DataLoadError::NoDataColumns.into());
    }

    let mut periods = Vec::with_capacity(sheet.rows.len());
    let mut values: Vec<Vec<Option<f64>>> = vec![Vec::with_capacity(sheet.rows.len()); data_cols.len()];

    for (i, row) in sheet.rows.iter().enumerate() {
        let row_no = i + 1;
        let label = row.get(index_pos).unwrap_or(&Cell::Empty);

        let blank_row = label.is_empty()
            && data_cols
                .iter()
                .all(|(c, _)| row.get(*c).map_or(true, Cell::is_empty));
        if blank_row {
            continue;
        }

        let period = match label {
            Cell::Date(d) => Some(*d),
            Cell::Number(n) => period_from_number(*n),
            Cell::Text(s) => parse_period_label(s),
            Cell::Empty => None,
        }
        .ok_or_else(|| ParseError {
            row: row_no,
            label: label.to_string(),
        })?;
        periods.push(period);

        for (slot, (c, name)) in values.iter_mut().zip(&data_cols) {
            slot.push(numeric_value(row.get(*c), row_no, name)?);
        }
    }

    let columns = data_cols
        .into_iter()
        .zip(values)
        .map(|((_, name), vals)| Series::new(name, vals))
        .collect();

    Ok(TimeSeriesTable::new(periods, columns)?)
}

fn numeric_value(cell: Option<&Cell>, row: usize, column: &str) -> Result<Option<f64>, DataLoadError> {
    let invalid = |value: String| DataLoadError::InvalidValue {
        row,
        column: column.to_string(),
        value,
    };

    match cell {
        None | Some(Cell::Empty) => Ok(None),
        Some(Cell::Number(n)) if n.is_nan() => Ok(None),
        Some(Cell::Number(n)) => Ok(Some(*n)),
        Some(Cell::Text(s)) => {
            let s = s.trim();
            if s.is_empty() || MISSING_MARKERS.contains(&s) {
                return Ok(None);
            }
            s.replace(',', "")
                .parse::<f64>()
                .map(Some)
                .map_err(|_| invalid(s.to_string()))
        }
        Some(Cell::Date(d)) => Err(invalid(d.to_string())),
    }
}

// ---------------------------------------------------------------------------
// Spreadsheet loader
// ---------------------------------------------------------------------------

/// First worksheet of the workbook; the first row holds the column names.
fn read_workbook(path: &Path) -> Result<RawSheet, DataLoadError> {
    let mut workbook = open_workbook_auto(path).map_err(|e| unreadable(path, e))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(DataLoadError::NoSheet)?
        .map_err(|e| unreadable(path, e))?;

    let mut rows = range.rows();
    let Some(header_row) = rows.next() else {
        return Ok(RawSheet::default());
    };

    let headers = header_row.iter().map(|c| c.to_string()).collect();
    let rows = rows
        .map(|row| row.iter().map(workbook_cell).collect())
        .collect();

    Ok(RawSheet { headers, rows })
}

fn workbook_cell(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::Float(f) => Cell::Number(*f),
        Data::Int(i) => Cell::Number(*i as f64),
        Data::String(s) => Cell::Text(s.clone()),
        Data::Bool(b) => Cell::Text(b.to_string()),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(d) => Cell::Date(d.date()),
            None => Cell::Text(data.to_string()),
        },
        Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::Text(s.clone()),
        Data::Error(e) => Cell::Text(e.to_string()),
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, one row per period.
fn read_csv(path: &Path) -> Result<RawSheet, DataLoadError> {
    let mut reader = csv::Reader::from_path(path).map_err(|e| unreadable(path, e))?;
    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| unreadable(path, e))?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').to_string())
        .collect();

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| unreadable(path, e))?;
        rows.push(
            record
                .iter()
                .map(|v| {
                    if v.trim().is_empty() {
                        Cell::Empty
                    } else {
                        Cell::Text(v.to_string())
                    }
                })
                .collect(),
        );
    }

    Ok(RawSheet { headers, rows })
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Records-oriented JSON, the layout of `df.reset_index().to_json(orient='records')`.
///
/// Columns are ordered by first appearance across the records.
fn read_json(path: &Path) -> Result<RawSheet, DataLoadError> {
    let text = std::fs::read_to_string(path).map_err(|e| unreadable(path, e))?;
    let root: JsonValue = serde_json::from_str(&text).map_err(|e| unreadable(path, e))?;

    let records = root
        .as_array()
        .ok_or_else(|| unreadable(path, "expected a top-level JSON array"))?;

    let mut headers: Vec<String> = Vec::new();
    let mut seen = BTreeSet::new();
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .ok_or_else(|| unreadable(path, format!("record {i} is not a JSON object")))?;
        for key in obj.keys() {
            if seen.insert(key.clone()) {
                headers.push(key.clone());
            }
        }
    }

    let rows = records
        .iter()
        .filter_map(|rec| rec.as_object())
        .map(|obj| {
            headers
                .iter()
                .map(|h| match obj.get(h) {
                    None | Some(JsonValue::Null) => Cell::Empty,
                    Some(JsonValue::Number(n)) => n.as_f64().map_or(Cell::Empty, Cell::Number),
                    Some(JsonValue::String(s)) => Cell::Text(s.clone()),
                    Some(other) => Cell::Text(other.to_string()),
                })
                .collect()
        })
        .collect();

    Ok(RawSheet { headers, rows })
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with one column per variable.
///
/// The index column may be text (`"1988Q1"`), a date, or a timestamp.
/// Variable columns may be any numeric type. Works with files written by
/// both **Pandas** (`df.reset_index().to_parquet()`) and **Polars**.
fn read_parquet(path: &Path) -> Result<RawSheet, DataLoadError> {
    let file = std::fs::File::open(path).map_err(|e| unreadable(path, e))?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file).map_err(|e| unreadable(path, e))?;
    let headers: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build().map_err(|e| unreadable(path, e))?;

    let mut rows = Vec::new();
    for batch_result in reader {
        let batch = batch_result.map_err(|e| unreadable(path, e))?;

        let columns: Vec<Vec<Cell>> = batch
            .columns()
            .iter()
            .map(arrow_cells)
            .collect::<Result<_, _>>()
            .map_err(|e| unreadable(path, e))?;

        for row in 0..batch.num_rows() {
            rows.push(columns.iter().map(|col| col[row].clone()).collect());
        }
    }

    Ok(RawSheet { headers, rows })
}

/// Convert one Arrow column into cells.
fn arrow_cells(col: &ArrayRef) -> Result<Vec<Cell>, arrow::error::ArrowError> {
    match col.data_type() {
        DataType::Utf8 | DataType::LargeUtf8 | DataType::Utf8View => {
            let text = cast(col, &DataType::Utf8)?;
            let text = text.as_string::<i32>();
            Ok((0..text.len())
                .map(|i| {
                    if text.is_null(i) {
                        Cell::Empty
                    } else {
                        Cell::Text(text.value(i).to_string())
                    }
                })
                .collect())
        }
        DataType::Date32 | DataType::Date64 | DataType::Timestamp(_, _) => {
            let dates = cast(col, &DataType::Date32)?;
            let dates = dates.as_primitive::<Date32Type>();
            Ok((0..dates.len())
                .map(|i| {
                    if dates.is_null(i) {
                        Cell::Empty
                    } else {
                        dates.value_as_date(i).map_or(Cell::Empty, Cell::Date)
                    }
                })
                .collect())
        }
        _ => {
            let numbers = cast(col, &DataType::Float64)?;
            let numbers = numbers.as_primitive::<Float64Type>();
            Ok((0..numbers.len())
                .map(|i| {
                    if numbers.is_null(i) {
                        Cell::Empty
                    } else {
                        Cell::Number(numbers.value(i))
                    }
                })
                .collect())
        }
    }
}
