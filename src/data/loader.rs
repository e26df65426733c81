use std::path::Path;

use arrow::array::{Array, ArrayRef, AsArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Date32Type, Float64Type};
use calamine::{open_workbook_auto, Data, Reader};
use chrono::{Days, NaiveDate, NaiveDateTime};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::error::LoadError;
use super::model::{FilterColumn, SalesRecord, SalesTable};
use crate::config::{DashboardConfig, SalesSchema};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a sales table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.xlsx` / `.xlsm` / `.xls` / `.ods` – workbook, reads `config.sheet_name`
/// * `.csv`     – header row with the schema's column names
/// * `.json`    – `[{ "Cidade do comprador": "...", ... }, ...]`
/// * `.parquet` – one column per schema field
pub fn load_file(path: &Path, config: &DashboardConfig) -> Result<SalesTable, LoadError> {
    if !path.exists() {
        return Err(LoadError::NotFound(path.to_path_buf()));
    }

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let sheet = match ext.as_str() {
        "xlsx" | "xlsm" | "xls" | "xlsb" | "ods" => read_workbook(path, &config.sheet_name)?,
        "csv" => read_csv(path)?,
        "json" => read_json(path, &config.schema)?,
        "parquet" | "pq" => read_parquet(path)?,
        other => return Err(LoadError::UnsupportedExtension(other.to_string())),
    };

    let table = sheet.into_table(&config.schema)?;
    log::info!(
        "Loaded {} sales records from {} ({} cities, {} products, {} payment states)",
        table.len(),
        path.display(),
        table.distinct_values(FilterColumn::City).len(),
        table.distinct_values(FilterColumn::Title).len(),
        table.distinct_values(FilterColumn::PaymentStatus).len(),
    );
    Ok(table)
}

// ---------------------------------------------------------------------------
// Format-neutral intermediate: header + rows of loosely typed cells
// ---------------------------------------------------------------------------

/// A cell as the source format delivers it, before schema typing.
#[derive(Debug, Clone, PartialEq)]
enum Cell {
    Empty,
    Text(String),
    Number(f64),
    Date(NaiveDate),
}

struct RawSheet {
    headers: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

/// Positions of the required columns within a header row.
struct ColumnIndex {
    city: usize,
    title: usize,
    payment_status: usize,
    total_price: usize,
    units_sold: usize,
    date: usize,
}

impl ColumnIndex {
    fn resolve(headers: &[String], schema: &SalesSchema) -> Result<Self, LoadError> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| LoadError::MissingColumn(name.to_string()))
        };
        Ok(ColumnIndex {
            city: find(schema.city.as_str())?,
            title: find(schema.title.as_str())?,
            payment_status: find(schema.payment_status.as_str())?,
            total_price: find(schema.total_price.as_str())?,
            units_sold: find(schema.units_sold.as_str())?,
            date: find(schema.date.as_str())?,
        })
    }
}

impl RawSheet {
    fn into_table(self, schema: &SalesSchema) -> Result<SalesTable, LoadError> {
        let idx = ColumnIndex::resolve(&self.headers, schema)?;
        let empty = Cell::Empty;

        let mut records = Vec::with_capacity(self.rows.len());
        let mut row_no = 0;
        for row in &self.rows {
            if row.iter().all(|c| *c == Cell::Empty) {
                continue;
            }
            row_no += 1;
            let cell = |i: usize| row.get(i).unwrap_or(&empty);
            let invalid = |column: &str, reason: String| LoadError::InvalidCell {
                row: row_no,
                column: column.to_string(),
                reason,
            };

            let total_price = cell_to_f64(cell(idx.total_price))
                .map_err(|reason| invalid(schema.total_price.as_str(), reason))?;
            let units_sold = cell_to_units(cell(idx.units_sold))
                .map_err(|reason| invalid(schema.units_sold.as_str(), reason))?;
            let date = cell_to_date(cell(idx.date))
                .map_err(|reason| invalid(schema.date.as_str(), reason))?;

            records.push(SalesRecord {
                city: cell_to_text(cell(idx.city)),
                title: cell_to_text(cell(idx.title)),
                payment_status: cell_to_text(cell(idx.payment_status)),
                total_price,
                units_sold,
                date,
            });
        }

        Ok(SalesTable::from_records(records))
    }
}

// -- Cell conversion --

fn cell_to_text(cell: &Cell) -> String {
    match cell {
        Cell::Empty => String::new(),
        Cell::Text(s) => s.trim().to_string(),
        Cell::Number(n) => n.to_string(),
        Cell::Date(d) => d.to_string(),
    }
}

fn cell_to_f64(cell: &Cell) -> Result<f64, String> {
    match cell {
        Cell::Number(n) => Ok(*n),
        Cell::Text(s) => parse_number(s).ok_or_else(|| format!("'{s}' is not a number")),
        Cell::Empty => Err("empty cell".to_string()),
        Cell::Date(d) => Err(format!("expected a number, found date {d}")),
    }
}

fn cell_to_units(cell: &Cell) -> Result<i64, String> {
    let n = cell_to_f64(cell)?;
    if n.fract() != 0.0 || !n.is_finite() {
        return Err(format!("{n} is not a whole number of units"));
    }
    // `i64::MAX as f64` rounds up to 2^63, so the upper bound is exclusive.
    if n < i64::MIN as f64 || n >= i64::MAX as f64 {
        return Err(format!("{n} units is out of range"));
    }
    Ok(n as i64)
}

fn cell_to_date(cell: &Cell) -> Result<NaiveDate, String> {
    match cell {
        Cell::Date(d) => Ok(*d),
        Cell::Number(serial) => {
            excel_serial_to_date(*serial).ok_or_else(|| format!("{serial} is not a valid date"))
        }
        Cell::Text(s) => parse_date(s).ok_or_else(|| format!("'{s}' is not a date")),
        Cell::Empty => Err("empty cell".to_string()),
    }
}

/// Parse a number written with either `.` or `,` as decimal separator.
///
/// When both appear, the last one is the decimal separator and the other
/// must split the integer part into groups of three (`1,234.50`,
/// `1.234,50`). A single separator followed by exactly three digits after
/// a non-zero lead of one to three digits is a thousands separator, so
/// `1.234` and `1,234` are both 1234 while `12.5` and `0.125` stay
/// decimals. Anything else with misplaced separators is rejected.
fn parse_number(s: &str) -> Option<f64> {
    let s = s.trim();
    if s.contains(['e', 'E']) {
        return s.parse().ok();
    }
    let (negative, body) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s),
    };

    let Some(pos) = body.rfind(['.', ',']) else {
        return s.parse().ok();
    };
    let sep = if body[pos..].starts_with('.') { '.' } else { ',' };
    let other = if sep == '.' { ',' } else { '.' };
    let (int_part, frac_part) = (&body[..pos], &body[pos + 1..]);

    let (int_digits, frac_digits) = if int_part.contains(sep) {
        // Repeated separator: grouping only, e.g. 1.234.567.
        (ungroup(body, sep)?, "")
    } else if int_part.contains(other) {
        if !is_digits(frac_part) {
            return None;
        }
        (ungroup(int_part, other)?, frac_part)
    } else if let Some(grouped) = ungroup(body, sep).filter(|_| frac_part.len() == 3) {
        (grouped, "")
    } else {
        if !is_digits(int_part) || !is_digits(frac_part) {
            return None;
        }
        (int_part.to_string(), frac_part)
    };

    let normalised = if frac_digits.is_empty() {
        int_digits
    } else {
        format!("{int_digits}.{frac_digits}")
    };
    let value: f64 = normalised.parse().ok()?;
    Some(if negative { -value } else { value })
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// Join `1.234.567` into `1234567`. The lead group has one to three digits
/// and no leading zero; every later group has exactly three.
fn ungroup(s: &str, sep: char) -> Option<String> {
    let mut groups = s.split(sep);
    let lead = groups.next()?;
    if !is_digits(lead) || lead.len() > 3 || lead.starts_with('0') {
        return None;
    }
    let mut out = lead.to_string();
    for group in groups {
        if group.len() != 3 || !is_digits(group) {
            return None;
        }
        out.push_str(group);
    }
    Some(out)
}

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y"];
const DATETIME_FORMATS: [&str; 5] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%d/%m/%Y %H:%M:%S",
];

/// Parse a date or datetime string; datetimes are truncated to their date.
fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    None
}

/// Excel stores dates as days since 1899-12-30 (the 1900 leap-year bug
/// is folded into that epoch). The fractional part is the time of day.
fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 0.0 {
        return None;
    }
    NaiveDate::from_ymd_opt(1899, 12, 30)?.checked_add_days(Days::new(serial.floor() as u64))
}

// ---------------------------------------------------------------------------
// Workbook loader (xlsx / xls / ods)
// ---------------------------------------------------------------------------

/// The first row of the sheet is the header row.
fn read_workbook(path: &Path, sheet_name: &str) -> Result<RawSheet, LoadError> {
    let mut workbook = open_workbook_auto(path)?;
    if !workbook.sheet_names().iter().any(|s| s == sheet_name) {
        return Err(LoadError::SheetNotFound(sheet_name.to_string()));
    }
    let range = workbook.worksheet_range(sheet_name)?;

    let mut rows = range.rows();
    let headers: Vec<String> = match rows.next() {
        Some(header) => header.iter().map(|c| cell_to_text(&workbook_cell(c))).collect(),
        None => Vec::new(),
    };
    let rows = rows
        .map(|row| row.iter().map(workbook_cell).collect())
        .collect();

    Ok(RawSheet { headers, rows })
}

fn workbook_cell(data: &Data) -> Cell {
    match data {
        Data::Empty | Data::Error(_) => Cell::Empty,
        Data::String(s) => Cell::Text(s.clone()),
        Data::Float(f) => Cell::Number(*f),
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Bool(b) => Cell::Text(b.to_string()),
        Data::DateTime(dt) => match excel_serial_to_date(dt.as_f64()) {
            Some(d) => Cell::Date(d),
            None => Cell::Number(dt.as_f64()),
        },
        Data::DateTimeIso(s) => match parse_date(s) {
            Some(d) => Cell::Date(d),
            None => Cell::Text(s.clone()),
        },
        Data::DurationIso(s) => Cell::Text(s.clone()),
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// Every CSV field arrives as text; typing happens in [`RawSheet::into_table`].
fn read_csv(path: &Path) -> Result<RawSheet, LoadError> {
    let mut reader = csv::Reader::from_path(path)?;
    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').to_string())
        .collect();

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        rows.push(
            record
                .iter()
                .map(|field| {
                    if field.trim().is_empty() {
                        Cell::Empty
                    } else {
                        Cell::Text(field.to_string())
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

/// Records-oriented JSON, as written by `df.to_json(orient='records')`:
///
/// ```json
/// [
///   { "Cidade do comprador": "Recife", "Título": "Caneca", "Preço total": 30.0, ... },
///   ...
/// ]
/// ```
///
/// Only the schema's columns are read. A column counts as present when any
/// record has the key; records without it get an empty cell there.
fn read_json(path: &Path, schema: &SalesSchema) -> Result<RawSheet, LoadError> {
    let text = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let root: JsonValue = serde_json::from_str(&text)?;

    let invalid_root = || LoadError::InvalidCell {
        row: 0,
        column: String::new(),
        reason: "expected a top-level array of objects".to_string(),
    };
    let records = root.as_array().ok_or_else(invalid_root)?;

    let objects = records
        .iter()
        .map(|rec| rec.as_object().ok_or_else(invalid_root))
        .collect::<Result<Vec<_>, _>>()?;

    let headers: Vec<String> = schema
        .columns()
        .iter()
        .filter(|c| objects.iter().any(|obj| obj.contains_key(**c)))
        .map(|c| c.to_string())
        .collect();

    let mut rows = Vec::with_capacity(objects.len());
    for obj in objects {
        rows.push(
            headers
                .iter()
                .map(|h| obj.get(h).map(json_cell).unwrap_or(Cell::Empty))
                .collect(),
        );
    }

    Ok(RawSheet { headers, rows })
}

fn json_cell(val: &JsonValue) -> Cell {
    match val {
        JsonValue::Null => Cell::Empty,
        JsonValue::String(s) => Cell::Text(s.clone()),
        JsonValue::Number(n) => match n.as_f64() {
            Some(f) => Cell::Number(f),
            None => Cell::Text(n.to_string()),
        },
        JsonValue::Bool(b) => Cell::Text(b.to_string()),
        other => Cell::Text(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file written by Pandas (`df.to_parquet()`) or Polars.
///
/// String columns become text, numeric columns numbers, and
/// date/timestamp columns dates. Other types are cast to strings.
fn read_parquet(path: &Path) -> Result<RawSheet, LoadError> {
    let file = std::fs::File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
    let headers: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build()?;

    let mut rows = Vec::new();
    for batch_result in reader {
        let batch = batch_result?;
        let columns = batch
            .columns()
            .iter()
            .map(arrow_cells)
            .collect::<Result<Vec<_>, _>>()?;

        for row in 0..batch.num_rows() {
            rows.push(columns.iter().map(|col| col[row].clone()).collect());
        }
    }

    Ok(RawSheet { headers, rows })
}

/// Convert one Arrow column into cells.
fn arrow_cells(col: &ArrayRef) -> Result<Vec<Cell>, LoadError> {
    let cells = match col.data_type() {
        DataType::Int8
        | DataType::Int16
        | DataType::Int32
        | DataType::Int64
        | DataType::UInt8
        | DataType::UInt16
        | DataType::UInt32
        | DataType::UInt64
        | DataType::Float32
        | DataType::Float64
        | DataType::Decimal128(_, _) => {
            let floats = cast(col, &DataType::Float64)?;
            let floats = floats.as_primitive::<Float64Type>();
            (0..floats.len())
                .map(|i| {
                    if floats.is_null(i) {
                        Cell::Empty
                    } else {
                        Cell::Number(floats.value(i))
                    }
                })
                .collect()
        }
        DataType::Date32 | DataType::Date64 | DataType::Timestamp(_, _) => {
            let days = cast(col, &DataType::Date32)?;
            let days = days.as_primitive::<Date32Type>();
            (0..days.len())
                .map(|i| {
                    if days.is_null(i) {
                        Cell::Empty
                    } else {
                        date32_to_date(days.value(i)).map_or(Cell::Empty, Cell::Date)
                    }
                })
                .collect()
        }
        _ => {
            let text = cast(col, &DataType::Utf8)?;
            let text = text.as_string::<i32>();
            (0..text.len())
                .map(|i| {
                    if text.is_null(i) {
                        Cell::Empty
                    } else {
                        Cell::Text(text.value(i).to_string())
                    }
                })
                .collect()
        }
    };
    Ok(cells)
}

/// Arrow `Date32` counts days since 1970-01-01.
fn date32_to_date(days: i32) -> Option<NaiveDate> {
    const UNIX_EPOCH_FROM_CE: i32 = 719_163;
    NaiveDate::from_num_days_from_ce_opt(days.checked_add(UNIX_EPOCH_FROM_CE)?)
}
