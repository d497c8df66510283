//! Loads a transaction export into memory.
//!
//! Spreadsheets (`.xlsx`, `.xls`, `.ods`) go through calamine, `.csv` files
//! through the csv crate. Both paths end up as `csv::StringRecord`s that are
//! deserialized into [`Transaction`] by header name.

use crate::core::error::ReportError;
use crate::core::transaction::{REQUIRED_COLUMNS, Transaction};
use anyhow::{Context, Result};
use calamine::{Data, Reader};
use chrono::{Duration, NaiveDate, NaiveDateTime, Timelike};
use csv::StringRecord;
use std::path::Path;
use tracing::{debug, info, warn};

#[tracing::instrument(skip_all, fields(path = %path.as_ref().display()))]
pub fn load_transactions<P: AsRef<Path>>(path: P) -> Result<Vec<Transaction>> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(ReportError::TransactionsNotFound(path.to_path_buf()).into());
    }

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    let (headers, records) = match extension.as_deref() {
        Some("csv") => read_csv(path)?,
        Some("xlsx") | Some("xlsm") | Some("xls") | Some("ods") => read_spreadsheet(path)?,
        _ => return Err(ReportError::UnsupportedFormat(path.to_path_buf()).into()),
    };

    let transactions = records_to_transactions(&headers, &records)?;
    info!("Loaded {} transactions", transactions.len());
    Ok(transactions)
}

fn read_csv(path: &Path) -> Result<(StringRecord, Vec<StringRecord>)> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Failed to open CSV file: {}", path.display()))?;

    let headers = reader.headers()?.clone();
    let records = reader
        .records()
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("Failed to read CSV file: {}", path.display()))?;
    Ok((headers, records))
}

fn read_spreadsheet(path: &Path) -> Result<(StringRecord, Vec<StringRecord>)> {
    let mut workbook = calamine::open_workbook_auto(path)
        .map_err(|e| ReportError::Spreadsheet(format!("{}: {e}", path.display())))?;

    let sheet = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| ReportError::Spreadsheet(format!("{}: no sheets", path.display())))?;
    debug!(%sheet, "Reading first worksheet");

    let range = workbook
        .worksheet_range(&sheet)
        .map_err(|e| ReportError::Spreadsheet(format!("{sheet}: {e}")))?;

    let mut rows = range.rows();
    let headers: StringRecord = match rows.next() {
        Some(row) => row.iter().map(cell_text).collect(),
        None => return Ok((StringRecord::new(), Vec::new())),
    };
    let records = rows
        .map(|row| row.iter().map(cell_text).collect::<StringRecord>())
        .collect();
    Ok((headers, records))
}

fn records_to_transactions(
    headers: &StringRecord,
    records: &[StringRecord],
) -> Result<Vec<Transaction>> {
    if headers.is_empty() && records.is_empty() {
        return Ok(Vec::new());
    }
    let headers: StringRecord = headers.iter().map(str::trim).collect();
    for column in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == column) {
            return Err(ReportError::MissingColumn(column).into());
        }
    }

    let mut transactions = Vec::with_capacity(records.len());
    for (index, record) in records.iter().enumerate() {
        if record.iter().all(|field| field.trim().is_empty()) {
            continue;
        }
        match record.deserialize::<Transaction>(Some(&headers)) {
            Ok(tx) => transactions.push(tx),
            Err(e) => warn!(row = index + 1, error = %e, "Skipping unreadable row"),
        }
    }
    Ok(transactions)
}

/// Renders a cell as the text the export would show for it.
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(f) => f.to_string(),
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => excel_serial_to_text(dt.as_f64()).unwrap_or_default(),
        Data::DateTimeIso(s) => iso_to_text(s).unwrap_or_else(|| s.clone()),
        Data::DurationIso(s) => s.clone(),
        Data::Error(_) => String::new(),
    }
}

/// Excel stores dates as days since 1899-12-30. Serials outside chrono's
/// range yield `None`, which leaves the cell empty.
fn excel_serial_to_text(serial: f64) -> Option<String> {
    if !serial.is_finite() {
        return None;
    }
    let base = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let seconds = (serial * 86_400.0).round();
    if seconds.abs() >= i64::MAX as f64 {
        return None;
    }
    let dt = base.checked_add_signed(Duration::try_seconds(seconds as i64)?)?;
    Some(format_export_datetime(dt))
}

fn iso_to_text(raw: &str) -> Option<String> {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S")
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
        .map(format_export_datetime)
}

/// Payment dates carry no time of day in the export, operation dates do.
fn format_export_datetime(dt: NaiveDateTime) -> String {
    if dt.num_seconds_from_midnight() == 0 {
        dt.format("%d.%m.%Y").to_string()
    } else {
        dt.format("%d.%m.%Y %H:%M:%S").to_string()
    }
}
