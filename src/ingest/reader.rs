//! Upload parsing: dispatch on the filename extension, produce a raw
//! [`Table`] with one column per header entry.

use std::io::Cursor;

use calamine::{Data, Reader, Xlsx};

use crate::domain::model::{Cell, Column, RawUpload, Table};
use crate::utils::error::{EtlError, Result};

/// The two supported container formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadFormat {
    Csv,
    Xlsx,
}

impl UploadFormat {
    /// Case-sensitive match on the last `.`-separated segment of the
    /// filename: `csv` and `xlsx` only. `dados.CSV` is not recognized.
    pub fn from_filename(filename: &str) -> Option<Self> {
        match filename.rsplit('.').next() {
            Some("csv") => Some(Self::Csv),
            Some("xlsx") => Some(Self::Xlsx),
            _ => None,
        }
    }
}

/// Parse an upload into a raw table.
///
/// Fails with `UnsupportedFormat` when the extension matches neither
/// recognized value and with `MalformedInput` when the bytes cannot be
/// tokenized into a rectangular header-plus-rows table. Row order in the
/// file is row order in the table.
pub fn parse(upload: &RawUpload) -> Result<Table> {
    let format =
        UploadFormat::from_filename(&upload.filename).ok_or_else(|| EtlError::UnsupportedFormat {
            filename: upload.filename.clone(),
        })?;

    tracing::debug!("Parsing upload '{}' as {:?}", upload.filename, format);

    match format {
        UploadFormat::Csv => parse_csv(&upload.bytes),
        UploadFormat::Xlsx => parse_xlsx(&upload.bytes),
    }
}

fn malformed(error: impl std::fmt::Display) -> EtlError {
    EtlError::MalformedInput {
        message: error.to_string(),
    }
}

/// Type a raw text field: empty → missing, numeric → number, else text.
fn field_to_cell(field: &str) -> Cell {
    let trimmed = field.trim();
    if trimmed.is_empty() {
        Cell::Missing
    } else if let Ok(number) = trimmed.parse::<f64>() {
        Cell::Number(number)
    } else {
        Cell::Text(field.to_string())
    }
}

fn parse_csv(bytes: &[u8]) -> Result<Table> {
    // Non-flexible reader: a ragged row is a malformed upload, not data.
    let mut reader = csv::ReaderBuilder::new().from_reader(bytes);

    let headers = reader.headers().map_err(malformed)?.clone();
    let mut columns: Vec<Column> = headers
        .iter()
        .map(|header| Column::new(header, Vec::new()))
        .collect();

    for record in reader.records() {
        let record = record.map_err(malformed)?;
        for (index, field) in record.iter().enumerate() {
            columns[index].cells.push(field_to_cell(field));
        }
    }

    let mut table = Table::new();
    for column in columns {
        table.push_column(column);
    }
    Ok(table)
}

fn header_text(value: &Data) -> String {
    match value {
        Data::String(s) => s.clone(),
        Data::Empty => String::new(),
        other => other.to_string(),
    }
}

fn data_to_cell(value: &Data) -> Cell {
    match value {
        Data::Empty => Cell::Missing,
        Data::String(s) => {
            if s.trim().is_empty() {
                Cell::Missing
            } else {
                Cell::Text(s.clone())
            }
        }
        Data::Float(f) => Cell::Number(*f),
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Bool(b) => Cell::Text(b.to_string()),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(value) => Cell::DateTime(value),
            None => Cell::Missing,
        },
        Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::Text(s.clone()),
        Data::Error(_) => Cell::Missing,
    }
}

fn parse_xlsx(bytes: &[u8]) -> Result<Table> {
    let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes)).map_err(malformed)?;

    // First worksheet, as a spreadsheet viewer would open it.
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| malformed("workbook contains no worksheets"))?
        .map_err(malformed)?;

    let mut rows = range.rows();
    let headers = match rows.next() {
        Some(row) => row,
        None => return Ok(Table::new()),
    };

    let mut columns: Vec<Column> = headers
        .iter()
        .map(|header| Column::new(header_text(header), Vec::new()))
        .collect();

    for row in rows {
        for (index, value) in row.iter().enumerate() {
            columns[index].cells.push(data_to_cell(value));
        }
    }

    let mut table = Table::new();
    for column in columns {
        table.push_column(column);
    }
    Ok(table)
}
