//! Canonical column layout of a delivery spreadsheet.
//!
//! Column access everywhere else goes through these constants and the
//! [`TableSchema`], validated once at the normalize boundary. The names must
//! match the uploaded header exactly, including case and accents.

use chrono::{NaiveDate, NaiveDateTime};

use crate::domain::model::{Cell, Table};
use crate::utils::error::{EtlError, Result};

pub const DATA_DO_ACIONAMENTO: &str = "DATA DO ACIONAMENTO";
pub const DATA_REAL_DA_COLETA: &str = "DATA REAL DA COLETA";
pub const DATA_PROGRAMADA_DA_ENTREGA: &str = "DATA PROGRAMADA DA ENTREGA";
pub const DATA_REAL_DE_ENTREGA: &str = "DATA REAL DE ENTREGA";
pub const DATA_REPROGRAMACAO: &str = "DATA REPROGRAMAÇÃO";
pub const DATA_DE_ENTREGA_DA_REVERSA: &str = "DATA DE ENTREGA DA REVERSA";

/// Invoice value column. Optional in the upload; guaranteed present and
/// fully numeric after normalization.
pub const VALOR_NF: &str = "VALOR NF";

/// The six designated date columns, in upload order.
pub const DATE_COLUMNS: [&str; 6] = [
    DATA_DO_ACIONAMENTO,
    DATA_REAL_DA_COLETA,
    DATA_PROGRAMADA_DA_ENTREGA,
    DATA_REAL_DE_ENTREGA,
    DATA_REPROGRAMACAO,
    DATA_DE_ENTREGA_DA_REVERSA,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SemanticType {
    Date,
    Numeric,
    Text,
}

#[derive(Debug, Clone, Copy)]
pub struct ColumnSpec {
    pub name: &'static str,
    pub semantic: SemanticType,
    pub required: bool,
}

/// Mapping from canonical column name to semantic type.
#[derive(Debug, Clone)]
pub struct TableSchema {
    columns: Vec<ColumnSpec>,
}

impl TableSchema {
    /// The fixed schema of a delivery upload: six required date columns and
    /// the optional monetary column.
    pub fn delivery() -> Self {
        let mut columns: Vec<ColumnSpec> = DATE_COLUMNS
            .into_iter()
            .map(|name| ColumnSpec {
                name,
                semantic: SemanticType::Date,
                required: true,
            })
            .collect();
        columns.push(ColumnSpec {
            name: VALOR_NF,
            semantic: SemanticType::Numeric,
            required: false,
        });
        Self { columns }
    }

    pub fn columns(&self) -> &[ColumnSpec] {
        &self.columns
    }

    pub fn date_columns(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.columns
            .iter()
            .filter(|spec| spec.semantic == SemanticType::Date)
            .map(|spec| spec.name)
    }

    /// Check that every required column is present by exact name. Returns
    /// the first absent one; callers run this before touching any cell.
    pub fn validate(&self, table: &Table) -> Result<()> {
        for spec in &self.columns {
            if spec.required && !table.has_column(spec.name) {
                return Err(EtlError::MissingColumn {
                    column: spec.name.to_string(),
                });
            }
        }
        Ok(())
    }
}

const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
];

const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y", "%Y/%m/%d"];

/// Best-effort reinterpretation of a cell as a date/time value.
///
/// The contract is the lenient one the pipeline is built on: a cell that
/// cannot be read as any recognized date representation yields `None` — the
/// caller turns that into a missing marker, never into an error. Date-only
/// inputs land at midnight. Bare numbers are not treated as date serials.
pub fn coerce_datetime(cell: &Cell) -> Option<NaiveDateTime> {
    match cell {
        Cell::DateTime(dt) => Some(*dt),
        Cell::Text(s) => parse_datetime_text(s),
        Cell::Number(_) | Cell::Missing => None,
    }
}

fn parse_datetime_text(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, format) {
            return Some(dt);
        }
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(text, format) {
            return date.and_hms_opt(0, 0, 0);
        }
    }
    None
}
