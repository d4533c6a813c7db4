//! Table normalization: date coercion, monetary healing, forward-fill.
//!
//! `normalize` consumes its input and returns the authoritative table.
//! Structural problems (a designated date column absent) are fatal and
//! raised before any cell is touched; per-cell data-quality problems are
//! recovered locally and never interrupt the flow.

use crate::domain::model::{Cell, Column, Table};
use crate::ingest::schema::{self, TableSchema};
use crate::utils::error::Result;

/// Normalize a raw parsed table into the analysis-ready form.
///
/// After this returns, each of the six designated date columns holds only
/// date/time values or missing markers, `VALOR NF` exists and carries a
/// number in every row, and every column has been forward-filled in row
/// order. Fails only with `MissingColumn`, checked up front — on error no
/// mutation has happened.
pub fn normalize(mut table: Table) -> Result<Table> {
    let table_schema = TableSchema::delivery();
    table_schema.validate(&table)?;

    for name in table_schema.date_columns() {
        if let Some(column) = table.column_mut(name) {
            for cell in column.cells.iter_mut() {
                *cell = match schema::coerce_datetime(cell) {
                    Some(dt) => Cell::DateTime(dt),
                    None => Cell::Missing,
                };
            }
        }
    }

    // Heal the monetary column before the fill: an absent invoice value is
    // a zero-value invoice, not a copy of the previous row's.
    heal_monetary(&mut table);
    forward_fill(&mut table);

    tracing::debug!(
        "Normalized table: {} rows x {} columns",
        table.row_count(),
        table.column_count()
    );

    Ok(table)
}

/// Ensure `VALOR NF` exists and is numeric in every row. Missing cells and
/// non-numeric residue become zero.
fn heal_monetary(table: &mut Table) {
    let rows = table.row_count();
    if !table.has_column(schema::VALOR_NF) {
        table.push_column(Column::filled(schema::VALOR_NF, Cell::Number(0.0), rows));
        return;
    }

    if let Some(column) = table.column_mut(schema::VALOR_NF) {
        for cell in column.cells.iter_mut() {
            *cell = match cell {
                Cell::Number(n) => Cell::Number(*n),
                Cell::Text(s) => Cell::Number(s.trim().parse().unwrap_or(0.0)),
                Cell::DateTime(_) | Cell::Missing => Cell::Number(0.0),
            };
        }
    }
}

/// Replace each missing marker with the nearest preceding non-missing value
/// in the same column, top to bottom. Leading gaps stay missing; no
/// wraparound, no backward fill. Applies to every column, not only the date
/// columns. Idempotent.
pub fn forward_fill(table: &mut Table) {
    for column in table.columns_mut() {
        let mut last_seen: Option<Cell> = None;
        for cell in column.cells.iter_mut() {
            if cell.is_missing() {
                if let Some(previous) = &last_seen {
                    *cell = previous.clone();
                }
            } else {
                last_seen = Some(cell.clone());
            }
        }
    }
}

/// Sum of the monetary column. A missing column or non-numeric residue
/// counts as zero; pure and safely recomputable.
pub fn total(table: &Table) -> f64 {
    table.column(schema::VALOR_NF).map_or(0.0, |column| {
        column.cells.iter().filter_map(|cell| cell.as_number()).sum()
    })
}
