//! Delivery indicators computed from the normalized table.
//!
//! Everything here is derived from the uploaded data; nothing is hardcoded.
//! The status column is not part of the fixed schema, so its name comes
//! from configuration and the distribution is simply omitted when the
//! column is absent.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::model::Table;
use crate::ingest::{normalize, schema};

/// On-time vs late split of delivered orders, by comparing the real
/// delivery date against the scheduled one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlaSummary {
    pub on_time: usize,
    pub late: usize,
    /// Rows where either date is missing and no verdict is possible.
    pub undetermined: usize,
    pub on_time_percent: f64,
}

/// Order count for one calendar day of `DATA DO ACIONAMENTO`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyVolume {
    pub day: NaiveDate,
    pub orders: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusCount {
    pub status: String,
    pub count: usize,
}

/// The aggregate bundle written next to the normalized table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndicatorReport {
    pub rows: usize,
    pub sla: SlaSummary,
    pub daily_volume: Vec<DailyVolume>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_counts: Option<Vec<StatusCount>>,
    pub total_valor_nf: f64,
}

pub fn sla_summary(table: &Table) -> SlaSummary {
    let mut on_time = 0;
    let mut late = 0;
    let mut undetermined = 0;

    match (
        table.column(schema::DATA_REAL_DE_ENTREGA),
        table.column(schema::DATA_PROGRAMADA_DA_ENTREGA),
    ) {
        (Some(real), Some(scheduled)) => {
            for (real_cell, scheduled_cell) in real.cells.iter().zip(&scheduled.cells) {
                match (real_cell.as_datetime(), scheduled_cell.as_datetime()) {
                    (Some(real_at), Some(scheduled_at)) => {
                        if real_at <= scheduled_at {
                            on_time += 1;
                        } else {
                            late += 1;
                        }
                    }
                    _ => undetermined += 1,
                }
            }
        }
        _ => undetermined = table.row_count(),
    }

    let delivered = on_time + late;
    let on_time_percent = if delivered == 0 {
        0.0
    } else {
        on_time as f64 * 100.0 / delivered as f64
    };

    SlaSummary {
        on_time,
        late,
        undetermined,
        on_time_percent,
    }
}

/// Orders per calendar day, ascending by day. Rows with a missing
/// acionamento date are skipped.
pub fn daily_volume(table: &Table) -> Vec<DailyVolume> {
    let mut counts: BTreeMap<NaiveDate, usize> = BTreeMap::new();

    if let Some(column) = table.column(schema::DATA_DO_ACIONAMENTO) {
        for cell in &column.cells {
            if let Some(dt) = cell.as_datetime() {
                *counts.entry(dt.date()).or_insert(0) += 1;
            }
        }
    }

    counts
        .into_iter()
        .map(|(day, orders)| DailyVolume { day, orders })
        .collect()
}

/// Value counts over an arbitrary column, descending by count (ties break
/// alphabetically). `None` when the column is absent; missing cells are not
/// counted.
pub fn status_distribution(table: &Table, column_name: &str) -> Option<Vec<StatusCount>> {
    let column = table.column(column_name)?;

    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for cell in &column.cells {
        if cell.is_missing() {
            continue;
        }
        *counts.entry(cell.render()).or_insert(0) += 1;
    }

    let mut distribution: Vec<StatusCount> = counts
        .into_iter()
        .map(|(status, count)| StatusCount { status, count })
        .collect();
    distribution.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.status.cmp(&b.status)));
    Some(distribution)
}

pub fn build_report(table: &Table, status_column: Option<&str>) -> IndicatorReport {
    IndicatorReport {
        rows: table.row_count(),
        sla: sla_summary(table),
        daily_volume: daily_volume(table),
        status_counts: status_column.and_then(|name| status_distribution(table, name)),
        total_valor_nf: normalize::total(table),
    }
}
