//! Planning, running and merging the per-row CFR lookups.

use async_trait::async_trait;
use cfrscan_browser::DriverLauncher;
use cfrscan_census::{VesselLookup, NOT_FOUND_MESSAGE};
use cfrscan_core::{Error, Result, SpreadsheetConfig};
use tracing::{info, warn};

use crate::table::{Cell, Table};

/// Anything that can turn a vessel name into a CFR cell value.
#[async_trait]
pub trait CfrSource: Send + Sync {
    /// Never fails; a miss comes back as a human-readable failure string.
    async fn find_cfr(&self, vessel_name: &str) -> String;
}

#[async_trait]
impl<L: DriverLauncher> CfrSource for VesselLookup<L> {
    async fn find_cfr(&self, vessel_name: &str) -> String {
        self.lookup_single_cfr(vessel_name).await
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchColumns {
    pub name_column: String,
    pub cfr_column: String,
}

impl BatchColumns {
    pub fn from_config(config: &SpreadsheetConfig) -> Self {
        Self {
            name_column: config.name_column.clone(),
            cfr_column: config.cfr_column.clone(),
        }
    }

    fn resolve(&self, table: &Table) -> Result<(usize, usize)> {
        let name = table.column_index(&self.name_column).ok_or_else(|| {
            Error::Spreadsheet(format!("Column '{}' not found in sheet '{}'", self.name_column, table.name))
        })?;
        let cfr = table.column_index(&self.cfr_column).ok_or_else(|| {
            Error::Spreadsheet(format!("Column '{}' not found in sheet '{}'", self.cfr_column, table.name))
        })?;
        Ok((name, cfr))
    }
}

/// A data row whose CFR cell is blank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingLookup {
    /// Zero-based index into `Table::rows`.
    pub row: usize,
    pub vessel_name: String,
}

/// Result of a back-fill run.
#[derive(Debug, Clone, PartialEq)]
pub struct FillReport {
    pub table: Table,
    pub looked_up: usize,
    pub found: usize,
}

/// Rows that need a lookup, in sheet order.
///
/// Rows with a blank CFR but no vessel name are skipped with a warning.
pub fn pending_lookups(table: &Table, columns: &BatchColumns) -> Result<Vec<PendingLookup>> {
    let (name_col, cfr_col) = columns.resolve(table)?;

    let mut pending = Vec::new();
    for (idx, row) in table.rows.iter().enumerate() {
        if !row.get(cfr_col).map_or(true, Cell::is_blank) {
            continue;
        }
        match row.get(name_col) {
            Some(name) if !name.is_blank() => pending.push(PendingLookup {
                row: idx,
                vessel_name: name.to_string(),
            }),
            _ => warn!(row = idx + 2, "Row without CFR has no vessel name, skipped"),
        }
    }
    Ok(pending)
}

/// Copy of `table` with the CFR column replaced for the given rows.
pub fn merge(table: &Table, cfr_col: usize, results: &[(usize, String)]) -> Table {
    let mut merged = table.clone();
    for (row, cfr) in results {
        if let Some(cell) = merged.rows.get_mut(*row).and_then(|r| r.get_mut(cfr_col)) {
            *cell = Cell::Text(cfr.clone());
        }
    }
    merged
}

/// Look up every pending row, one after another, and merge the results.
///
/// `on_lookup` is called before each lookup with its 1-based position, the
/// total and the row being looked up.
pub async fn back_fill<F>(
    table: &Table,
    columns: &BatchColumns,
    source: &dyn CfrSource,
    mut on_lookup: F,
) -> Result<FillReport>
where
    F: FnMut(usize, usize, &PendingLookup) + Send,
{
    let (_, cfr_col) = columns.resolve(table)?;
    let pending = pending_lookups(table, columns)?;
    let total = pending.len();
    info!(sheet = %table.name, rows = table.rows.len(), pending = total, "Back-filling CFR column");

    let mut results = Vec::with_capacity(total);
    for (i, item) in pending.iter().enumerate() {
        on_lookup(i + 1, total, item);
        let cfr = source.find_cfr(&item.vessel_name).await;
        results.push((item.row, cfr));
    }

    let found = results
        .iter()
        .filter(|(_, cfr)| cfr != NOT_FOUND_MESSAGE)
        .count();

    Ok(FillReport {
        table: merge(table, cfr_col, &results),
        looked_up: total,
        found,
    })
}
