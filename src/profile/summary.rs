//! Whole-table summary: every column profiled in table order.

use serde::{Deserialize, Serialize};

use crate::profile::column::{profile_column, ColumnProfile};
use crate::table::Table;

/// Dataset-level summary: dimensions plus one profile per column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetSummary {
    /// Number of rows.
    pub n_rows: usize,
    /// Number of columns.
    pub n_cols: usize,
    /// Per-column profiles, in table column order.
    pub columns: Vec<ColumnProfile>,
}

impl DatasetSummary {
    /// Looks up a column profile by name.
    pub fn column(&self, name: &str) -> Option<&ColumnProfile> {
        self.columns.iter().find(|c| c.name == name)
    }
}

/// Profiles every column of the table.
///
/// Total and infallible for any valid [`Table`]: a zero-row table yields
/// profiles with zero counts, a zero-column table yields an empty list.
pub fn summarize(table: &Table) -> DatasetSummary {
    DatasetSummary {
        n_rows: table.n_rows(),
        n_cols: table.n_cols(),
        columns: table
            .columns()
            .iter()
            .map(profile_column)
            .collect(),
    }
}
