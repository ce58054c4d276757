//! Missing-value analysis.

use serde::{Deserialize, Serialize};

use crate::table::Table;

/// Missing-value counts for one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissingColumn {
    /// Column name.
    pub name: String,
    /// Count of null entries.
    pub missing: usize,
    /// Fraction of entries that are null.
    pub missing_share: f64,
}

/// Per-column missing-value table.
///
/// Compact: only columns with at least one missing cell appear, in table
/// column order. A table with no missing values, or a zero-row table, yields
/// an empty report.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MissingTable {
    /// Columns with at least one missing value, in table column order.
    pub columns: Vec<MissingColumn>,
}

impl MissingTable {
    /// Returns true if no column has missing values.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Missing share of a column, by name. Columns with no missing values
    /// report 0.0 whether or not they appear in the compact table.
    pub fn share(&self, name: &str) -> f64 {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.missing_share)
            .unwrap_or(0.0)
    }

    /// Largest per-column missing share, 0.0 when nothing is missing.
    pub fn max_share(&self) -> f64 {
        self.columns
            .iter()
            .map(|c| c.missing_share)
            .fold(0.0, f64::max)
    }

    /// Total count of missing cells across all columns.
    pub fn total_missing(&self) -> usize {
        self.columns.iter().map(|c| c.missing).sum()
    }

    /// Names of columns whose missing share strictly exceeds `threshold`.
    pub fn columns_above(&self, threshold: f64) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|c| c.missing_share > threshold)
            .map(|c| c.name.as_str())
            .collect()
    }
}

/// Computes the missing-value table. Total and infallible.
pub fn analyze_missing(table: &Table) -> MissingTable {
    let n_rows = table.n_rows();
    if n_rows == 0 {
        return MissingTable::default();
    }
    let columns = table
        .columns()
        .iter()
        .filter_map(|column| {
            let missing = n_rows - column.non_null_count();
            (missing > 0).then(|| MissingColumn {
                name: column.name().to_string(),
                missing,
                missing_share: missing as f64 / n_rows as f64,
            })
        })
        .collect();
    MissingTable { columns }
}
