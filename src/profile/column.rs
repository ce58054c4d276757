//! Per-column descriptive statistics.

use serde::{Deserialize, Serialize};

use crate::table::{Column, ColumnData};

/// How many distinct example values a profile carries.
const MAX_EXAMPLE_VALUES: usize = 5;

/// Descriptive statistics for a single column.
///
/// Numeric aggregates are computed over non-null values only and are `None`
/// when no value supports them: `min`/`max`/`mean` need at least one
/// observation, `std` needs at least two. Non-numeric columns always carry
/// `None` for all four.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnProfile {
    /// Column name.
    pub name: String,
    /// Logical type label: "numeric", "boolean", "text" or "datetime".
    pub dtype: String,
    /// Count of non-null entries.
    pub non_null: usize,
    /// Count of null entries.
    pub missing: usize,
    /// Fraction of entries that are null; 0.0 for a zero-row table.
    pub missing_share: f64,
    /// Count of distinct non-null values.
    pub unique: usize,
    /// True iff the column's storage type is numeric.
    pub is_numeric: bool,
    /// Minimum over non-null values, numeric columns only.
    pub min: Option<f64>,
    /// Maximum over non-null values, numeric columns only.
    pub max: Option<f64>,
    /// Mean over non-null values, numeric columns only.
    pub mean: Option<f64>,
    /// Sample standard deviation (n-1) over non-null values, numeric columns
    /// only; `None` below two observations.
    pub std: Option<f64>,
    /// Up to five distinct values in first-seen order, rendered as strings.
    pub example_values: Vec<String>,
}

/// Computes the profile of one column.
///
/// The row count is the column's own length, so the profile is well defined
/// for any column, attached to a table or not.
pub fn profile_column(column: &Column) -> ColumnProfile {
    let n_rows = column.len();
    let non_null = column.non_null_count();
    let missing = n_rows - non_null;
    let missing_share = if n_rows == 0 {
        0.0
    } else {
        missing as f64 / n_rows as f64
    };

    let (unique, example_values) = distinct_values(column);

    let (min, max, mean, std) = match column.data() {
        ColumnData::Numeric(values) => numeric_stats(values),
        _ => (None, None, None, None),
    };

    ColumnProfile {
        name: column.name().to_string(),
        dtype: column.dtype_label().to_string(),
        non_null,
        missing,
        missing_share,
        unique,
        is_numeric: column.is_numeric(),
        min,
        max,
        mean,
        std,
        example_values,
    }
}

fn distinct_values(column: &Column) -> (usize, Vec<String>) {
    let mut seen = std::collections::HashSet::new();
    let mut examples = Vec::new();
    for i in 0..column.len() {
        if let Some(rendered) = column.value_to_string(i) {
            if seen.insert(rendered.clone()) && examples.len() < MAX_EXAMPLE_VALUES {
                examples.push(rendered);
            }
        }
    }
    (seen.len(), examples)
}

fn numeric_stats(
    values: &[Option<f64>],
) -> (Option<f64>, Option<f64>, Option<f64>, Option<f64>) {
    let mut n = 0usize;
    let mut sum = 0.0;
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for v in values.iter().flatten() {
        n += 1;
        sum += v;
        min = min.min(*v);
        max = max.max(*v);
    }
    if n == 0 {
        return (None, None, None, None);
    }
    let mean = sum / n as f64;

    let std = if n >= 2 {
        let ss: f64 = values
            .iter()
            .flatten()
            .map(|v| (v - mean) * (v - mean))
            .sum();
        Some((ss / (n - 1) as f64).sqrt())
    } else {
        None
    };

    (Some(min), Some(max), Some(mean), std)
}
