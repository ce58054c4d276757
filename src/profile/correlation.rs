//! Pairwise-complete Pearson correlation over numeric columns.

use serde::{Deserialize, Serialize};

use crate::table::{ColumnData, Table};

/// Pearson correlation matrix over the table's numeric columns.
///
/// Symmetric, with entries in table column order. Empty when the table has
/// fewer than two numeric columns. An entry is `None` when it is undefined:
/// fewer than two complete pairs, or zero variance within the pairs. The
/// diagonal is pinned to 1.0 for any column with at least one non-null
/// value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CorrelationMatrix {
    /// Names of the numeric columns, in table column order.
    pub columns: Vec<String>,
    /// Row-major matrix; `values[i][j]` correlates `columns[i]` with
    /// `columns[j]`.
    pub values: Vec<Vec<Option<f64>>>,
}

impl CorrelationMatrix {
    /// Returns true if the matrix has no entries.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Looks up an entry by column names.
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.columns.iter().position(|c| c == a)?;
        let j = self.columns.iter().position(|c| c == b)?;
        self.values[i][j]
    }
}

/// Computes the correlation matrix. Total and infallible.
pub fn correlation_matrix(table: &Table) -> CorrelationMatrix {
    let numeric: Vec<(&str, &[Option<f64>])> = table
        .columns()
        .iter()
        .filter_map(|c| match c.data() {
            ColumnData::Numeric(values) => Some((c.name(), values.as_slice())),
            _ => None,
        })
        .collect();

    if numeric.len() < 2 {
        return CorrelationMatrix::default();
    }

    let n = numeric.len();
    let mut values = vec![vec![None; n]; n];
    for i in 0..n {
        let has_values = numeric[i].1.iter().any(|v| v.is_some());
        values[i][i] = has_values.then_some(1.0);
        for j in (i + 1)..n {
            let r = pairwise_pearson(numeric[i].1, numeric[j].1);
            values[i][j] = r;
            values[j][i] = r;
        }
    }

    CorrelationMatrix {
        columns: numeric.iter().map(|(name, _)| name.to_string()).collect(),
        values,
    }
}

/// Pearson correlation over rows where both columns are non-null.
///
/// `None` when fewer than two complete pairs exist or either column has
/// zero variance within the pairs. Never NaN.
fn pairwise_pearson(xs: &[Option<f64>], ys: &[Option<f64>]) -> Option<f64> {
    let mut n = 0.0;
    let mut sx = 0.0;
    let mut sy = 0.0;
    let mut sxy = 0.0;
    let mut sxx = 0.0;
    let mut syy = 0.0;
    for (x, y) in xs.iter().zip(ys) {
        if let (Some(x), Some(y)) = (x, y) {
            n += 1.0;
            sx += x;
            sy += y;
            sxy += x * y;
            sxx += x * x;
            syy += y * y;
        }
    }
    if n < 2.0 {
        return None;
    }

    let cov = n * sxy - sx * sy;
    let var_x = n * sxx - sx * sx;
    let var_y = n * syy - sy * sy;
    if var_x <= 0.0 || var_y <= 0.0 {
        return None;
    }

    // Rounding can push the ratio marginally outside [-1, 1].
    Some((cov / (var_x * var_y).sqrt()).clamp(-1.0, 1.0))
}
