//! Top-K value counts for categorical columns.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::table::Table;

/// Options for category profiling, validated at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryOptions {
    top_k: usize,
    max_columns: usize,
}

impl Default for CategoryOptions {
    fn default() -> Self {
        Self {
            top_k: 5,
            max_columns: 20,
        }
    }
}

impl CategoryOptions {
    /// Creates validated options.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if either value is zero.
    pub fn new(top_k: usize, max_columns: usize) -> Result<Self> {
        if top_k == 0 {
            return Err(Error::invalid_config("top_k must be at least 1"));
        }
        if max_columns == 0 {
            return Err(Error::invalid_config("max_columns must be at least 1"));
        }
        Ok(Self { top_k, max_columns })
    }

    /// Number of most frequent values kept per column.
    pub fn top_k(&self) -> usize {
        self.top_k
    }

    /// Maximum number of categorical columns profiled.
    pub fn max_columns(&self) -> usize {
        self.max_columns
    }
}

/// One value and how often it occurs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCount {
    /// The rendered value.
    pub value: String,
    /// Occurrence count.
    pub count: usize,
}

/// Top-K frequency table for one categorical column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryColumn {
    /// Column name.
    pub name: String,
    /// Most frequent values, count-descending. Equal counts keep first-seen
    /// row order.
    pub counts: Vec<CategoryCount>,
}

/// Frequency tables for the first `max_columns` categorical columns.
///
/// Columns with zero non-null values are omitted entirely.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryTable {
    /// Per-column frequency tables, in table column order.
    pub columns: Vec<CategoryColumn>,
}

impl CategoryTable {
    /// Returns true if no column was profiled.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Looks up a column's frequency table by name.
    pub fn column(&self, name: &str) -> Option<&CategoryColumn> {
        self.columns.iter().find(|c| c.name == name)
    }
}

/// Computes top-K value counts over the table's non-numeric columns.
///
/// Only the first `max_columns` non-numeric columns, in table order, are
/// considered. Total and infallible.
pub fn category_table(table: &Table, options: &CategoryOptions) -> CategoryTable {
    let columns = table
        .columns()
        .iter()
        .filter(|c| !c.is_numeric())
        .take(options.max_columns())
        .filter_map(|column| {
            let counts = top_values(table.n_rows(), column, options.top_k());
            (!counts.is_empty()).then(|| CategoryColumn {
                name: column.name().to_string(),
                counts,
            })
        })
        .collect();
    CategoryTable { columns }
}

fn top_values(n_rows: usize, column: &crate::table::Column, top_k: usize) -> Vec<CategoryCount> {
    // Value -> (first-seen index, count). The index breaks count ties.
    let mut counts: HashMap<String, (usize, usize)> = HashMap::new();
    let mut order = 0usize;
    for i in 0..n_rows {
        if let Some(rendered) = column.value_to_string(i) {
            counts
                .entry(rendered)
                .and_modify(|(_, c)| *c += 1)
                .or_insert_with(|| {
                    order += 1;
                    (order, 1)
                });
        }
    }

    let mut entries: Vec<(String, usize, usize)> = counts
        .into_iter()
        .map(|(value, (first_seen, count))| (value, first_seen, count))
        .collect();
    entries.sort_by(|a, b| b.2.cmp(&a.2).then(a.1.cmp(&b.1)));
    entries.truncate(top_k);
    entries
        .into_iter()
        .map(|(value, _, count)| CategoryCount { value, count })
        .collect()
}

#[cfg(test)]
mod tests {
    use crate::table::Column;

    use super::*;

    fn text(values: &[Option<&str>]) -> Vec<Option<String>> {
        values.iter().map(|v| v.map(str::to_string)).collect()
    }

    #[test]
    fn test_counts_descending_with_first_seen_ties() {
        let table = Table::new(vec![Column::text(
            "city",
            text(&[
                Some("B"),
                Some("A"),
                Some("A"),
                Some("C"),
                Some("B"),
                Some("A"),
            ]),
        )])
        .unwrap();
        let result = category_table(&table, &CategoryOptions::default());
        let counts = &result.column("city").unwrap().counts;
        assert_eq!(counts[0].value, "A");
        assert_eq!(counts[0].count, 3);
        // B and C would tie at different counts here; check a real tie below.
        assert_eq!(counts[1].value, "B");
        assert_eq!(counts[1].count, 2);
        assert_eq!(counts[2].value, "C");
    }

    #[test]
    fn test_tie_broken_by_first_appearance() {
        let table = Table::new(vec![Column::text(
            "c",
            text(&[Some("y"), Some("x"), Some("x"), Some("y")]),
        )])
        .unwrap();
        let result = category_table(&table, &CategoryOptions::default());
        let counts = &result.column("c").unwrap().counts;
        assert_eq!(counts[0].value, "y");
        assert_eq!(counts[1].value, "x");
    }

    #[test]
    fn test_top_k_truncation() {
        let table = Table::new(vec![Column::text(
            "c",
            text(&[Some("a"), Some("b"), Some("c"), Some("d")]),
        )])
        .unwrap();
        let options = CategoryOptions::new(2, 20).unwrap();
        let result = category_table(&table, &options);
        assert_eq!(result.column("c").unwrap().counts.len(), 2);
    }

    #[test]
    fn test_numeric_columns_excluded() {
        let table = Table::new(vec![
            Column::numeric("n", vec![Some(1.0), Some(1.0)]),
            Column::text("t", text(&[Some("a"), Some("b")])),
        ])
        .unwrap();
        let result = category_table(&table, &CategoryOptions::default());
        assert!(result.column("n").is_none());
        assert!(result.column("t").is_some());
    }

    #[test]
    fn test_all_null_column_omitted() {
        let table = Table::new(vec![Column::text("t", vec![None, None])]).unwrap();
        let result = category_table(&table, &CategoryOptions::default());
        assert!(result.is_empty());
    }

    #[test]
    fn test_max_columns_takes_first_in_table_order() {
        let table = Table::new(vec![
            Column::text("t1", text(&[Some("a")])),
            Column::text("t2", text(&[Some("b")])),
            Column::text("t3", text(&[Some("c")])),
        ])
        .unwrap();
        let options = CategoryOptions::new(5, 2).unwrap();
        let result = category_table(&table, &options);
        let names: Vec<&str> = result.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["t1", "t2"]);
    }

    #[test]
    fn test_zero_options_rejected() {
        assert!(CategoryOptions::new(0, 20).is_err());
        assert!(CategoryOptions::new(5, 0).is_err());
    }

    #[test]
    fn test_boolean_column_is_categorical() {
        let table = Table::new(vec![Column::boolean(
            "flag",
            vec![Some(true), Some(true), Some(false)],
        )])
        .unwrap();
        let result = category_table(&table, &CategoryOptions::default());
        let counts = &result.column("flag").unwrap().counts;
        assert_eq!(counts[0].value, "true");
        assert_eq!(counts[0].count, 2);
    }
}
