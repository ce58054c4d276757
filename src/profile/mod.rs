//! Profiling components: per-column statistics, whole-table summary,
//! missing-value analysis, correlation and category frequency tables.
//!
//! Every routine here is total over any valid [`Table`](crate::table::Table):
//! empty tables, all-null columns and constant columns yield degenerate but
//! well-formed results, never errors.

pub mod categories;
pub mod column;
pub mod correlation;
pub mod missing;
pub mod summary;

pub use categories::{category_table, CategoryColumn, CategoryCount, CategoryOptions, CategoryTable};
pub use column::{profile_column, ColumnProfile};
pub use correlation::{correlation_matrix, CorrelationMatrix};
pub use missing::{analyze_missing, MissingColumn, MissingTable};
pub use summary::{summarize, DatasetSummary};
