//! # perfilar
//!
//! Tabular dataset profiling in pure Rust: per-column statistics,
//! missing-value analysis, pairwise-complete Pearson correlation, top-K
//! category tables, and heuristic quality flags with a composite score.
//!
//! Data is loaded through Arrow (CSV or Parquet) into an immutable
//! [`Table`] whose columns carry an explicit logical type. Every analysis
//! is a pure function of the table: given a valid `Table`, profiling never
//! fails, it only degrades to well-formed degenerate results (empty
//! matrices, `None` statistics).
//!
//! ## Example
//!
//! ```no_run
//! use perfilar::{
//!     profile::{analyze_missing, summarize},
//!     quality::{evaluate_quality, QualityConfig},
//!     table::Table,
//! };
//!
//! # fn main() -> perfilar::Result<()> {
//! let table = Table::from_csv("data.csv")?;
//! let summary = summarize(&table);
//! let missing = analyze_missing(&table);
//! let flags = evaluate_quality(&summary, &missing, &QualityConfig::default());
//! println!("quality score: {:.2}", flags.quality_score);
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![allow(clippy::module_name_repetitions)]

pub mod cli;
pub mod error;
pub mod profile;
pub mod quality;
pub mod report;
pub mod serve;
pub mod table;

pub use error::{Error, Result};
pub use profile::{
    analyze_missing, category_table, correlation_matrix, profile_column, summarize,
    CategoryOptions, CategoryTable, ColumnProfile, CorrelationMatrix, DatasetSummary,
    MissingTable,
};
pub use quality::{evaluate_quality, QualityConfig, QualityFlags};
pub use report::{generate_report, ReportArtifacts, ReportOptions};
pub use table::{Column, ColumnData, CsvOptions, Table};
