//! Heuristic dataset quality flags and composite scoring.
//!
//! Flags are derived from the [`DatasetSummary`] and [`MissingTable`] alone,
//! never from a second pass over the raw values. The composite score starts
//! at 1.0 and deducts a configured weight per firing flag, then clamps to
//! [0, 1].

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::profile::{DatasetSummary, MissingTable};

/// Thresholds that decide when a flag fires.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityThresholds {
    /// Minimum row count before `too_few_rows` fires.
    pub min_rows: usize,
    /// Maximum column count before `too_many_columns` fires.
    pub max_columns: usize,
    /// Maximum per-column missing share before `too_many_missing` fires.
    pub max_missing_share: f64,
}

impl Default for QualityThresholds {
    fn default() -> Self {
        Self {
            min_rows: 100,
            max_columns: 100,
            max_missing_share: 0.5,
        }
    }
}

/// Score deduction per flag.
///
/// The constant-column weight is scaled by the share of affected columns, so
/// one constant column among fifty barely moves the score while an
/// all-constant table loses the full weight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityWeights {
    /// Deduction when the table has fewer than `min_rows` rows.
    pub too_few_rows: f64,
    /// Deduction when the table has more than `max_columns` columns.
    pub too_many_columns: f64,
    /// Deduction when some column's missing share exceeds the threshold.
    pub too_many_missing: f64,
    /// Maximum deduction for constant columns.
    pub constant_columns: f64,
    /// Deduction when an id-like column contains duplicates.
    pub id_duplicates: f64,
}

impl Default for QualityWeights {
    fn default() -> Self {
        Self {
            too_few_rows: 0.10,
            too_many_columns: 0.10,
            too_many_missing: 0.20,
            constant_columns: 0.25,
            id_duplicates: 0.25,
        }
    }
}

/// Validated configuration for the quality engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QualityConfig {
    /// Flag thresholds.
    pub thresholds: QualityThresholds,
    /// Score weights.
    pub weights: QualityWeights,
}

impl QualityConfig {
    /// Creates a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if the missing-share threshold or
    /// any weight falls outside [0, 1].
    pub fn new(thresholds: QualityThresholds, weights: QualityWeights) -> Result<Self> {
        if !(0.0..=1.0).contains(&thresholds.max_missing_share) {
            return Err(Error::invalid_config(
                "max_missing_share must be within [0, 1]",
            ));
        }
        for (name, w) in [
            ("too_few_rows", weights.too_few_rows),
            ("too_many_columns", weights.too_many_columns),
            ("too_many_missing", weights.too_many_missing),
            ("constant_columns", weights.constant_columns),
            ("id_duplicates", weights.id_duplicates),
        ] {
            if !(0.0..=1.0).contains(&w) {
                return Err(Error::invalid_config(format!(
                    "weight '{name}' must be within [0, 1]"
                )));
            }
        }
        Ok(Self {
            thresholds,
            weights,
        })
    }
}

/// Quality flags and composite score for one dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityFlags {
    /// Row count is below the minimum threshold.
    pub too_few_rows: bool,
    /// Column count exceeds the maximum threshold.
    pub too_many_columns: bool,
    /// Some column's missing share exceeds the threshold.
    pub too_many_missing: bool,
    /// At least one cell anywhere in the table is missing.
    pub has_missing_values: bool,
    /// Largest per-column missing share.
    pub max_missing_share: f64,
    /// At least one column is constant.
    pub has_constant_columns: bool,
    /// Names of constant columns (exactly one distinct non-null value).
    #[serde(rename = "constant_columns_list")]
    pub constant_columns: Vec<String>,
    /// At least one id-like column contains duplicate values.
    pub has_suspicious_id_duplicates: bool,
    /// Names of id-like columns that contain duplicate values.
    #[serde(rename = "suspicious_id_columns")]
    pub id_columns_with_duplicates: Vec<String>,
    /// Composite score in [0, 1]; higher is better.
    pub quality_score: f64,
}

/// A column counts as id-like when its name contains "id" in any case.
fn is_id_like(name: &str) -> bool {
    name.to_ascii_lowercase().contains("id")
}

/// Derives quality flags and the composite score.
///
/// Total and infallible: an empty table simply fires `too_few_rows` and
/// nothing else.
pub fn evaluate_quality(
    summary: &DatasetSummary,
    missing: &MissingTable,
    config: &QualityConfig,
) -> QualityFlags {
    let thresholds = &config.thresholds;
    let weights = &config.weights;

    let too_few_rows = summary.n_rows < thresholds.min_rows;
    let too_many_columns = summary.n_cols > thresholds.max_columns;
    let max_missing_share = missing.max_share();
    let too_many_missing = max_missing_share > thresholds.max_missing_share;
    let has_missing_values = missing.total_missing() > 0;

    // Constant means exactly one distinct non-null value; all-null columns
    // do not qualify.
    let constant_columns: Vec<String> = summary
        .columns
        .iter()
        .filter(|c| c.non_null > 0 && c.unique == 1)
        .map(|c| c.name.clone())
        .collect();

    let id_columns_with_duplicates: Vec<String> = summary
        .columns
        .iter()
        .filter(|c| is_id_like(&c.name) && c.non_null > 0 && c.unique < c.non_null)
        .map(|c| c.name.clone())
        .collect();

    let mut deduction = 0.0;
    if too_few_rows {
        deduction += weights.too_few_rows;
    }
    if too_many_columns {
        deduction += weights.too_many_columns;
    }
    if too_many_missing {
        deduction += weights.too_many_missing;
    }
    if !constant_columns.is_empty() && summary.n_cols > 0 {
        let share = constant_columns.len() as f64 / summary.n_cols as f64;
        deduction += weights.constant_columns * share.min(1.0);
    }
    if !id_columns_with_duplicates.is_empty() {
        deduction += weights.id_duplicates;
    }
    let quality_score = (1.0 - deduction).clamp(0.0, 1.0);

    QualityFlags {
        too_few_rows,
        too_many_columns,
        too_many_missing,
        has_missing_values,
        max_missing_share,
        has_constant_columns: !constant_columns.is_empty(),
        constant_columns,
        has_suspicious_id_duplicates: !id_columns_with_duplicates.is_empty(),
        id_columns_with_duplicates,
        quality_score,
    }
}
