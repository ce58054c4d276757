//! Report generation: profiling artifacts written to a directory.
//!
//! A report run produces `summary.csv`, `missing.csv` (only when something
//! is missing), `correlation.csv` (only when at least two numeric columns
//! exist), one `top_categories/<column>.csv` per profiled categorical
//! column, and a human-readable `report.md` tying them together.

use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::error::{Error, Result};
use crate::profile::{
    analyze_missing, category_table, correlation_matrix, summarize, CategoryOptions,
    CategoryTable, CorrelationMatrix, DatasetSummary, MissingTable,
};
use crate::quality::{evaluate_quality, QualityConfig, QualityFlags};
use crate::table::Table;

/// Options for a report run, validated at construction.
#[derive(Debug, Clone)]
pub struct ReportOptions {
    out_dir: PathBuf,
    title: String,
    source: Option<String>,
    categories: CategoryOptions,
    min_missing_share: f64,
    quality: QualityConfig,
}

impl ReportOptions {
    /// Creates options with defaults for everything but the output
    /// directory.
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
            title: "Dataset report".to_string(),
            source: None,
            categories: CategoryOptions::default(),
            min_missing_share: 0.05,
            quality: QualityConfig::default(),
        }
    }

    /// Sets the report title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Names the source file in the markdown report.
    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Sets the category profiling options.
    #[must_use]
    pub fn with_categories(mut self, categories: CategoryOptions) -> Self {
        self.categories = categories;
        self
    }

    /// Sets the missing-share threshold above which a column is called out
    /// in the markdown report.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if the share is outside [0, 1].
    pub fn with_min_missing_share(mut self, share: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&share) {
            return Err(Error::invalid_config(
                "min_missing_share must be within [0, 1]",
            ));
        }
        self.min_missing_share = share;
        Ok(self)
    }

    /// Sets the quality engine configuration.
    #[must_use]
    pub fn with_quality(mut self, quality: QualityConfig) -> Self {
        self.quality = quality;
        self
    }
}

/// Paths written by a report run, relative to nothing (absolute as given).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportArtifacts {
    /// Every file written, in write order.
    pub files: Vec<PathBuf>,
}

/// Runs every analysis over the table and writes the artifacts.
///
/// # Errors
///
/// Returns an error if the output directory or any artifact cannot be
/// written.
pub fn generate_report(table: &Table, options: &ReportOptions) -> Result<ReportArtifacts> {
    let summary = summarize(table);
    let missing = analyze_missing(table);
    let flags = evaluate_quality(&summary, &missing, &options.quality);
    let correlation = correlation_matrix(table);
    let categories = category_table(table, &options.categories);

    fs::create_dir_all(&options.out_dir).map_err(|e| Error::io(e, &options.out_dir))?;

    let mut artifacts = ReportArtifacts::default();

    let summary_path = options.out_dir.join("summary.csv");
    write_file(&summary_path, &summary_csv(&summary))?;
    artifacts.files.push(summary_path);

    if !missing.is_empty() {
        let missing_path = options.out_dir.join("missing.csv");
        write_file(&missing_path, &missing_csv(&missing))?;
        artifacts.files.push(missing_path);
    }

    if !correlation.is_empty() {
        let corr_path = options.out_dir.join("correlation.csv");
        write_file(&corr_path, &correlation_csv(&correlation))?;
        artifacts.files.push(corr_path);
    }

    if !categories.is_empty() {
        let cat_dir = options.out_dir.join("top_categories");
        fs::create_dir_all(&cat_dir).map_err(|e| Error::io(e, &cat_dir))?;
        for column in &categories.columns {
            let path = cat_dir.join(format!("{}.csv", sanitize_file_name(&column.name)));
            let mut body = String::from("value,count\n");
            for entry in &column.counts {
                body.push_str(&format!("{},{}\n", csv_cell(&entry.value), entry.count));
            }
            write_file(&path, &body)?;
            artifacts.files.push(path);
        }
    }

    let md_path = options.out_dir.join("report.md");
    write_file(
        &md_path,
        &report_markdown(options, &summary, &missing, &flags, &correlation, &categories),
    )?;
    artifacts.files.push(md_path);

    Ok(artifacts)
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    fs::write(path, content).map_err(|e| Error::io(e, path))
}

/// Quotes a CSV cell when it contains a delimiter, quote or newline.
fn csv_cell(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn fmt_opt(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn sanitize_file_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

fn summary_csv(summary: &DatasetSummary) -> String {
    let mut out = String::from(
        "name,dtype,non_null,missing,missing_share,unique,is_numeric,min,max,mean,std\n",
    );
    for c in &summary.columns {
        out.push_str(&format!(
            "{},{},{},{},{},{},{},{},{},{},{}\n",
            csv_cell(&c.name),
            c.dtype,
            c.non_null,
            c.missing,
            c.missing_share,
            c.unique,
            c.is_numeric,
            fmt_opt(c.min),
            fmt_opt(c.max),
            fmt_opt(c.mean),
            fmt_opt(c.std),
        ));
    }
    out
}

fn missing_csv(missing: &MissingTable) -> String {
    let mut out = String::from("name,missing,missing_share\n");
    for c in &missing.columns {
        out.push_str(&format!(
            "{},{},{}\n",
            csv_cell(&c.name),
            c.missing,
            c.missing_share
        ));
    }
    out
}

fn correlation_csv(matrix: &CorrelationMatrix) -> String {
    let mut out = String::from("column");
    for name in &matrix.columns {
        out.push(',');
        out.push_str(&csv_cell(name));
    }
    out.push('\n');
    for (i, name) in matrix.columns.iter().enumerate() {
        out.push_str(&csv_cell(name));
        for j in 0..matrix.columns.len() {
            out.push(',');
            out.push_str(&fmt_opt(matrix.values[i][j]));
        }
        out.push('\n');
    }
    out
}

fn report_markdown(
    options: &ReportOptions,
    summary: &DatasetSummary,
    missing: &MissingTable,
    flags: &QualityFlags,
    correlation: &CorrelationMatrix,
    categories: &CategoryTable,
) -> String {
    let mut md = String::new();
    md.push_str(&format!("# {}\n\n", options.title));
    if let Some(source) = &options.source {
        md.push_str(&format!("Source: `{source}`\n\n"));
    }
    md.push_str(&format!(
        "Rows: {} | Columns: {}\n\n",
        summary.n_rows, summary.n_cols
    ));

    md.push_str("## Quality\n\n");
    md.push_str(&format!(
        "Quality score: **{:.2}**\n\n",
        flags.quality_score
    ));
    let mut fired = Vec::new();
    if flags.too_few_rows {
        fired.push("too few rows".to_string());
    }
    if flags.too_many_columns {
        fired.push("too many columns".to_string());
    }
    if flags.too_many_missing {
        fired.push(format!(
            "high missing share (max {:.1}%)",
            flags.max_missing_share * 100.0
        ));
    }
    if flags.has_constant_columns {
        fired.push(format!(
            "constant columns: {}",
            flags.constant_columns.join(", ")
        ));
    }
    if flags.has_suspicious_id_duplicates {
        fired.push(format!(
            "duplicate ids in: {}",
            flags.id_columns_with_duplicates.join(", ")
        ));
    }
    if fired.is_empty() {
        md.push_str("No quality flags raised.\n\n");
    } else {
        for flag in &fired {
            md.push_str(&format!("- {flag}\n"));
        }
        md.push('\n');
    }

    md.push_str("## Columns\n\n");
    md.push_str("See `summary.csv` for per-column statistics.\n\n");
    md.push_str("| name | dtype | missing | unique |\n");
    md.push_str("|------|-------|---------|--------|\n");
    for c in &summary.columns {
        md.push_str(&format!(
            "| {} | {} | {:.1}% | {} |\n",
            c.name,
            c.dtype,
            c.missing_share * 100.0,
            c.unique
        ));
    }
    md.push('\n');

    md.push_str("## Missing values\n\n");
    if missing.is_empty() {
        md.push_str("No missing values.\n\n");
    } else {
        md.push_str(&format!(
            "{} missing cells across {} columns (`missing.csv`).\n\n",
            missing.total_missing(),
            missing.columns.len()
        ));
        let worst = missing.columns_above(options.min_missing_share);
        if !worst.is_empty() {
            md.push_str(&format!(
                "Columns above {:.0}% missing: {}\n\n",
                options.min_missing_share * 100.0,
                worst.join(", ")
            ));
        }
    }

    md.push_str("## Correlation\n\n");
    if correlation.is_empty() {
        md.push_str("Fewer than two numeric columns; no matrix produced.\n\n");
    } else {
        md.push_str(&format!(
            "Pearson matrix over {} numeric columns in `correlation.csv`.\n\n",
            correlation.columns.len()
        ));
    }

    md.push_str("## Categories\n\n");
    if categories.is_empty() {
        md.push_str("No categorical columns profiled.\n");
    } else {
        md.push_str(&format!(
            "Top-{} value counts for {} columns under `top_categories/`.\n",
            options.categories.top_k(),
            categories.columns.len()
        ));
    }

    md
}

#[cfg(test)]
mod tests {
    use crate::table::Column;

    use super::*;

    fn sample_table() -> Table {
        Table::new(vec![
            Column::numeric("a", vec![Some(1.0), Some(2.0), None]),
            Column::numeric("b", vec![Some(2.0), Some(4.0), Some(6.0)]),
            Column::text(
                "city",
                vec![Some("X".into()), Some("X".into()), Some("Y".into())],
            ),
        ])
        .unwrap()
    }

    #[test]
    fn test_report_writes_all_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let options = ReportOptions::new(dir.path()).with_title("Sample");
        let artifacts = generate_report(&sample_table(), &options).unwrap();

        assert!(dir.path().join("summary.csv").exists());
        assert!(dir.path().join("missing.csv").exists());
        assert!(dir.path().join("correlation.csv").exists());
        assert!(dir.path().join("top_categories/city.csv").exists());
        assert!(dir.path().join("report.md").exists());
        assert_eq!(artifacts.files.len(), 5);

        let md = fs::read_to_string(dir.path().join("report.md")).unwrap();
        assert!(md.starts_with("# Sample"));
        assert!(md.contains("Quality score"));
    }

    #[test]
    fn test_missing_csv_skipped_when_complete() {
        let dir = tempfile::tempdir().unwrap();
        let table = Table::new(vec![Column::numeric("x", vec![Some(1.0), Some(2.0)])]).unwrap();
        generate_report(&table, &ReportOptions::new(dir.path())).unwrap();
        assert!(!dir.path().join("missing.csv").exists());
        // Single numeric column: no correlation artifact either.
        assert!(!dir.path().join("correlation.csv").exists());
    }

    #[test]
    fn test_summary_csv_content() {
        let dir = tempfile::tempdir().unwrap();
        generate_report(&sample_table(), &ReportOptions::new(dir.path())).unwrap();
        let csv = fs::read_to_string(dir.path().join("summary.csv")).unwrap();
        let mut lines = csv.lines();
        assert!(lines.next().unwrap().starts_with("name,dtype,non_null"));
        assert!(csv.contains("a,numeric,2,1,"));
        assert!(csv.contains("city,text,3,0,"));
    }

    #[test]
    fn test_csv_cell_escaping() {
        assert_eq!(csv_cell("plain"), "plain");
        assert_eq!(csv_cell("a,b"), "\"a,b\"");
        assert_eq!(csv_cell("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn test_category_file_name_sanitized() {
        let dir = tempfile::tempdir().unwrap();
        let table = Table::new(vec![Column::text(
            "city/region",
            vec![Some("X".into())],
        )])
        .unwrap();
        generate_report(&table, &ReportOptions::new(dir.path())).unwrap();
        assert!(dir.path().join("top_categories/city_region.csv").exists());
    }

    #[test]
    fn test_invalid_min_missing_share() {
        let result = ReportOptions::new("/tmp/out").with_min_missing_share(1.5);
        assert!(result.is_err());
    }
}
