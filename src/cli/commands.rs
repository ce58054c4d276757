//! Subcommand implementations.

use std::path::Path;

use crate::error::{Error, Result};
use crate::profile::{analyze_missing, summarize, CategoryOptions, ColumnProfile};
use crate::quality::{evaluate_quality, QualityConfig};
use crate::report::{generate_report, ReportOptions};
use crate::serve::{run_server, ServeOptions};
use crate::table::{CsvOptions, Table};

/// Loads a table, dispatching on the file extension.
fn load_table(path: &Path, delimiter: char) -> Result<Table> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    match extension.as_str() {
        "csv" | "tsv" | "txt" => {
            if !delimiter.is_ascii() {
                return Err(Error::invalid_config("delimiter must be an ASCII character"));
            }
            let options = CsvOptions::default().with_delimiter(delimiter as u8);
            Table::from_csv_with_options(path, options)
        }
        "parquet" => Table::from_parquet(path),
        other => Err(Error::unsupported_format(other)),
    }
}

fn fmt_opt(value: Option<f64>) -> String {
    value
        .map(|v| format!("{v:.4}"))
        .unwrap_or_else(|| "-".to_string())
}

fn print_profile_row(profile: &ColumnProfile) {
    println!(
        "{:<24} {:<9} {:>9} {:>8.1}% {:>8} {:>12} {:>12} {:>12} {:>12}",
        profile.name,
        profile.dtype,
        profile.non_null,
        profile.missing_share * 100.0,
        profile.unique,
        fmt_opt(profile.min),
        fmt_opt(profile.max),
        fmt_opt(profile.mean),
        fmt_opt(profile.std),
    );
}

pub fn cmd_overview(path: &Path, delimiter: char) -> Result<()> {
    let table = load_table(path, delimiter)?;
    let summary = summarize(&table);

    println!("{}", path.display());
    println!("rows: {}  columns: {}", summary.n_rows, summary.n_cols);
    println!();
    println!(
        "{:<24} {:<9} {:>9} {:>9} {:>8} {:>12} {:>12} {:>12} {:>12}",
        "column", "dtype", "non_null", "missing", "unique", "min", "max", "mean", "std"
    );
    for profile in &summary.columns {
        print_profile_row(profile);
    }

    for profile in &summary.columns {
        if !profile.example_values.is_empty() && !profile.is_numeric {
            println!(
                "  {}: {}",
                profile.name,
                profile.example_values.join(", ")
            );
        }
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
pub fn cmd_report(
    path: &Path,
    out_dir: &Path,
    delimiter: char,
    top_k_categories: usize,
    max_category_columns: usize,
    title: &str,
    min_missing_share: f64,
) -> Result<()> {
    let table = load_table(path, delimiter)?;

    let categories = CategoryOptions::new(top_k_categories, max_category_columns)?;
    let options = ReportOptions::new(out_dir)
        .with_title(title)
        .with_source(path.display().to_string())
        .with_categories(categories)
        .with_min_missing_share(min_missing_share)?;

    let artifacts = generate_report(&table, &options)?;
    println!("report written to {}", out_dir.display());
    for file in &artifacts.files {
        println!("  {}", file.display());
    }
    Ok(())
}

pub fn cmd_flags(path: &Path, delimiter: char, json: bool) -> Result<()> {
    let table = load_table(path, delimiter)?;
    let summary = summarize(&table);
    let missing = analyze_missing(&table);
    let flags = evaluate_quality(&summary, &missing, &QualityConfig::default());

    if json {
        let rendered =
            serde_json::to_string_pretty(&flags).map_err(|e| Error::Format(e.to_string()))?;
        println!("{rendered}");
        return Ok(());
    }

    println!("quality score: {:.2}", flags.quality_score);
    println!("too few rows: {}", flags.too_few_rows);
    println!("too many columns: {}", flags.too_many_columns);
    println!(
        "too many missing: {} (max share {:.1}%)",
        flags.too_many_missing,
        flags.max_missing_share * 100.0
    );
    println!("has missing values: {}", flags.has_missing_values);
    if flags.has_constant_columns {
        println!("constant columns: {}", flags.constant_columns.join(", "));
    }
    if flags.has_suspicious_id_duplicates {
        println!(
            "id columns with duplicates: {}",
            flags.id_columns_with_duplicates.join(", ")
        );
    }
    Ok(())
}

pub fn cmd_serve(host: String, port: u16, history_limit: usize) -> Result<()> {
    tracing_subscriber::fmt().with_target(false).init();

    let options = ServeOptions {
        host,
        port,
        history_limit,
    };
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(Error::io_no_path)?;
    runtime.block_on(run_server(options))
}
