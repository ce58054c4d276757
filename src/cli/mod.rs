//! Command-line interface.

mod commands;

use std::{path::PathBuf, process::ExitCode};

use clap::{Parser, Subcommand};

/// Tabular dataset profiling: column statistics, missing values,
/// correlation, category tables and quality flags.
#[derive(Parser)]
#[command(name = "perfilar", version, about)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print a quick per-column overview of a dataset
    Overview {
        /// Path to a CSV or Parquet file
        path: PathBuf,

        /// CSV field delimiter
        #[arg(long, default_value = ",")]
        delimiter: char,
    },

    /// Write a full profiling report to a directory
    Report {
        /// Path to a CSV or Parquet file
        path: PathBuf,

        /// Output directory for the report artifacts
        #[arg(long, default_value = "report")]
        out_dir: PathBuf,

        /// CSV field delimiter
        #[arg(long, default_value = ",")]
        delimiter: char,

        /// Most frequent values kept per categorical column
        #[arg(long, default_value_t = 5)]
        top_k_categories: usize,

        /// Maximum categorical columns profiled
        #[arg(long, default_value_t = 20)]
        max_category_columns: usize,

        /// Report title
        #[arg(long, default_value = "Dataset report")]
        title: String,

        /// Missing share above which a column is called out
        #[arg(long, default_value_t = 0.05)]
        min_missing_share: f64,
    },

    /// Evaluate quality flags and the composite score
    Flags {
        /// Path to a CSV or Parquet file
        path: PathBuf,

        /// CSV field delimiter
        #[arg(long, default_value = ",")]
        delimiter: char,

        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Run the HTTP profiling service
    Serve {
        /// Bind host
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Bind port
        #[arg(long, default_value_t = 8000)]
        port: u16,

        /// Uploads retained in the processing history
        #[arg(long, default_value_t = 100)]
        history_limit: usize,
    },
}

/// Parses arguments and dispatches to the subcommand.
pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Overview { path, delimiter } => commands::cmd_overview(&path, delimiter),
        Commands::Report {
            path,
            out_dir,
            delimiter,
            top_k_categories,
            max_category_columns,
            title,
            min_missing_share,
        } => commands::cmd_report(
            &path,
            &out_dir,
            delimiter,
            top_k_categories,
            max_category_columns,
            &title,
            min_missing_share,
        ),
        Commands::Flags {
            path,
            delimiter,
            json,
        } => commands::cmd_flags(&path, delimiter, json),
        Commands::Serve {
            host,
            port,
            history_limit,
        } => commands::cmd_serve(host, port, history_limit),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_structure_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_overview() {
        let cli = Cli::try_parse_from(["perfilar", "overview", "data.csv"]).unwrap();
        assert!(matches!(cli.command, Commands::Overview { .. }));
    }

    #[test]
    fn test_parse_report_with_options() {
        let cli = Cli::try_parse_from([
            "perfilar",
            "report",
            "data.csv",
            "--out-dir",
            "out",
            "--top-k-categories",
            "3",
        ])
        .unwrap();
        match cli.command {
            Commands::Report {
                out_dir,
                top_k_categories,
                ..
            } => {
                assert_eq!(out_dir, PathBuf::from("out"));
                assert_eq!(top_k_categories, 3);
            }
            _ => panic!("expected report subcommand"),
        }
    }

    #[test]
    fn test_parse_serve_defaults() {
        let cli = Cli::try_parse_from(["perfilar", "serve"]).unwrap();
        match cli.command {
            Commands::Serve { host, port, .. } => {
                assert_eq!(host, "127.0.0.1");
                assert_eq!(port, 8000);
            }
            _ => panic!("expected serve subcommand"),
        }
    }

    #[test]
    fn test_missing_path_is_an_error() {
        assert!(Cli::try_parse_from(["perfilar", "overview"]).is_err());
    }
}
