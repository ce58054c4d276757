//! HTTP service adapter.
//!
//! A thin hyper service over the profiling core. Uploads are raw CSV
//! request bodies (`text/csv`); the client names the file through the
//! `filename` query parameter. Endpoints:
//!
//! - `GET  /health` — liveness probe
//! - `POST /summary` — per-column profiles
//! - `POST /missing` — missing-value table
//! - `POST /quality-flags` — flags with substring key filtering (`exclude`)
//! - `POST /report` — combined report (`include_correlation`,
//!   `include_categories`)
//! - `POST /usable` — model-family usability verdict (`model`, `min_score`)
//! - `GET  /benchmark` — statistics over recently processed uploads
//!
//! Malformed uploads and bad parameters map to 400, everything else to 500.
//! The only server-side state is the bounded [`ProcessingLog`].

pub mod history;

use std::{
    collections::HashMap,
    convert::Infallible,
    net::SocketAddr,
    sync::{Arc, Mutex},
    time::Instant,
};

use hyper::{
    service::{make_service_fn, service_fn},
    Body, Method, Request, Response, Server, StatusCode,
};
use serde::Serialize;

use crate::error::{Error, Result};
use crate::profile::{
    analyze_missing, category_table, correlation_matrix, summarize, CategoryOptions,
    DatasetSummary, MissingTable,
};
use crate::quality::{evaluate_quality, QualityConfig, QualityFlags};
use crate::table::{CsvOptions, Table};

pub use history::{BenchmarkSummary, ProcessingLog, ProcessingRecord};

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServeOptions {
    /// Bind host.
    pub host: String,
    /// Bind port.
    pub port: u16,
    /// Maximum uploads retained in the processing history.
    pub history_limit: usize,
}

impl Default for ServeOptions {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            history_limit: 100,
        }
    }
}

struct AppState {
    log: Mutex<ProcessingLog>,
    quality: QualityConfig,
}

impl AppState {
    fn new(history_limit: usize) -> Self {
        Self {
            log: Mutex::new(ProcessingLog::new(history_limit)),
            quality: QualityConfig::default(),
        }
    }

    fn record(&self, processed: &Processed) {
        let mut log = self.log.lock().unwrap_or_else(|e| e.into_inner());
        log.push(ProcessingRecord {
            filename: processed.filename.clone(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            n_rows: processed.summary.n_rows,
            n_cols: processed.summary.n_cols,
            quality_score: processed.flags.quality_score,
            processing_ms: processed.processing_ms,
        });
    }
}

/// One upload run through the profiling pipeline.
struct Processed {
    filename: String,
    table: Table,
    summary: DatasetSummary,
    missing: MissingTable,
    flags: QualityFlags,
    processing_ms: f64,
}

/// Runs the HTTP server until the process is stopped.
///
/// # Errors
///
/// Returns [`Error::Serve`] if the address is invalid, the bind fails, or
/// the server loop exits with an error.
pub async fn run_server(options: ServeOptions) -> Result<()> {
    let addr: SocketAddr = format!("{}:{}", options.host, options.port)
        .parse()
        .map_err(|e| Error::serve(format!("invalid bind address: {e}")))?;

    let state = Arc::new(AppState::new(options.history_limit));
    let make_svc = make_service_fn(move |_conn| {
        let state = Arc::clone(&state);
        async move {
            Ok::<_, Infallible>(service_fn(move |req| handle(req, Arc::clone(&state))))
        }
    });

    let server = Server::try_bind(&addr)
        .map_err(|e| Error::serve(format!("bind {addr}: {e}")))?
        .serve(make_svc);
    tracing::info!(%addr, "listening");

    server.await.map_err(|e| Error::serve(e.to_string()))
}

async fn handle(
    req: Request<Body>,
    state: Arc<AppState>,
) -> std::result::Result<Response<Body>, Infallible> {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let started = Instant::now();

    let response = route(req, &state)
        .await
        .unwrap_or_else(|err| error_response(&err));

    tracing::info!(
        %method,
        %path,
        status = response.status().as_u16(),
        elapsed_ms = started.elapsed().as_secs_f64() * 1000.0,
        "request"
    );
    Ok(response)
}

async fn route(req: Request<Body>, state: &AppState) -> Result<Response<Body>> {
    let path = req.uri().path().to_string();
    let query = parse_query(req.uri().query().unwrap_or(""));

    match (req.method(), path.as_str()) {
        (&Method::GET, "/health") => Ok(json_response(
            StatusCode::OK,
            &serde_json::json!({
                "status": "ok",
                "service": "perfilar",
                "version": env!("CARGO_PKG_VERSION"),
            }),
        )),

        (&Method::GET, "/benchmark") => {
            let limit = parse_number(&query, "limit", 10usize)?;
            let log = state.log.lock().unwrap_or_else(|e| e.into_inner());
            Ok(json_response(StatusCode::OK, &log.summary(limit)))
        }

        (&Method::POST, "/summary") => {
            let processed = process_upload(state, &query, req.into_body()).await?;
            Ok(json_response(
                StatusCode::OK,
                &serde_json::json!({
                    "filename": processed.filename,
                    "summary": processed.summary,
                    "processing_ms": processed.processing_ms,
                }),
            ))
        }

        (&Method::POST, "/missing") => {
            let processed = process_upload(state, &query, req.into_body()).await?;
            let high: Vec<&str> = processed.missing.columns_above(0.5);
            Ok(json_response(
                StatusCode::OK,
                &serde_json::json!({
                    "filename": processed.filename,
                    "missing": processed.missing,
                    "total_missing_cells": processed.missing.total_missing(),
                    "high_missing_columns": high,
                    "has_any_missing": !processed.missing.is_empty(),
                }),
            ))
        }

        (&Method::POST, "/quality-flags") => {
            let exclude = query
                .get("exclude")
                .cloned()
                .unwrap_or_else(|| "share".to_string());
            let processed = process_upload(state, &query, req.into_body()).await?;
            let flags = filtered_flags(&processed.flags, &exclude)?;
            Ok(json_response(
                StatusCode::OK,
                &serde_json::json!({
                    "filename": processed.filename,
                    "flags": flags,
                }),
            ))
        }

        (&Method::POST, "/report") => {
            let include_correlation = parse_bool(&query, "include_correlation", true)?;
            let include_categories = parse_bool(&query, "include_categories", true)?;
            let processed = process_upload(state, &query, req.into_body()).await?;

            let mut body = serde_json::json!({
                "filename": processed.filename,
                "summary": processed.summary,
                "missing": processed.missing,
                "flags": processed.flags,
                "processing_ms": processed.processing_ms,
            });
            if include_correlation {
                body["correlation"] = to_json(&correlation_matrix(&processed.table))?;
            }
            if include_categories {
                body["categories"] = to_json(&category_table(
                    &processed.table,
                    &CategoryOptions::default(),
                ))?;
            }
            Ok(json_response(StatusCode::OK, &body))
        }

        (&Method::POST, "/usable") => {
            let model = query
                .get("model")
                .cloned()
                .ok_or_else(|| Error::invalid_config("missing 'model' query parameter"))?;
            let min_score = parse_number(&query, "min_score", 0.7f64)?;
            let processed = process_upload(state, &query, req.into_body()).await?;
            let usable = usable_for(&model, &processed.summary, &processed.flags, min_score)?;
            Ok(json_response(
                StatusCode::OK,
                &serde_json::json!({
                    "filename": processed.filename,
                    "model": model,
                    "usable": usable,
                    "quality_score": processed.flags.quality_score,
                    "min_score": min_score,
                }),
            ))
        }

        _ => Ok(json_response(
            StatusCode::NOT_FOUND,
            &serde_json::json!({ "error": "not found" }),
        )),
    }
}

async fn process_upload(
    state: &AppState,
    query: &HashMap<String, String>,
    body: Body,
) -> Result<Processed> {
    let filename = query
        .get("filename")
        .cloned()
        .unwrap_or_else(|| "upload.csv".to_string());
    let bytes = hyper::body::to_bytes(body)
        .await
        .map_err(|e| Error::serve(format!("reading request body: {e}")))?;
    if bytes.is_empty() {
        return Err(Error::schema("empty request body"));
    }

    let started = Instant::now();
    let table = Table::from_csv_bytes(&bytes, CsvOptions::default())?;
    let summary = summarize(&table);
    let missing = analyze_missing(&table);
    let flags = evaluate_quality(&summary, &missing, &state.quality);
    let processing_ms = started.elapsed().as_secs_f64() * 1000.0;

    let processed = Processed {
        filename,
        table,
        summary,
        missing,
        flags,
        processing_ms,
    };
    state.record(&processed);
    Ok(processed)
}

/// Usability verdict per model family.
///
/// Regression requires a complete table, clustering requires no constant
/// columns and more than two columns, scoring requires the composite score
/// to reach `min_score`.
fn usable_for(
    model: &str,
    summary: &DatasetSummary,
    flags: &QualityFlags,
    min_score: f64,
) -> Result<bool> {
    match model {
        "regression" => Ok(!flags.has_missing_values),
        "clustering" => Ok(!flags.has_constant_columns && summary.n_cols > 2),
        "scoring" => Ok(flags.quality_score >= min_score),
        other => Err(Error::invalid_config(format!(
            "unknown model family '{other}'"
        ))),
    }
}

/// Serializes the flags and drops every key containing any of the
/// comma-separated `exclude` substrings. An empty filter keeps everything.
fn filtered_flags(flags: &QualityFlags, exclude: &str) -> Result<serde_json::Value> {
    let needles: Vec<&str> = exclude
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();
    let mut value = to_json(flags)?;
    if !needles.is_empty() {
        if let Some(map) = value.as_object_mut() {
            map.retain(|key, _| !needles.iter().any(|n| key.contains(n)));
        }
    }
    Ok(value)
}

fn to_json<T: Serialize>(value: &T) -> Result<serde_json::Value> {
    serde_json::to_value(value).map_err(|e| Error::Format(e.to_string()))
}

fn parse_query(raw: &str) -> HashMap<String, String> {
    raw.split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| match pair.split_once('=') {
            Some((key, value)) => (key.to_string(), value.to_string()),
            None => (pair.to_string(), String::new()),
        })
        .collect()
}

fn parse_bool(query: &HashMap<String, String>, key: &str, default: bool) -> Result<bool> {
    match query.get(key).map(String::as_str) {
        None => Ok(default),
        Some("true") | Some("1") | Some("yes") => Ok(true),
        Some("false") | Some("0") | Some("no") => Ok(false),
        Some(other) => Err(Error::invalid_config(format!(
            "parameter '{key}' must be a boolean, got '{other}'"
        ))),
    }
}

fn parse_number<T: std::str::FromStr>(
    query: &HashMap<String, String>,
    key: &str,
    default: T,
) -> Result<T> {
    match query.get(key) {
        None => Ok(default),
        Some(raw) => raw
            .parse()
            .map_err(|_| Error::invalid_config(format!("parameter '{key}' must be a number"))),
    }
}

fn json_response<T: Serialize>(status: StatusCode, value: &T) -> Response<Body> {
    let body = serde_json::to_vec(value).unwrap_or_default();
    Response::builder()
        .status(status)
        .header(hyper::header::CONTENT_TYPE, "application/json")
        .body(Body::from(body))
        .unwrap_or_else(|_| Response::new(Body::empty()))
}

fn error_response(err: &Error) -> Response<Body> {
    let status = match err {
        Error::Io { .. }
        | Error::Arrow(_)
        | Error::Parquet(_)
        | Error::Schema { .. }
        | Error::InvalidConfig { .. }
        | Error::UnsupportedFormat { .. } => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    json_response(status, &serde_json::json!({ "error": err.to_string() }))
}
