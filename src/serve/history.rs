//! Bounded history of processed uploads.
//!
//! Adapter-side state only; nothing in the profiling core reads it.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

/// One processed upload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessingRecord {
    /// Client-supplied file name.
    pub filename: String,
    /// RFC 3339 timestamp of when processing finished.
    pub timestamp: String,
    /// Rows in the parsed table.
    pub n_rows: usize,
    /// Columns in the parsed table.
    pub n_cols: usize,
    /// Composite quality score of the upload.
    pub quality_score: f64,
    /// Wall-clock processing time in milliseconds.
    pub processing_ms: f64,
}

/// Aggregate view over the history, served by the benchmark endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkSummary {
    /// Uploads currently retained in the history.
    pub retained: usize,
    /// Mean quality score over retained uploads.
    pub avg_quality_score: f64,
    /// Mean processing time in milliseconds over retained uploads.
    pub avg_processing_ms: f64,
    /// Most recent records, newest first, capped by the request limit.
    pub recent: Vec<ProcessingRecord>,
}

/// Fixed-capacity log of processed uploads; the oldest record is evicted
/// when full.
#[derive(Debug)]
pub struct ProcessingLog {
    capacity: usize,
    records: VecDeque<ProcessingRecord>,
}

impl ProcessingLog {
    /// Creates a log retaining at most `capacity` records. A zero capacity
    /// retains nothing.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            records: VecDeque::with_capacity(capacity),
        }
    }

    /// Appends a record, evicting the oldest when at capacity.
    pub fn push(&mut self, record: ProcessingRecord) {
        if self.capacity == 0 {
            return;
        }
        if self.records.len() == self.capacity {
            self.records.pop_front();
        }
        self.records.push_back(record);
    }

    /// Number of retained records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if nothing has been retained.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Builds the aggregate view, with at most `limit` recent records,
    /// newest first.
    pub fn summary(&self, limit: usize) -> BenchmarkSummary {
        let n = self.records.len();
        let (avg_quality_score, avg_processing_ms) = if n == 0 {
            (0.0, 0.0)
        } else {
            let score: f64 = self.records.iter().map(|r| r.quality_score).sum();
            let time: f64 = self.records.iter().map(|r| r.processing_ms).sum();
            (score / n as f64, time / n as f64)
        };
        BenchmarkSummary {
            retained: n,
            avg_quality_score,
            avg_processing_ms,
            recent: self.records.iter().rev().take(limit).cloned().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, score: f64) -> ProcessingRecord {
        ProcessingRecord {
            filename: name.to_string(),
            timestamp: "2026-01-01T00:00:00+00:00".to_string(),
            n_rows: 10,
            n_cols: 2,
            quality_score: score,
            processing_ms: 1.0,
        }
    }

    #[test]
    fn test_eviction_at_capacity() {
        let mut log = ProcessingLog::new(2);
        log.push(record("a", 0.5));
        log.push(record("b", 0.6));
        log.push(record("c", 0.7));
        assert_eq!(log.len(), 2);
        let summary = log.summary(10);
        let names: Vec<&str> = summary.recent.iter().map(|r| r.filename.as_str()).collect();
        assert_eq!(names, vec!["c", "b"]);
    }

    #[test]
    fn test_summary_averages() {
        let mut log = ProcessingLog::new(10);
        log.push(record("a", 0.4));
        log.push(record("b", 0.8));
        let summary = log.summary(1);
        assert_eq!(summary.retained, 2);
        assert!((summary.avg_quality_score - 0.6).abs() < 1e-12);
        assert_eq!(summary.recent.len(), 1);
        assert_eq!(summary.recent[0].filename, "b");
    }

    #[test]
    fn test_empty_log_summary() {
        let log = ProcessingLog::new(5);
        let summary = log.summary(10);
        assert_eq!(summary.retained, 0);
        assert_eq!(summary.avg_quality_score, 0.0);
        assert!(summary.recent.is_empty());
    }

    #[test]
    fn test_zero_capacity_retains_nothing() {
        let mut log = ProcessingLog::new(0);
        log.push(record("a", 0.5));
        assert!(log.is_empty());
    }
}
