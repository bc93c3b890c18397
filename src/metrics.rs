// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Metrics instrumentation for search-compiler.
//!
//! Uses the `metrics` crate for backend-agnostic metrics collection.
//! The embedding service is responsible for choosing the exporter (Prometheus, OTEL, etc.)
//!
//! # Metric Naming Convention
//! - `search_compiler_` prefix for all metrics
//! - `_total` suffix for counters
//! - `_seconds` suffix for duration histograms
//!
//! # Labels
//! - `kind`: filter, sort
//! - `status`: success, or the [`ErrorKind`](crate::ErrorKind) of a rejection
//! - `backend`: memory
//! - `operation`: index, delete, search

use metrics::{counter, gauge, histogram};
use std::time::{Duration, Instant};

// ═══════════════════════════════════════════════════════════════════════════
// COMPILATION - Filter and sort compiler outcomes
// ═══════════════════════════════════════════════════════════════════════════

/// Record a filter or sort compilation outcome
pub fn record_compilation(kind: &str, status: &str) {
    counter!(
        "search_compiler_compilations_total",
        "kind" => kind.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// Record compilation latency
pub fn record_compile_latency(kind: &str, duration: Duration) {
    histogram!(
        "search_compiler_compile_seconds",
        "kind" => kind.to_string()
    )
    .record(duration.as_secs_f64());
}

// ═══════════════════════════════════════════════════════════════════════════
// BACKEND - Index maintenance and search execution
// ═══════════════════════════════════════════════════════════════════════════

/// Record a search executed against a backend
pub fn record_search(backend: &str, status: &str) {
    counter!(
        "search_compiler_backend_searches_total",
        "backend" => backend.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// Record backend operation latency
pub fn record_backend_latency(backend: &str, operation: &str, duration: Duration) {
    histogram!(
        "search_compiler_backend_seconds",
        "backend" => backend.to_string(),
        "operation" => operation.to_string()
    )
    .record(duration.as_secs_f64());
}

/// Record how many ids a search returned
pub fn record_search_results(backend: &str, count: usize) {
    histogram!(
        "search_compiler_search_results",
        "backend" => backend.to_string()
    )
    .record(count as f64);
}

/// Set the number of documents held by a backend
pub fn set_indexed_documents(backend: &str, count: usize) {
    gauge!(
        "search_compiler_indexed_documents",
        "backend" => backend.to_string()
    )
    .set(count as f64);
}

/// A timing guard that records backend latency on drop
pub struct LatencyTimer {
    backend: &'static str,
    operation: &'static str,
    start: Instant,
}

impl LatencyTimer {
    /// Start a new latency timer
    pub fn new(backend: &'static str, operation: &'static str) -> Self {
        Self {
            backend,
            operation,
            start: Instant::now(),
        }
    }
}

impl Drop for LatencyTimer {
    fn drop(&mut self) {
        record_backend_latency(self.backend, self.operation, self.start.elapsed());
    }
}
