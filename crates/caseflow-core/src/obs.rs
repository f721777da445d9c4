//! Structured observability hooks for engine runs.
//!
//! This module provides:
//! - A run-scoped tracing span via the `EngineSpan` RAII guard
//! - Emission functions for each pipeline stage
//!
//! Events are emitted at `info!` level unless noted; filter with `RUST_LOG`.

use tracing::info;

/// RAII guard that enters a run-scoped tracing span for the duration of a run.
///
/// # Example
///
/// ```ignore
/// let _span = EngineSpan::enter("0b7c...");
/// // Every event inside is tagged with run_id.
/// ```
pub struct EngineSpan {
    _span: tracing::span::EnteredSpan,
}

impl EngineSpan {
    /// Create and enter a span tagged with the run_id.
    pub fn enter(run_id: &str) -> Self {
        let span = tracing::info_span!("caseflow.run", run_id = %run_id);
        Self {
            _span: span.entered(),
        }
    }
}

/// Emit event: run started over `records` input rows.
pub fn emit_run_started(run_id: &str, records: usize, seeded: bool) {
    info!(event = "run.started", run_id = %run_id, records = records, seeded = seeded);
}

/// Emit event: department and month keys discovered.
pub fn emit_grid_extracted(departments: usize, months: usize) {
    info!(event = "grid.extracted", departments = departments, months = months);
}

/// Emit event: departments beyond the configured limit were dropped (warning level).
pub fn emit_departments_truncated(limit: usize, dropped: usize) {
    tracing::warn!(event = "departments.truncated", limit = limit, dropped = dropped);
}

/// Emit event: metric cells built.
pub fn emit_cells_synthesized(cells: usize) {
    info!(event = "cells.synthesized", cells = cells);
}

/// Emit event: department summaries built; `undefined` counts zero-baseline
/// improvements.
pub fn emit_summaries_aggregated(summaries: usize, undefined: usize) {
    info!(event = "summaries.aggregated", summaries = summaries, undefined = undefined);
}

/// Emit event: forecasts fitted.
pub fn emit_forecast_fitted(departments: usize, combined_points: usize) {
    info!(
        event = "forecast.fitted",
        departments = departments,
        combined_points = combined_points,
    );
}

/// Emit event: run finished.
pub fn emit_run_finished(run_id: &str, duration_ms: u64, digest: &str) {
    info!(
        event = "run.finished",
        run_id = %run_id,
        duration_ms = duration_ms,
        snapshot_digest = %digest,
    );
}
