//! Global atomic counters for engine observability.
//!
//! Counters are incremented silently at the call site. Call
//! [`Metrics::flush`] to emit current values as a single
//! `tracing::info!` event (e.g. at the end of a CLI invocation).

use std::sync::atomic::{AtomicU64, Ordering};

/// Global metrics singleton.
pub static METRICS: Metrics = Metrics::new();

/// Atomic counters, updated with relaxed ordering.
pub struct Metrics {
    runs_completed: AtomicU64,
    records_ingested: AtomicU64,
    cells_synthesized: AtomicU64,
    forecasts_fitted: AtomicU64,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    pub const fn new() -> Self {
        Self {
            runs_completed: AtomicU64::new(0),
            records_ingested: AtomicU64::new(0),
            cells_synthesized: AtomicU64::new(0),
            forecasts_fitted: AtomicU64::new(0),
        }
    }

    /// Record one finished run and its volumes.
    pub fn record_run(&self, records: usize, cells: usize, forecasts: usize) {
        self.runs_completed.fetch_add(1, Ordering::Relaxed);
        self.records_ingested.fetch_add(records as u64, Ordering::Relaxed);
        self.cells_synthesized.fetch_add(cells as u64, Ordering::Relaxed);
        self.forecasts_fitted.fetch_add(forecasts as u64, Ordering::Relaxed);
        tracing::trace!(metric = "run", "counters incremented");
    }

    /// Emit all current counter values as a single `info!` event.
    pub fn flush(&self) {
        tracing::info!(
            metric = "flush",
            runs_completed = self.runs_completed(),
            records_ingested = self.records_ingested(),
            cells_synthesized = self.cells_synthesized(),
            forecasts_fitted = self.forecasts_fitted(),
        );
    }

    pub fn runs_completed(&self) -> u64 {
        self.runs_completed.load(Ordering::Relaxed)
    }

    pub fn records_ingested(&self) -> u64 {
        self.records_ingested.load(Ordering::Relaxed)
    }

    pub fn cells_synthesized(&self) -> u64 {
        self.cells_synthesized.load(Ordering::Relaxed)
    }

    pub fn forecasts_fitted(&self) -> u64 {
        self.forecasts_fitted.load(Ordering::Relaxed)
    }

    /// Reset all counters to zero (useful in tests).
    pub fn reset(&self) {
        self.runs_completed.store(0, Ordering::Relaxed);
        self.records_ingested.store(0, Ordering::Relaxed);
        self.cells_synthesized.store(0, Ordering::Relaxed);
        self.forecasts_fitted.store(0, Ordering::Relaxed);
    }
}
