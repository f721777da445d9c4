//! Domain models for caseflow.
//!
//! Canonical definitions for the engine's entities:
//! - `RawRecord`: one input case, field name to string
//! - `MetricCell`: derived metrics for a (department, month) pair
//! - `DepartmentSummary`: per-department roll-up with improvement percentages
//! - `ForecastSeries` / `CombinedSeries`: accuracy trends and projections

pub mod digest;
pub mod error;
pub mod forecast;
pub mod metrics;
pub mod record;

// Re-export main types and errors
pub use error::{CaseflowError, Result};
pub use forecast::{
    clamp_percent, CombinedPoint, CombinedSeries, ForecastPoint, ForecastSeries,
    HistoricalPoint, LinearTrend, SeriesPhase, SeriesValue,
};
pub use metrics::{DepartmentSummary, Kpi, KpiImprovements, MetricCell, MetricSet, Method};
pub use record::{numeric_field, records_from_json, text_field, RawRecord};
