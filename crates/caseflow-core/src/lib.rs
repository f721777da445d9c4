//! Caseflow Core Library
//!
//! Turns departmental case records into per-month metric cells for a
//! baseline and two derived scoring models, rolls them up into department
//! improvement percentages, and forecasts each department's accuracy trend.

pub mod aggregate;
pub mod comparison;
pub mod config;
pub mod domain;
pub mod engine;
pub mod forecast;
pub mod grouping;
pub mod metrics;
pub mod obs;
pub mod reporting;
pub mod synthesis;
pub mod telemetry;

pub use domain::{
    clamp_percent, records_from_json, CaseflowError, CombinedPoint, CombinedSeries,
    DepartmentSummary, ForecastPoint, ForecastSeries, HistoricalPoint, Kpi, KpiImprovements,
    LinearTrend, MetricCell, MetricSet, Method, RawRecord, Result, SeriesPhase,
};

pub use aggregate::{aggregate, improvement_percent, mean, summarize_department};
pub use comparison::{
    compare, compare_all, compare_department, department_totals, kpi_shares, overall_scores,
    ComparisonRow, DepartmentTotal, KpiShare, ModelComparison, OverallScores,
};
pub use config::{EngineConfig, FieldNames, ModelProfile, ZeroBaselinePolicy};
pub use engine::{Engine, EngineReport};
pub use forecast::{combine, forecast_all, forecast_department, period_label, MIN_HISTORY};
pub use grouping::{extract_groups, GroupGrid};
pub use reporting::{render_summary_md, write_report_json, write_summary_md};
pub use synthesis::{baseline_metrics, derive_metrics, synthesize, CellGrid, FieldAverages};

pub use metrics::METRICS;
pub use obs::EngineSpan;
pub use telemetry::init_tracing;

/// Caseflow version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
