//! The batch engine: records in, report out.
//!
//! A run is a pure transform over one input snapshot:
//! records → grid → cells → summaries, with cells also feeding the
//! forecaster. Nothing is cached between runs.

use std::collections::BTreeMap;
use std::time::Instant;

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use uuid::Uuid;

use crate::aggregate::aggregate;
use crate::comparison::{compare, ModelComparison};
use crate::config::EngineConfig;
use crate::domain::digest::snapshot_digest;
use crate::domain::error::Result;
use crate::domain::forecast::{CombinedSeries, ForecastSeries};
use crate::domain::metrics::{DepartmentSummary, Kpi, Method};
use crate::domain::record::RawRecord;
use crate::forecast::{combine, forecast_all};
use crate::grouping::{extract_groups, GroupGrid};
use crate::metrics::METRICS;
use crate::obs;
use crate::synthesis::{synthesize, CellGrid};

/// Everything one engine run produces.
#[derive(Debug, Clone, Serialize)]
pub struct EngineReport {
    pub run_id: Uuid,
    pub generated_at: DateTime<Utc>,
    /// SHA256 of the canonical input records.
    pub snapshot_digest: String,
    pub departments: Vec<String>,
    pub months: Vec<String>,
    pub cells: CellGrid,
    pub summaries: Vec<DepartmentSummary>,
    pub comparison: ModelComparison,
    pub forecasts: BTreeMap<String, ForecastSeries>,
    pub combined: CombinedSeries,
}

impl EngineReport {
    pub fn summary(&self, department: &str) -> Option<&DepartmentSummary> {
        self.summaries.iter().find(|s| s.department == department)
    }

    pub fn forecast(&self, department: &str) -> Option<&ForecastSeries> {
        self.forecasts.get(department)
    }
}

/// Stateless engine bound to one configuration.
#[derive(Debug, Clone)]
pub struct Engine {
    config: EngineConfig,
}

impl Engine {
    /// Validate `config` and build an engine.
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Run with a generator seeded from `config.seed`, or from entropy.
    pub fn run(&self, records: &[RawRecord]) -> Result<EngineReport> {
        let mut rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        self.run_with_rng(records, &mut rng)
    }

    /// Run drawing jitter from the caller's generator.
    pub fn run_with_rng<R: Rng + ?Sized>(
        &self,
        records: &[RawRecord],
        rng: &mut R,
    ) -> Result<EngineReport> {
        let started = Instant::now();
        let run_id = Uuid::new_v4();
        let run_label = run_id.to_string();
        let _span = obs::EngineSpan::enter(&run_label);
        obs::emit_run_started(&run_label, records.len(), self.config.seed.is_some());

        let digest = snapshot_digest(records)?;
        let config = &self.config;

        let grid = self.extract(records);

        let cells = synthesize(records, &grid, config, rng);
        obs::emit_cells_synthesized(cells.len());

        let summaries = aggregate(&grid, &cells, config.zero_baseline);
        obs::emit_summaries_aggregated(summaries.len(), count_undefined(&summaries));
        let comparison = compare(&summaries);

        let forecasts = forecast_all(&grid, &cells, config.forecast_horizon);
        let ordered: Vec<&ForecastSeries> = grid
            .departments
            .iter()
            .filter_map(|d| forecasts.get(d))
            .collect();
        let combined = combine(&ordered);
        obs::emit_forecast_fitted(forecasts.len(), combined.points.len());

        METRICS.record_run(records.len(), cells.len(), forecasts.len());
        obs::emit_run_finished(
            &run_label,
            started.elapsed().as_millis() as u64,
            &digest,
        );

        Ok(EngineReport {
            run_id,
            generated_at: Utc::now(),
            snapshot_digest: digest,
            departments: grid.departments,
            months: grid.months,
            cells,
            summaries,
            comparison,
            forecasts,
            combined,
        })
    }

    /// Discover departments and months only.
    pub fn extract(&self, records: &[RawRecord]) -> GroupGrid {
        let grid = extract_groups(records, &self.config.fields, self.config.department_limit);
        obs::emit_grid_extracted(grid.departments.len(), grid.months.len());
        if grid.dropped_departments > 0 {
            obs::emit_departments_truncated(self.config.department_limit, grid.dropped_departments);
        }
        grid
    }
}

fn count_undefined(summaries: &[DepartmentSummary]) -> usize {
    summaries
        .iter()
        .flat_map(|s| Method::DERIVED.iter().filter_map(move |m| s.improvement(*m)))
        .flat_map(|imp| Kpi::ALL.iter().map(move |k| imp.get(*k)))
        .filter(Option::is_none)
        .count()
}
