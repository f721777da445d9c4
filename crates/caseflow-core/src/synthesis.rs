//! Metric synthesis: per (department, month) cell metrics for baseline and
//! the two derived models.
//!
//! Baseline metrics are linear in the cell's field averages. Derived models
//! scale or lift the baseline according to their [`ModelProfile`], plus a
//! uniform accuracy jitter drawn from an injected generator.

use std::collections::{BTreeMap, HashMap};

use rand::Rng;
use serde::ser::{Serialize, Serializer};

use crate::config::{EngineConfig, FieldNames, ModelProfile};
use crate::domain::metrics::{MetricCell, MetricSet};
use crate::domain::record::{numeric_field, text_field, RawRecord};
use crate::grouping::GroupGrid;

const CMI_FALLBACK: f64 = 1.0;
const SEVERITY_FALLBACK: f64 = 1.0;
const LOS_FALLBACK: f64 = 0.0;
const REVENUE_FALLBACK: f64 = 0.0;

const CMI_PIVOT: f64 = 0.8;
const BASELINE_ACCURACY: f64 = 0.70;
const ACCURACY_PER_CMI: f64 = 0.15;
const BASELINE_ACCURACY_CAP: f64 = 0.95;
const BASELINE_TURNAROUND_HOURS: f64 = 40.0;
const TURNAROUND_HOURS_PER_LOS_DAY: f64 = 3.0;
const BASELINE_COST: f64 = 80.0;
const COST_PER_SEVERITY: f64 = 20.0;
const BASELINE_SATISFACTION: f64 = 3.2;
const SATISFACTION_PER_CMI: f64 = 0.8;
const BASELINE_SATISFACTION_CAP: f64 = 4.5;

/// Arithmetic means of the raw numeric fields over one cell's records.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldAverages {
    pub case_mix_index: f64,
    pub length_of_stay: f64,
    pub severity: f64,
    pub revenue: f64,
    pub case_count: usize,
}

impl FieldAverages {
    /// Average over `records`, substituting fallbacks for missing values.
    /// Returns `None` for an empty slice.
    pub fn from_records(records: &[&RawRecord], fields: &FieldNames) -> Option<Self> {
        if records.is_empty() {
            return None;
        }
        let n = records.len() as f64;
        let mean = |field: &str, fallback: f64| {
            records
                .iter()
                .map(|r| numeric_field(r, field, fallback))
                .sum::<f64>()
                / n
        };

        Some(Self {
            case_mix_index: mean(&fields.case_mix_index, CMI_FALLBACK),
            length_of_stay: mean(&fields.length_of_stay, LOS_FALLBACK),
            severity: mean(&fields.severity, SEVERITY_FALLBACK),
            revenue: mean(&fields.revenue, REVENUE_FALLBACK),
            case_count: records.len(),
        })
    }
}

/// Baseline metrics from field averages.
pub fn baseline_metrics(avg: &FieldAverages) -> MetricSet {
    let cmi_offset = avg.case_mix_index - CMI_PIVOT;
    MetricSet {
        accuracy: (BASELINE_ACCURACY + cmi_offset * ACCURACY_PER_CMI).min(BASELINE_ACCURACY_CAP),
        turnaround: BASELINE_TURNAROUND_HOURS + avg.length_of_stay * TURNAROUND_HOURS_PER_LOS_DAY,
        cost: BASELINE_COST + avg.severity * COST_PER_SEVERITY,
        satisfaction: (BASELINE_SATISFACTION + cmi_offset * SATISFACTION_PER_CMI)
            .min(BASELINE_SATISFACTION_CAP),
    }
}

/// Derived-model metrics from the (already capped) baseline.
///
/// `jitter` is added to accuracy before the cap is applied.
pub fn derive_metrics(baseline: &MetricSet, profile: &ModelProfile, jitter: f64) -> MetricSet {
    MetricSet {
        accuracy: (baseline.accuracy + profile.accuracy_lift + jitter).min(profile.accuracy_cap),
        turnaround: baseline.turnaround * profile.turnaround_factor,
        cost: baseline.cost * profile.cost_factor,
        satisfaction: (baseline.satisfaction + profile.satisfaction_lift)
            .min(profile.satisfaction_cap),
    }
}

fn draw_jitter<R: Rng + ?Sized>(rng: &mut R, amplitude: f64) -> f64 {
    rng.gen::<f64>() * amplitude
}

/// Sparse map from (department, month) to [`MetricCell`], iterated in
/// department order then month order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CellGrid {
    departments: Vec<String>,
    months: Vec<String>,
    cells: BTreeMap<(usize, usize), MetricCell>,
}

impl CellGrid {
    pub fn get(&self, department: &str, month: &str) -> Option<&MetricCell> {
        let d = self.departments.iter().position(|x| x == department)?;
        let m = self.months.binary_search_by(|x| x.as_str().cmp(month)).ok()?;
        self.cells.get(&(d, m))
    }

    /// Cells of one department in month order.
    pub fn for_department(&self, department: &str) -> impl Iterator<Item = &MetricCell> + '_ {
        let d = self.departments.iter().position(|x| x == department);
        d.into_iter()
            .flat_map(move |d| self.cells.range((d, 0)..(d + 1, 0)).map(|(_, cell)| cell))
    }

    pub fn iter(&self) -> impl Iterator<Item = &MetricCell> + '_ {
        self.cells.values()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl Serialize for CellGrid {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.cells.values())
    }
}

/// Build every populated cell of `grid`.
///
/// Jitter is drawn from `rng` once for model-1 then once for model-2 per
/// cell, visiting cells in department then month order.
pub fn synthesize<R: Rng + ?Sized>(
    records: &[RawRecord],
    grid: &GroupGrid,
    config: &EngineConfig,
    rng: &mut R,
) -> CellGrid {
    let fields = &config.fields;
    let mut buckets: HashMap<(usize, usize), Vec<&RawRecord>> = HashMap::new();
    for record in records {
        let department = text_field(record, &fields.department).and_then(|d| grid.department_index(d));
        let month = text_field(record, &fields.month).and_then(|m| grid.month_index(m));
        if let (Some(d), Some(m)) = (department, month) {
            buckets.entry((d, m)).or_default().push(record);
        }
    }

    let mut cells = BTreeMap::new();
    for (d, department) in grid.departments.iter().enumerate() {
        for (m, month) in grid.months.iter().enumerate() {
            let Some(avg) = buckets
                .get(&(d, m))
                .and_then(|subset| FieldAverages::from_records(subset, fields))
            else {
                continue;
            };

            let baseline = baseline_metrics(&avg);
            let jitter_1 = draw_jitter(rng, config.model_1.jitter);
            let jitter_2 = draw_jitter(rng, config.model_2.jitter);
            cells.insert(
                (d, m),
                MetricCell {
                    department: department.clone(),
                    month: month.clone(),
                    month_index: m,
                    case_count: avg.case_count,
                    avg_revenue: avg.revenue,
                    baseline,
                    model_1: derive_metrics(&baseline, &config.model_1, jitter_1),
                    model_2: derive_metrics(&baseline, &config.model_2, jitter_2),
                },
            );
        }
    }

    tracing::debug!(cells = cells.len(), "metric cells synthesized");
    CellGrid {
        departments: grid.departments.clone(),
        months: grid.months.clone(),
        cells,
    }
}
