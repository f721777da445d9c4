//! Department roll-ups and improvement percentages.
//!
//! Improvements are always computed from averaged absolute metrics
//! (average-then-ratio). Each cell has its own baseline, so averaging
//! per-cell ratios would give a different and wrong answer.

use crate::config::ZeroBaselinePolicy;
use crate::domain::metrics::{DepartmentSummary, Kpi, KpiImprovements, MetricCell, MetricSet, Method};
use crate::grouping::GroupGrid;
use crate::synthesis::CellGrid;

/// Arithmetic mean; an empty slice averages to 0.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Percentage improvement of the mean of `derived` over the mean of
/// `baseline` for one KPI.
///
/// Positive means better: for KPIs where lower is better the sign is
/// flipped. A zero baseline mean is resolved by `policy`.
pub fn improvement_percent(
    derived: &[f64],
    baseline: &[f64],
    kpi: Kpi,
    policy: ZeroBaselinePolicy,
) -> Option<f64> {
    let derived_mean = mean(derived);
    let baseline_mean = mean(baseline);
    if baseline_mean == 0.0 {
        return match policy {
            ZeroBaselinePolicy::Undefined => None,
            ZeroBaselinePolicy::Zero => Some(0.0),
        };
    }

    let delta = if kpi.higher_is_better() {
        derived_mean - baseline_mean
    } else {
        baseline_mean - derived_mean
    };
    Some(delta / baseline_mean * 100.0)
}

fn column(cells: &[&MetricCell], method: Method, kpi: Kpi) -> Vec<f64> {
    cells.iter().map(|c| c.metrics(method).get(kpi)).collect()
}

fn mean_set(cells: &[&MetricCell], method: Method) -> MetricSet {
    MetricSet {
        accuracy: mean(&column(cells, method, Kpi::Accuracy)),
        turnaround: mean(&column(cells, method, Kpi::Turnaround)),
        cost: mean(&column(cells, method, Kpi::Cost)),
        satisfaction: mean(&column(cells, method, Kpi::Satisfaction)),
    }
}

fn improvements(cells: &[&MetricCell], method: Method, policy: ZeroBaselinePolicy) -> KpiImprovements {
    let mut out = KpiImprovements::default();
    for kpi in Kpi::ALL {
        let derived = column(cells, method, kpi);
        let baseline = column(cells, Method::Baseline, kpi);
        out.set(kpi, improvement_percent(&derived, &baseline, kpi, policy));
    }
    out
}

/// Summarize one department's cells. Returns `None` when there are none.
pub fn summarize_department(
    department: &str,
    cells: &[&MetricCell],
    policy: ZeroBaselinePolicy,
) -> Option<DepartmentSummary> {
    if cells.is_empty() {
        return None;
    }
    let revenues: Vec<f64> = cells.iter().map(|c| c.avg_revenue).collect();

    Some(DepartmentSummary {
        department: department.to_string(),
        cell_count: cells.len(),
        case_count: cells.iter().map(|c| c.case_count).sum(),
        avg_revenue: mean(&revenues),
        baseline: mean_set(cells, Method::Baseline),
        model_1: mean_set(cells, Method::Model1),
        model_2: mean_set(cells, Method::Model2),
        model_1_improvement: improvements(cells, Method::Model1, policy),
        model_2_improvement: improvements(cells, Method::Model2, policy),
    })
}

/// One summary per department with at least one cell, in department order.
pub fn aggregate(
    grid: &GroupGrid,
    cells: &CellGrid,
    policy: ZeroBaselinePolicy,
) -> Vec<DepartmentSummary> {
    grid.departments
        .iter()
        .filter_map(|department| {
            let dept_cells: Vec<&MetricCell> = cells.for_department(department).collect();
            summarize_department(department, &dept_cells, policy)
        })
        .collect()
}
