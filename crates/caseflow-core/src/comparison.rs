//! Cross-department model comparison built on department summaries.

use serde::{Deserialize, Serialize};

use crate::domain::metrics::{DepartmentSummary, Kpi, Method};

/// Improvement of both derived models for one KPI.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComparisonRow {
    pub kpi: Kpi,
    pub model_1: Option<f64>,
    pub model_2: Option<f64>,
    /// Departments with a defined model-1 value.
    pub model_1_departments: usize,
    /// Departments with a defined model-2 value.
    pub model_2_departments: usize,
}

impl ComparisonRow {
    pub fn value(&self, method: Method) -> Option<f64> {
        match method {
            Method::Baseline => None,
            Method::Model1 => self.model_1,
            Method::Model2 => self.model_2,
        }
    }
}

/// Sum of a model's defined improvements across KPIs.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct OverallScores {
    pub model_1: f64,
    pub model_2: f64,
}

/// A department's combined improvement per model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepartmentTotal {
    pub department: String,
    pub model_1_total: f64,
    pub model_2_total: f64,
    pub case_count: usize,
}

/// Portion of a model's total absolute improvement owed to one KPI.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KpiShare {
    pub kpi: Kpi,
    pub value: f64,
    pub percent: f64,
}

/// Everything a dashboard's comparison view needs.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ModelComparison {
    pub rows: Vec<ComparisonRow>,
    pub overall: OverallScores,
    pub department_totals: Vec<DepartmentTotal>,
}

fn defined_mean(values: impl Iterator<Item = Option<f64>>) -> (Option<f64>, usize) {
    let (sum, count) = values
        .flatten()
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        (None, 0)
    } else {
        (Some(sum / count as f64), count)
    }
}

/// One row per KPI averaging each model's improvement over all departments.
/// Undefined improvements are skipped, not counted as zero.
pub fn compare_all(summaries: &[DepartmentSummary]) -> Vec<ComparisonRow> {
    Kpi::ALL
        .iter()
        .map(|&kpi| {
            let (model_1, model_1_departments) =
                defined_mean(summaries.iter().map(|s| s.model_1_improvement.get(kpi)));
            let (model_2, model_2_departments) =
                defined_mean(summaries.iter().map(|s| s.model_2_improvement.get(kpi)));
            ComparisonRow {
                kpi,
                model_1,
                model_2,
                model_1_departments,
                model_2_departments,
            }
        })
        .collect()
}

/// The same rows for a single department.
pub fn compare_department(summary: &DepartmentSummary) -> Vec<ComparisonRow> {
    compare_all(std::slice::from_ref(summary))
}

pub fn overall_scores(rows: &[ComparisonRow]) -> OverallScores {
    OverallScores {
        model_1: rows.iter().filter_map(|r| r.model_1).sum(),
        model_2: rows.iter().filter_map(|r| r.model_2).sum(),
    }
}

pub fn department_totals(summaries: &[DepartmentSummary]) -> Vec<DepartmentTotal> {
    summaries
        .iter()
        .map(|s| DepartmentTotal {
            department: s.department.clone(),
            model_1_total: s.model_1_improvement.total(),
            model_2_total: s.model_2_improvement.total(),
            case_count: s.case_count,
        })
        .collect()
}

/// Share of each KPI in `method`'s total absolute improvement.
///
/// Undefined values count as zero. When the total is zero every share is 0%.
pub fn kpi_shares(rows: &[ComparisonRow], method: Method) -> Vec<KpiShare> {
    let total: f64 = rows
        .iter()
        .map(|r| r.value(method).unwrap_or(0.0).abs())
        .sum();
    rows.iter()
        .map(|r| {
            let value = r.value(method).unwrap_or(0.0).abs();
            let percent = if total == 0.0 { 0.0 } else { value / total * 100.0 };
            KpiShare {
                kpi: r.kpi,
                value,
                percent,
            }
        })
        .collect()
}

/// Full comparison over all departments.
pub fn compare(summaries: &[DepartmentSummary]) -> ModelComparison {
    let rows = compare_all(summaries);
    ModelComparison {
        overall: overall_scores(&rows),
        department_totals: department_totals(summaries),
        rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::metrics::{KpiImprovements, MetricSet};

    fn summary(name: &str, m1: [Option<f64>; 4], m2: [Option<f64>; 4]) -> DepartmentSummary {
        let imp = |v: [Option<f64>; 4]| KpiImprovements {
            accuracy: v[0],
            turnaround: v[1],
            cost: v[2],
            satisfaction: v[3],
        };
        DepartmentSummary {
            department: name.to_string(),
            cell_count: 1,
            case_count: 4,
            avg_revenue: 0.0,
            baseline: MetricSet::default(),
            model_1: MetricSet::default(),
            model_2: MetricSet::default(),
            model_1_improvement: imp(m1),
            model_2_improvement: imp(m2),
        }
    }

    #[test]
    fn compare_all_averages_defined_values() {
        let summaries = vec![
            summary("A", [Some(10.0), Some(20.0), Some(18.0), Some(15.0)], [Some(20.0); 4]),
            summary("B", [Some(20.0), None, Some(18.0), Some(5.0)], [Some(30.0); 4]),
        ];
        let rows = compare_all(&summaries);
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0].kpi, Kpi::Accuracy);
        assert_eq!(rows[0].model_1, Some(15.0));
        assert_eq!(rows[0].model_2, Some(25.0));
        assert_eq!(rows[1].model_1, Some(20.0));
        assert_eq!(rows[1].model_1_departments, 1);
        assert_eq!(rows[1].model_2_departments, 2);

        let overall = overall_scores(&rows);
        assert_eq!(overall.model_1, 15.0 + 20.0 + 18.0 + 10.0);
        assert_eq!(overall.model_2, 100.0);
    }

    #[test]
    fn compare_all_with_no_departments() {
        let rows = compare_all(&[]);
        assert_eq!(rows.len(), 4);
        assert!(rows.iter().all(|r| r.model_1.is_none() && r.model_2.is_none()));
        assert_eq!(overall_scores(&rows), OverallScores::default());
    }

    #[test]
    fn department_totals_sum_kpis() {
        let s = summary("A", [Some(1.0), Some(2.0), None, Some(3.0)], [Some(4.0); 4]);
        let totals = department_totals(&[s]);
        assert_eq!(totals[0].model_1_total, 6.0);
        assert_eq!(totals[0].model_2_total, 16.0);
        assert_eq!(totals[0].case_count, 4);
    }

    #[test]
    fn kpi_shares_use_absolute_values() {
        let s = summary("A", [Some(0.0); 4], [Some(10.0), Some(-30.0), Some(40.0), Some(20.0)]);
        let shares = kpi_shares(&compare_department(&s), Method::Model2);
        for (share, expected) in shares.iter().zip([10.0, 30.0, 40.0, 20.0]) {
            assert!((share.percent - expected).abs() < 1e-9);
        }
        assert_eq!(shares[1].value, 30.0);

        let zero = kpi_shares(&compare_department(&s), Method::Model1);
        assert!(zero.iter().all(|s| s.percent == 0.0));
    }
}
