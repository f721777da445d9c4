//! Metric cells and department summaries.

use serde::{Deserialize, Serialize};

/// The four KPIs scored for every method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Kpi {
    Accuracy,
    Turnaround,
    Cost,
    Satisfaction,
}

impl Kpi {
    pub const ALL: [Kpi; 4] = [Kpi::Accuracy, Kpi::Turnaround, Kpi::Cost, Kpi::Satisfaction];

    /// Whether a larger value of this KPI is an improvement.
    pub fn higher_is_better(self) -> bool {
        matches!(self, Kpi::Accuracy | Kpi::Satisfaction)
    }

    pub fn label(self) -> &'static str {
        match self {
            Kpi::Accuracy => "Accuracy",
            Kpi::Turnaround => "Turnaround",
            Kpi::Cost => "Cost",
            Kpi::Satisfaction => "Satisfaction",
        }
    }
}

/// Scoring method. `Baseline` is the reference the two derived models are
/// compared against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Method {
    Baseline,
    #[serde(rename = "model_1")]
    Model1,
    #[serde(rename = "model_2")]
    Model2,
}

impl Method {
    pub const DERIVED: [Method; 2] = [Method::Model1, Method::Model2];
}

/// One value per KPI.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MetricSet {
    /// Fraction in 0.0–1.0.
    pub accuracy: f64,
    /// Hours.
    pub turnaround: f64,
    /// Cost units.
    pub cost: f64,
    /// Score on a 1–5 scale.
    pub satisfaction: f64,
}

impl MetricSet {
    pub fn get(&self, kpi: Kpi) -> f64 {
        match kpi {
            Kpi::Accuracy => self.accuracy,
            Kpi::Turnaround => self.turnaround,
            Kpi::Cost => self.cost,
            Kpi::Satisfaction => self.satisfaction,
        }
    }
}

/// Metrics derived for one populated (department, month) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricCell {
    pub department: String,
    pub month: String,
    /// Position of `month` in the sorted month list.
    pub month_index: usize,
    pub case_count: usize,
    pub avg_revenue: f64,
    pub baseline: MetricSet,
    pub model_1: MetricSet,
    pub model_2: MetricSet,
}

impl MetricCell {
    pub fn metrics(&self, method: Method) -> &MetricSet {
        match method {
            Method::Baseline => &self.baseline,
            Method::Model1 => &self.model_1,
            Method::Model2 => &self.model_2,
        }
    }
}

/// Percentage improvement of one derived model over baseline, per KPI.
///
/// `None` means the baseline mean was zero and the ratio is undefined.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct KpiImprovements {
    pub accuracy: Option<f64>,
    pub turnaround: Option<f64>,
    pub cost: Option<f64>,
    pub satisfaction: Option<f64>,
}

impl KpiImprovements {
    pub fn get(&self, kpi: Kpi) -> Option<f64> {
        match kpi {
            Kpi::Accuracy => self.accuracy,
            Kpi::Turnaround => self.turnaround,
            Kpi::Cost => self.cost,
            Kpi::Satisfaction => self.satisfaction,
        }
    }

    pub fn set(&mut self, kpi: Kpi, value: Option<f64>) {
        match kpi {
            Kpi::Accuracy => self.accuracy = value,
            Kpi::Turnaround => self.turnaround = value,
            Kpi::Cost => self.cost = value,
            Kpi::Satisfaction => self.satisfaction = value,
        }
    }

    /// Sum of the defined improvements.
    pub fn total(&self) -> f64 {
        Kpi::ALL.iter().filter_map(|kpi| self.get(*kpi)).sum()
    }
}

/// Roll-up of every cell belonging to one department.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepartmentSummary {
    pub department: String,
    /// Number of populated months.
    pub cell_count: usize,
    /// Sum of per-cell case counts.
    pub case_count: usize,
    /// Unweighted mean of per-cell average revenue.
    pub avg_revenue: f64,
    pub baseline: MetricSet,
    pub model_1: MetricSet,
    pub model_2: MetricSet,
    pub model_1_improvement: KpiImprovements,
    pub model_2_improvement: KpiImprovements,
}

impl DepartmentSummary {
    pub fn metrics(&self, method: Method) -> &MetricSet {
        match method {
            Method::Baseline => &self.baseline,
            Method::Model1 => &self.model_1,
            Method::Model2 => &self.model_2,
        }
    }

    /// Improvements of a derived model. Baseline has none against itself.
    pub fn improvement(&self, method: Method) -> Option<&KpiImprovements> {
        match method {
            Method::Baseline => None,
            Method::Model1 => Some(&self.model_1_improvement),
            Method::Model2 => Some(&self.model_2_improvement),
        }
    }
}
