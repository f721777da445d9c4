//! Accuracy trend fits and forecast series.

use serde::{Deserialize, Serialize};

/// Lower and upper bound for any accuracy percentage the forecaster emits.
pub const PERCENT_RANGE: (f64, f64) = (0.0, 100.0);

/// Clamp a value to [`PERCENT_RANGE`].
pub fn clamp_percent(value: f64) -> f64 {
    value.clamp(PERCENT_RANGE.0, PERCENT_RANGE.1)
}

/// Fitted line `y = intercept + slope * t` over time indices `t = 0, 1, ...`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LinearTrend {
    pub slope: f64,
    pub intercept: f64,
}

impl LinearTrend {
    /// Ordinary least squares fit of `values` against their index.
    ///
    /// An empty series yields slope 0 and intercept 0. A single point has a
    /// zero denominator and yields a flat line through that point.
    pub fn fit(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self::default();
        }

        let n = values.len() as f64;
        let sum_t: f64 = (0..values.len()).map(|i| i as f64).sum();
        let sum_y: f64 = values.iter().sum();
        let sum_t2: f64 = (0..values.len()).map(|i| (i * i) as f64).sum();
        let sum_ty: f64 = values.iter().enumerate().map(|(i, &y)| i as f64 * y).sum();

        let denominator = n * sum_t2 - sum_t * sum_t;
        if denominator == 0.0 {
            return Self {
                slope: 0.0,
                intercept: sum_y / n,
            };
        }

        let slope = (n * sum_ty - sum_t * sum_y) / denominator;
        let intercept = (sum_y - slope * sum_t) / n;
        Self { slope, intercept }
    }

    /// Unclamped line value at index `t`.
    pub fn value_at(&self, t: usize) -> f64 {
        self.intercept + self.slope * t as f64
    }
}

/// One observed month of a department's accuracy series (0–100 scale).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalPoint {
    /// Position within the department's own history.
    pub index: usize,
    pub month: String,
    /// Position of `month` in the global sorted month list.
    pub month_index: usize,
    pub model_1_actual: f64,
    pub model_2_actual: f64,
    pub model_1_trend: f64,
    pub model_2_trend: f64,
}

/// One extrapolated period beyond the observed history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub index: usize,
    pub period: String,
    pub model_1: f64,
    pub model_2: f64,
}

/// Trend fit, history and forecast for one department.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastSeries {
    pub department: String,
    pub model_1_trend: LinearTrend,
    pub model_2_trend: LinearTrend,
    pub history: Vec<HistoricalPoint>,
    pub forecast: Vec<ForecastPoint>,
}

impl ForecastSeries {
    /// History length plus forecast length.
    pub fn len(&self) -> usize {
        self.history.len() + self.forecast.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Label and (model-1, model-2) value at a series index: the actual
    /// for observed indices, the forecast beyond them.
    pub fn value_at(&self, index: usize) -> Option<SeriesValue<'_>> {
        if let Some(point) = self.history.get(index) {
            return Some(SeriesValue {
                label: &point.month,
                phase: SeriesPhase::Historical,
                model_1: point.model_1_actual,
                model_2: point.model_2_actual,
            });
        }
        self.forecast
            .get(index - self.history.len())
            .map(|point| SeriesValue {
                label: &point.period,
                phase: SeriesPhase::Forecast,
                model_1: point.model_1,
                model_2: point.model_2,
            })
    }
}

/// Borrowed view of one index of a [`ForecastSeries`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeriesValue<'a> {
    pub label: &'a str,
    pub phase: SeriesPhase,
    pub model_1: f64,
    pub model_2: f64,
}

/// Whether a point is observed, extrapolated, or (for combined series) both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeriesPhase {
    Historical,
    Forecast,
    Mixed,
}

/// One index of the cross-department average.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombinedPoint {
    pub index: usize,
    pub period: String,
    pub phase: SeriesPhase,
    pub model_1: f64,
    pub model_2: f64,
    /// Departments with a value at this index.
    pub contributors: usize,
    pub historical_contributors: usize,
    pub forecast_contributors: usize,
}

/// Index-by-index average of every department's series.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CombinedSeries {
    pub points: Vec<CombinedPoint>,
}
