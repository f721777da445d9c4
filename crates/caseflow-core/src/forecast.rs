//! Accuracy trend forecasting.
//!
//! Each department's model-1 and model-2 accuracy (scaled to 0–100) is fit
//! with a least-squares line over its own history and extrapolated a fixed
//! number of periods. Every emitted trend or forecast value is clamped to
//! [0, 100]; the fitted coefficients themselves are not.

use std::collections::BTreeMap;

use chrono::{Months, NaiveDate};

use crate::domain::forecast::{
    clamp_percent, CombinedPoint, CombinedSeries, ForecastPoint, ForecastSeries,
    HistoricalPoint, LinearTrend, SeriesPhase,
};
use crate::domain::metrics::MetricCell;
use crate::grouping::GroupGrid;
use crate::synthesis::CellGrid;

/// Fewest populated months a department needs to be forecast.
pub const MIN_HISTORY: usize = 2;

/// Label for the period `offset` months after `last_month`.
///
/// `YYYY-MM` months advance on the calendar; anything else is labelled
/// `"<last_month>+<offset>"`.
pub fn period_label(last_month: &str, offset: usize) -> String {
    let next = NaiveDate::parse_from_str(&format!("{last_month}-01"), "%Y-%m-%d")
        .ok()
        .zip(u32::try_from(offset).ok())
        .and_then(|(date, offset)| date.checked_add_months(Months::new(offset)));
    match next {
        Some(date) => date.format("%Y-%m").to_string(),
        None => format!("{last_month}+{offset}"),
    }
}

/// Fit and extrapolate one department's history.
///
/// `cells` must be in month order. Returns `None` with fewer than
/// [`MIN_HISTORY`] cells.
pub fn forecast_department(
    department: &str,
    cells: &[&MetricCell],
    horizon: usize,
) -> Option<ForecastSeries> {
    if cells.len() < MIN_HISTORY {
        return None;
    }

    let model_1: Vec<f64> = cells.iter().map(|c| c.model_1.accuracy * 100.0).collect();
    let model_2: Vec<f64> = cells.iter().map(|c| c.model_2.accuracy * 100.0).collect();
    let model_1_trend = LinearTrend::fit(&model_1);
    let model_2_trend = LinearTrend::fit(&model_2);

    let history = cells
        .iter()
        .enumerate()
        .map(|(i, cell)| HistoricalPoint {
            index: i,
            month: cell.month.clone(),
            month_index: cell.month_index,
            model_1_actual: model_1[i],
            model_2_actual: model_2[i],
            model_1_trend: clamp_percent(model_1_trend.value_at(i)),
            model_2_trend: clamp_percent(model_2_trend.value_at(i)),
        })
        .collect();

    let n = cells.len();
    let last_month = &cells[n - 1].month;
    let forecast = (0..horizon)
        .map(|step| ForecastPoint {
            index: n + step,
            period: period_label(last_month, step + 1),
            model_1: clamp_percent(model_1_trend.value_at(n + step)),
            model_2: clamp_percent(model_2_trend.value_at(n + step)),
        })
        .collect();

    Some(ForecastSeries {
        department: department.to_string(),
        model_1_trend,
        model_2_trend,
        history,
        forecast,
    })
}

/// Forecast every department with enough history, keyed by department.
pub fn forecast_all(
    grid: &GroupGrid,
    cells: &CellGrid,
    horizon: usize,
) -> BTreeMap<String, ForecastSeries> {
    let mut out = BTreeMap::new();
    for department in &grid.departments {
        let dept_cells: Vec<&MetricCell> = cells.for_department(department).collect();
        match forecast_department(department, &dept_cells, horizon) {
            Some(series) => {
                tracing::debug!(
                    department = %department,
                    model_1_slope = series.model_1_trend.slope,
                    model_2_slope = series.model_2_trend.slope,
                    "trend fitted"
                );
                out.insert(department.clone(), series);
            }
            None => tracing::debug!(
                department = %department,
                cells = dept_cells.len(),
                "insufficient history for forecast"
            ),
        }
    }
    out
}

/// Average departments index by index.
///
/// At each index only departments whose series reaches that far
/// contribute; shorter series are not padded. Historical indices use the
/// actual value, later ones the forecast. The label comes from the first
/// contributor.
pub fn combine(series: &[&ForecastSeries]) -> CombinedSeries {
    let longest = series.iter().map(|s| s.len()).max().unwrap_or(0);
    let mut points = Vec::with_capacity(longest);

    for index in 0..longest {
        let mut period = None;
        let (mut sum_1, mut sum_2) = (0.0, 0.0);
        let (mut historical, mut forecast) = (0usize, 0usize);

        for value in series.iter().filter_map(|s| s.value_at(index)) {
            period.get_or_insert_with(|| value.label.to_string());
            sum_1 += value.model_1;
            sum_2 += value.model_2;
            match value.phase {
                SeriesPhase::Historical => historical += 1,
                _ => forecast += 1,
            }
        }

        let contributors = historical + forecast;
        let Some(period) = period else { continue };
        let phase = match (historical, forecast) {
            (_, 0) => SeriesPhase::Historical,
            (0, _) => SeriesPhase::Forecast,
            _ => SeriesPhase::Mixed,
        };
        points.push(CombinedPoint {
            index,
            period,
            phase,
            model_1: sum_1 / contributors as f64,
            model_2: sum_2 / contributors as f64,
            contributors,
            historical_contributors: historical,
            forecast_contributors: forecast,
        });
    }

    CombinedSeries { points }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::metrics::MetricSet;

    fn cell(month: &str, month_index: usize, acc_1: f64, acc_2: f64) -> MetricCell {
        MetricCell {
            department: "Cardiology".to_string(),
            month: month.to_string(),
            month_index,
            case_count: 1,
            avg_revenue: 0.0,
            baseline: MetricSet::default(),
            model_1: MetricSet {
                accuracy: acc_1,
                ..MetricSet::default()
            },
            model_2: MetricSet {
                accuracy: acc_2,
                ..MetricSet::default()
            },
        }
    }

    #[test]
    fn period_labels_follow_calendar() {
        assert_eq!(period_label("2025-06", 1), "2025-07");
        assert_eq!(period_label("2025-11", 3), "2026-02");
        assert_eq!(period_label("Q2", 2), "Q2+2");
    }

    #[test]
    fn single_cell_is_not_forecast() {
        let c = cell("2025-01", 0, 0.8, 0.9);
        assert!(forecast_department("Cardiology", &[&c], 6).is_none());
    }

    #[test]
    fn series_index_is_dense_over_sparse_months() {
        let a = cell("2025-01", 0, 0.80, 0.90);
        let b = cell("2025-04", 3, 0.82, 0.91);
        let series = forecast_department("Cardiology", &[&a, &b], 2).expect("series");
        assert_eq!(series.history[1].index, 1);
        assert_eq!(series.history[1].month_index, 3);
        assert_eq!(series.forecast[0].index, 2);
        assert_eq!(series.forecast[0].period, "2025-05");
        assert!((series.model_1_trend.slope - 2.0).abs() < 1e-9);
        assert!((series.model_1_trend.intercept - 80.0).abs() < 1e-9);
    }

    #[test]
    fn combine_stops_short_series_without_padding() {
        let short = forecast_department(
            "A",
            &[&cell("2025-01", 0, 0.80, 0.90), &cell("2025-02", 1, 0.80, 0.90)],
            1,
        )
        .expect("short");
        let long = forecast_department(
            "B",
            &[
                &cell("2025-01", 0, 0.60, 0.70),
                &cell("2025-02", 1, 0.60, 0.70),
                &cell("2025-03", 2, 0.60, 0.70),
            ],
            1,
        )
        .expect("long");

        let combined = combine(&[&short, &long]);
        assert_eq!(combined.points.len(), 4);

        let p0 = &combined.points[0];
        assert_eq!(p0.contributors, 2);
        assert_eq!(p0.phase, SeriesPhase::Historical);
        assert!((p0.model_1 - 70.0).abs() < 1e-9);

        // A is forecasting at index 2 while B still has an actual.
        let p2 = &combined.points[2];
        assert_eq!(p2.phase, SeriesPhase::Mixed);
        assert_eq!(p2.historical_contributors, 1);
        assert_eq!(p2.forecast_contributors, 1);
        assert_eq!(p2.period, "2025-03");

        // Only B reaches index 3.
        let p3 = &combined.points[3];
        assert_eq!(p3.contributors, 1);
        assert_eq!(p3.phase, SeriesPhase::Forecast);
        assert!((p3.model_1 - 60.0).abs() < 1e-9);
        assert!((p3.model_2 - 70.0).abs() < 1e-9);
    }

    #[test]
    fn combine_of_nothing_is_empty() {
        assert!(combine(&[]).points.is_empty());
    }
}
