use caseflow_core::{
    combine, forecast_department, LinearTrend, MetricCell, MetricSet, SeriesPhase,
};

fn cell(month: &str, month_index: usize, acc_1: f64, acc_2: f64) -> MetricCell {
    let set = |accuracy| MetricSet {
        accuracy,
        turnaround: 30.0,
        cost: 100.0,
        satisfaction: 4.0,
    };
    MetricCell {
        department: "Cardiology".to_string(),
        month: month.to_string(),
        month_index,
        case_count: 3,
        avg_revenue: 1200.0,
        baseline: set(0.7),
        model_1: set(acc_1),
        model_2: set(acc_2),
    }
}

fn months(n: usize) -> Vec<String> {
    (1..=n).map(|m| format!("2025-{m:02}")).collect()
}

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-6
}

#[test]
fn linear_history_extrapolates_exactly() {
    let labels = months(6);
    let cells: Vec<MetricCell> = (0..6)
        .map(|i| {
            let acc = (70.0 + 2.0 * i as f64) / 100.0;
            cell(&labels[i], i, acc, acc)
        })
        .collect();
    let refs: Vec<&MetricCell> = cells.iter().collect();

    let series = forecast_department("Cardiology", &refs, 6).expect("forecast");
    assert!(approx(series.model_1_trend.slope, 2.0));
    assert!(approx(series.model_1_trend.intercept, 70.0));

    let values: Vec<f64> = series.forecast.iter().map(|p| p.model_1).collect();
    assert_eq!(values.len(), 6);
    for (got, want) in values.iter().zip([82.0, 84.0, 86.0, 88.0, 90.0, 92.0]) {
        assert!(approx(*got, want), "got {got}, want {want}");
    }
    assert_eq!(series.forecast[0].index, 6);
    assert_eq!(series.forecast[0].period, "2025-07");
    assert_eq!(series.forecast[5].index, 11);
    assert_eq!(series.forecast[5].period, "2025-12");
    assert!(series
        .history
        .iter()
        .all(|p| approx(p.model_1_actual, p.model_1_trend)));
}

#[test]
fn overshooting_trend_is_pinned_at_100() {
    // 45, 57, 69: slope 12, so forecasts run 81, 93, 105, 117, ...
    let labels = months(3);
    let cells: Vec<MetricCell> = [0.45, 0.57, 0.69]
        .iter()
        .enumerate()
        .map(|(i, acc)| cell(&labels[i], i, *acc, 0.9))
        .collect();
    let refs: Vec<&MetricCell> = cells.iter().collect();

    let series = forecast_department("Cardiology", &refs, 6).expect("forecast");
    assert!(approx(series.forecast[0].model_1, 81.0));
    assert!(approx(series.forecast[1].model_1, 93.0));
    assert!(series.forecast[2..].iter().all(|p| p.model_1 == 100.0));
    // The fitted line itself is not clamped.
    assert!(series.model_1_trend.value_at(8) > 100.0);
}

#[test]
fn falling_trend_is_floored_at_zero() {
    let labels = months(2);
    let cells = vec![cell(&labels[0], 0, 0.3, 0.5), cell(&labels[1], 1, 0.1, 0.5)];
    let refs: Vec<&MetricCell> = cells.iter().collect();

    let series = forecast_department("Cardiology", &refs, 3).expect("forecast");
    assert!(series.forecast.iter().all(|p| p.model_1 == 0.0));
    assert!(series.forecast.iter().all(|p| approx(p.model_2, 50.0)));
}

#[test]
fn single_month_is_not_forecast() {
    let only = cell("2025-01", 0, 0.8, 0.9);
    assert!(forecast_department("Cardiology", &[&only], 6).is_none());
    assert!(forecast_department("Cardiology", &[], 6).is_none());
}

#[test]
fn series_index_is_dense_over_sparse_months() {
    // Populated in global months 0, 3 and 5 only.
    let cells = vec![
        cell("2025-01", 0, 0.80, 0.80),
        cell("2025-04", 3, 0.82, 0.84),
        cell("2025-06", 5, 0.84, 0.88),
    ];
    let refs: Vec<&MetricCell> = cells.iter().collect();
    let series = forecast_department("Cardiology", &refs, 2).expect("forecast");

    let indices: Vec<usize> = series.history.iter().map(|p| p.index).collect();
    assert_eq!(indices, vec![0, 1, 2]);
    let global: Vec<usize> = series.history.iter().map(|p| p.month_index).collect();
    assert_eq!(global, vec![0, 3, 5]);
    assert_eq!(series.forecast[0].period, "2025-07");
}

#[test]
fn non_calendar_months_get_offset_labels() {
    let cells = vec![cell("Q1", 0, 0.8, 0.8), cell("Q2", 1, 0.82, 0.84)];
    let refs: Vec<&MetricCell> = cells.iter().collect();
    let series = forecast_department("Cardiology", &refs, 2).expect("forecast");
    assert_eq!(series.forecast[0].period, "Q2+1");
    assert_eq!(series.forecast[1].period, "Q2+2");
}

#[test]
fn combined_series_does_not_pad_short_departments() {
    let long: Vec<MetricCell> = (0..4)
        .map(|i| cell(&format!("2025-0{}", i + 1), i, 0.80, 0.90))
        .collect();
    let short = vec![cell("2025-01", 0, 0.60, 0.70), cell("2025-02", 1, 0.60, 0.70)];

    let long_refs: Vec<&MetricCell> = long.iter().collect();
    let short_refs: Vec<&MetricCell> = short.iter().collect();
    let a = forecast_department("Cardiology", &long_refs, 2).expect("long");
    let b = forecast_department("Oncology", &short_refs, 2).expect("short");

    let combined = combine(&[&a, &b]);
    assert_eq!(combined.points.len(), 6);

    let first = &combined.points[0];
    assert_eq!(first.contributors, 2);
    assert!(approx(first.model_1, 70.0));

    // Index 2: long is historical, short is forecasting.
    let mixed = &combined.points[2];
    assert_eq!(mixed.phase, SeriesPhase::Mixed);
    assert_eq!(mixed.historical_contributors, 1);
    assert_eq!(mixed.forecast_contributors, 1);

    // Index 4 onward only the long department reaches.
    let tail = &combined.points[4];
    assert_eq!(tail.contributors, 1);
    assert_eq!(tail.phase, SeriesPhase::Forecast);
    assert!(approx(tail.model_1, 80.0));
    assert_eq!(tail.period, "2025-05");
}

#[test]
fn trend_fit_edge_cases() {
    assert_eq!(LinearTrend::fit(&[]), LinearTrend::default());
    let flat = LinearTrend::fit(&[42.0]);
    assert_eq!(flat.slope, 0.0);
    assert!(approx(flat.intercept, 42.0));
}
