use anyhow::{Context, Result};
use std::path::Path;

use crate::domain::metrics::{Kpi, KpiImprovements};
use crate::engine::EngineReport;

/// Write the report in pretty JSON format.
pub fn write_report_json(path: &Path, report: &EngineReport) -> Result<()> {
    let content = serde_json::to_string_pretty(report).context("serialize engine report")?;
    std::fs::write(path, content).with_context(|| format!("write {:?}", path))?;
    Ok(())
}

fn fmt_percent(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{v:+.1}%"),
        None => "n/a".to_string(),
    }
}

fn improvement_cells(imp: &KpiImprovements) -> String {
    Kpi::ALL
        .iter()
        .map(|kpi| fmt_percent(imp.get(*kpi)))
        .collect::<Vec<_>>()
        .join(" | ")
}

/// Render a markdown summary of department improvements and the combined
/// accuracy forecast.
pub fn render_summary_md(report: &EngineReport) -> String {
    let mut out = String::new();
    out.push_str("# Model Comparison Summary\n\n");
    out.push_str(&format!(
        "- snapshot: `{}`\n- departments: {}\n- months: {}\n- cells: {}\n\n",
        report.snapshot_digest,
        report.departments.len(),
        report.months.len(),
        report.cells.len()
    ));

    if report.summaries.is_empty() {
        out.push_str("No department data.\n");
        return out;
    }

    out.push_str("## Improvement over baseline\n\n");
    out.push_str("| Department | Cases | Model | Accuracy | Turnaround | Cost | Satisfaction |\n");
    out.push_str("|---|---|---|---|---|---|---|\n");
    for s in &report.summaries {
        out.push_str(&format!(
            "| {} | {} | model_1 | {} |\n",
            s.department,
            s.case_count,
            improvement_cells(&s.model_1_improvement)
        ));
        out.push_str(&format!(
            "| {} | {} | model_2 | {} |\n",
            s.department,
            s.case_count,
            improvement_cells(&s.model_2_improvement)
        ));
    }
    out.push('\n');

    let overall = &report.comparison.overall;
    out.push_str(&format!(
        "Overall score: model_1 {:.1}, model_2 {:.1}\n\n",
        overall.model_1, overall.model_2
    ));

    if !report.combined.points.is_empty() {
        out.push_str("## Combined accuracy forecast\n\n");
        out.push_str("| Period | Phase | Model 1 | Model 2 | Departments |\n");
        out.push_str("|---|---|---|---|---|\n");
        for p in &report.combined.points {
            out.push_str(&format!(
                "| {} | {:?} | {:.1} | {:.1} | {} |\n",
                p.period, p.phase, p.model_1, p.model_2, p.contributors
            ));
        }
    }
    out
}

/// Write the markdown summary.
pub fn write_summary_md(path: &Path, report: &EngineReport) -> Result<()> {
    let md = render_summary_md(report);
    std::fs::write(path, md).with_context(|| format!("write {:?}", path))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::domain::record::RawRecord;
    use crate::engine::Engine;

    fn rec(department: &str, month: &str) -> RawRecord {
        [("Specialty", department), ("Month", month), ("CMI Value", "1.2")]
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn sample_report() -> EngineReport {
        let records = vec![
            rec("Cardiology", "2025-01"),
            rec("Cardiology", "2025-02"),
            rec("Oncology", "2025-01"),
        ];
        Engine::new(EngineConfig::default().without_jitter())
            .expect("engine")
            .run(&records)
            .expect("run")
    }

    #[test]
    fn report_json_has_expected_keys() {
        let report = sample_report();
        let raw = serde_json::to_value(&report).expect("serialize report");
        let obj = raw.as_object().expect("report object");
        for key in [
            "run_id",
            "generated_at",
            "snapshot_digest",
            "departments",
            "months",
            "cells",
            "summaries",
            "comparison",
            "forecasts",
            "combined",
        ] {
            assert!(obj.contains_key(key), "missing key: {}", key);
        }
        assert_eq!(raw["cells"].as_array().map(Vec::len), Some(3));
        assert!(raw["forecasts"]["Cardiology"].is_object());
        assert!(raw["forecasts"].get("Oncology").is_none());
    }

    #[test]
    fn write_report_json_to_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("report.json");
        write_report_json(&path, &sample_report()).expect("write");
        let text = std::fs::read_to_string(&path).expect("read back");
        assert!(text.contains("\"summaries\""));
    }

    #[test]
    fn summary_md_lists_departments() {
        let md = render_summary_md(&sample_report());
        assert!(md.starts_with("# Model Comparison Summary"));
        assert!(md.contains("| Cardiology | 2 | model_1 |"));
        assert!(md.contains("| Oncology | 1 | model_2 |"));
        assert!(md.contains("## Combined accuracy forecast"));
    }

    #[test]
    fn fmt_percent_marks_undefined() {
        assert_eq!(fmt_percent(Some(12.345)), "+12.3%");
        assert_eq!(fmt_percent(None), "n/a");
    }
}
