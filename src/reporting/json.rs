//! # JSON Reporting Module / JSON 报告模块
//!
//! Writes the suite summary, plus its statistics, as a pretty-printed JSON
//! document.
//!
//! 将套件摘要及其统计信息写为格式化的 JSON 文档。

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;

use crate::core::models::Parameters;
use crate::core::plugin::Reporter;
use crate::core::summary::{TestResultSummary, TestSuiteSummary};
use crate::plugins::params::str_param;
use crate::reporting::write_report;

/// Reporter registered as `json`. Parameter `path` names the output file,
/// default `suite_report_<timestamp>.json`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonReporter;

#[derive(Debug, Serialize)]
struct Statistics {
    total: usize,
    passed: usize,
    failed: usize,
    skipped: usize,
    success_rate: Option<f64>,
}

#[derive(Debug, Serialize)]
struct JsonReport<'a> {
    timestamp: DateTime<Utc>,
    statistics: Statistics,
    results: &'a [TestResultSummary],
}

/// Serialises `summary` into the report document.
pub fn to_json(summary: &TestSuiteSummary) -> Result<String> {
    let report = JsonReport {
        timestamp: summary.timestamp,
        statistics: Statistics {
            total: summary.total(),
            passed: summary.passed(),
            failed: summary.failed(),
            skipped: summary.skipped(),
            success_rate: summary.success_rate(),
        },
        results: &summary.results,
    };
    Ok(serde_json::to_string_pretty(&report)?)
}

pub fn default_path(summary: &TestSuiteSummary) -> PathBuf {
    PathBuf::from(format!(
        "suite_report_{}.json",
        summary.timestamp.format("%Y%m%d_%H%M%S")
    ))
}

impl Reporter for JsonReporter {
    fn report(&self, summary: &TestSuiteSummary, parameters: &Parameters) -> Result<()> {
        let path = str_param(parameters, "path")?
            .map(PathBuf::from)
            .unwrap_or_else(|| default_path(summary));
        write_report(&path, &to_json(summary)?)?;
        info!(path = %path.display(), "JSON report written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::TestResult;
    use chrono::TimeZone;
    use serde_json::{Value, json};

    fn summary() -> TestSuiteSummary {
        TestSuiteSummary {
            timestamp: Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap(),
            results: vec![TestResultSummary {
                name: "smoke".into(),
                plugin_identifier: "command".into(),
                result: TestResult::failed("boom"),
            }],
        }
    }

    #[test]
    fn report_contains_statistics_and_results() {
        let value: Value = serde_json::from_str(&to_json(&summary()).unwrap()).unwrap();
        assert_eq!(value["statistics"]["failed"], json!(1));
        assert_eq!(value["statistics"]["success_rate"], json!(0.0));
        assert_eq!(value["results"][0]["name"], json!("smoke"));
        assert_eq!(value["results"][0]["result"]["status"], json!("failed"));
        assert_eq!(value["results"][0]["result"]["message"], json!("boom"));
    }

    #[test]
    fn default_path_uses_the_suite_timestamp() {
        assert_eq!(
            default_path(&summary()),
            PathBuf::from("suite_report_20240501_123000.json")
        );
    }

    #[test]
    fn writes_to_the_configured_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("report.json");
        let Value::Object(params) = json!({"path": path.to_str().unwrap()}) else {
            unreachable!()
        };
        JsonReporter.report(&summary(), &params).unwrap();
        assert!(std::fs::read_to_string(&path).unwrap().contains("\"smoke\""));
    }
}
