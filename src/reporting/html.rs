//! # HTML Reporting Module / HTML 报告模块
//!
//! This module renders a standalone HTML report with the suite statistics and
//! a results table. Rows of failed tests can be expanded to show their message
//! and check details.
//!
//! 此模块生成独立的 HTML 报告，包含套件统计和结果表格。
//! 失败测试的行可以展开以显示其消息和检查详情。

use anyhow::Result;
use maud::{DOCTYPE, Markup, PreEscaped, html};
use std::path::PathBuf;
use tracing::info;

use crate::core::models::{Parameters, ResultStatus, TestResult};
use crate::core::plugin::Reporter;
use crate::core::summary::TestSuiteSummary;
use crate::infra::t;
use crate::plugins::params::str_param;
use crate::reporting::{status_label, write_report};

/// Embedded CSS styles for HTML reports / HTML 报告的嵌入式 CSS 样式
const HTML_STYLE: &str = r#"
body { font-family: -apple-system, "Segoe UI", Roboto, sans-serif; margin: 2rem; color: #222; }
h1 { margin-bottom: 0.25rem; }
.timestamp { color: #777; margin-bottom: 1.5rem; }
.summary-container { display: flex; gap: 1rem; margin-bottom: 2rem; }
.summary-item { padding: 0.75rem 1.25rem; border-radius: 6px; background: #f4f4f4; text-align: center; }
.summary-item .count { display: block; font-size: 1.6rem; font-weight: bold; }
.summary-item .label { color: #555; }
.passed-text { color: #2e7d32; }
.failed-text { color: #c62828; }
.skipped-text { color: #ef6c00; }
table { border-collapse: collapse; width: 100%; }
th, td { text-align: left; padding: 0.5rem 0.75rem; border-bottom: 1px solid #e0e0e0; vertical-align: top; }
th { background: #fafafa; }
.status-cell { font-weight: bold; }
.status-cell.passed { color: #2e7d32; }
.status-cell.failed { color: #c62828; }
.status-cell.skipped { color: #ef6c00; }
details pre { background: #f7f7f7; padding: 0.5rem; overflow-x: auto; }
.check-ok { color: #2e7d32; }
.check-failed { color: #c62828; }
"#;

/// Reporter registered as `html`. Parameter `path` names the output file,
/// default `suite_report.html`.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlReporter;

impl Reporter for HtmlReporter {
    fn report(&self, summary: &TestSuiteSummary, parameters: &Parameters) -> Result<()> {
        let path = str_param(parameters, "path")?
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("suite_report.html"));
        write_report(&path, &render(summary).into_string())?;
        info!(path = %path.display(), "HTML report written");
        Ok(())
    }
}

fn status_class(status: ResultStatus) -> &'static str {
    status.as_str()
}

/// Renders the full report page.
/// 生成完整的报告页面。
pub fn render(summary: &TestSuiteSummary) -> Markup {
    let rate = summary
        .success_rate()
        .map(|rate| format!("{rate:.1}%"))
        .unwrap_or_else(|| "N/A".to_string());

    html! {
        (DOCTYPE)
        html {
            head {
                meta charset="utf-8";
                title { (t!("html_report.title")) }
                style { (PreEscaped(HTML_STYLE)) }
            }
            body {
                h1 { (t!("html_report.main_header")) }
                div class="timestamp" { (summary.timestamp.format("%Y-%m-%d %H:%M:%S UTC").to_string()) }
                div class="summary-container" {
                    (summary_item(summary.total(), &t!("html_report.summary.total"), ""))
                    (summary_item(summary.passed(), &status_label(ResultStatus::Passed), "passed-text"))
                    (summary_item(summary.failed(), &status_label(ResultStatus::Failed), "failed-text"))
                    (summary_item(summary.skipped(), &status_label(ResultStatus::Skipped), "skipped-text"))
                    div class="summary-item" {
                        span class="count" { (rate) }
                        span class="label" { (t!("html_report.summary.success_rate")) }
                    }
                }
                table {
                    thead {
                        tr {
                            th { (t!("html_report.table.header.name")) }
                            th { (t!("html_report.table.header.runner")) }
                            th { (t!("html_report.table.header.status")) }
                            th { (t!("html_report.table.header.message")) }
                        }
                    }
                    tbody {
                        @for entry in &summary.results {
                            tr {
                                td { (entry.name) }
                                td { (entry.plugin_identifier) }
                                td {
                                    div class={ "status-cell " (status_class(entry.result.status())) } {
                                        (status_label(entry.result.status()))
                                    }
                                }
                                td { (result_cell(&entry.result)) }
                            }
                        }
                    }
                }
            }
        }
    }
}

fn summary_item(count: usize, label: &str, class: &str) -> Markup {
    html! {
        div class="summary-item" {
            span class={ "count " (class) } { (count) }
            span class="label" { (label) }
        }
    }
}

fn result_cell(result: &TestResult) -> Markup {
    let message = result.message().unwrap_or_default();
    if !result.is_failure() {
        return html! { (message) };
    }
    html! {
        details {
            summary { (message) }
            @if let Some(details) = result.details() {
                ul {
                    @for (check, detail) in details {
                        li class=(if detail.success { "check-ok" } else { "check-failed" }) {
                            strong { (check) } ": "
                            (t!("html_report.expected")) " " code { (detail.expected.to_string()) }
                            ", "
                            (t!("html_report.actual")) " " code { (detail.actual.to_string()) }
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::{DetailMap, TestDetails};
    use crate::core::summary::TestResultSummary;
    use chrono::Utc;
    use serde_json::json;

    #[test]
    fn failed_rows_expose_message_and_details() {
        let mut details = DetailMap::new();
        details.insert("exit_code".into(), TestDetails::new(json!(0), json!(2), false));
        let summary = TestSuiteSummary {
            timestamp: Utc::now(),
            results: vec![
                TestResultSummary {
                    name: "ok".into(),
                    plugin_identifier: "command".into(),
                    result: TestResult::passed(),
                },
                TestResultSummary {
                    name: "<broken>".into(),
                    plugin_identifier: "command".into(),
                    result: TestResult::failed("exit 2").with_details(details),
                },
            ],
        };

        let page = render(&summary).into_string();
        assert!(page.starts_with("<!DOCTYPE html>"));
        assert!(page.contains("<details>"));
        assert!(page.contains("exit 2"));
        assert!(page.contains("exit_code"));
        // Test names are escaped.
        assert!(page.contains("&lt;broken&gt;"));
        assert!(page.contains("50.0%"));
    }
}
