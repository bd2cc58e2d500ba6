//! # Console Reporting Module / 控制台报告模块
//!
//! This module prints test results to the terminal, as a table or as a list,
//! followed by a summary panel with counts and the success rate.
//!
//! 此模块将测试结果以表格或列表形式打印到终端，
//! 随后打印包含计数和成功率的摘要面板。

use anyhow::{Result, bail};
use colored::*;

use crate::core::models::{Parameters, ResultStatus, TestResult};
use crate::core::plugin::Reporter;
use crate::core::summary::{TestResultSummary, TestSuiteSummary};
use crate::infra::t;
use crate::plugins::params::{bool_param, str_param};
use crate::reporting::status_label;

/// Layout of the per-test section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleFormat {
    Table,
    List,
}

/// Reporter registered as `console`.
///
/// Parameters: `format` (`"table"` or `"list"`, default table),
/// `show_details` (default `false`) and `show_summary` (default `true`).
///
/// 注册为 `console` 的报告器。
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleReporter;

impl Reporter for ConsoleReporter {
    fn report(&self, summary: &TestSuiteSummary, parameters: &Parameters) -> Result<()> {
        let format = match str_param(parameters, "format")? {
            None | Some("table") => ConsoleFormat::Table,
            Some("list") => ConsoleFormat::List,
            Some(other) => bail!("unknown console format '{other}', expected 'table' or 'list'"),
        };
        let show_details = bool_param(parameters, "show_details", false)?;
        let show_summary = bool_param(parameters, "show_summary", true)?;

        print!("{}", render(summary, format, show_details, show_summary));
        Ok(())
    }
}

/// Renders the whole console report into a string.
pub fn render(
    summary: &TestSuiteSummary,
    format: ConsoleFormat,
    show_details: bool,
    show_summary: bool,
) -> String {
    let mut out = String::new();
    out.push_str(&format!("\n{}\n", t!("console.results_banner").bold()));

    match format {
        ConsoleFormat::Table => {
            out.push_str(&format!(
                "  {:<10} | {:<32} | {:<12} | {}\n",
                t!("console.header.status"),
                t!("console.header.name"),
                t!("console.header.runner"),
                t!("console.header.message"),
            ));
            out.push_str(&format!("  {}\n", "-".repeat(78)));
            for entry in &summary.results {
                out.push_str(&format!(
                    "  {:<10} | {:<32} | {:<12} | {}\n",
                    colored_status(entry.result.status()),
                    entry.name,
                    entry.plugin_identifier,
                    entry.result.message().unwrap_or_default(),
                ));
                if show_details {
                    out.push_str(&render_details(&entry.result));
                }
            }
        }
        ConsoleFormat::List => {
            for entry in &summary.results {
                out.push_str(&format!("{}\n", status_line(entry)));
                if show_details {
                    out.push_str(&render_details(&entry.result));
                }
            }
        }
    }

    if show_summary {
        out.push_str(&render_summary(summary));
    }
    out
}

/// One coloured line for a finished test: `[status] name (runner): message`.
/// 已完成测试的一行彩色输出。
pub fn status_line(entry: &TestResultSummary) -> String {
    let mut line = format!(
        "  [{}] {} ({})",
        colored_status(entry.result.status()),
        entry.name.bold(),
        entry.plugin_identifier.dimmed()
    );
    if let Some(message) = entry.result.message() {
        line.push_str(": ");
        line.push_str(message);
    }
    line
}

fn colored_status(status: ResultStatus) -> ColoredString {
    let label = status_label(status);
    match status {
        ResultStatus::Passed => label.green(),
        ResultStatus::Failed => label.red(),
        ResultStatus::Skipped => label.yellow(),
    }
}

fn render_details(result: &TestResult) -> String {
    let Some(details) = result.details() else {
        return String::new();
    };
    details
        .iter()
        .map(|(check, detail)| {
            let mark = if detail.success { "✓".green() } else { "✗".red() };
            format!(
                "      {mark} {check}: {} {} / {} {}\n",
                t!("console.expected"),
                detail.expected,
                t!("console.actual"),
                detail.actual
            )
        })
        .collect()
}

/// Renders the counts and success rate panel.
pub fn render_summary(summary: &TestSuiteSummary) -> String {
    let rate = summary
        .success_rate()
        .map(|rate| format!("{rate:.1}%"))
        .unwrap_or_else(|| "N/A".to_string());

    let overall = if summary.has_failures() {
        t!("console.overall_failure").red().bold()
    } else {
        t!("console.overall_success").green().bold()
    };

    format!(
        "\n{}\n  {}: {}   {}: {}   {}: {}   {}: {}\n  {}: {}\n{}\n",
        t!("console.summary_banner").cyan(),
        t!("console.total"),
        summary.total(),
        status_label(ResultStatus::Passed),
        summary.passed().to_string().green(),
        status_label(ResultStatus::Failed),
        summary.failed().to_string().red(),
        status_label(ResultStatus::Skipped),
        summary.skipped().to_string().yellow(),
        t!("console.success_rate"),
        rate,
        overall
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::{DetailMap, TestDetails};
    use chrono::Utc;
    use serde_json::{Value, json};

    fn summary() -> TestSuiteSummary {
        let mut details = DetailMap::new();
        details.insert("exit_code".into(), TestDetails::new(json!(0), json!(1), false));
        TestSuiteSummary {
            timestamp: Utc::now(),
            results: vec![
                TestResultSummary {
                    name: "alpha".into(),
                    plugin_identifier: "command".into(),
                    result: TestResult::passed(),
                },
                TestResultSummary {
                    name: "beta".into(),
                    plugin_identifier: "command".into(),
                    result: TestResult::failed("exit 1").with_details(details),
                },
            ],
        }
    }

    #[test]
    fn table_lists_every_test_and_the_summary() {
        colored::control::set_override(false);
        let out = render(&summary(), ConsoleFormat::Table, true, true);
        assert!(out.contains("alpha"));
        assert!(out.contains("beta"));
        assert!(out.contains("exit 1"));
        assert!(out.contains("exit_code"));
        assert!(out.contains("50.0%"));
    }

    #[test]
    fn summary_panel_can_be_hidden() {
        colored::control::set_override(false);
        let with = render(&summary(), ConsoleFormat::List, false, true);
        let without = render(&summary(), ConsoleFormat::List, false, false);
        assert!(with.contains("50.0%"));
        assert!(!without.contains("50.0%"));
        assert!(!without.contains("exit_code"));
    }

    #[test]
    fn unknown_format_is_rejected() {
        let Value::Object(params) = json!({"format": "grid"}) else {
            unreachable!()
        };
        assert!(ConsoleReporter.report(&summary(), &params).is_err());
    }
}
