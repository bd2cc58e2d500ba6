//! # Result Aggregation Module / 结果汇总模块
//!
//! Assembles the per-test results of a run into a timestamped
//! [`TestSuiteSummary`], keeping them aligned index-for-index with the tests.
//!
//! 将一次运行的各测试结果汇总为带时间戳的 [`TestSuiteSummary`]，并与测试逐一对齐。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::core::error::{Error, Result};
use crate::core::models::{ResultStatus, TestConfig, TestResult};

/// One row of the summary: which test ran, through which runner, and how it ended.
/// 摘要中的一行：运行了哪个测试、通过哪个运行器以及结果如何。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestResultSummary {
    pub name: String,
    pub plugin_identifier: String,
    pub result: TestResult,
}

/// The outcome of a whole suite run.
/// 整个套件运行的结果。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestSuiteSummary {
    /// When the suite started executing.
    /// 套件开始执行的时间。
    pub timestamp: DateTime<Utc>,
    /// Results in the same order as the suite's tests.
    /// 与套件测试顺序相同的结果。
    pub results: Vec<TestResultSummary>,
}

impl TestSuiteSummary {
    pub fn total(&self) -> usize {
        self.results.len()
    }

    pub fn count(&self, status: ResultStatus) -> usize {
        self.results
            .iter()
            .filter(|entry| entry.result.status() == status)
            .count()
    }

    pub fn passed(&self) -> usize {
        self.count(ResultStatus::Passed)
    }

    pub fn failed(&self) -> usize {
        self.count(ResultStatus::Failed)
    }

    pub fn skipped(&self) -> usize {
        self.count(ResultStatus::Skipped)
    }

    pub fn has_failures(&self) -> bool {
        self.results.iter().any(|entry| entry.result.is_failure())
    }

    /// Percentage of passed tests, or `None` for an empty suite.
    pub fn success_rate(&self) -> Option<f64> {
        if self.results.is_empty() {
            None
        } else {
            Some(self.passed() as f64 * 100.0 / self.total() as f64)
        }
    }

    pub fn results(&self) -> impl Iterator<Item = &TestResult> {
        self.results.iter().map(|entry| &entry.result)
    }
}

/// Builds summaries from ordered test/result lists.
pub struct ResultAggregator;

impl ResultAggregator {
    /// Pairs `tests[i]` with `results[i]`.
    ///
    /// A length mismatch means a strategy broke result alignment; it is
    /// reported instead of producing a misaligned summary.
    pub fn aggregate(
        timestamp: DateTime<Utc>,
        tests: &[Arc<TestConfig>],
        results: Vec<TestResult>,
    ) -> Result<TestSuiteSummary> {
        if tests.len() != results.len() {
            return Err(Error::InvalidConfiguration(format!(
                "execution produced {} results for {} tests",
                results.len(),
                tests.len()
            )));
        }

        let results = tests
            .iter()
            .zip(results)
            .map(|(test, result)| TestResultSummary {
                name: test.name().to_string(),
                plugin_identifier: test.plugin_identifier().to_string(),
                result,
            })
            .collect();

        Ok(TestSuiteSummary { timestamp, results })
    }
}
