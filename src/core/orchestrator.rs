//! # Suite Orchestrator Module / 套件编排模块
//!
//! Wires the plugin registry, the configuration resolver and an execution
//! strategy together to run one suite from configuration to reports.
//!
//! 将插件注册表、配置解析器和执行策略连接起来，完成一个套件从配置到报告的运行。

use chrono::Utc;
use futures::future::BoxFuture;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::core::config::{ConfigResolver, TestSuiteConfig};
use crate::core::error::{Error, Result};
use crate::core::models::{Parameters, TestConfig, TestResult};
use crate::core::plugin::TestRunner;
use crate::core::registry::PluginRegistry;
use crate::core::strategy::{ExecutionStrategy, RunOne, SequentialStrategy, run_one_fn};
use crate::core::summary::{ResultAggregator, TestSuiteSummary};

/// Merged parameter that overrides the suite-wide timeout for one test.
pub const TIMEOUT_PARAMETER: &str = "timeout_secs";

/// Runs test suites against a read-only plugin registry.
/// 针对只读插件注册表运行测试套件。
#[derive(Debug)]
pub struct TestSuiteOrchestrator {
    registry: Arc<PluginRegistry>,
    resolver: ConfigResolver,
    strategy: Box<dyn ExecutionStrategy>,
    test_timeout: Option<Duration>,
    cancel: CancellationToken,
}

impl TestSuiteOrchestrator {
    /// Creates an orchestrator using the sequential strategy and no timeout.
    pub fn new(registry: Arc<PluginRegistry>) -> Self {
        Self {
            resolver: ConfigResolver::new(Arc::clone(&registry)),
            registry,
            strategy: Box::new(SequentialStrategy),
            test_timeout: None,
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_strategy(mut self, strategy: Box<dyn ExecutionStrategy>) -> Self {
        self.strategy = strategy;
        self
    }

    /// Sets the default per-attempt timeout for every test.
    pub fn with_test_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.test_timeout = timeout.filter(|limit| !limit.is_zero());
        self
    }

    /// Uses `token` to stop the run early. Tests that have not finished when
    /// it fires are reported as skipped.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn registry(&self) -> &PluginRegistry {
        &self.registry
    }

    pub fn resolver(&self) -> &ConfigResolver {
        &self.resolver
    }

    pub fn strategy(&self) -> &dyn ExecutionStrategy {
        self.strategy.as_ref()
    }

    /// Loads the suite at `path` and runs it.
    pub async fn run_file(&self, path: &Path) -> Result<TestSuiteSummary> {
        let suite = self.resolver.load_suite(path)?;
        self.run(&suite).await
    }

    /// Runs every test of `suite`, builds the summary and dispatches the
    /// configured reporters.
    ///
    /// Tests whose runner plugin is not registered are reported as skipped
    /// without affecting the others. Reporter failures are logged and do not
    /// affect the returned summary.
    ///
    /// 运行 `suite` 中的每个测试，构建摘要并调用已配置的报告器。
    pub async fn run(&self, suite: &TestSuiteConfig) -> Result<TestSuiteSummary> {
        let timestamp = Utc::now();
        let tests = self.resolver.resolve_tests(suite);
        let runners = self.resolve_runners(&tests);

        info!(
            tests = tests.len(),
            strategy = self.strategy.name(),
            "starting test suite"
        );

        let run_one = self.run_one(runners);
        let results = self.strategy.execute(&tests, run_one).await?;
        let summary = ResultAggregator::aggregate(timestamp, &tests, results)?;

        info!(
            passed = summary.passed(),
            failed = summary.failed(),
            skipped = summary.skipped(),
            "test suite finished"
        );

        for err in self.dispatch_reports(suite, &summary) {
            warn!(error = %err, "reporter failed");
        }

        Ok(summary)
    }

    /// Invokes every configured reporter with the summary and its own
    /// parameters. Failures are collected, never propagated, so one broken
    /// reporter cannot stop the others.
    ///
    /// 使用摘要及各自的参数调用每个已配置的报告器。失败会被收集而不会传播。
    pub fn dispatch_reports(&self, suite: &TestSuiteConfig, summary: &TestSuiteSummary) -> Vec<Error> {
        let empty = Parameters::new();
        suite
            .reports
            .iter()
            .filter_map(|entry| {
                let parameters = entry.parameters.as_ref().unwrap_or(&empty);
                let outcome = self.registry.reporter(&entry.plugin_identifier).and_then(|reporter| {
                    reporter
                        .report(summary, parameters)
                        .map_err(|source| Error::Reporter {
                            reporter: entry.display_name().to_string(),
                            source,
                        })
                });
                match outcome {
                    Ok(()) => {
                        debug!(reporter = %entry.display_name(), "report dispatched");
                        None
                    }
                    Err(err) => Some(err),
                }
            })
            .collect()
    }

    /// Looks up the runner of every distinct plugin identifier used by `tests`.
    fn resolve_runners(&self, tests: &[Arc<TestConfig>]) -> HashMap<String, Arc<dyn TestRunner>> {
        let mut runners = HashMap::new();
        for test in tests {
            let identifier = test.plugin_identifier();
            if runners.contains_key(identifier) {
                continue;
            }
            match self.registry.runner(identifier) {
                Ok(runner) => {
                    runners.insert(identifier.to_string(), runner);
                }
                Err(err) => warn!(test = %test.name(), error = %err, "test will be skipped"),
            }
        }
        runners
    }

    /// Builds the callback handed to the strategy: dispatch to the resolved
    /// runner under the timeout and cancellation rules.
    fn run_one(&self, runners: HashMap<String, Arc<dyn TestRunner>>) -> RunOne {
        let runners = Arc::new(runners);
        let default_timeout = self.test_timeout;
        let cancel = self.cancel.clone();

        run_one_fn(move |test: Arc<TestConfig>| {
            let runner = runners.get(test.plugin_identifier()).cloned();
            let cancel = cancel.clone();
            async move {
                let Some(runner) = runner else {
                    return Ok(TestResult::skipped(format!(
                        "test '{}' skipped: no runner plugin registered under '{}'",
                        test.name(),
                        test.plugin_identifier()
                    )));
                };
                if cancel.is_cancelled() {
                    return Ok(cancelled(&test));
                }

                let timeout = parameter_timeout(test.parameters()).or(default_timeout);
                let execution = run_with_timeout(runner.run(test.parameters()), timeout, &test);
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => Ok(cancelled(&test)),
                    outcome = execution => outcome,
                }
            }
        })
    }
}

fn cancelled(test: &TestConfig) -> TestResult {
    TestResult::skipped(format!("test '{}' skipped: the run was cancelled", test.name()))
}

/// Reads the per-test timeout override from the merged parameters.
fn parameter_timeout(parameters: &Parameters) -> Option<Duration> {
    parameters
        .get(TIMEOUT_PARAMETER)
        .and_then(|value| value.as_f64())
        .filter(|secs| *secs > 0.0)
        .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
}

async fn run_with_timeout(
    execution: BoxFuture<'_, anyhow::Result<TestResult>>,
    timeout: Option<Duration>,
    test: &TestConfig,
) -> Result<TestResult> {
    let outcome = match timeout {
        Some(limit) => match tokio::time::timeout(limit, execution).await {
            Ok(outcome) => outcome,
            Err(_) => {
                warn!(test = %test.name(), timeout = ?limit, "test timed out");
                return Ok(TestResult::failed(format!(
                    "test '{}' timed out after {:.1}s",
                    test.name(),
                    limit.as_secs_f64()
                )));
            }
        },
        None => execution.await,
    };
    outcome.map_err(|source| Error::execution(test.name(), source))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn timeout_parameter_accepts_positive_numbers_only() {
        let mut params = Parameters::new();
        assert_eq!(parameter_timeout(&params), None);

        params.insert(TIMEOUT_PARAMETER.into(), json!(2));
        assert_eq!(parameter_timeout(&params), Some(Duration::from_secs(2)));

        params.insert(TIMEOUT_PARAMETER.into(), json!(0.5));
        assert_eq!(parameter_timeout(&params), Some(Duration::from_millis(500)));

        params.insert(TIMEOUT_PARAMETER.into(), json!(-1));
        assert_eq!(parameter_timeout(&params), None);

        params.insert(TIMEOUT_PARAMETER.into(), json!("soon"));
        assert_eq!(parameter_timeout(&params), None);
    }

    #[test]
    fn oversized_timeout_parameter_is_ignored() {
        let mut params = Parameters::new();
        params.insert(TIMEOUT_PARAMETER.into(), json!(1e20));
        assert_eq!(parameter_timeout(&params), None);

        params.insert(TIMEOUT_PARAMETER.into(), json!(f64::MAX));
        assert_eq!(parameter_timeout(&params), None);
    }

    #[test]
    fn zero_default_timeout_means_no_timeout() {
        let registry = Arc::new(PluginRegistry::new());
        let orchestrator =
            TestSuiteOrchestrator::new(registry).with_test_timeout(Some(Duration::ZERO));
        assert_eq!(orchestrator.test_timeout, None);
    }
}
