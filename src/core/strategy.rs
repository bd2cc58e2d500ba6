//! # Execution Strategy Module / 执行策略模块
//!
//! An execution strategy decides the order and concurrency pattern used to
//! run a list of tests against a single-test callback. Whatever the strategy,
//! the returned results are aligned index-for-index with the input tests;
//! only the execution order may differ.
//!
//! - [`SequentialStrategy`] - one test at a time, fail-fast on errors.
//! - [`ParallelStrategy`] - bounded pool of tokio tasks; errors become `Failed`.
//! - [`GroupedStrategy`] - named groups run sequentially, ungrouped tests last.
//! - [`RetryStrategy`] - retries failed tests, delegating to another strategy.
//!
//! 执行策略决定针对单测试回调运行测试列表时的顺序和并发模式。
//! 无论使用哪种策略，返回的结果都与输入测试逐一对齐，只有执行顺序可能不同。

use async_trait::async_trait;
use futures::future::BoxFuture;
use futures::{FutureExt, StreamExt, stream};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::core::error::{Error, Result};
use crate::core::models::{TestConfig, TestResult};

/// The single-test execution callback handed to a strategy.
///
/// An `Err` is an unrecoverable execution error for that test.
/// 交给策略的单测试执行回调。`Err` 表示该测试不可恢复的执行错误。
pub type RunOne =
    Arc<dyn Fn(Arc<TestConfig>) -> BoxFuture<'static, Result<TestResult>> + Send + Sync>;

/// Wraps an async closure into a [`RunOne`] callback.
pub fn run_one_fn<F, Fut>(f: F) -> RunOne
where
    F: Fn(Arc<TestConfig>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<TestResult>> + Send + 'static,
{
    Arc::new(move |test| f(test).boxed())
}

/// A policy for running an ordered list of tests.
/// 运行有序测试列表的策略。
#[async_trait]
pub trait ExecutionStrategy: Send + Sync + fmt::Debug {
    /// A short, stable name for logs and listings.
    fn name(&self) -> &'static str;

    /// Runs `tests` through `run_one` and returns one result per test, in
    /// input order.
    async fn execute(&self, tests: &[Arc<TestConfig>], run_one: RunOne) -> Result<Vec<TestResult>>;
}

/// Turns the filled slot array into the final result list.
fn collect_slots(tests: &[Arc<TestConfig>], slots: Vec<Option<TestResult>>) -> Vec<TestResult> {
    slots
        .into_iter()
        .zip(tests)
        .map(|(slot, test)| {
            slot.unwrap_or_else(|| {
                TestResult::failed(format!("no result was produced for test '{}'", test.name()))
            })
        })
        .collect()
}

/// Runs tests one at a time, in list order.
///
/// An unrecoverable error aborts the run immediately: no further tests are
/// started and the error is returned to the caller.
#[derive(Debug, Clone, Copy, Default)]
pub struct SequentialStrategy;

#[async_trait]
impl ExecutionStrategy for SequentialStrategy {
    fn name(&self) -> &'static str {
        "sequential"
    }

    async fn execute(&self, tests: &[Arc<TestConfig>], run_one: RunOne) -> Result<Vec<TestResult>> {
        let mut results = Vec::with_capacity(tests.len());
        for test in tests {
            debug!(test = %test.name(), "running test");
            results.push(run_one(Arc::clone(test)).await?);
        }
        Ok(results)
    }
}

/// Runs tests concurrently on a bounded pool of tokio tasks.
///
/// Every test gets its own task, at most `max_workers` of them in flight.
/// Completions are written into a pre-sized slot array at the test's original
/// index, so the returned order never depends on completion order. An error
/// or a panic in one task becomes a `Failed` result for that test; the other
/// tasks run to completion.
///
/// 在有界的 tokio 任务池上并发运行测试。
/// 完成的结果写入预分配槽数组中测试的原始索引处，因此返回顺序与完成顺序无关。
/// 单个任务中的错误或 panic 会变成该测试的 `Failed` 结果，其余任务继续完成。
#[derive(Debug, Clone, Copy)]
pub struct ParallelStrategy {
    max_workers: usize,
}

impl ParallelStrategy {
    /// `None` uses the number of available CPUs.
    pub fn new(max_workers: Option<usize>) -> Result<Self> {
        let max_workers = max_workers.unwrap_or_else(num_cpus::get);
        if max_workers == 0 {
            return Err(Error::InvalidConfiguration(
                "parallel strategy needs at least one worker".to_string(),
            ));
        }
        Ok(Self { max_workers })
    }

    pub fn max_workers(&self) -> usize {
        self.max_workers
    }
}

#[async_trait]
impl ExecutionStrategy for ParallelStrategy {
    fn name(&self) -> &'static str {
        "parallel"
    }

    async fn execute(&self, tests: &[Arc<TestConfig>], run_one: RunOne) -> Result<Vec<TestResult>> {
        let mut slots: Vec<Option<TestResult>> = vec![None; tests.len()];

        // The task is only spawned when `buffer_unordered` polls the wrapper,
        // which bounds the number of live tasks by `max_workers`.
        let mut completions = stream::iter(tests.iter().cloned().enumerate().map(|(index, test)| {
            let run_one = Arc::clone(&run_one);
            async move {
                let name = test.name().to_string();
                let outcome = tokio::spawn(run_one(test)).await;
                (index, name, outcome)
            }
        }))
        .buffer_unordered(self.max_workers);

        while let Some((index, name, outcome)) = completions.next().await {
            let result = match outcome {
                Ok(Ok(result)) => result,
                Ok(Err(err)) => {
                    warn!(test = %name, error = %err, "test raised an error, recording it as failed");
                    TestResult::failed(err.to_string())
                }
                Err(join_err) => {
                    warn!(test = %name, error = %join_err, "test task aborted, recording it as failed");
                    TestResult::failed(format!("test task for '{name}' aborted: {join_err}"))
                }
            };
            slots[index] = Some(result);
        }

        Ok(collect_slots(tests, slots))
    }
}

/// Runs named groups of tests, each strictly sequential.
///
/// Groups are processed in definition order and each group's tests in the
/// order listed. Tests not referenced by any group run afterwards in their
/// original relative order. Results are reassembled into the input order.
/// Names that match no input test are ignored. If several input tests share
/// a name, a group reference runs all of them in input order.
///
/// 按名称分组运行测试，每组严格顺序执行。
/// 组按定义顺序处理，组内测试按列出顺序执行；未被任何组引用的测试随后按原始相对顺序运行。
/// 结果按输入顺序重新组装。
#[derive(Debug, Clone)]
pub struct GroupedStrategy {
    groups: Vec<(String, Vec<String>)>,
}

impl GroupedStrategy {
    /// Validates the group definitions. A test name listed more than once,
    /// in the same group or across groups, is rejected.
    pub fn new<I, G, T>(groups: I) -> Result<Self>
    where
        I: IntoIterator<Item = (G, Vec<T>)>,
        G: Into<String>,
        T: Into<String>,
    {
        let groups: Vec<(String, Vec<String>)> = groups
            .into_iter()
            .map(|(name, tests)| (name.into(), tests.into_iter().map(Into::into).collect()))
            .collect();

        let mut owners: HashMap<&str, &str> = HashMap::new();
        for (group, tests) in &groups {
            for test in tests {
                if let Some(previous) = owners.insert(test.as_str(), group.as_str()) {
                    return Err(Error::InvalidConfiguration(format!(
                        "test '{test}' is listed in group '{previous}' and again in group '{group}'"
                    )));
                }
            }
        }

        Ok(Self { groups })
    }

    pub fn groups(&self) -> &[(String, Vec<String>)] {
        &self.groups
    }
}

#[async_trait]
impl ExecutionStrategy for GroupedStrategy {
    fn name(&self) -> &'static str {
        "grouped"
    }

    async fn execute(&self, tests: &[Arc<TestConfig>], run_one: RunOne) -> Result<Vec<TestResult>> {
        let mut by_name: HashMap<&str, Vec<usize>> = HashMap::new();
        for (index, test) in tests.iter().enumerate() {
            by_name.entry(test.name()).or_default().push(index);
        }

        let mut slots: Vec<Option<TestResult>> = vec![None; tests.len()];
        let mut grouped: HashSet<usize> = HashSet::new();

        for (group, names) in &self.groups {
            info!(group = %group, tests = names.len(), "executing test group");
            for name in names {
                let Some(indices) = by_name.get(name.as_str()) else {
                    debug!(group = %group, test = %name, "group references an unknown test, ignoring");
                    continue;
                };
                for &index in indices {
                    grouped.insert(index);
                    slots[index] = Some(run_one(Arc::clone(&tests[index])).await?);
                }
            }
        }

        for (index, test) in tests.iter().enumerate() {
            if !grouped.contains(&index) {
                slots[index] = Some(run_one(Arc::clone(test)).await?);
            }
        }

        Ok(collect_slots(tests, slots))
    }
}

/// Retries failed tests before delegating to a base strategy.
///
/// For each test the callback is invoked until it returns something other
/// than `Failed`, or `max_retries` extra attempts have been made; the last
/// attempt's result is kept. The retry loop lives inside the test's own
/// execution slot, so under a parallel base strategy it never holds back
/// other tests. Unrecoverable errors are not retried.
///
/// 在委托给基础策略之前为失败的测试添加重试。
/// 重试循环位于测试自身的执行槽内，因此在并行基础策略下不会阻塞其他测试。
#[derive(Debug)]
pub struct RetryStrategy {
    base: Box<dyn ExecutionStrategy>,
    max_retries: u32,
}

impl RetryStrategy {
    pub fn new(base: Box<dyn ExecutionStrategy>, max_retries: u32) -> Self {
        Self { base, max_retries }
    }

    pub fn base(&self) -> &dyn ExecutionStrategy {
        self.base.as_ref()
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }
}

#[async_trait]
impl ExecutionStrategy for RetryStrategy {
    fn name(&self) -> &'static str {
        "retry"
    }

    async fn execute(&self, tests: &[Arc<TestConfig>], run_one: RunOne) -> Result<Vec<TestResult>> {
        let max_retries = self.max_retries;
        let retrying = run_one_fn(move |test| run_with_retries(Arc::clone(&run_one), test, max_retries));
        self.base.execute(tests, retrying).await
    }
}

/// The per-test retry loop used by [`RetryStrategy`].
async fn run_with_retries(run_one: RunOne, test: Arc<TestConfig>, max_retries: u32) -> Result<TestResult> {
    let mut attempt: u32 = 0;
    loop {
        let result = run_one(Arc::clone(&test)).await?;
        if !result.is_failure() {
            if attempt > 0 {
                info!(test = %test.name(), retries = attempt, "test passed after retrying");
            }
            return Ok(result);
        }
        if attempt >= max_retries {
            if max_retries > 0 {
                warn!(test = %test.name(), attempts = attempt + 1, "test failed on every attempt");
            }
            return Ok(result);
        }
        attempt += 1;
        info!(
            test = %test.name(),
            attempt = attempt + 1,
            of = max_retries + 1,
            "retrying failed test"
        );
    }
}
