//! # Plugin Contracts Module / 插件契约模块
//!
//! One explicit trait per capability kind, and the [`Plugin`] descriptor that
//! binds an implementation to the identifiers it is registered under.
//!
//! 每种能力类型对应一个显式 trait，以及将实现绑定到其注册标识符的 [`Plugin`] 描述符。

use async_trait::async_trait;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use crate::core::models::{Parameters, PluginKind, PluginMetadata, TestResult};
use crate::core::summary::TestSuiteSummary;

/// Decodes raw configuration text into a structured map.
/// 将原始配置文本解码为结构化映射。
pub trait ConfigParser: Send + Sync {
    fn parse(&self, raw: &str) -> anyhow::Result<Parameters>;
}

impl<F> ConfigParser for F
where
    F: Fn(&str) -> anyhow::Result<Parameters> + Send + Sync,
{
    fn parse(&self, raw: &str) -> anyhow::Result<Parameters> {
        self(raw)
    }
}

/// Executes one test from its merged parameters.
///
/// An `Err` is an unrecoverable execution error (the test could not be run at
/// all); a test that ran and did not meet its expectations returns
/// `Ok(TestResult::Failed { .. })`.
///
/// 根据合并后的参数执行一个测试。
/// `Err` 表示不可恢复的执行错误；测试运行但未达到预期时返回 `Ok(TestResult::Failed { .. })`。
#[async_trait]
pub trait TestRunner: Send + Sync {
    async fn run(&self, parameters: &Parameters) -> anyhow::Result<TestResult>;
}

/// Adapts a synchronous closure into a [`TestRunner`].
pub struct FnRunner<F>(F);

impl<F> FnRunner<F>
where
    F: Fn(&Parameters) -> anyhow::Result<TestResult> + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

#[async_trait]
impl<F> TestRunner for FnRunner<F>
where
    F: Fn(&Parameters) -> anyhow::Result<TestResult> + Send + Sync,
{
    async fn run(&self, parameters: &Parameters) -> anyhow::Result<TestResult> {
        (self.0)(parameters)
    }
}

/// Publishes a finished suite summary (file, console, network...).
/// 发布已完成的套件摘要（文件、控制台、网络等）。
pub trait Reporter: Send + Sync {
    fn report(&self, summary: &TestSuiteSummary, parameters: &Parameters) -> anyhow::Result<()>;
}

impl<F> Reporter for F
where
    F: Fn(&TestSuiteSummary, &Parameters) -> anyhow::Result<()> + Send + Sync,
{
    fn report(&self, summary: &TestSuiteSummary, parameters: &Parameters) -> anyhow::Result<()> {
        self(summary, parameters)
    }
}

/// The implementation behind a plugin, tagged by capability kind.
#[derive(Clone)]
pub enum PluginExecutor {
    Parser(Arc<dyn ConfigParser>),
    Runner(Arc<dyn TestRunner>),
    Reporter(Arc<dyn Reporter>),
}

impl PluginExecutor {
    pub fn kind(&self) -> PluginKind {
        match self {
            PluginExecutor::Parser(_) => PluginKind::Parser,
            PluginExecutor::Runner(_) => PluginKind::Runner,
            PluginExecutor::Reporter(_) => PluginKind::Reporter,
        }
    }
}

/// A capability implementation addressable by one or more identifiers.
/// 可通过一个或多个标识符访问的能力实现。
#[derive(Clone)]
pub struct Plugin {
    pub metadata: PluginMetadata,
    identifiers: BTreeSet<String>,
    executor: PluginExecutor,
}

impl Plugin {
    pub fn new<I, S>(metadata: PluginMetadata, identifiers: I, executor: PluginExecutor) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            metadata,
            identifiers: identifiers.into_iter().map(Into::into).collect(),
            executor,
        }
    }

    pub fn parser<I, S>(metadata: PluginMetadata, identifiers: I, parser: impl ConfigParser + 'static) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(metadata, identifiers, PluginExecutor::Parser(Arc::new(parser)))
    }

    pub fn runner<I, S>(metadata: PluginMetadata, identifiers: I, runner: impl TestRunner + 'static) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(metadata, identifiers, PluginExecutor::Runner(Arc::new(runner)))
    }

    pub fn reporter<I, S>(metadata: PluginMetadata, identifiers: I, reporter: impl Reporter + 'static) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(metadata, identifiers, PluginExecutor::Reporter(Arc::new(reporter)))
    }

    pub fn kind(&self) -> PluginKind {
        self.executor.kind()
    }

    pub fn identifiers(&self) -> impl Iterator<Item = &str> {
        self.identifiers.iter().map(String::as_str)
    }

    pub fn executor(&self) -> &PluginExecutor {
        &self.executor
    }

    pub fn as_parser(&self) -> Option<&Arc<dyn ConfigParser>> {
        match &self.executor {
            PluginExecutor::Parser(parser) => Some(parser),
            _ => None,
        }
    }

    pub fn as_runner(&self) -> Option<&Arc<dyn TestRunner>> {
        match &self.executor {
            PluginExecutor::Runner(runner) => Some(runner),
            _ => None,
        }
    }

    pub fn as_reporter(&self) -> Option<&Arc<dyn Reporter>> {
        match &self.executor {
            PluginExecutor::Reporter(reporter) => Some(reporter),
            _ => None,
        }
    }
}

impl fmt::Debug for Plugin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Plugin")
            .field("kind", &self.kind())
            .field("metadata", &self.metadata)
            .field("identifiers", &self.identifiers)
            .finish_non_exhaustive()
    }
}
