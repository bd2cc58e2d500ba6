//! # Configuration Module / 配置模块
//!
//! This module defines the suite configuration document, the execution
//! settings that select a strategy, and the [`ConfigResolver`] which turns raw
//! configuration text into resolved, ready-to-run test configurations.
//!
//! 此模块定义套件配置文档、选择执行策略的执行设置，
//! 以及将原始配置文本转换为可直接运行的测试配置的 [`ConfigResolver`]。

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::core::error::{Error, Result};
use crate::core::models::{Parameters, TestConfig};
use crate::core::registry::PluginRegistry;
use crate::core::strategy::{
    ExecutionStrategy, GroupedStrategy, ParallelStrategy, RetryStrategy, SequentialStrategy,
};

/// A test entry as written in the configuration, before parameter merging.
/// 配置中写入的测试条目（参数合并之前）。
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TestEntry {
    /// The name used to identify the test in logs, groups and reports.
    /// 用于在日志、分组和报告中识别测试的名称。
    pub name: String,
    /// The identifier of the runner plugin that executes the test.
    /// 执行该测试的运行器插件标识符。
    pub plugin_identifier: String,
    #[serde(default)]
    pub parameters: Option<Parameters>,
}

/// A reporter entry: which reporter plugin to invoke and with what parameters.
/// 报告器条目：调用哪个报告器插件以及使用什么参数。
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ReporterEntry {
    pub plugin_identifier: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub parameters: Option<Parameters>,
}

impl ReporterEntry {
    /// The configured name, falling back to the plugin identifier.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.plugin_identifier)
    }
}

/// Which base execution strategy a suite uses.
/// 套件使用的基础执行策略。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    #[default]
    Sequential,
    Parallel,
    Grouped,
}

impl StrategyKind {
    pub const NAMES: [&'static str; 3] = ["sequential", "parallel", "grouped"];
}

impl FromStr for StrategyKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "sequential" => Ok(StrategyKind::Sequential),
            "parallel" => Ok(StrategyKind::Parallel),
            "grouped" => Ok(StrategyKind::Grouped),
            other => Err(Error::InvalidConfiguration(format!(
                "unknown execution strategy '{other}'"
            ))),
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StrategyKind::Sequential => "sequential",
            StrategyKind::Parallel => "parallel",
            StrategyKind::Grouped => "grouped",
        };
        f.write_str(name)
    }
}

/// A named, ordered group of tests for the grouped strategy.
/// 分组策略使用的命名有序测试组。
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct GroupDefinition {
    pub name: String,
    #[serde(default)]
    pub tests: Vec<String>,
}

/// The optional `execution` section of a suite document.
///
/// 套件文档中可选的 `execution` 部分。
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExecutionSettings {
    pub strategy: StrategyKind,
    /// Worker pool size for the parallel strategy. Defaults to the number of CPUs.
    /// 并行策略的工作池大小。默认为 CPU 数量。
    pub max_workers: Option<usize>,
    /// Group definitions for the grouped strategy, in execution order.
    /// 分组策略的组定义，按执行顺序排列。
    pub groups: Vec<GroupDefinition>,
    /// Additional attempts for failed tests. `0` disables the retry wrapper.
    /// 失败测试的额外尝试次数。`0` 表示不启用重试包装。
    pub retries: u32,
    /// Per-attempt timeout applied to every test unless the test overrides it.
    /// `0` means no timeout.
    /// 应用于每个测试的单次尝试超时，除非测试自行覆盖。`0` 表示不设超时。
    pub timeout_secs: Option<u64>,
}

impl ExecutionSettings {
    /// Composes the configured strategy: the base strategy, wrapped in a
    /// retry strategy when `retries > 0`.
    pub fn build_strategy(&self) -> Result<Box<dyn ExecutionStrategy>> {
        let base: Box<dyn ExecutionStrategy> = match self.strategy {
            StrategyKind::Sequential => Box::new(SequentialStrategy),
            StrategyKind::Parallel => Box::new(ParallelStrategy::new(self.max_workers)?),
            StrategyKind::Grouped => Box::new(GroupedStrategy::new(
                self.groups
                    .iter()
                    .map(|group| (group.name.clone(), group.tests.clone())),
            )?),
        };

        if self.retries > 0 {
            Ok(Box::new(RetryStrategy::new(base, self.retries)))
        } else {
            Ok(base)
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.filter(|secs| *secs > 0).map(Duration::from_secs)
    }
}

/// Represents an entire suite configuration as parsed from a document.
/// 表示从文档解析出的整个套件配置。
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct TestSuiteConfig {
    /// Parameters shared by every test; test-level entries win on collision.
    /// 所有测试共享的参数；冲突时以测试级参数为准。
    #[serde(default)]
    pub parameters: Option<Parameters>,
    #[serde(default)]
    pub tests: Vec<TestEntry>,
    #[serde(default)]
    pub reports: Vec<ReporterEntry>,
    #[serde(default)]
    pub execution: ExecutionSettings,
}

impl TestSuiteConfig {
    /// Interprets a parsed document as a suite configuration.
    pub fn from_parameters(document: Parameters) -> Result<Self> {
        if document.is_empty() {
            return Err(Error::InvalidConfiguration(
                "configuration document is empty".to_string(),
            ));
        }
        serde_json::from_value(Value::Object(document))
            .map_err(|e| Error::InvalidConfiguration(e.to_string()))
    }
}

/// Merges suite-level and test-level parameters.
///
/// Test-level entries override global ones on key collision and a missing map
/// counts as empty. The result is always a freshly allocated map; neither
/// input is modified or aliased.
///
/// 合并套件级和测试级参数。键冲突时测试级条目覆盖全局条目，缺失的映射视为空。
/// 结果始终是新分配的映射，不会修改或引用任一输入。
pub fn merge_parameters(global: Option<&Parameters>, test: Option<&Parameters>) -> Parameters {
    let mut merged = global.cloned().unwrap_or_default();
    if let Some(test) = test {
        merged.extend(test.iter().map(|(key, value)| (key.clone(), value.clone())));
    }
    merged
}

/// Normalises a format hint such as `".YML"` into a parser identifier (`"yml"`).
fn normalize_format(hint: &str) -> String {
    hint.trim().trim_start_matches('.').to_ascii_lowercase()
}

/// Parses configuration text through the parser plugins and resolves test
/// parameters.
/// 通过解析器插件解析配置文本并解析测试参数。
#[derive(Debug, Clone)]
pub struct ConfigResolver {
    registry: Arc<PluginRegistry>,
}

impl ConfigResolver {
    pub fn new(registry: Arc<PluginRegistry>) -> Self {
        Self { registry }
    }

    /// See [`merge_parameters`].
    pub fn merge(global: Option<&Parameters>, test: Option<&Parameters>) -> Parameters {
        merge_parameters(global, test)
    }

    /// Decodes `raw` with the parser registered under `format_hint`.
    pub fn parse(&self, raw: &str, format_hint: &str) -> Result<Parameters> {
        let format = normalize_format(format_hint);
        let parser = self
            .registry
            .parser(&format)
            .map_err(|_| Error::UnsupportedFormat {
                format: format.clone(),
            })?;

        debug!(format = %format, bytes = raw.len(), "parsing configuration");
        parser
            .parse(raw)
            .map_err(|source| Error::ParseError { format, source })
    }

    /// Parses `raw` and interprets it as a suite configuration.
    pub fn parse_suite(&self, raw: &str, format_hint: &str) -> Result<TestSuiteConfig> {
        TestSuiteConfig::from_parameters(self.parse(raw, format_hint)?)
    }

    /// Reads a suite file, choosing the parser from its extension.
    /// 读取套件文件，并根据扩展名选择解析器。
    pub fn load_suite(&self, path: &Path) -> Result<TestSuiteConfig> {
        let raw = fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.display().to_string(),
            source,
        })?;
        let format = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default();
        self.parse_suite(&raw, format)
    }

    /// Produces the resolved test list: one immutable [`TestConfig`] per entry,
    /// in configuration order, each with its own merged parameter map.
    pub fn resolve_tests(&self, suite: &TestSuiteConfig) -> Vec<Arc<TestConfig>> {
        suite
            .tests
            .iter()
            .map(|entry| {
                let parameters =
                    merge_parameters(suite.parameters.as_ref(), entry.parameters.as_ref());
                Arc::new(TestConfig::new(
                    entry.name.clone(),
                    entry.plugin_identifier.clone(),
                    parameters,
                ))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params(value: Value) -> Parameters {
        match value {
            Value::Object(map) => map,
            other => panic!("expected an object, got {other}"),
        }
    }

    #[test]
    fn test_entries_override_global_entries() {
        let global = params(json!({"t": 5, "v": 1}));
        let test = params(json!({"t": 10}));
        let merged = merge_parameters(Some(&global), Some(&test));
        assert_eq!(Value::Object(merged), json!({"t": 10, "v": 1}));
    }

    #[test]
    fn missing_maps_count_as_empty() {
        assert!(merge_parameters(None, None).is_empty());
        let global = params(json!({"v": 1}));
        assert_eq!(merge_parameters(Some(&global), None), global);
        assert_eq!(merge_parameters(None, Some(&global)), global);
    }

    #[test]
    fn merged_map_does_not_alias_inputs() {
        let mut global = params(json!({"nested": {"a": 1}}));
        let mut test = params(json!({"b": 2}));
        let merged = merge_parameters(Some(&global), Some(&test));

        global.insert("nested".into(), json!("changed"));
        test.insert("b".into(), json!(3));

        assert_eq!(Value::Object(merged), json!({"nested": {"a": 1}, "b": 2}));
    }

    #[test]
    fn format_hints_are_normalised() {
        assert_eq!(normalize_format(".YML"), "yml");
        assert_eq!(normalize_format(" json "), "json");
    }

    #[test]
    fn strategy_kind_from_str() {
        assert_eq!("Parallel".parse::<StrategyKind>().unwrap(), StrategyKind::Parallel);
        assert!("random".parse::<StrategyKind>().is_err());
    }

    #[test]
    fn retries_wrap_the_base_strategy() {
        let settings = ExecutionSettings {
            strategy: StrategyKind::Parallel,
            max_workers: Some(2),
            retries: 2,
            ..Default::default()
        };
        assert_eq!(settings.build_strategy().unwrap().name(), "retry");

        let settings = ExecutionSettings::default();
        assert_eq!(settings.build_strategy().unwrap().name(), "sequential");
    }

    #[test]
    fn zero_timeout_disables_the_limit() {
        let mut settings = ExecutionSettings {
            timeout_secs: Some(0),
            ..Default::default()
        };
        assert_eq!(settings.timeout(), None);

        settings.timeout_secs = Some(3);
        assert_eq!(settings.timeout(), Some(Duration::from_secs(3)));
    }

    #[test]
    fn empty_document_is_rejected() {
        let err = TestSuiteConfig::from_parameters(Parameters::new()).unwrap_err();
        assert!(matches!(err, Error::InvalidConfiguration(_)));
    }
}
