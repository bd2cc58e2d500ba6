//! # Data Models Module / 数据模型模块
//!
//! This module defines the core data structures shared by the registry, the
//! execution strategies and the reporters: plugin descriptors, resolved test
//! configurations and the tagged test result.
//!
//! 此模块定义了注册表、执行策略和报告器共享的核心数据结构：
//! 插件描述、已解析的测试配置以及带标签的测试结果。

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// A parameter map as it appears in configuration documents.
/// 配置文档中出现的参数映射。
pub type Parameters = serde_json::Map<String, Value>;

/// The three capability kinds a plugin can provide.
/// 插件可以提供的三种能力类型。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PluginKind {
    /// Turns raw configuration text into a structured map.
    /// 将原始配置文本转换为结构化映射。
    Parser,
    /// Executes a single test from its merged parameters.
    /// 根据合并后的参数执行单个测试。
    Runner,
    /// Consumes the final summary.
    /// 消费最终的摘要。
    Reporter,
}

impl PluginKind {
    pub const ALL: [PluginKind; 3] = [PluginKind::Parser, PluginKind::Runner, PluginKind::Reporter];

    pub fn as_str(&self) -> &'static str {
        match self {
            PluginKind::Parser => "parser",
            PluginKind::Runner => "runner",
            PluginKind::Reporter => "reporter",
        }
    }
}

impl fmt::Display for PluginKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Descriptive information about a plugin. Plays no role in lookups.
/// 插件的描述信息，不参与查找。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginMetadata {
    pub name: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub description: String,
}

impl PluginMetadata {
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            description: description.into(),
        }
    }
}

/// The fully resolved configuration of one test: its name, the runner plugin
/// it targets and its merged parameters. Immutable once constructed.
///
/// 单个测试的完整解析配置：名称、目标运行器插件以及合并后的参数。构造后不可变。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestConfig {
    name: String,
    plugin_identifier: String,
    #[serde(default)]
    parameters: Parameters,
}

impl TestConfig {
    pub fn new(
        name: impl Into<String>,
        plugin_identifier: impl Into<String>,
        parameters: Parameters,
    ) -> Self {
        Self {
            name: name.into(),
            plugin_identifier: plugin_identifier.into(),
            parameters,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn plugin_identifier(&self) -> &str {
        &self.plugin_identifier
    }

    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }
}

/// One named check inside a test result.
/// 测试结果中的一个命名检查项。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestDetails {
    pub expected: Value,
    pub actual: Value,
    pub success: bool,
}

impl TestDetails {
    pub fn new(expected: impl Into<Value>, actual: impl Into<Value>, success: bool) -> Self {
        Self {
            expected: expected.into(),
            actual: actual.into(),
            success,
        }
    }
}

/// Named check details keyed by check name.
pub type DetailMap = BTreeMap<String, TestDetails>;

/// The discriminant of a [`TestResult`].
/// [`TestResult`] 的判别值。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultStatus {
    Passed,
    Failed,
    Skipped,
}

impl ResultStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResultStatus::Passed => "passed",
            ResultStatus::Failed => "failed",
            ResultStatus::Skipped => "skipped",
        }
    }
}

impl fmt::Display for ResultStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Represents the outcome of a single test execution.
/// The variant is fixed at construction; the builder methods below only attach
/// a message or details and always keep the variant.
///
/// 表示单个测试执行的结果。
/// 变体在构造时确定；下面的构建方法只附加消息或详情，始终保持变体不变。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum TestResult {
    /// The test ran and all of its checks succeeded.
    /// 测试已运行且所有检查均成功。
    Passed {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        details: Option<DetailMap>,
    },
    /// The test ran and at least one check failed, or it could not complete.
    /// 测试已运行但至少一项检查失败，或无法完成。
    Failed {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        details: Option<DetailMap>,
    },
    /// The test was not run (missing runner plugin, cancellation, or the
    /// runner itself decided to skip).
    /// 测试未运行（缺少运行器插件、被取消或运行器自行决定跳过）。
    Skipped {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        details: Option<DetailMap>,
    },
}

impl TestResult {
    pub fn passed() -> Self {
        TestResult::Passed {
            message: None,
            details: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        TestResult::Failed {
            message: Some(message.into()),
            details: None,
        }
    }

    pub fn skipped(message: impl Into<String>) -> Self {
        TestResult::Skipped {
            message: Some(message.into()),
            details: None,
        }
    }

    /// Replaces the message, keeping the variant.
    pub fn with_message(mut self, new_message: impl Into<String>) -> Self {
        match &mut self {
            TestResult::Passed { message, .. }
            | TestResult::Failed { message, .. }
            | TestResult::Skipped { message, .. } => *message = Some(new_message.into()),
        }
        self
    }

    /// Replaces the check details, keeping the variant.
    pub fn with_details(mut self, new_details: DetailMap) -> Self {
        match &mut self {
            TestResult::Passed { details, .. }
            | TestResult::Failed { details, .. }
            | TestResult::Skipped { details, .. } => *details = Some(new_details),
        }
        self
    }

    pub fn status(&self) -> ResultStatus {
        match self {
            TestResult::Passed { .. } => ResultStatus::Passed,
            TestResult::Failed { .. } => ResultStatus::Failed,
            TestResult::Skipped { .. } => ResultStatus::Skipped,
        }
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            TestResult::Passed { message, .. }
            | TestResult::Failed { message, .. }
            | TestResult::Skipped { message, .. } => message.as_deref(),
        }
    }

    pub fn details(&self) -> Option<&DetailMap> {
        match self {
            TestResult::Passed { details, .. }
            | TestResult::Failed { details, .. }
            | TestResult::Skipped { details, .. } => details.as_ref(),
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, TestResult::Failed { .. })
    }

    pub fn is_passed(&self) -> bool {
        matches!(self, TestResult::Passed { .. })
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, TestResult::Skipped { .. })
    }
}

impl fmt::Display for TestResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.message() {
            Some(message) => write!(f, "{}: {}", self.status(), message),
            None => write!(f, "{}", self.status()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn builders_keep_the_variant() {
        let result = TestResult::failed("boom").with_message("still failing");
        assert_eq!(result.status(), ResultStatus::Failed);
        assert_eq!(result.message(), Some("still failing"));

        let mut details = DetailMap::new();
        details.insert("cpu".into(), TestDetails::new(json!(50), json!(75), false));
        let result = TestResult::passed().with_details(details);
        assert!(result.is_passed());
        assert_eq!(result.details().map(|d| d.len()), Some(1));
    }

    #[test]
    fn results_serialize_with_a_status_tag() {
        let value = serde_json::to_value(TestResult::skipped("no runner")).unwrap();
        assert_eq!(value, json!({"status": "skipped", "message": "no runner"}));

        let parsed: TestResult = serde_json::from_value(json!({"status": "passed"})).unwrap();
        assert_eq!(parsed, TestResult::passed());
    }

    #[test]
    fn display_includes_message_when_present() {
        assert_eq!(TestResult::passed().to_string(), "passed");
        assert_eq!(TestResult::failed("exit 2").to_string(), "failed: exit 2");
    }
}
