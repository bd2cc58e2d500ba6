//! # Suite Runner Library / Suite Runner 库
//!
//! A plugin-based, configuration-driven test suite executor. Parsers turn
//! configuration documents into suites, runners execute individual tests,
//! execution strategies decide order and concurrency, and reporters publish
//! the aggregated summary.
//!
//! 一个基于插件、配置驱动的测试套件执行器。解析器将配置文档转换为套件，
//! 运行器执行单个测试，执行策略决定顺序和并发，报告器发布汇总结果。
//!
//! ## Modules / 模块
//!
//! - `core` - Plugin registry, configuration, strategies and the orchestrator
//! - `plugins` - Built-in parser and runner plugins
//! - `reporting` - Built-in reporter plugins
//! - `infra` - Process execution, logging and i18n helpers
//! - `cli` - Command-line interface and commands
//!
//! - `core` - 插件注册表、配置、执行策略和编排器
//! - `plugins` - 内置解析器和运行器插件
//! - `reporting` - 内置报告器插件
//! - `infra` - 进程执行、日志和国际化辅助
//! - `cli` - 命令行接口和命令

pub mod cli;
pub mod core;
pub mod infra;
pub mod plugins;
pub mod reporting;

// Re-export commonly used items
pub use crate::core::{
    ConfigResolver, Error, ExecutionStrategy, Parameters, Plugin, PluginRegistry, Result,
    TestConfig, TestResult, TestSuiteConfig, TestSuiteOrchestrator, TestSuiteSummary,
};

/// Selects the UI language, matching the full locale first (e.g. "zh-CN"),
/// then just the language code (e.g. "zh"), and finally falling back to "en".
///
/// 选择界面语言：先匹配完整区域（如 "zh-CN"），再匹配语言代码，最后回退到 "en"。
pub fn set_language(locale: &str) {
    let available_locales = rust_i18n::available_locales!();

    let lang = if available_locales.contains(&locale) {
        locale
    } else {
        let code = locale.split(['-', '_']).next().unwrap_or_default();
        available_locales
            .iter()
            .copied()
            .find(|available| *available == code || available.starts_with(&format!("{code}-")))
            .unwrap_or("en")
    };

    rust_i18n::set_locale(lang);
}

// Initialize i18n
rust_i18n::i18n!("locales", fallback = "en");
