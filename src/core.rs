//! # Core Module / 核心模块
//!
//! This module contains the execution engine of Suite Runner: the plugin
//! contracts and registry, configuration resolution, execution strategies,
//! the suite orchestrator and result aggregation.
//!
//! 此模块包含 Suite Runner 的执行引擎：插件契约与注册表、配置解析、
//! 执行策略、套件编排器以及结果汇总。

pub mod config;
pub mod error;
pub mod models;
pub mod orchestrator;
pub mod plugin;
pub mod registry;
pub mod strategy;
pub mod summary;

// Re-exports
pub use config::{ConfigResolver, TestSuiteConfig};
pub use error::{Error, Result};
pub use models::{Parameters, PluginKind, PluginMetadata, TestConfig, TestResult};
pub use orchestrator::TestSuiteOrchestrator;
pub use plugin::{ConfigParser, FnRunner, Plugin, Reporter, TestRunner};
pub use registry::PluginRegistry;
pub use strategy::{
    ExecutionStrategy, GroupedStrategy, ParallelStrategy, RetryStrategy, RunOne,
    SequentialStrategy,
};
pub use summary::{ResultAggregator, TestSuiteSummary};
