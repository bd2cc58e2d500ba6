//! # Run Command Module / 运行命令模块
//!
//! This module implements the `run` command for the Suite Runner CLI,
//! which loads a suite file and executes it with the configured strategy.
//!
//! 此模块实现了 Suite Runner CLI 的 `run` 命令，
//! 加载套件文件并使用配置的策略执行。

use anyhow::{Context, Result};
use colored::*;
use std::{path::PathBuf, process::ExitCode, sync::Arc};
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::{
    core::{
        config::{ConfigResolver, ExecutionSettings, StrategyKind},
        orchestrator::TestSuiteOrchestrator,
        registry::PluginRegistry,
    },
    infra::t,
    reporting::console::status_line,
};

/// Command-line overrides for a suite's `execution` section.
/// 对套件 `execution` 部分的命令行覆盖。
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub config: PathBuf,
    pub jobs: Option<usize>,
    pub strategy: Option<StrategyKind>,
    pub retries: Option<u32>,
    pub timeout_secs: Option<u64>,
}

impl RunOptions {
    /// Applies every flag that was given on top of the file's settings.
    pub fn apply(&self, settings: &mut ExecutionSettings) {
        if let Some(strategy) = self.strategy {
            settings.strategy = strategy;
        }
        if let Some(jobs) = self.jobs {
            settings.max_workers = Some(jobs);
        }
        if let Some(retries) = self.retries {
            settings.retries = retries;
        }
        if let Some(timeout) = self.timeout_secs {
            settings.timeout_secs = Some(timeout);
        }
    }
}

/// Executes the run command.
///
/// # Returns
/// `ExitCode::FAILURE` when at least one test failed, `ExitCode::SUCCESS`
/// otherwise. Fatal errors (unreadable config, unrecoverable test errors)
/// are returned as `Err`.
pub async fn execute(options: RunOptions) -> Result<ExitCode> {
    let registry = Arc::new(
        PluginRegistry::with_plugins(Vec::new()).with_context(|| t!("run.registry_failed").to_string())?,
    );

    let resolver = ConfigResolver::new(Arc::clone(&registry));
    let mut suite = resolver
        .load_suite(&options.config)
        .with_context(|| t!("run.config_load_failed", path = options.config.display()).to_string())?;
    options.apply(&mut suite.execution);

    println!(
        "{}",
        t!("run.loading_suite", path = options.config.display())
    );

    let strategy = suite.execution.build_strategy()?;
    let orchestrator = TestSuiteOrchestrator::new(registry)
        .with_strategy(strategy)
        .with_test_timeout(suite.execution.timeout())
        .with_cancellation(setup_signal_handler());

    println!(
        "{}",
        t!(
            "run.starting",
            count = suite.tests.len(),
            strategy = orchestrator.strategy().name()
        )
        .bold()
    );

    let summary = orchestrator
        .run(&suite)
        .await
        .with_context(|| t!("run.execution_failed").to_string())?;

    println!();
    for entry in &summary.results {
        println!("{}", status_line(entry));
    }

    let tally = t!(
        "run.tally",
        passed = summary.passed(),
        failed = summary.failed(),
        skipped = summary.skipped()
    );
    if summary.has_failures() {
        println!("\n{}", tally.red().bold());
        Ok(ExitCode::FAILURE)
    } else {
        println!("\n{}", tally.green().bold());
        Ok(ExitCode::SUCCESS)
    }
}

/// Sets up a signal handler for graceful shutdown.
fn setup_signal_handler() -> CancellationToken {
    let token = CancellationToken::new();
    let token_clone = token.clone();

    tokio::spawn(async move {
        match signal::ctrl_c().await {
            Ok(()) => {
                println!("\n{}", t!("run.shutdown_signal").yellow());
                token_clone.cancel();
            }
            Err(e) => warn!(error = %e, "failed to listen for Ctrl-C"),
        }
    });

    token
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_file_settings() {
        let mut settings = ExecutionSettings {
            strategy: StrategyKind::Grouped,
            retries: 1,
            timeout_secs: Some(30),
            ..Default::default()
        };
        let options = RunOptions {
            strategy: Some(StrategyKind::Parallel),
            jobs: Some(4),
            retries: Some(0),
            ..Default::default()
        };
        options.apply(&mut settings);

        assert_eq!(settings.strategy, StrategyKind::Parallel);
        assert_eq!(settings.max_workers, Some(4));
        assert_eq!(settings.retries, 0);
        // Not given on the command line, so the file value stays.
        assert_eq!(settings.timeout_secs, Some(30));
    }
}
