//! # Init Command Module / 初始化命令模块
//!
//! This module implements the `init` command for the Suite Runner CLI,
//! which writes a starter suite configuration file.
//!
//! 此模块实现了 Suite Runner CLI 的 `init` 命令，
//! 用于写入一个初始套件配置文件。

use anyhow::{Context, Result, bail};
use colored::*;
use std::{fs, path::Path};

use crate::infra::t;

pub const DEFAULT_CONFIG: &str = r#"# Suite Runner configuration / 套件运行器配置

# Parameters shared by every test; a test's own parameters win on conflict.
# 所有测试共享的参数；测试自身的参数在冲突时优先。
parameters:
  expected_exit_code: 0

# Test definitions / 测试定义
tests:
  - name: hello
    plugin_identifier: command
    parameters:
      command: echo hello
      expected_output: hello

  - name: home-directory
    plugin_identifier: command
    parameters:
      # Environment variables and ~ are expanded / 支持环境变量和 ~ 展开
      command: ls ~
      # Optional per-test timeout in seconds / 可选的单个测试超时（秒）
      timeout_secs: 10

  - name: host-resources
    plugin_identifier: system
    parameters:
      # Usage must stay below each threshold (percent, default 80)
      # 使用率必须低于各阈值（百分比，默认 80）
      memory:
        threshold: 95
      disk:
        path: /
        threshold: 95

# How the tests are executed / 测试的执行方式
execution:
  strategy: sequential # sequential | parallel | grouped
  # max_workers: 4
  # groups:
  #   - name: smoke
  #     tests: [hello]
  retries: 0
  # timeout_secs: 60

# Reporters run after all tests finish / 所有测试完成后运行的报告器
reports:
  - plugin_identifier: console
    parameters:
      format: table # table | list
      show_details: true
  - plugin_identifier: html
    parameters:
      path: suite_report.html
"#;

/// Writes [`DEFAULT_CONFIG`] to `output`.
///
/// # Arguments
/// * `output` - Path for the new configuration file
/// * `force` - Whether to overwrite an existing file
pub fn execute(output: &Path, force: bool) -> Result<()> {
    if output.exists() && !force {
        println!("{}", t!("init.use_force").yellow());
        bail!("{}", t!("init.file_exists", path = output.display()));
    }

    // Create parent directories if needed
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        if !parent.exists() {
            fs::create_dir_all(parent).with_context(|| {
                t!("init.create_parent_dir_failed", path = parent.display()).to_string()
            })?;
        }
    }

    fs::write(output, DEFAULT_CONFIG)
        .with_context(|| t!("init.write_failed", path = output.display()).to_string())?;

    println!("{}", t!("init.success", path = output.display()).green());
    println!("{}", t!("init.next_steps", path = output.display()));

    Ok(())
}
