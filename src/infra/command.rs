//! # Command Execution Module / 命令执行模块
//!
//! Helpers for turning a configured command line into a child process and
//! capturing everything it prints.
//!
//! 将配置的命令行转换为子进程并捕获其全部输出的辅助函数。

use anyhow::{Context, Result, anyhow};
use std::path::Path;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::warn;

/// Expands environment variables and `~` in `command_line`, then splits it
/// into a program and its arguments using shell quoting rules.
///
/// The child is killed if the returned command's future is dropped, so a
/// timed-out or cancelled test never leaves a process behind.
///
/// 展开 `command_line` 中的环境变量和 `~`，然后按 shell 引号规则拆分为程序和参数。
/// 如果返回命令的 future 被丢弃，子进程会被终止。
pub fn prepare_command(
    command_line: &str,
    working_dir: Option<&Path>,
) -> Result<(tokio::process::Command, String)> {
    let expanded = shellexpand::full(command_line)
        .with_context(|| format!("Failed to expand command: {command_line}"))?
        .to_string();

    let parts = shlex::split(&expanded)
        .ok_or_else(|| anyhow!("Failed to parse command: {expanded}"))?;
    let (program, args) = parts
        .split_first()
        .ok_or_else(|| anyhow!("Empty command after parsing."))?;

    let mut cmd = tokio::process::Command::new(program);
    cmd.args(args).kill_on_drop(true);
    if let Some(dir) = working_dir {
        cmd.current_dir(dir);
    }
    Ok((cmd, expanded))
}

/// Spawns a command, captures its stdout and stderr.
/// The output streams are read concurrently and combined into a single string.
///
/// # Returns
/// A tuple containing:
/// - The `ExitStatus` of the process wrapped in an `io::Result`.
/// - The combined stdout and stderr as a `String`.
///
/// 派生一个命令，捕获其 stdout 和 stderr。
/// 输出流被并发读取并合并到一个字符串中。
pub async fn spawn_and_capture(
    mut cmd: tokio::process::Command,
) -> (std::io::Result<std::process::ExitStatus>, String) {
    let mut child = match cmd
        .stdout(std::process::Stdio::piped())
        .stderr(std::process::Stdio::piped())
        .spawn()
    {
        Ok(child) => child,
        Err(e) => return (Err(e), String::new()),
    };

    let (Some(stdout), Some(stderr)) = (child.stdout.take(), child.stderr.take()) else {
        return (
            Err(std::io::Error::other("failed to capture child output")),
            String::new(),
        );
    };

    // Both readers append to the same buffer, line by line.
    // 两个读取任务逐行追加到同一个缓冲区。
    let output = Arc::new(tokio::sync::Mutex::new(String::new()));

    let stdout_output = Arc::clone(&output);
    let stdout_handle = tokio::spawn(async move {
        let mut lines = BufReader::new(stdout).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            let mut output = stdout_output.lock().await;
            output.push_str(&line);
            output.push('\n');
        }
    });

    let stderr_output = Arc::clone(&output);
    let stderr_handle = tokio::spawn(async move {
        let mut lines = BufReader::new(stderr).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            let mut output = stderr_output.lock().await;
            output.push_str(&line);
            output.push('\n');
        }
    });

    let status = child.wait().await;

    // Drain both readers so no trailing output is lost.
    // 等待两个读取任务结束，避免丢失末尾输出。
    if let Err(e) = stdout_handle.await {
        warn!(error = %e, "failed to join stdout reader");
    }
    if let Err(e) = stderr_handle.await {
        warn!(error = %e, "failed to join stderr reader");
    }

    let captured = output.lock().await.clone();
    (status, captured)
}
