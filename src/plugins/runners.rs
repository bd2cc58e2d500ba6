//! # Command Runner / 命令运行器
//!
//! Runs a configured command line as a child process and checks its exit code
//! and, optionally, its output.
//!
//! 将配置的命令行作为子进程运行，并检查其退出码以及（可选的）输出。

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use serde_json::json;
use std::path::Path;
use tracing::debug;

use crate::core::models::{DetailMap, Parameters, TestDetails, TestResult};
use crate::core::plugin::TestRunner;
use crate::infra::command::{prepare_command, spawn_and_capture};
use crate::plugins::params::{int_param, str_param};

/// Runner registered as `command`.
///
/// | parameter            | meaning                                          |
/// |----------------------|--------------------------------------------------|
/// | `command`            | command line to run (required)                   |
/// | `working_dir`        | directory to run it in                           |
/// | `expected_exit_code` | exit code that counts as success, default `0`    |
/// | `expected_output`    | text that must appear in stdout or stderr        |
#[derive(Debug, Clone, Copy, Default)]
pub struct CommandRunner;

#[async_trait]
impl TestRunner for CommandRunner {
    async fn run(&self, parameters: &Parameters) -> Result<TestResult> {
        let command_line = str_param(parameters, "command")?
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| anyhow!("the command runner needs a non-empty 'command' parameter"))?;
        let working_dir = str_param(parameters, "working_dir")?.map(Path::new);
        let expected_code = int_param(parameters, "expected_exit_code", 0)?;
        let expected_output = str_param(parameters, "expected_output")?;

        let (cmd, expanded) = prepare_command(command_line, working_dir)?;
        debug!(command = %expanded, "spawning test command");

        let (status, output) = spawn_and_capture(cmd).await;
        let status = status.with_context(|| format!("Failed to run command: {expanded}"))?;

        let actual_code = status.code();
        let code_ok = actual_code.is_some_and(|code| i64::from(code) == expected_code);

        let mut details = DetailMap::new();
        details.insert(
            "exit_code".to_string(),
            TestDetails::new(json!(expected_code), json!(actual_code), code_ok),
        );

        let output_ok = match expected_output {
            Some(needle) => {
                let found = output.contains(needle);
                details.insert(
                    "output".to_string(),
                    TestDetails::new(json!(needle), json!(output.trim_end()), found),
                );
                found
            }
            None => true,
        };

        let result = if code_ok && output_ok {
            TestResult::passed()
        } else if !code_ok {
            let actual = actual_code.map_or_else(|| "none (terminated by signal)".to_string(), |c| c.to_string());
            TestResult::failed(format!(
                "command exited with code {actual}, expected {expected_code}"
            ))
        } else {
            TestResult::failed(format!(
                "command output did not contain {:?}",
                expected_output.unwrap_or_default()
            ))
        };

        Ok(result.with_details(details))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn params(value: Value) -> Parameters {
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[tokio::test]
    async fn missing_command_is_an_error() {
        let err = CommandRunner.run(&Parameters::new()).await.unwrap_err();
        assert!(err.to_string().contains("command"));

        let err = CommandRunner.run(&params(json!({"command": "   "}))).await;
        assert!(err.is_err());
    }

    #[tokio::test]
    async fn wrongly_typed_parameters_are_errors() {
        let err = CommandRunner
            .run(&params(json!({"command": "true", "expected_exit_code": "zero"})))
            .await;
        assert!(err.is_err());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn exit_code_and_output_are_checked() {
        let result = CommandRunner
            .run(&params(json!({"command": "echo hello", "expected_output": "hello"})))
            .await
            .unwrap();
        assert!(result.is_passed(), "{result}");
        let details = result.details().unwrap();
        assert!(details["exit_code"].success);
        assert!(details["output"].success);

        let result = CommandRunner
            .run(&params(json!({"command": "sh -c 'exit 3'"})))
            .await
            .unwrap();
        assert!(result.is_failure());
        assert!(result.message().unwrap().contains("code 3"));

        let result = CommandRunner
            .run(&params(json!({"command": "sh -c 'exit 3'", "expected_exit_code": 3})))
            .await
            .unwrap();
        assert!(result.is_passed());
    }
}
