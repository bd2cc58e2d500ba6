//! # System Runner / 系统资源运行器
//!
//! Checks host resource usage against thresholds. Each configured section
//! (`cpu`, `memory`, `disk`) becomes one check, and a check succeeds only
//! while usage stays below its threshold.
//!
//! 根据阈值检查主机资源使用情况。每个配置的部分（`cpu`、`memory`、`disk`）
//! 对应一个检查项，只有当使用率低于阈值时检查才算成功。

use anyhow::{Context, Result, anyhow, bail};
use async_trait::async_trait;
use serde_json::{Value, json};
use std::path::{Path, PathBuf};
use sysinfo::{Disks, MINIMUM_CPU_UPDATE_INTERVAL, System};
use tracing::debug;

use crate::core::models::{DetailMap, Parameters, TestDetails, TestResult};
use crate::core::plugin::TestRunner;
use crate::plugins::params::str_param;

/// Usage percentage a check must stay below when no `threshold` is given.
pub const DEFAULT_THRESHOLD: f64 = 80.0;

/// Source of usage percentages in the range `0..=100`.
#[async_trait]
pub trait MetricsSource: Send + Sync {
    async fn cpu_percent(&self) -> Result<f64>;
    async fn memory_percent(&self) -> Result<f64>;
    /// Usage of the filesystem that holds `path`.
    async fn disk_percent(&self, path: &Path) -> Result<f64>;
}

/// Reads live metrics from the host through `sysinfo`.
#[derive(Debug, Clone, Copy, Default)]
pub struct HostMetrics;

#[async_trait]
impl MetricsSource for HostMetrics {
    async fn cpu_percent(&self) -> Result<f64> {
        // Usage is a delta between two refreshes.
        let mut system = System::new();
        system.refresh_cpu_usage();
        tokio::time::sleep(MINIMUM_CPU_UPDATE_INTERVAL).await;
        system.refresh_cpu_usage();
        Ok(round_percent(f64::from(system.global_cpu_usage())))
    }

    async fn memory_percent(&self) -> Result<f64> {
        let mut system = System::new();
        system.refresh_memory();
        let total = system.total_memory();
        if total == 0 {
            bail!("total memory of the host is unknown");
        }
        Ok(round_percent(system.used_memory() as f64 / total as f64 * 100.0))
    }

    async fn disk_percent(&self, path: &Path) -> Result<f64> {
        let path = path.to_path_buf();
        tokio::task::spawn_blocking(move || disk_usage(path)).await?
    }
}

fn disk_usage(path: PathBuf) -> Result<f64> {
    let path = path
        .canonicalize()
        .with_context(|| format!("cannot resolve disk path {}", path.display()))?;
    let disks = Disks::new_with_refreshed_list();
    let disk = disks
        .list()
        .iter()
        .filter(|disk| path.starts_with(disk.mount_point()))
        .max_by_key(|disk| disk.mount_point().as_os_str().len())
        .ok_or_else(|| anyhow!("no mounted disk contains {}", path.display()))?;

    let total = disk.total_space();
    if total == 0 {
        bail!("disk mounted at {} reports no capacity", disk.mount_point().display());
    }
    let used = total.saturating_sub(disk.available_space());
    Ok(round_percent(used as f64 / total as f64 * 100.0))
}

fn round_percent(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Runner registered as `system`.
///
/// | parameter        | meaning                                             |
/// |------------------|-----------------------------------------------------|
/// | `cpu`            | `{threshold}`: CPU usage limit in percent           |
/// | `memory`         | `{threshold}`: memory usage limit in percent        |
/// | `disk`           | `{path, threshold}`: usage limit for `path`'s disk  |
///
/// Thresholds default to [`DEFAULT_THRESHOLD`]. Absent or empty sections
/// are not checked. With no checks at all the test is skipped.
#[derive(Debug, Clone, Default)]
pub struct SystemRunner<M = HostMetrics> {
    metrics: M,
}

impl SystemRunner {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<M: MetricsSource> SystemRunner<M> {
    pub fn with_metrics(metrics: M) -> Self {
        Self { metrics }
    }
}

#[async_trait]
impl<M: MetricsSource> TestRunner for SystemRunner<M> {
    async fn run(&self, parameters: &Parameters) -> Result<TestResult> {
        let mut details = DetailMap::new();

        if let Some(section) = check_section(parameters, "cpu")? {
            let (expected, limit) = threshold(section, "cpu")?;
            let actual = self.metrics.cpu_percent().await?;
            details.insert("cpu".into(), TestDetails::new(expected, json!(actual), actual < limit));
        }

        if let Some(section) = check_section(parameters, "memory")? {
            let (expected, limit) = threshold(section, "memory")?;
            let actual = self.metrics.memory_percent().await?;
            details.insert("memory".into(), TestDetails::new(expected, json!(actual), actual < limit));
        }

        if let Some(section) = check_section(parameters, "disk")? {
            let (expected, limit) = threshold(section, "disk")?;
            let path = str_param(section, "path")?
                .ok_or_else(|| anyhow!("the disk check needs a 'path' parameter"))?;
            let actual = self.metrics.disk_percent(Path::new(path)).await?;
            details.insert("disk".into(), TestDetails::new(expected, json!(actual), actual < limit));
        }

        if details.is_empty() {
            return Ok(TestResult::skipped("no system checks configured"));
        }

        let exceeded: Vec<&str> = details
            .iter()
            .filter(|(_, check)| !check.success)
            .map(|(name, _)| name.as_str())
            .collect();
        debug!(checks = details.len(), exceeded = ?exceeded, "system checks sampled");

        let result = if exceeded.is_empty() {
            TestResult::passed()
        } else {
            TestResult::failed(format!("usage reached the threshold for: {}", exceeded.join(", ")))
        };
        Ok(result.with_details(details))
    }
}

/// A check section; absent, `null` and empty maps all mean "not configured".
fn check_section<'a>(parameters: &'a Parameters, key: &str) -> Result<Option<&'a Parameters>> {
    match parameters.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Object(section)) if section.is_empty() => Ok(None),
        Some(Value::Object(section)) => Ok(Some(section)),
        Some(other) => Err(anyhow!("parameter '{key}' must be a map, got {other}")),
    }
}

/// The configured threshold as written, plus its numeric value.
fn threshold(section: &Parameters, check: &str) -> Result<(Value, f64)> {
    match section.get("threshold") {
        None | Some(Value::Null) => Ok((json!(DEFAULT_THRESHOLD), DEFAULT_THRESHOLD)),
        Some(value) => value
            .as_f64()
            .map(|limit| (value.clone(), limit))
            .ok_or_else(|| anyhow!("'{check}.threshold' must be a number, got {value}")),
    }
}
