//! # Reporting Module / 报告模块
//!
//! The built-in reporter plugins: a coloured console report, a JSON file and
//! a standalone HTML page.
//!
//! 内置报告器插件：彩色控制台报告、JSON 文件和独立的 HTML 页面。

pub mod console;
pub mod html;
pub mod json;

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use crate::core::models::ResultStatus;
use crate::infra::t;

/// The localised label for a result status.
/// 结果状态的本地化标签。
pub fn status_label(status: ResultStatus) -> String {
    match status {
        ResultStatus::Passed => t!("status.passed").to_string(),
        ResultStatus::Failed => t!("status.failed").to_string(),
        ResultStatus::Skipped => t!("status.skipped").to_string(),
    }
}

/// Writes `contents` to `path`, creating missing parent directories.
pub(crate) fn write_report(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    fs::write(path, contents).with_context(|| format!("Failed to write report to {}", path.display()))
}
