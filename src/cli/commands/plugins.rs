//! # Plugins Command Module / 插件命令模块
//!
//! Lists every registered plugin, grouped by capability kind.
//! 按能力类型分组列出所有已注册的插件。

use anyhow::{Context, Result};
use colored::*;

use crate::core::{models::PluginKind, registry::PluginRegistry};
use crate::infra::t;

/// Renders the plugin listing for `registry`.
pub fn render(registry: &PluginRegistry) -> String {
    let mut out = String::new();
    for kind in PluginKind::ALL {
        out.push_str(&format!("{}\n", t!("plugins.kind_header", kind = kind).bold()));
        for plugin in registry.plugins(kind) {
            let identifiers = plugin.identifiers().collect::<Vec<_>>().join(", ");
            out.push_str(&format!(
                "  - {} {} [{}]\n",
                plugin.metadata.name.cyan(),
                format!("v{}", plugin.metadata.version).dimmed(),
                identifiers
            ));
            if !plugin.metadata.description.is_empty() {
                out.push_str(&format!("      {}\n", plugin.metadata.description));
            }
        }
    }
    out
}

pub fn execute() -> Result<()> {
    let registry = PluginRegistry::with_plugins(Vec::new()).with_context(|| t!("run.registry_failed").to_string())?;
    print!("{}", render(&registry));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listing_shows_builtin_identifiers() {
        colored::control::set_override(false);
        let registry = PluginRegistry::with_plugins(Vec::new()).unwrap();
        let out = render(&registry);
        assert!(out.contains("[yaml, yml]"));
        assert!(out.contains("command-runner"));
        assert!(out.contains("html-reporter"));
    }
}
