//! # Built-in Plugins Module / 内置插件模块
//!
//! The plugins every registry starts with. They are registered before any
//! externally supplied plugin, so their identifiers cannot be taken over.
//!
//! 每个注册表初始包含的插件。它们先于任何外部插件注册，因此其标识符不会被占用。

pub mod params;
pub mod parsers;
pub mod runners;
pub mod system;

use crate::core::models::PluginMetadata;
use crate::core::plugin::Plugin;
use crate::reporting::{console::ConsoleReporter, html::HtmlReporter, json::JsonReporter};

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Returns the built-in plugins in registration order: parsers, the command
/// and system runners, then reporters.
/// 按注册顺序返回内置插件：解析器、命令和系统运行器，然后是报告器。
pub fn builtin_plugins() -> Vec<Plugin> {
    vec![
        Plugin::parser(
            PluginMetadata::new("json-parser", VERSION, "Parses JSON configuration documents"),
            ["json"],
            parsers::parse_json,
        ),
        Plugin::parser(
            PluginMetadata::new("yaml-parser", VERSION, "Parses YAML configuration documents"),
            ["yaml", "yml"],
            parsers::parse_yaml,
        ),
        Plugin::parser(
            PluginMetadata::new("toml-parser", VERSION, "Parses TOML configuration documents"),
            ["toml"],
            parsers::parse_toml,
        ),
        Plugin::runner(
            PluginMetadata::new(
                "command-runner",
                VERSION,
                "Runs a shell-style command and checks its exit code and output",
            ),
            ["command"],
            runners::CommandRunner,
        ),
        Plugin::runner(
            PluginMetadata::new(
                "system-runner",
                VERSION,
                "Checks CPU, memory and disk usage against thresholds",
            ),
            ["system"],
            system::SystemRunner::new(),
        ),
        Plugin::reporter(
            PluginMetadata::new("console-reporter", VERSION, "Prints results to the terminal"),
            ["console"],
            ConsoleReporter,
        ),
        Plugin::reporter(
            PluginMetadata::new("json-reporter", VERSION, "Writes the summary as a JSON file"),
            ["json"],
            JsonReporter,
        ),
        Plugin::reporter(
            PluginMetadata::new("html-reporter", VERSION, "Writes a standalone HTML report"),
            ["html"],
            HtmlReporter,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::PluginKind;

    #[test]
    fn builtins_cover_every_kind() {
        let plugins = builtin_plugins();
        for kind in PluginKind::ALL {
            assert!(plugins.iter().any(|p| p.kind() == kind), "no built-in {kind}");
        }
        let yaml = plugins
            .iter()
            .find(|p| p.metadata.name == "yaml-parser")
            .unwrap();
        assert_eq!(yaml.identifiers().collect::<Vec<_>>(), ["yaml", "yml"]);
        assert!(plugins.iter().any(|p| p.identifiers().any(|id| id == "system")));
    }
}
