//! # Plugin Registry Module / 插件注册表模块
//!
//! Holds, per capability kind, the mapping from identifier to plugin.
//! The registry is populated during a discovery phase (built-ins first, then
//! externally supplied plugins) and is shared read-only afterwards, typically
//! behind an `Arc`. Registration is first-registered-wins: a later plugin that
//! reuses an identifier is rejected, never silently overriding the earlier one.
//!
//! 按能力类型保存从标识符到插件的映射。
//! 注册表在发现阶段填充（先内置插件，后外部插件），之后以只读方式共享。
//! 注册遵循"先注册者优先"：重复使用标识符的后续插件会被拒绝。

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::debug;

use crate::core::error::{Error, Result};
use crate::core::models::PluginKind;
use crate::core::plugin::{ConfigParser, Plugin, Reporter, TestRunner};

#[derive(Debug, Default)]
pub struct PluginRegistry {
    plugins: BTreeMap<PluginKind, HashMap<String, Arc<Plugin>>>,
    /// Registration order, used for deterministic listing.
    order: Vec<Arc<Plugin>>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a registry from the built-in plugins followed by `external`.
    /// 先注册内置插件，再注册 `external` 中的插件。
    pub fn with_plugins(external: impl IntoIterator<Item = Plugin>) -> Result<Self> {
        let mut registry = Self::new();
        registry.register_all(crate::plugins::builtin_plugins())?;
        registry.register_all(external)?;
        Ok(registry)
    }

    /// Registers `plugin` under every one of its identifiers.
    ///
    /// All identifiers are checked before anything is inserted, so a rejected
    /// plugin leaves the registry exactly as it was.
    pub fn register(&mut self, plugin: Plugin) -> Result<()> {
        let kind = plugin.kind();
        if plugin.identifiers().next().is_none() {
            return Err(Error::InvalidConfiguration(format!(
                "{kind} plugin '{}' declares no identifiers",
                plugin.metadata.name
            )));
        }
        let table = self.plugins.entry(kind).or_default();

        if let Some(taken) = plugin.identifiers().find(|id| table.contains_key(*id)) {
            return Err(Error::DuplicateIdentifier {
                kind,
                identifier: taken.to_string(),
            });
        }

        let plugin = Arc::new(plugin);
        for identifier in plugin.identifiers() {
            table.insert(identifier.to_string(), Arc::clone(&plugin));
        }
        debug!(
            kind = %kind,
            plugin = %plugin.metadata.name,
            identifiers = ?plugin.identifiers().collect::<Vec<_>>(),
            "registered plugin"
        );
        self.order.push(plugin);
        Ok(())
    }

    /// Registers plugins in iteration order, stopping at the first conflict.
    pub fn register_all(&mut self, plugins: impl IntoIterator<Item = Plugin>) -> Result<()> {
        plugins.into_iter().try_for_each(|plugin| self.register(plugin))
    }

    pub fn get(&self, kind: PluginKind, identifier: &str) -> Result<Arc<Plugin>> {
        self.plugins
            .get(&kind)
            .and_then(|table| table.get(identifier))
            .cloned()
            .ok_or_else(|| Error::PluginNotFound {
                kind,
                identifier: identifier.to_string(),
            })
    }

    pub fn contains(&self, kind: PluginKind, identifier: &str) -> bool {
        self.plugins
            .get(&kind)
            .is_some_and(|table| table.contains_key(identifier))
    }

    pub fn parser(&self, identifier: &str) -> Result<Arc<dyn ConfigParser>> {
        self.get(PluginKind::Parser, identifier)
            .map(|plugin| plugin.as_parser().cloned())
            .and_then(|parser| parser.ok_or_else(|| not_found(PluginKind::Parser, identifier)))
    }

    pub fn runner(&self, identifier: &str) -> Result<Arc<dyn TestRunner>> {
        self.get(PluginKind::Runner, identifier)
            .map(|plugin| plugin.as_runner().cloned())
            .and_then(|runner| runner.ok_or_else(|| not_found(PluginKind::Runner, identifier)))
    }

    pub fn reporter(&self, identifier: &str) -> Result<Arc<dyn Reporter>> {
        self.get(PluginKind::Reporter, identifier)
            .map(|plugin| plugin.as_reporter().cloned())
            .and_then(|reporter| reporter.ok_or_else(|| not_found(PluginKind::Reporter, identifier)))
    }

    /// Plugins of `kind` in registration order.
    pub fn plugins(&self, kind: PluginKind) -> impl Iterator<Item = &Arc<Plugin>> {
        self.order.iter().filter(move |plugin| plugin.kind() == kind)
    }

    /// Sorted identifiers registered for `kind`.
    pub fn identifiers(&self, kind: PluginKind) -> Vec<&str> {
        let mut ids: Vec<&str> = self
            .plugins
            .get(&kind)
            .map(|table| table.keys().map(String::as_str).collect())
            .unwrap_or_default();
        ids.sort_unstable();
        ids
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

fn not_found(kind: PluginKind, identifier: &str) -> Error {
    Error::PluginNotFound {
        kind,
        identifier: identifier.to_string(),
    }
}
