//! Plugin registry
//!
//! Maps provider names to the plugins backing them. Each plugin's `base`
//! chain is resolved once, when the registry is built, into a linear list of
//! ancestors (nearest base first).

use crate::builtin::builtin_plugins;
use crate::plugin::Plugin;
use crate::{Error, Result};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Registered plugins with their precomputed inheritance chains.
///
/// # Example
///
/// ```
/// use orca_providers::PluginRegistry;
///
/// let registry = PluginRegistry::with_builtins(Vec::new()).unwrap();
/// assert!(registry.get("exec").is_some());
/// assert!(registry.ancestor_names("container").is_empty());
/// ```
#[derive(Clone, Default)]
pub struct PluginRegistry {
    plugins: Vec<Arc<dyn Plugin>>,
    index: HashMap<String, usize>,
    ancestors: HashMap<String, Vec<String>>,
}

impl PluginRegistry {
    /// Build a registry from `plugins`.
    ///
    /// A plugin registered twice under the same name replaces the earlier
    /// one in place.
    pub fn new(plugins: impl IntoIterator<Item = Arc<dyn Plugin>>) -> Result<Self> {
        let mut registry = Self::default();

        for plugin in plugins {
            let name = plugin.name().to_string();
            match registry.index.get(&name) {
                Some(&position) => {
                    tracing::debug!(plugin = %name, "Replacing registered plugin");
                    registry.plugins[position] = plugin;
                }
                None => {
                    registry.index.insert(name, registry.plugins.len());
                    registry.plugins.push(plugin);
                }
            }
        }

        for plugin in &registry.plugins {
            let chain = registry.linearize(plugin.as_ref())?;
            registry.ancestors.insert(plugin.name().to_string(), chain);
        }

        Ok(registry)
    }

    /// Build a registry holding the built-in plugins followed by `plugins`.
    pub fn with_builtins(plugins: impl IntoIterator<Item = Arc<dyn Plugin>>) -> Result<Self> {
        Self::new(builtin_plugins().into_iter().chain(plugins))
    }

    fn linearize(&self, plugin: &dyn Plugin) -> Result<Vec<String>> {
        let mut chain: Vec<String> = Vec::new();
        let mut current_name = plugin.name();
        let mut next = plugin.base();

        while let Some(base) = next {
            if base == plugin.name() || chain.iter().any(|c| c == base) {
                let mut cycle = vec![plugin.name().to_string()];
                cycle.extend(chain.iter().cloned());
                cycle.push(base.to_string());
                return Err(Error::configuration(format!(
                    "Circular plugin base chain detected: {}",
                    cycle.join(" -> ")
                )));
            }

            let Some(base_plugin) = self.get(base) else {
                return Err(Error::configuration(format!(
                    "Plugin '{current_name}' specifies base '{base}', which has not been registered"
                )));
            };

            chain.push(base.to_string());
            current_name = base_plugin.name();
            next = base_plugin.base();
        }

        Ok(chain)
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Plugin>> {
        self.index.get(name).map(|&i| &self.plugins[i])
    }

    /// Like [`get`](Self::get), failing when the plugin is unknown.
    pub fn require(&self, name: &str) -> Result<&Arc<dyn Plugin>> {
        self.get(name).ok_or_else(|| {
            Error::configuration(format!(
                "Configured provider '{name}' has not been registered. Available plugins: {}",
                self.names().join(", ")
            ))
        })
    }

    /// Names of the plugin's bases, nearest first.
    pub fn ancestor_names(&self, name: &str) -> &[String] {
        self.ancestors.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The plugin's bases, nearest first.
    pub fn ancestors(&self, name: &str) -> Vec<&Arc<dyn Plugin>> {
        self.ancestor_names(name)
            .iter()
            .filter_map(|base| self.get(base))
            .collect()
    }

    /// Whether `name` is `kind` itself or is built on a plugin named `kind`.
    pub fn is_a(&self, name: &str, kind: &str) -> bool {
        name == kind || self.ancestor_names(name).iter().any(|base| base == kind)
    }

    /// Registered plugin names in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.plugins.iter().map(|p| p.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}

impl fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginRegistry")
            .field("plugins", &self.names())
            .field("ancestors", &self.ancestors)
            .finish()
    }
}
