//! Plugin composition across configuration layers.

use std::sync::Arc;

use tracing::{debug, info, warn};

use hatch_core::{FoldDirection, HatchError, HatchResult, LayeredConfig, Value};

use crate::hooks::HookProxyManager;
use crate::plugin::{Plugin, plugin_from_value};

/// Key every layer lists its plugins under.
pub const PLUGINS_KEY: &str = "plugins";

/// Composes and applies plugins.
#[derive(Debug, Clone, Copy, Default)]
pub struct PluginComposer;

impl PluginComposer {
    /// Concatenates the `plugins` lists of every layer, base layer first.
    pub fn compose(config: &LayeredConfig) -> HatchResult<Vec<Arc<dyn Plugin>>> {
        let plugins = config.compose(PLUGINS_KEY, FoldDirection::BottomUp, Vec::new(), concat_plugins)?;
        debug!(count = plugins.len(), layers = config.len(), "Plugins composed");
        Ok(plugins)
    }

    /// Applies every plugin accepted by `filter`, in order.
    ///
    /// A plugin's declared hooks are attached to its class's hooks (a proxy
    /// if the class has no instance yet) before its `apply` runs. The first
    /// failure aborts the remaining plugins. Returns the number applied.
    pub fn apply_all<F>(
        plugins: &[Arc<dyn Plugin>],
        manager: &HookProxyManager,
        filter: F,
    ) -> HatchResult<usize>
    where
        F: Fn(&dyn Plugin) -> bool,
    {
        let resolver = manager.resolver();
        let mut applied = 0;

        for plugin in plugins {
            if !filter(&**plugin) {
                debug!(plugin = %plugin.name(), "Plugin filtered out");
                continue;
            }

            match (plugin.class(), plugin.hooks()) {
                (Some(class), Some(hooks)) => {
                    manager.apply_hooks(&class, &hooks)?;
                    debug!(plugin = %plugin.name(), class = %class, listeners = hooks.len(), "Plugin hooks applied");
                }
                (None, Some(hooks)) => {
                    warn!(plugin = %plugin.name(), listeners = hooks.len(), "Plugin hooks ignored: plugin names no class");
                }
                _ => {}
            }

            plugin.apply(&resolver)?;
            applied += 1;

            info!(plugin = %plugin.name(), "Plugin applied");
        }

        Ok(applied)
    }
}

/// Fold step for `plugins`: appends each layer's list, rejecting anything
/// that is not a list of plugins. Layers without the key contribute nothing.
pub fn concat_plugins(
    prev: Option<Vec<Arc<dyn Plugin>>>,
    anchor: Option<&Value>,
    origin: &str,
) -> HatchResult<Option<Vec<Arc<dyn Plugin>>>> {
    let Some(anchor) = anchor else {
        return Ok(prev);
    };

    let items = anchor.as_list().ok_or_else(|| {
        HatchError::invalid_plugins(origin, format!("expected a list, got {}", anchor.type_name()))
    })?;

    let mut plugins = prev.unwrap_or_default();
    for (index, item) in items.iter().enumerate() {
        let plugin = plugin_from_value(item).ok_or_else(|| {
            HatchError::invalid_plugins(
                origin,
                format!("item {index} is a {}, not a plugin", item.type_name()),
            )
        })?;
        plugins.push(plugin);
    }

    Ok(Some(plugins))
}
