//! Plugin trait and plugin values.

use std::sync::Arc;

use hatch_core::{HatchResult, Value};

use crate::hooks::{ClassId, HookResolver, HookSet};

/// Trait that all plugins must implement.
///
/// Plugins live inside configuration layers as [`Value::Object`]s (see
/// [`plugin_value`]) and are applied once per orchestration run, in the
/// order the layers compose them.
pub trait Plugin: Send + Sync + std::fmt::Debug {
    /// Name used in logs and as the tap name of declared hooks.
    fn name(&self) -> &str;

    /// Class whose hooks [`hooks`](Self::hooks) extends.
    fn class(&self) -> Option<ClassId> {
        None
    }

    /// Listeners attached to the hooks of [`class`](Self::class) before
    /// [`apply`](Self::apply) runs.
    fn hooks(&self) -> Option<HookSet> {
        None
    }

    /// Whether the plugin runs in the sandbox (parent) process rather than
    /// the orchestrated child.
    fn sandbox(&self) -> bool {
        false
    }

    /// Attaches listeners through `hooks`.
    fn apply(&self, hooks: &HookResolver<'_>) -> HatchResult<()>;
}

/// Wraps a plugin so it can be stored in a configuration layer.
pub fn plugin_value<P: Plugin + 'static>(plugin: P) -> Value {
    shared_plugin_value(Arc::new(plugin))
}

/// Wraps an already shared plugin.
pub fn shared_plugin_value(plugin: Arc<dyn Plugin>) -> Value {
    Value::object(plugin)
}

/// Builds a list value of plugins, ready for a layer's `plugins` key.
pub fn plugin_list<I>(plugins: I) -> Value
where
    I: IntoIterator<Item = Arc<dyn Plugin>>,
{
    Value::List(plugins.into_iter().map(shared_plugin_value).collect())
}

/// Extracts a plugin from a configuration value.
pub fn plugin_from_value(value: &Value) -> Option<Arc<dyn Plugin>> {
    value.downcast_ref::<Arc<dyn Plugin>>().cloned()
}
