//! Layered configuration resolution.
//!
//! Layers are ordered bottom to top: index 0 is the base layer and the last
//! layer is the most specific override. Resolution never reads files; the
//! stack is handed fully loaded layers by its caller.

use std::sync::Arc;

use tracing::trace;

use crate::error::HatchError;
use crate::result::HatchResult;

use super::layer::ConfigLayer;
use super::value::Value;

/// Order in which a fold visits the layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FoldDirection {
    /// Base layer first, top layer last.
    BottomUp,
    /// Top layer first, base layer last.
    TopDown,
}

/// An ordered, read-only stack of configuration layers.
///
/// Cloning is cheap: clones and namespaced views share the same layers.
#[derive(Debug, Clone)]
pub struct LayeredConfig {
    layers: Arc<[ConfigLayer]>,
    paths: Vec<String>,
}

impl LayeredConfig {
    /// Creates a stack from layers ordered bottom to top.
    pub fn new(layers: Vec<ConfigLayer>) -> Self {
        Self {
            layers: layers.into(),
            paths: Vec::new(),
        }
    }

    /// Returns a view whose lookups are nested under `name`.
    pub fn namespace(&self, name: &str) -> Self {
        let mut paths = self.paths.clone();
        paths.push(name.to_string());
        Self {
            layers: Arc::clone(&self.layers),
            paths,
        }
    }

    /// Whether at least one layer is loaded.
    pub fn is_loaded(&self) -> bool {
        !self.layers.is_empty()
    }

    /// Number of layers.
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Whether the stack has no layers.
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Layer origins, bottom to top.
    pub fn origins(&self) -> Vec<&str> {
        self.layers.iter().map(ConfigLayer::origin).collect()
    }

    /// Folds `key` across every layer with `combine`.
    ///
    /// `combine` receives the accumulator (`None` while unset), the layer's
    /// value (`None` when the layer lacks the key) and the layer origin.
    /// `default` is used only when the accumulator is still unset after the
    /// last layer; any value a layer produced, however falsy, is kept.
    pub fn compose<T, F>(
        &self,
        key: &str,
        direction: FoldDirection,
        default: T,
        mut combine: F,
    ) -> HatchResult<T>
    where
        F: FnMut(Option<T>, Option<&Value>, &str) -> HatchResult<Option<T>>,
    {
        if self.layers.is_empty() {
            return Err(HatchError::not_loaded(key));
        }

        let mut acc = None;
        let mut step = |layer: &ConfigLayer| -> HatchResult<()> {
            let anchor = layer.get(&self.paths, key);
            trace!(
                key = key,
                origin = layer.origin(),
                present = anchor.is_some(),
                "Folding config layer"
            );
            acc = combine(acc.take(), anchor, layer.origin())?;
            Ok(())
        };

        match direction {
            FoldDirection::BottomUp => self.layers.iter().try_for_each(&mut step)?,
            FoldDirection::TopDown => self.layers.iter().rev().try_for_each(&mut step)?,
        }

        Ok(acc.unwrap_or(default))
    }

    /// Returns the first present value for `key`, scanning top to bottom.
    pub fn bail_top(&self, key: &str, default: Value) -> HatchResult<Value> {
        self.compose(key, FoldDirection::TopDown, default, bail)
    }

    /// Returns the first present value for `key`, scanning bottom to top.
    pub fn bail_bottom(&self, key: &str, default: Value) -> HatchResult<Value> {
        self.compose(key, FoldDirection::BottomUp, default, bail)
    }
}

fn bail(prev: Option<Value>, anchor: Option<&Value>, _origin: &str) -> HatchResult<Option<Value>> {
    Ok(prev.or_else(|| anchor.cloned()))
}
