//! Hook ownership for extensible classes.

use std::sync::{Arc, RwLock};

use tracing::debug;

use hatch_core::{HatchError, HatchResult};

use crate::hooks::{ClassId, HookRegistry, HookSlot};

/// Produces the slots every instance of a class always has.
pub type HookFactory = fn() -> Vec<(&'static str, HookSlot)>;

/// Owner of one object's hook registry.
///
/// The registry is built from the class's reserved slots, optionally
/// extended once with custom slots. Custom slots can only be set before
/// the registry is first read; afterwards listeners may still be attached
/// but the slot set is fixed.
#[derive(Debug)]
pub struct Hookable {
    class: ClassId,
    reserved: HookFactory,
    hooks: RwLock<Option<Arc<HookRegistry>>>,
}

impl Hookable {
    /// Creates a hook owner for `class` with its reserved slot factory.
    pub fn new(class: ClassId, reserved: HookFactory) -> Self {
        Self {
            class,
            reserved,
            hooks: RwLock::new(None),
        }
    }

    /// The class identity.
    pub fn class(&self) -> &ClassId {
        &self.class
    }

    /// Sets custom slots on top of the reserved ones.
    pub fn set_hooks<I, S>(&self, custom: I) -> HatchResult<()>
    where
        I: IntoIterator<Item = (S, HookSlot)>,
        S: Into<String>,
    {
        let mut hooks = self.hooks.write().unwrap_or_else(|e| e.into_inner());
        if hooks.is_some() {
            return Err(HatchError::hooks_already_resolved(self.class.as_str()));
        }

        let registry = HookRegistry::with_slots(custom)?;
        for (name, slot) in (self.reserved)() {
            if registry.contains(name) {
                return Err(HatchError::reserved_hook(self.class.as_str(), name));
            }
            registry.declare(name, slot)?;
        }

        debug!(class = %self.class, slots = ?registry.slot_names(), "Custom hooks set");

        *hooks = Some(Arc::new(registry));
        Ok(())
    }

    /// Returns the registry, materializing the reserved slots on first read.
    pub fn hooks(&self) -> HatchResult<Arc<HookRegistry>> {
        if let Some(hooks) = &*self.hooks.read().unwrap_or_else(|e| e.into_inner()) {
            return Ok(Arc::clone(hooks));
        }

        let mut hooks = self.hooks.write().unwrap_or_else(|e| e.into_inner());
        if let Some(existing) = &*hooks {
            return Ok(Arc::clone(existing));
        }

        let registry = Arc::new(HookRegistry::with_slots((self.reserved)())?);
        *hooks = Some(Arc::clone(&registry));
        Ok(registry)
    }

    /// Whether the registry has been set or read.
    pub fn is_resolved(&self) -> bool {
        self.hooks.read().unwrap_or_else(|e| e.into_inner()).is_some()
    }
}
