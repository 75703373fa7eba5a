//! Registry of declared hook slots with ordered listeners.

use std::collections::HashMap;
use std::sync::RwLock;

use tracing::{debug, trace};

use hatch_core::{HatchError, HatchResult, Value};

use super::definitions::{DispatchMode, HookArgs, HookSlot};
use super::listener::{Listener, Tap};

#[derive(Debug, Default)]
struct Slots {
    /// Declaration order.
    order: Vec<String>,
    by_name: HashMap<String, HookSlot>,
}

/// Registry of hook slots owned by one object.
///
/// Listeners are attached through a shared reference; broadcasting works on
/// a snapshot of the listener list, so a listener may attach further
/// listeners without deadlocking (they take effect on the next broadcast).
#[derive(Debug, Default)]
pub struct HookRegistry {
    slots: RwLock<Slots>,
}

impl HookRegistry {
    /// Creates a registry with no slots.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry and declares `slots` in order.
    pub fn with_slots<I, S>(slots: I) -> HatchResult<Self>
    where
        I: IntoIterator<Item = (S, HookSlot)>,
        S: Into<String>,
    {
        let registry = Self::new();
        for (name, slot) in slots {
            registry.declare(name, slot)?;
        }
        Ok(registry)
    }

    /// Declares a slot.
    pub fn declare(&self, name: impl Into<String>, slot: HookSlot) -> HatchResult<()> {
        let name = name.into();
        let mut slots = self.slots.write().unwrap_or_else(|e| e.into_inner());

        if slots.by_name.contains_key(&name) {
            return Err(HatchError::duplicate_hook(&name));
        }

        debug!(hook = %name, mode = %slot.mode(), params = ?slot.params(), "Hook slot declared");

        slots.order.push(name.clone());
        slots.by_name.insert(name, slot);
        Ok(())
    }

    /// Appends a listener to slot `name`.
    pub fn attach(&self, name: &str, tap: Tap) -> HatchResult<()> {
        let mut slots = self.slots.write().unwrap_or_else(|e| e.into_inner());
        let slot = slots
            .by_name
            .get_mut(name)
            .ok_or_else(|| HatchError::unknown_hook(name))?;

        check_listener(name, slot, &tap)?;

        debug!(hook = %name, tap = %tap.name(), "Hook listener attached");

        slot.taps.push(tap);
        Ok(())
    }

    /// Checks that `tap` could be attached to slot `name` without attaching it.
    pub(crate) fn check_tap(&self, name: &str, tap: &Tap) -> HatchResult<()> {
        let slots = self.slots.read().unwrap_or_else(|e| e.into_inner());
        let slot = slots
            .by_name
            .get(name)
            .ok_or_else(|| HatchError::unknown_hook(name))?;
        check_listener(name, slot, tap)
    }

    /// Whether slot `name` is declared.
    pub fn contains(&self, name: &str) -> bool {
        let slots = self.slots.read().unwrap_or_else(|e| e.into_inner());
        slots.by_name.contains_key(name)
    }

    /// Declared slot names, in declaration order.
    pub fn slot_names(&self) -> Vec<String> {
        let slots = self.slots.read().unwrap_or_else(|e| e.into_inner());
        slots.order.clone()
    }

    /// Dispatch mode of slot `name`.
    pub fn mode(&self, name: &str) -> Option<DispatchMode> {
        let slots = self.slots.read().unwrap_or_else(|e| e.into_inner());
        slots.by_name.get(name).map(HookSlot::mode)
    }

    /// Number of listeners attached to slot `name`.
    pub fn listener_count(&self, name: &str) -> usize {
        let slots = self.slots.read().unwrap_or_else(|e| e.into_inner());
        slots.by_name.get(name).map(HookSlot::len).unwrap_or(0)
    }

    /// Tap names attached to slot `name`, in attachment order.
    pub fn tap_names(&self, name: &str) -> Vec<String> {
        let slots = self.slots.read().unwrap_or_else(|e| e.into_inner());
        slots
            .by_name
            .get(name)
            .map(HookSlot::tap_names)
            .unwrap_or_default()
    }

    /// Runs every listener of a synchronous slot in attachment order.
    ///
    /// The first listener error is returned and the remaining listeners
    /// are skipped.
    pub fn broadcast_sync(&self, name: &str, args: Vec<Value>) -> HatchResult<()> {
        let (args, mode, listeners) = self.snapshot(name, args)?;

        if mode != DispatchMode::Sync {
            return Err(HatchError::invalid_listener(format!(
                "hook slot '{name}' is {mode} and must be broadcast asynchronously"
            )));
        }

        trace!(hook = %name, listeners = listeners.len(), "Broadcasting hook");

        for listener in &listeners {
            match listener {
                Listener::Sync(f) => f(&args)?,
                Listener::Async(_) => {
                    return Err(HatchError::invalid_listener(format!(
                        "hook slot '{name}' holds an async listener and cannot be broadcast synchronously"
                    )));
                }
            }
        }
        Ok(())
    }

    /// Runs every listener in attachment order, awaiting each one before
    /// starting the next.
    ///
    /// The first failure is returned and the remaining listeners never start.
    pub async fn broadcast_async(&self, name: &str, args: Vec<Value>) -> HatchResult<()> {
        let (args, _, listeners) = self.snapshot(name, args)?;

        trace!(hook = %name, listeners = listeners.len(), "Broadcasting hook");

        for listener in listeners {
            match listener {
                Listener::Sync(f) => f(&args)?,
                Listener::Async(f) => f(args.clone()).await?,
            }
        }
        Ok(())
    }

    fn snapshot(
        &self,
        name: &str,
        values: Vec<Value>,
    ) -> HatchResult<(HookArgs, DispatchMode, Vec<Listener>)> {
        let slots = self.slots.read().unwrap_or_else(|e| e.into_inner());
        let slot = slots
            .by_name
            .get(name)
            .ok_or_else(|| HatchError::unknown_hook(name))?;

        if values.len() != slot.params().len() {
            return Err(HatchError::invalid_hook_args(
                name,
                slot.params().len(),
                values.len(),
            ));
        }

        let listeners = slot.taps.iter().map(|t| t.listener().clone()).collect();
        Ok((HookArgs::new(name, slot.params(), values), slot.mode(), listeners))
    }
}

fn check_listener(name: &str, slot: &HookSlot, tap: &Tap) -> HatchResult<()> {
    if slot.mode() == DispatchMode::Sync && tap.listener().is_async() {
        return Err(HatchError::invalid_listener(format!(
            "tap '{}' is async but hook slot '{name}' is sync",
            tap.name()
        )));
    }
    Ok(())
}
