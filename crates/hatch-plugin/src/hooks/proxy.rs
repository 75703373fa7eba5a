//! Proxy hook registries.
//!
//! A proxy stands in for the hook registry of a class that has no instance
//! yet. It accepts listeners for any slot name and records them; once the
//! real registry is known the recorded listeners are replayed onto it and the
//! proxy forwards every later attachment.

use std::sync::{Arc, RwLock};

use tracing::{debug, info};

use hatch_core::{HatchError, HatchResult};

use super::definitions::ClassId;
use super::listener::Tap;
use super::registry::HookRegistry;

#[derive(Debug)]
enum ProxyState {
    /// Recorded listeners per slot, slots in first-attach order.
    Pending(Vec<(String, Vec<Tap>)>),
    /// Bound to the real registry.
    Forwarding(Arc<HookRegistry>),
}

/// Hook registry whose slot set is discovered lazily.
#[derive(Debug)]
pub struct ProxyHookRegistry {
    class: ClassId,
    state: RwLock<ProxyState>,
}

impl ProxyHookRegistry {
    pub(crate) fn new(class: ClassId) -> Self {
        Self {
            class,
            state: RwLock::new(ProxyState::Pending(Vec::new())),
        }
    }

    /// Class this proxy stands in for.
    pub fn class(&self) -> &ClassId {
        &self.class
    }

    /// Records `tap` for slot `name`, or forwards it once bound.
    ///
    /// Before binding any slot name is accepted.
    pub fn attach(&self, name: &str, tap: Tap) -> HatchResult<()> {
        let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
        match &mut *state {
            ProxyState::Pending(slots) => {
                debug!(class = %self.class, hook = %name, tap = %tap.name(), "Listener recorded on proxy");
                match slots.iter_mut().find(|(slot, _)| slot == name) {
                    Some((_, taps)) => taps.push(tap),
                    None => slots.push((name.to_string(), vec![tap])),
                }
                Ok(())
            }
            ProxyState::Forwarding(real) => real.attach(name, tap),
        }
    }

    /// Whether the proxy has been bound to its real registry.
    pub fn is_bound(&self) -> bool {
        let state = self.state.read().unwrap_or_else(|e| e.into_inner());
        matches!(&*state, ProxyState::Forwarding(_))
    }

    /// Slot names with recorded listeners, in first-attach order.
    ///
    /// Empty once bound.
    pub fn pending_slots(&self) -> Vec<String> {
        let state = self.state.read().unwrap_or_else(|e| e.into_inner());
        match &*state {
            ProxyState::Pending(slots) => slots.iter().map(|(name, _)| name.clone()).collect(),
            ProxyState::Forwarding(_) => Vec::new(),
        }
    }

    /// Number of listeners recorded for slot `name`.
    pub fn listener_count(&self, name: &str) -> usize {
        let state = self.state.read().unwrap_or_else(|e| e.into_inner());
        match &*state {
            ProxyState::Pending(slots) => slots
                .iter()
                .find(|(slot, _)| slot == name)
                .map(|(_, taps)| taps.len())
                .unwrap_or(0),
            ProxyState::Forwarding(real) => real.listener_count(name),
        }
    }
}

/// Binding operations reserved for [`super::HookProxyManager`].
pub(crate) trait ProxyBinding {
    /// Replays recorded listeners onto `real` and starts forwarding.
    ///
    /// Every recorded slot and listener is validated before anything is
    /// replayed, so a failed bind leaves `real` untouched.
    fn bind(&self, real: &Arc<HookRegistry>) -> HatchResult<()>;
}

impl ProxyBinding for ProxyHookRegistry {
    fn bind(&self, real: &Arc<HookRegistry>) -> HatchResult<()> {
        let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
        let slots = match &*state {
            ProxyState::Pending(slots) => slots,
            ProxyState::Forwarding(_) => {
                return Err(HatchError::promotion_conflict(self.class.as_str()));
            }
        };

        for (name, taps) in slots {
            if !real.contains(name) {
                return Err(HatchError::reserved_hook(self.class.as_str(), name));
            }
            for tap in taps {
                real.check_tap(name, tap)?;
            }
        }

        let mut replayed = 0usize;
        for (name, taps) in slots {
            for tap in taps {
                real.attach(name, tap.clone())?;
                replayed += 1;
            }
        }

        info!(class = %self.class, listeners = replayed, "Proxy listeners replayed onto real hooks");

        *state = ProxyState::Forwarding(Arc::clone(real));
        Ok(())
    }
}

/// Handle returned when resolving hooks: the real registry, or a proxy
/// standing in for it.
#[derive(Debug, Clone)]
pub enum HookHandle {
    /// The real registry.
    Real(Arc<HookRegistry>),
    /// A proxy recording listeners for a class not yet instantiated.
    Proxy(Arc<ProxyHookRegistry>),
}

impl HookHandle {
    /// Attaches `tap` to slot `name` on whichever registry this handle holds.
    pub fn attach(&self, name: &str, tap: Tap) -> HatchResult<()> {
        match self {
            Self::Real(registry) => registry.attach(name, tap),
            Self::Proxy(proxy) => proxy.attach(name, tap),
        }
    }

    /// Whether this handle is a proxy.
    pub fn is_proxy(&self) -> bool {
        matches!(self, Self::Proxy(_))
    }

    /// The real registry, if this handle holds one.
    pub fn as_real(&self) -> Option<&Arc<HookRegistry>> {
        match self {
            Self::Real(registry) => Some(registry),
            Self::Proxy(_) => None,
        }
    }

    /// Number of listeners attached (or recorded) for slot `name`.
    pub fn listener_count(&self, name: &str) -> usize {
        match self {
            Self::Real(registry) => registry.listener_count(name),
            Self::Proxy(proxy) => proxy.listener_count(name),
        }
    }

    /// Whether both handles point at the same registry.
    pub fn same_as(&self, other: &HookHandle) -> bool {
        match (self, other) {
            (Self::Real(a), Self::Real(b)) => Arc::ptr_eq(a, b),
            (Self::Proxy(a), Self::Proxy(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}
