//! Arena mapping class identities to real or proxy hook registries.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use tracing::{debug, info};

use hatch_core::{HatchError, HatchResult};

use super::definitions::ClassId;
use super::listener::Tap;
use super::proxy::{HookHandle, ProxyBinding, ProxyHookRegistry};
use super::registry::HookRegistry;

/// Listeners a plugin declares for the hooks of a class.
#[derive(Debug, Clone, Default)]
pub struct HookSet {
    entries: Vec<(String, Tap)>,
}

impl HookSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a listener for slot `name`.
    pub fn on(mut self, name: impl Into<String>, tap: Tap) -> Self {
        self.entries.push((name.into(), tap));
        self
    }

    /// Number of declared listeners.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no listener is declared.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Declared `(slot, tap)` pairs in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Tap)> {
        self.entries.iter().map(|(name, tap)| (name.as_str(), tap))
    }
}

/// Session-scoped arena of hook registries keyed by class identity.
///
/// The host's own registry always exists and is returned for the empty
/// identity. A class resolves to a proxy until [`promote`](Self::promote)
/// binds its real registry.
#[derive(Debug)]
pub struct HookProxyManager {
    host: Arc<HookRegistry>,
    entries: RwLock<HashMap<ClassId, HookHandle>>,
}

impl HookProxyManager {
    /// Creates a manager around the host's registry.
    pub fn new(host: Arc<HookRegistry>) -> Self {
        Self {
            host,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// The host's own registry.
    pub fn host(&self) -> Arc<HookRegistry> {
        Arc::clone(&self.host)
    }

    /// Resolves hooks for `class`, or the host's hooks for `None`.
    pub fn resolve(&self, class: Option<&ClassId>) -> HookHandle {
        match class {
            None => HookHandle::Real(self.host()),
            Some(class) => self.resolve_class(class),
        }
    }

    /// Resolves hooks for `class`, creating a proxy on first use.
    ///
    /// Every caller gets the same handle until the class is promoted.
    pub fn resolve_class(&self, class: &ClassId) -> HookHandle {
        if let Some(handle) = self.read_entry(class) {
            return handle;
        }

        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries
            .entry(class.clone())
            .or_insert_with(|| {
                debug!(class = %class, "Creating proxy hooks");
                HookHandle::Proxy(Arc::new(ProxyHookRegistry::new(class.clone())))
            })
            .clone()
    }

    /// Binds the real registry of `class`.
    ///
    /// Listeners recorded on the class's proxy are replayed onto `real` in
    /// their original order. Promoting a class twice is an error.
    pub fn promote(&self, class: &ClassId, real: Arc<HookRegistry>) -> HatchResult<()> {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());

        match entries.get(class) {
            Some(HookHandle::Real(_)) => {
                return Err(HatchError::promotion_conflict(class.as_str()));
            }
            Some(HookHandle::Proxy(proxy)) => proxy.bind(&real)?,
            None => {}
        }

        info!(class = %class, slots = ?real.slot_names(), "Hooks promoted");

        entries.insert(class.clone(), HookHandle::Real(real));
        Ok(())
    }

    /// Attaches every listener of `hooks` to the resolved hooks of `class`.
    pub fn apply_hooks(&self, class: &ClassId, hooks: &HookSet) -> HatchResult<()> {
        let handle = self.resolve_class(class);
        for (name, tap) in hooks.iter() {
            handle.attach(name, tap.clone())?;
        }
        Ok(())
    }

    /// Whether `class` has a real registry.
    pub fn is_promoted(&self, class: &ClassId) -> bool {
        matches!(self.read_entry(class), Some(HookHandle::Real(_)))
    }

    /// Class identities known to the arena.
    pub fn classes(&self) -> Vec<ClassId> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        let mut classes: Vec<ClassId> = entries.keys().cloned().collect();
        classes.sort();
        classes
    }

    /// Forgets every class entry; the host registry is kept.
    pub fn reset(&self) {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        debug!(classes = entries.len(), "Hook arena reset");
        entries.clear();
    }

    /// Returns the resolver handed to plugins.
    pub fn resolver(&self) -> HookResolver<'_> {
        HookResolver { manager: self }
    }

    fn read_entry(&self, class: &ClassId) -> Option<HookHandle> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries.get(class).cloned()
    }
}

/// Hook lookup handed to plugins while they are applied.
#[derive(Debug, Clone, Copy)]
pub struct HookResolver<'a> {
    manager: &'a HookProxyManager,
}

impl HookResolver<'_> {
    /// The host's own hooks.
    pub fn host(&self) -> Arc<HookRegistry> {
        self.manager.host()
    }

    /// Hooks of `class`; a proxy if no instance has promoted them yet.
    pub fn class(&self, class: &ClassId) -> HookHandle {
        self.manager.resolve_class(class)
    }

    /// Host hooks for `None`, class hooks otherwise.
    pub fn resolve(&self, class: Option<&ClassId>) -> HookHandle {
        self.manager.resolve(class)
    }
}
