//! Hook slots, registries, proxies, and the proxy manager.

pub mod definitions;
pub mod listener;
pub mod manager;
pub mod proxy;
pub mod registry;

pub use definitions::{ClassId, DispatchMode, HookArgs, HookSlot};
pub use listener::{Listener, Tap};
pub use manager::{HookProxyManager, HookResolver, HookSet};
pub use proxy::{HookHandle, ProxyHookRegistry};
pub use registry::HookRegistry;
