//! # hatch-plugin
//!
//! Plugin framework for hatch. Provides:
//!
//! - Hook slots with synchronous and sequential-async broadcast
//! - Proxy hook registries that record listeners for classes not yet
//!   instantiated, and replay them on promotion
//! - Plugin composition across configuration layers
//! - Blocks with phase-aware create/run lifecycles
//! - Sandbox launch preparation with an immutable environment overlay

pub mod block;
pub mod composer;
pub mod hookable;
pub mod hooks;
pub mod lifecycle;
pub mod plugin;
pub mod sandbox;

pub use block::{Block, BlockHost, PhaseSupport};
pub use composer::PluginComposer;
pub use hookable::Hookable;
pub use hooks::{
    ClassId, DispatchMode, HookArgs, HookHandle, HookProxyManager, HookRegistry, HookResolver,
    HookSet, HookSlot, Listener, ProxyHookRegistry, Tap,
};
pub use lifecycle::{HatchOptions, Lifecycle};
pub use plugin::Plugin;
pub use sandbox::{EnvOverlay, LaunchPlan, Sandbox, SandboxEnv};
