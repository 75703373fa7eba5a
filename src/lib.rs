//! # hatch
//!
//! Plugin-driven bootstrapper. Configuration layers contribute plugins and
//! block settings; plugins extend the hooks of blocks that may not exist
//! yet; the sandbox prepares the environment of the orchestrated child.

pub mod telemetry;

pub use hatch_core::config::HatchConfig;
pub use hatch_core::{ConfigLayer, ErrorKind, FoldDirection, HatchError, HatchResult, LayeredConfig, Value};
pub use hatch_plugin::{
    Block, BlockHost, ClassId, DispatchMode, EnvOverlay, HatchOptions, HookArgs, HookHandle,
    HookProxyManager, HookRegistry, HookResolver, HookSet, HookSlot, Hookable, LaunchPlan,
    Lifecycle, Listener, PhaseSupport, Plugin, PluginComposer, ProxyHookRegistry, Sandbox,
    SandboxEnv, Tap,
};
