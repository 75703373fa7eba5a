//! Orchestration session: plugins, mounted blocks, and the run sequence.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, info};

use hatch_core::{HatchError, HatchResult, LayeredConfig, Value};

use crate::block::{Block, BlockHost, PHASE_DEFAULT};
use crate::composer::PluginComposer;
use crate::hooks::{HookProxyManager, HookRegistry};
use crate::plugin::Plugin;

/// Key under which each configuration layer nests its hatch settings.
pub const NAMESPACE: &str = "hatch";

/// Options of one orchestration session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HatchOptions {
    /// Working directory of the orchestrated project.
    pub cwd: PathBuf,
    /// Development mode.
    pub dev: bool,
    /// Phase blocks are filtered by.
    pub phase: String,
}

impl HatchOptions {
    /// Options for `cwd` in the default phase, not in dev mode.
    pub fn new(cwd: impl Into<PathBuf>) -> Self {
        Self {
            cwd: cwd.into(),
            dev: false,
            phase: PHASE_DEFAULT.to_string(),
        }
    }

    /// Sets development mode.
    pub fn with_dev(mut self, dev: bool) -> Self {
        self.dev = dev;
        self
    }

    /// Sets the phase blocks are filtered by.
    pub fn with_phase(mut self, phase: impl Into<String>) -> Self {
        self.phase = phase.into();
        self
    }

    /// Checks that `cwd` and `phase` are set.
    pub fn validate(&self) -> HatchResult<()> {
        if self.cwd.as_os_str().is_empty() {
            return Err(HatchError::invalid_options("cwd must not be empty"));
        }
        if self.phase.trim().is_empty() {
            return Err(HatchError::invalid_options("phase must not be empty"));
        }
        Ok(())
    }

    /// Validates the options and makes `cwd` absolute against the current
    /// directory.
    pub fn resolved(mut self) -> HatchResult<Self> {
        self.validate()?;
        if !self.cwd.is_absolute() {
            self.cwd = std::path::absolute(&self.cwd)?;
        }
        Ok(self)
    }
}

/// One orchestration session.
///
/// Owns the hook arena for the session. Plugins are applied before blocks
/// are mounted, so their listeners land on proxies that each mounted block
/// promotes to its real hooks.
#[derive(Debug)]
pub struct Lifecycle {
    options: Arc<HatchOptions>,
    config: LayeredConfig,
    manager: HookProxyManager,
    blocks: Vec<BlockHost>,
}

impl Lifecycle {
    /// Creates a session over the `hatch` namespace of `config`.
    pub fn new(
        options: HatchOptions,
        config: LayeredConfig,
        host_hooks: HookRegistry,
    ) -> HatchResult<Self> {
        let options = options.resolved()?;

        debug!(
            cwd = %options.cwd.display(),
            dev = options.dev,
            phase = %options.phase,
            layers = config.len(),
            "Lifecycle created"
        );

        Ok(Self {
            options: Arc::new(options),
            config: config.namespace(NAMESPACE),
            manager: HookProxyManager::new(Arc::new(host_hooks)),
            blocks: Vec::new(),
        })
    }

    /// The resolved session options.
    pub fn options(&self) -> &Arc<HatchOptions> {
        &self.options
    }

    /// The namespaced configuration view.
    pub fn config(&self) -> &LayeredConfig {
        &self.config
    }

    /// The host's own hooks.
    pub fn hooks(&self) -> Arc<HookRegistry> {
        self.manager.host()
    }

    /// The session's hook arena.
    pub fn manager(&self) -> &HookProxyManager {
        &self.manager
    }

    /// Mounted blocks in mount order.
    pub fn blocks(&self) -> &[BlockHost] {
        &self.blocks
    }

    /// Composes `plugins` and applies those accepted by `filter`.
    pub fn apply_plugins<F>(&self, filter: F) -> HatchResult<usize>
    where
        F: Fn(&dyn Plugin) -> bool,
    {
        let plugins = PluginComposer::compose(&self.config)?;
        PluginComposer::apply_all(&plugins, &self.manager, filter)
    }

    /// Mounts `block` and promotes its hooks in the arena.
    pub fn mount(&mut self, block: Box<dyn Block>) -> HatchResult<()> {
        let host = BlockHost::new(block)?;
        self.manager.promote(host.class(), host.hooks()?)?;

        debug!(class = %host.class(), "Block mounted");
        self.blocks.push(host);
        Ok(())
    }

    /// Configures, creates, and runs every mounted block.
    ///
    /// Every block receives its config value and fires `config`. Blocks
    /// that take part in the current phase are then created and run in
    /// mount order. Returns the run outputs of those blocks.
    pub async fn run(&mut self) -> HatchResult<Vec<Value>> {
        for host in &mut self.blocks {
            let value = match host.config_key().map(str::to_string) {
                Some(key) => self.config.bail_top(&key, Value::Null)?,
                None => Value::Null,
            };
            host.set_config(value, &self.options)?;
        }

        for host in &mut self.blocks {
            host.create(&self.options)?;
        }

        let mut outputs = Vec::new();
        for host in &self.blocks {
            if let Some(output) = host.run(&self.options).await? {
                outputs.push(output);
            }
        }

        info!(
            phase = %self.options.phase,
            blocks = self.blocks.len(),
            ran = outputs.len(),
            "Lifecycle run complete"
        );
        Ok(outputs)
    }

    /// Drops mounted blocks and clears the hook arena.
    pub fn reset(&mut self) {
        self.blocks.clear();
        self.manager.reset();
    }
}
