//! Hookable units the lifecycle creates and runs.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use hatch_core::{HatchResult, Value};

use crate::hookable::Hookable;
use crate::hooks::{ClassId, HookRegistry, HookSlot};
use crate::lifecycle::HatchOptions;

/// Phase every block participates in unless it says otherwise.
pub const PHASE_DEFAULT: &str = "default";

/// Slot fired after the block's config value is set.
pub const HOOK_CONFIG: &str = "config";
/// Slot fired after `create` produced an outlet.
pub const HOOK_CREATED: &str = "created";
/// Slot fired before `run`.
pub const HOOK_BEFORE_RUN: &str = "before_run";
/// Slot fired after `run` returned.
pub const HOOK_RUN: &str = "run";

/// Slots every block has.
pub fn default_hooks() -> Vec<(&'static str, HookSlot)> {
    vec![
        (HOOK_CREATED, HookSlot::sync(["outlet", "options"])),
        (HOOK_BEFORE_RUN, HookSlot::sequential(["options"])),
        (HOOK_RUN, HookSlot::sequential(["return_value", "options"])),
        (HOOK_CONFIG, HookSlot::sync(["config", "options"])),
    ]
}

/// Which phases a block takes part in.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PhaseSupport {
    /// Only [`PHASE_DEFAULT`].
    #[default]
    DefaultOnly,
    /// Exactly the listed phases.
    Phases(Vec<String>),
    /// None at all.
    Disabled,
}

impl PhaseSupport {
    /// Whether a block with this support runs in `phase`.
    pub fn participates(&self, phase: &str) -> bool {
        match self {
            Self::DefaultOnly => phase == PHASE_DEFAULT,
            Self::Phases(phases) => phases.iter().any(|p| p == phase),
            Self::Disabled => false,
        }
    }
}

/// A unit of work the lifecycle creates and runs.
#[async_trait]
pub trait Block: Send + Sync {
    /// Identity whose hooks plugins extend.
    fn class(&self) -> ClassId;

    /// Phases this block takes part in.
    fn phases(&self) -> PhaseSupport {
        PhaseSupport::DefaultOnly
    }

    /// Key (under the lifecycle namespace) holding this block's config value.
    fn config_key(&self) -> Option<&str> {
        None
    }

    /// Slots added on top of [`default_hooks`].
    fn custom_hooks(&self) -> Vec<(String, HookSlot)> {
        Vec::new()
    }

    /// Builds the block's outlet.
    fn create(&self, config: &Value, options: &HatchOptions) -> HatchResult<Value>;

    /// Runs the block.
    async fn run(&self, config: &Value, options: &HatchOptions) -> HatchResult<Value>;
}

/// A mounted block together with its hooks, config value, and outlet.
pub struct BlockHost {
    block: Box<dyn Block>,
    hookable: Hookable,
    config: Value,
    outlet: Option<Value>,
}

impl std::fmt::Debug for BlockHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockHost")
            .field("class", self.hookable.class())
            .field("config", &self.config)
            .field("outlet", &self.outlet)
            .finish()
    }
}

impl BlockHost {
    /// Wraps `block`, declaring its custom slots.
    pub fn new(block: Box<dyn Block>) -> HatchResult<Self> {
        let hookable = Hookable::new(block.class(), default_hooks);
        let custom = block.custom_hooks();
        if !custom.is_empty() {
            hookable.set_hooks(custom)?;
        }

        Ok(Self {
            block,
            hookable,
            config: Value::Null,
            outlet: None,
        })
    }

    /// The block's class identity.
    pub fn class(&self) -> &ClassId {
        self.hookable.class()
    }

    /// The block's hooks.
    pub fn hooks(&self) -> HatchResult<Arc<HookRegistry>> {
        self.hookable.hooks()
    }

    /// Key holding the block's config value.
    pub fn config_key(&self) -> Option<&str> {
        self.block.config_key()
    }

    /// Whether the block runs in `phase`.
    pub fn participates(&self, phase: &str) -> bool {
        self.block.phases().participates(phase)
    }

    /// The outlet produced by `create`, if it ran.
    pub fn outlet(&self) -> Option<&Value> {
        self.outlet.as_ref()
    }

    /// Stores the config value and fires `config`.
    pub fn set_config(&mut self, value: Value, options: &Arc<HatchOptions>) -> HatchResult<()> {
        self.config = value;
        self.hooks()?
            .broadcast_sync(HOOK_CONFIG, vec![self.config.clone(), options_value(options)])
    }

    /// Creates the outlet and fires `created`; `None` when the block sits
    /// this phase out.
    pub fn create(&mut self, options: &Arc<HatchOptions>) -> HatchResult<Option<Value>> {
        if !self.participates(&options.phase) {
            debug!(class = %self.class(), phase = %options.phase, "Block skipped for phase");
            return Ok(None);
        }

        let outlet = self.block.create(&self.config, options)?;
        self.outlet = Some(outlet.clone());
        self.hooks()?
            .broadcast_sync(HOOK_CREATED, vec![outlet.clone(), options_value(options)])?;

        debug!(class = %self.class(), "Block created");
        Ok(Some(outlet))
    }

    /// Runs the block between `before_run` and `run`; `None` when the block
    /// sits this phase out.
    pub async fn run(&self, options: &Arc<HatchOptions>) -> HatchResult<Option<Value>> {
        if !self.participates(&options.phase) {
            return Ok(None);
        }

        let hooks = self.hooks()?;
        hooks
            .broadcast_async(HOOK_BEFORE_RUN, vec![options_value(options)])
            .await?;

        let ret = self.block.run(&self.config, options).await?;

        hooks
            .broadcast_async(HOOK_RUN, vec![ret.clone(), options_value(options)])
            .await?;

        info!(class = %self.class(), phase = %options.phase, "Block ran");
        Ok(Some(ret))
    }
}

fn options_value(options: &Arc<HatchOptions>) -> Value {
    Value::object(Arc::clone(options))
}
