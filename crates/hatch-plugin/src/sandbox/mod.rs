//! Sandbox launch preparation.
//!
//! The sandbox runs in the parent process. It applies the plugins marked
//! [`Plugin::sandbox`](crate::plugin::Plugin::sandbox), lets them shape the
//! child's environment through the `sandbox_environment` hook, and returns
//! a [`LaunchPlan`] for the child.

pub mod env;
pub mod launch;

use std::collections::BTreeMap;

use tracing::{debug, info};

use hatch_core::config::sandbox::SandboxConfig;
use hatch_core::{HatchResult, LayeredConfig, Value};

use crate::hooks::{HookRegistry, HookSlot};
use crate::lifecycle::{HatchOptions, Lifecycle};

pub use env::{EnvOverlay, EnvOverlayBuilder, SandboxEnv};
pub use launch::LaunchPlan;

use env::{ENV_CWD, ENV_DEV, ENV_PHASE, ESSENTIAL_ENV_KEYS};

/// Host hook fired while the child environment is being built.
pub const HOOK_SANDBOX_ENVIRONMENT: &str = "sandbox_environment";

/// Prepares launches of the orchestrated child process.
#[derive(Debug, Clone)]
pub struct Sandbox {
    options: HatchOptions,
    config: LayeredConfig,
    settings: SandboxConfig,
    parent_env: BTreeMap<String, String>,
}

impl Sandbox {
    /// Creates a sandbox over the current process environment.
    pub fn new(
        options: HatchOptions,
        config: LayeredConfig,
        settings: SandboxConfig,
    ) -> HatchResult<Self> {
        Ok(Self {
            options: options.resolved()?,
            config,
            settings,
            parent_env: std::env::vars().collect(),
        })
    }

    /// Replaces the parent environment snapshot.
    pub fn with_parent_env<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.parent_env = vars
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        self
    }

    /// Slots of the sandbox host.
    pub fn host_hooks() -> HatchResult<HookRegistry> {
        HookRegistry::with_slots([(
            HOOK_SANDBOX_ENVIRONMENT,
            HookSlot::sequential(["sandbox", "context"]),
        )])
    }

    /// Builds the launch plan for `program`.
    ///
    /// Sandbox plugins are applied to a fresh lifecycle, then every
    /// `sandbox_environment` listener may edit the overlay through the
    /// [`SandboxEnv`] passed as `sandbox`. The first failing listener
    /// aborts preparation.
    pub async fn prepare(
        &self,
        program: impl Into<String>,
        args: Vec<String>,
    ) -> HatchResult<LaunchPlan> {
        let program = program.into();
        let env = SandboxEnv::new(self.base_env()?);

        let lifecycle = Lifecycle::new(self.options.clone(), self.config.clone(), Self::host_hooks()?)?;
        let applied = lifecycle.apply_plugins(|plugin| plugin.sandbox())?;
        debug!(applied, "Sandbox plugins applied");

        lifecycle
            .hooks()
            .broadcast_async(
                HOOK_SANDBOX_ENVIRONMENT,
                vec![Value::object(env.clone()), self.context()],
            )
            .await?;

        let plan = LaunchPlan {
            program,
            args,
            cwd: self.options.cwd.clone(),
            env: env.build(),
            stdio: self.settings.stdio,
        };

        info!(
            program = %plan.program,
            args = ?plan.args,
            env_vars = plan.env.len(),
            "Launch plan prepared"
        );
        Ok(plan)
    }

    fn base_env(&self) -> HatchResult<EnvOverlayBuilder> {
        let mut builder = EnvOverlayBuilder::new(self.parent_env.clone());

        for key in ESSENTIAL_ENV_KEYS {
            builder.inherit(key)?;
        }
        for key in &self.settings.inherit_env {
            builder.inherit(key)?;
        }

        builder.reserve(ENV_CWD, self.options.cwd.display().to_string());
        if self.options.dev {
            builder.reserve(ENV_DEV, "true");
        }
        builder.reserve(ENV_PHASE, self.options.phase.clone());

        Ok(builder)
    }

    fn context(&self) -> Value {
        let mut context = BTreeMap::new();
        context.insert(
            "cwd".to_string(),
            Value::from(self.options.cwd.display().to_string()),
        );
        context.insert("dev".to_string(), Value::from(self.options.dev));
        context.insert("phase".to_string(), Value::from(self.options.phase.clone()));
        Value::Table(context)
    }
}
