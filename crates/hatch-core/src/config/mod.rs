//! Runtime settings.
//!
//! These are the host's own settings (logging, sandbox behaviour), read
//! through the `config` crate. They are separate from the layered
//! configuration stack in [`crate::layers`], which carries plugin lists and
//! block settings contributed by each configuration layer.

pub mod logging;
pub mod sandbox;

use serde::{Deserialize, Serialize};

use self::logging::LoggingConfig;
use self::sandbox::SandboxConfig;

use crate::error::HatchError;

/// Root runtime settings.
///
/// Every section has a serde default, so an empty source set still
/// deserializes into a usable configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HatchConfig {
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Sandbox settings.
    #[serde(default)]
    pub sandbox: SandboxConfig,
}

impl HatchConfig {
    /// Load settings from TOML files.
    ///
    /// Merges `config/default` with an environment-specific overlay and
    /// environment variables prefixed with `HATCH__`. Both files are optional.
    pub fn load(env: &str) -> Result<Self, HatchError> {
        Self::builder(env)
            .build()
            .map_err(|e| HatchError::configuration(format!("Failed to build config: {e}")))?
            .try_deserialize()
            .map_err(|e| HatchError::configuration(format!("Failed to deserialize config: {e}")))
    }

    fn builder(env: &str) -> config::ConfigBuilder<config::builder::DefaultState> {
        config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("HATCH")
                    .prefix_separator("__")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("sandbox.inherit_env")
                    .try_parsing(true),
            )
    }
}
