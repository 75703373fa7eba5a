//! Unified error types for hatch.
//!
//! Every failure raised by configuration resolution, the hook system,
//! plugin application, and sandbox preparation is a [`HatchError`]. The
//! [`ErrorKind`] tells callers which rule was violated; the message carries
//! the offending key, layer origin, slot name, or class identity.

use std::fmt;
use thiserror::Error;

/// Category of a hatch error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    /// A resolution method was called on an empty layer stack.
    NotLoaded,
    /// A layer's plugin contribution is not a list of plugins.
    InvalidPlugins,
    /// A configuration layer could not be built from its source data.
    InvalidLayer,
    /// A hook slot was declared twice on one registry.
    DuplicateHookName,
    /// A listener was attached to a slot the real registry does not declare.
    UnknownHookSlot,
    /// Hooks were replaced after they had been set or read.
    HooksAlreadyResolved,
    /// A slot name collides with a reserved slot, or a proxy replay targets
    /// a slot the real registry does not recognize.
    ReservedHookNameConflict,
    /// A class identity was promoted twice.
    PromotionConflict,
    /// A broadcast supplied a different number of arguments than declared.
    InvalidHookArgs,
    /// A listener or broadcast does not fit the slot's dispatch mode.
    InvalidListener,
    /// A plugin tried to override an environment key owned by the sandbox.
    PreservedEnvKey,
    /// Orchestration options failed validation.
    InvalidOptions,
    /// A plugin, block, or listener reported a failure.
    Plugin,
    /// Runtime settings could not be loaded.
    Configuration,
    /// A serialization/deserialization error occurred.
    Serialization,
    /// An I/O error occurred.
    Io,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotLoaded => write!(f, "NOT_LOADED"),
            Self::InvalidPlugins => write!(f, "INVALID_PLUGINS"),
            Self::InvalidLayer => write!(f, "INVALID_LAYER"),
            Self::DuplicateHookName => write!(f, "DUPLICATE_HOOK_NAME"),
            Self::UnknownHookSlot => write!(f, "UNKNOWN_HOOK_SLOT"),
            Self::HooksAlreadyResolved => write!(f, "HOOKS_ALREADY_RESOLVED"),
            Self::ReservedHookNameConflict => write!(f, "RESERVED_HOOK_NAME_CONFLICT"),
            Self::PromotionConflict => write!(f, "PROMOTION_CONFLICT"),
            Self::InvalidHookArgs => write!(f, "INVALID_HOOK_ARGS"),
            Self::InvalidListener => write!(f, "INVALID_LISTENER"),
            Self::PreservedEnvKey => write!(f, "PRESERVED_ENV_KEY"),
            Self::InvalidOptions => write!(f, "INVALID_OPTIONS"),
            Self::Plugin => write!(f, "PLUGIN"),
            Self::Configuration => write!(f, "CONFIGURATION"),
            Self::Serialization => write!(f, "SERIALIZATION"),
            Self::Io => write!(f, "IO"),
        }
    }
}

/// The unified error used throughout hatch.
///
/// None of these are transient: they are raised at the point of violation
/// and propagated unchanged with `?`.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct HatchError {
    /// The category of error.
    pub kind: ErrorKind,
    /// A human-readable error message.
    pub message: String,
    /// Optional underlying cause.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl HatchError {
    /// Create a new error.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Create a new error with an underlying cause.
    pub fn with_source(
        kind: ErrorKind,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Resolution attempted before any layer was loaded.
    pub fn not_loaded(key: &str) -> Self {
        Self::new(
            ErrorKind::NotLoaded,
            format!("cannot resolve '{key}': no configuration layers are loaded"),
        )
    }

    /// A layer contributed something other than a plugin list.
    pub fn invalid_plugins(origin: &str, detail: impl fmt::Display) -> Self {
        Self::new(
            ErrorKind::InvalidPlugins,
            format!("invalid plugins in layer '{origin}': {detail}"),
        )
    }

    /// Create an invalid-layer error.
    pub fn invalid_layer(origin: &str, detail: impl fmt::Display) -> Self {
        Self::new(
            ErrorKind::InvalidLayer,
            format!("layer '{origin}' is invalid: {detail}"),
        )
    }

    /// Create a duplicate-hook-name error.
    pub fn duplicate_hook(name: &str) -> Self {
        Self::new(
            ErrorKind::DuplicateHookName,
            format!("hook slot '{name}' is already declared"),
        )
    }

    /// Create an unknown-hook-slot error.
    pub fn unknown_hook(name: &str) -> Self {
        Self::new(
            ErrorKind::UnknownHookSlot,
            format!("hook slot '{name}' is not declared"),
        )
    }

    /// Create a hooks-already-resolved error.
    pub fn hooks_already_resolved(class: &str) -> Self {
        Self::new(
            ErrorKind::HooksAlreadyResolved,
            format!("hooks of '{class}' were already set or read and cannot be replaced"),
        )
    }

    /// Create a reserved-hook-name error.
    pub fn reserved_hook(class: &str, name: &str) -> Self {
        Self::new(
            ErrorKind::ReservedHookNameConflict,
            format!("hook slot '{name}' is not available on '{class}'"),
        )
    }

    /// Create a promotion-conflict error.
    pub fn promotion_conflict(class: &str) -> Self {
        Self::new(
            ErrorKind::PromotionConflict,
            format!("hooks of '{class}' were already promoted"),
        )
    }

    /// Create an invalid-hook-args error.
    pub fn invalid_hook_args(name: &str, expected: usize, actual: usize) -> Self {
        Self::new(
            ErrorKind::InvalidHookArgs,
            format!("hook slot '{name}' takes {expected} argument(s), got {actual}"),
        )
    }

    /// Create an invalid-listener error.
    pub fn invalid_listener(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidListener, message)
    }

    /// Create a preserved-env-key error.
    pub fn preserved_env_key(key: &str) -> Self {
        Self::new(
            ErrorKind::PreservedEnvKey,
            format!("environment key '{key}' is reserved and cannot be changed"),
        )
    }

    /// Create an invalid-options error.
    pub fn invalid_options(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidOptions, message)
    }

    /// Create a plugin error.
    pub fn plugin(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Plugin, message)
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }
}

impl Clone for HatchError {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            message: self.message.clone(),
            source: None,
        }
    }
}

impl From<serde_json::Error> for HatchError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(
            ErrorKind::Serialization,
            format!("JSON serialization error: {err}"),
            err,
        )
    }
}

impl From<std::io::Error> for HatchError {
    fn from(err: std::io::Error) -> Self {
        Self::with_source(ErrorKind::Io, format!("I/O error: {err}"), err)
    }
}

impl From<config::ConfigError> for HatchError {
    fn from(err: config::ConfigError) -> Self {
        Self::with_source(
            ErrorKind::Configuration,
            format!("Configuration error: {err}"),
            err,
        )
    }
}
