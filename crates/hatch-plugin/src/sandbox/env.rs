//! Environment overlay for the sandboxed child process.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use tracing::trace;

use hatch_core::{HatchError, HatchResult};

/// Parent keys every child inherits.
pub const ESSENTIAL_ENV_KEYS: &[&str] = &["PATH", "RUST_LOG", "RUST_BACKTRACE"];

pub const ENV_CWD: &str = "HATCH_CWD";
pub const ENV_DEV: &str = "HATCH_DEV";
pub const ENV_PHASE: &str = "HATCH_PHASE";

/// Keys only the sandbox itself may set.
pub const PRIVATE_ENV_KEYS: &[&str] = &[ENV_CWD, ENV_DEV, ENV_PHASE];

/// Whether `key` is reserved for the sandbox.
pub fn is_private_key(key: &str) -> bool {
    PRIVATE_ENV_KEYS.contains(&key)
}

/// Immutable environment of a child process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvOverlay {
    vars: BTreeMap<String, String>,
}

impl EnvOverlay {
    /// Value of `key`, if set.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    /// Whether `key` is set.
    pub fn contains(&self, key: &str) -> bool {
        self.vars.contains_key(key)
    }

    /// Variables in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of variables.
    pub fn len(&self) -> usize {
        self.vars.len()
    }

    /// Whether no variable is set.
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

/// Builds an [`EnvOverlay`] from a snapshot of the parent environment.
///
/// Nothing from the parent is inherited unless asked for.
#[derive(Debug, Clone, Default)]
pub struct EnvOverlayBuilder {
    parent: BTreeMap<String, String>,
    vars: BTreeMap<String, String>,
}

impl EnvOverlayBuilder {
    /// Starts from the given parent environment snapshot.
    pub fn new<I, K, V>(parent: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            parent: parent
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            vars: BTreeMap::new(),
        }
    }

    /// Starts from the current process environment.
    pub fn from_process() -> Self {
        Self::new(std::env::vars())
    }

    /// Sets `key` to `value`.
    pub fn set(&mut self, key: &str, value: impl Into<String>) -> HatchResult<()> {
        self.set_opt(key, Some(value))
    }

    /// Sets `key` when `value` is present; `None` leaves the key untouched.
    pub fn set_opt(&mut self, key: &str, value: Option<impl Into<String>>) -> HatchResult<()> {
        guard(key)?;
        if let Some(value) = value {
            self.vars.insert(key.to_string(), value.into());
        }
        Ok(())
    }

    /// Copies `key` from the parent environment, if the parent has it.
    pub fn inherit(&mut self, key: &str) -> HatchResult<()> {
        guard(key)?;
        match self.parent.get(key) {
            Some(value) => {
                self.vars.insert(key.to_string(), value.clone());
            }
            None => trace!(key, "Parent has no value to inherit"),
        }
        Ok(())
    }

    /// Current value of `key` in the overlay.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    pub(crate) fn reserve(&mut self, key: &'static str, value: impl Into<String>) {
        self.vars.insert(key.to_string(), value.into());
    }

    /// Freezes the overlay.
    pub fn build(&self) -> EnvOverlay {
        EnvOverlay {
            vars: self.vars.clone(),
        }
    }
}

fn guard(key: &str) -> HatchResult<()> {
    if is_private_key(key) {
        return Err(HatchError::preserved_env_key(key));
    }
    Ok(())
}

/// Shared handle to the overlay under construction, passed to
/// `sandbox_environment` listeners.
#[derive(Debug, Clone)]
pub struct SandboxEnv {
    inner: Arc<Mutex<EnvOverlayBuilder>>,
}

impl SandboxEnv {
    /// Wraps `builder` for shared editing.
    pub fn new(builder: EnvOverlayBuilder) -> Self {
        Self {
            inner: Arc::new(Mutex::new(builder)),
        }
    }

    /// Sets `key` to `value`. Private keys are refused.
    pub fn set(&self, key: &str, value: impl Into<String>) -> HatchResult<()> {
        self.lock().set(key, value)
    }

    /// Sets `key` when `value` is present and leaves it untouched otherwise.
    pub fn set_opt(&self, key: &str, value: Option<impl Into<String>>) -> HatchResult<()> {
        self.lock().set_opt(key, value)
    }

    /// Copies `key` from the parent environment, if the parent has it.
    pub fn inherit(&self, key: &str) -> HatchResult<()> {
        self.lock().inherit(key)
    }

    /// Current value of `key` in the overlay.
    pub fn get(&self, key: &str) -> Option<String> {
        self.lock().get(key).map(str::to_string)
    }

    /// Freezes the current state of the overlay.
    pub fn build(&self) -> EnvOverlay {
        self.lock().build()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, EnvOverlayBuilder> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}
