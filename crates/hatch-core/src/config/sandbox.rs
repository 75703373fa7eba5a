//! Sandbox configuration.

use serde::{Deserialize, Serialize};

/// How the child process's standard streams are wired.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StdioMode {
    /// Share the parent's streams.
    #[default]
    Inherit,
    /// Capture the streams through pipes.
    Pipe,
    /// Discard all output.
    Null,
}

/// Settings applied when preparing a sandboxed child process.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SandboxConfig {
    /// Stdio wiring for the child.
    #[serde(default)]
    pub stdio: StdioMode,
    /// Extra parent environment keys inherited by the child, on top of the
    /// essential ones.
    #[serde(default)]
    pub inherit_env: Vec<String>,
}
