//! Launch plan for the sandboxed child process.

use std::path::PathBuf;
use std::process::{Command, Stdio};

use hatch_core::config::sandbox::StdioMode;

use super::env::EnvOverlay;

/// Everything needed to start the child process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchPlan {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: PathBuf,
    /// Complete child environment; the parent's is not inherited.
    pub env: EnvOverlay,
    pub stdio: StdioMode,
}

impl LaunchPlan {
    /// Builds an unspawned command for this plan.
    pub fn command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .current_dir(&self.cwd)
            .env_clear()
            .envs(self.env.iter());

        let stdio = || match self.stdio {
            StdioMode::Inherit => Stdio::inherit(),
            StdioMode::Pipe => Stdio::piped(),
            StdioMode::Null => Stdio::null(),
        };
        command.stdin(stdio()).stdout(stdio()).stderr(stdio());
        command
    }
}
