use std::path::PathBuf;

use anyhow::{Context, Result};
use tokio::process::Command;

/// Captured result of a finished external command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code, `None` if the process was killed by a signal.
    pub status: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.status == Some(0)
    }
}

/// Runs a program to completion and hands back its output without judging
/// the exit status. Callers decide whether a non-zero status is an error.
pub trait CommandExecutor {
    async fn execute(&self, program: &str, args: &[&str]) -> Result<CommandOutput>;
}

#[derive(Debug, Clone)]
pub struct ShellExecutor {
    cwd: PathBuf,
}

impl ShellExecutor {
    pub fn new(cwd: impl Into<PathBuf>) -> Self {
        Self { cwd: cwd.into() }
    }
}

impl CommandExecutor for ShellExecutor {
    async fn execute(&self, program: &str, args: &[&str]) -> Result<CommandOutput> {
        tracing::trace!("exec: {} {}", program, args.join(" "));
        let output = Command::new(program)
            .args(args)
            .current_dir(&self.cwd)
            .output()
            .await
            .with_context(|| format!("failed to spawn `{} {}`", program, args.join(" ")))?;
        Ok(CommandOutput {
            status: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}
