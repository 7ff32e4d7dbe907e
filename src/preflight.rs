use std::io::Write;

use anyhow::Result;

use crate::checks::{self, CheckKind, CheckOutcome};
use crate::config::DeployConfig;
use crate::exec::CommandExecutor;
use crate::git;
use crate::prompt::Prompt;
use crate::report;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Passed,
    Aborted { check: CheckKind, message: String },
    /// The operator declined to continue at a confirmation prompt.
    Declined,
}

/// Runs the preflight battery against one branch. Checks only report
/// outcomes; printing and the abort decision happen here.
pub struct CheckRunner<E, P> {
    config: DeployConfig,
    executor: E,
    prompt: P,
}

impl<E: CommandExecutor, P: Prompt> CheckRunner<E, P> {
    pub fn new(config: DeployConfig, executor: E, prompt: P) -> Self {
        Self {
            config,
            executor,
            prompt,
        }
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    pub async fn run_all<W: Write>(&self, branch: &str, out: &mut W) -> Result<RunOutcome> {
        tracing::debug!("preflight: start branch={}", branch);
        for kind in CheckKind::ORDER {
            let outcome = if kind == CheckKind::MigrationChanges && self.config.confirm_migrations
            {
                self.prompt_on_migration_changes(branch, out).await?
            } else {
                self.run_one(kind, branch, out).await?
            };
            if outcome != RunOutcome::Passed {
                return Ok(outcome);
            }
        }
        report::write_success(out)?;
        tracing::debug!("preflight: done branch={}", branch);
        Ok(RunOutcome::Passed)
    }

    /// Run a single check, printing its advisory if any.
    pub async fn run_one<W: Write>(
        &self,
        kind: CheckKind,
        branch: &str,
        out: &mut W,
    ) -> Result<RunOutcome> {
        match checks::run_check(kind, &self.executor, &self.config, branch).await? {
            CheckOutcome::Passed => Ok(RunOutcome::Passed),
            CheckOutcome::Warning(advisory) => {
                report::write_advisory(out, &advisory)?;
                Ok(RunOutcome::Passed)
            }
            CheckOutcome::Fatal(message) => {
                tracing::debug!("preflight: {} aborted the run", kind);
                Ok(RunOutcome::Aborted {
                    check: kind,
                    message,
                })
            }
        }
    }

    /// Refresh remote-tracking refs, then list files changed against the base branch.
    pub async fn changed_files(&self, branch: &str) -> Result<Vec<String>> {
        git::fetch(&self.executor, &self.config.remote).await?;
        git::changed_files(
            &self.executor,
            &self.config.remote,
            &self.config.base_branch,
            branch,
        )
        .await
    }

    pub async fn prompt_on_migration_changes<W: Write>(
        &self,
        branch: &str,
        out: &mut W,
    ) -> Result<RunOutcome> {
        let outcome =
            checks::detect_migration_changes(&self.executor, &self.config, branch).await?;
        let CheckOutcome::Warning(advisory) = outcome else {
            return Ok(RunOutcome::Passed);
        };
        report::write_advisory(out, &advisory)?;
        out.flush()?;
        if self.prompt.confirm("Continue?")? {
            Ok(RunOutcome::Passed)
        } else {
            Ok(RunOutcome::Declined)
        }
    }
}
