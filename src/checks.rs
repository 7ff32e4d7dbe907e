use std::fmt;

use anyhow::Result;
use clap::ValueEnum;

use crate::config::DeployConfig;
use crate::exec::CommandExecutor;
use crate::git::{self, BaseBranchMatcher};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CheckKind {
    DeployBranchIsCurrent,
    BranchPushed,
    MissingPush,
    ProdMergedIn,
    CurrentBranchProd,
    RequirementChanges,
    MigrationChanges,
}

impl CheckKind {
    /// Execution order for a full run. Identity and sync checks come before
    /// the content advisories.
    pub const ORDER: [CheckKind; 7] = [
        CheckKind::DeployBranchIsCurrent,
        CheckKind::BranchPushed,
        CheckKind::MissingPush,
        CheckKind::ProdMergedIn,
        CheckKind::CurrentBranchProd,
        CheckKind::RequirementChanges,
        CheckKind::MigrationChanges,
    ];

    pub fn name(self) -> &'static str {
        match self {
            CheckKind::DeployBranchIsCurrent => "deploy-branch-is-current",
            CheckKind::BranchPushed => "branch-pushed",
            CheckKind::MissingPush => "missing-push",
            CheckKind::ProdMergedIn => "prod-merged-in",
            CheckKind::CurrentBranchProd => "current-branch-prod",
            CheckKind::RequirementChanges => "requirement-changes",
            CheckKind::MigrationChanges => "migration-changes",
        }
    }
}

impl fmt::Display for CheckKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Advisory {
    pub headline: String,
    pub files: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
    Passed,
    Warning(Advisory),
    Fatal(String),
}

impl CheckOutcome {
    pub fn is_warning(&self) -> bool {
        matches!(self, CheckOutcome::Warning(_))
    }
}

pub async fn run_check<E: CommandExecutor>(
    kind: CheckKind,
    exec: &E,
    cfg: &DeployConfig,
    branch: &str,
) -> Result<CheckOutcome> {
    tracing::debug!("checks: running {} for {}", kind, branch);
    let outcome = match kind {
        CheckKind::DeployBranchIsCurrent => detect_deploy_branch_is_current(exec, branch).await,
        CheckKind::BranchPushed => detect_local_branch_pushed(exec, cfg, branch).await,
        CheckKind::MissingPush => detect_missing_push(exec, cfg, branch).await,
        CheckKind::ProdMergedIn => detect_prod_merged_in(exec, cfg, branch).await,
        CheckKind::CurrentBranchProd => Ok(detect_current_branch_prod(cfg, branch)),
        CheckKind::RequirementChanges => detect_requirement_changes(exec, cfg, branch).await,
        CheckKind::MigrationChanges => detect_migration_changes(exec, cfg, branch).await,
    }?;
    tracing::trace!("checks: {} warning={}", kind, outcome.is_warning());
    Ok(outcome)
}

pub fn matching_files(changed: &[String], marker: &str) -> Vec<String> {
    changed
        .iter()
        .filter(|f| f.contains(marker))
        .cloned()
        .collect()
}

async fn marker_advisory<E: CommandExecutor>(
    exec: &E,
    cfg: &DeployConfig,
    branch: &str,
    marker: &str,
    headline: &str,
) -> Result<CheckOutcome> {
    let changed = git::changed_files(exec, &cfg.remote, &cfg.base_branch, branch).await?;
    let files = matching_files(&changed, marker);
    if files.is_empty() {
        return Ok(CheckOutcome::Passed);
    }
    Ok(CheckOutcome::Warning(Advisory {
        headline: headline.to_string(),
        files,
    }))
}

pub async fn detect_requirement_changes<E: CommandExecutor>(
    exec: &E,
    cfg: &DeployConfig,
    branch: &str,
) -> Result<CheckOutcome> {
    marker_advisory(
        exec,
        cfg,
        branch,
        &cfg.requirement_marker,
        "WARNING: We have requirement changes in this deployment:",
    )
    .await
}

pub async fn detect_migration_changes<E: CommandExecutor>(
    exec: &E,
    cfg: &DeployConfig,
    branch: &str,
) -> Result<CheckOutcome> {
    marker_advisory(
        exec,
        cfg,
        branch,
        &cfg.migration_marker,
        "WARNING: You have migrations in this deployment:",
    )
    .await
}

pub fn detect_current_branch_prod(cfg: &DeployConfig, branch: &str) -> CheckOutcome {
    if branch != cfg.base_branch {
        return CheckOutcome::Passed;
    }
    CheckOutcome::Warning(Advisory {
        headline: format!(
            "WARNING: Deploying {} branch some checks won't be detected",
            cfg.base_branch
        ),
        files: Vec::new(),
    })
}

pub async fn detect_prod_merged_in<E: CommandExecutor>(
    exec: &E,
    cfg: &DeployConfig,
    branch: &str,
) -> Result<CheckOutcome> {
    git::fetch(exec, &cfg.remote).await?;
    let matcher = BaseBranchMatcher::new(&cfg.base_branch)?;
    let unmerged = git::unmerged_branches(exec).await?;
    if let Some(hit) = unmerged.iter().find(|name| matcher.is_match(name)) {
        tracing::debug!("checks: {} is not merged into HEAD", hit);
        return Ok(CheckOutcome::Fatal(format!(
            "*** '{base}' not MERGED into '{branch}' (hint: 'git pull {remote} {base}' or 'ssh-add')",
            base = cfg.base_branch,
            remote = cfg.remote,
        )));
    }
    Ok(CheckOutcome::Passed)
}

pub async fn detect_missing_push<E: CommandExecutor>(
    exec: &E,
    cfg: &DeployConfig,
    branch: &str,
) -> Result<CheckOutcome> {
    let remote_rev = git::remote_revision(exec, &cfg.remote, branch).await?;
    let local_rev = git::local_revision(exec).await?;
    if remote_rev.as_deref() != Some(local_rev.as_str()) {
        tracing::debug!(
            "checks: local {} differs from remote {:?}",
            local_rev,
            remote_rev
        );
        return Ok(CheckOutcome::Fatal(String::from(
            "There are local commits not in remote (hint: git push).",
        )));
    }
    Ok(CheckOutcome::Passed)
}

pub async fn detect_local_branch_pushed<E: CommandExecutor>(
    exec: &E,
    cfg: &DeployConfig,
    branch: &str,
) -> Result<CheckOutcome> {
    if git::remote_revision(exec, &cfg.remote, branch).await?.is_none() {
        return Ok(CheckOutcome::Fatal(format!(
            "Branch '{branch}' has not been pushed to remote."
        )));
    }
    Ok(CheckOutcome::Passed)
}

pub async fn detect_deploy_branch_is_current<E: CommandExecutor>(
    exec: &E,
    branch: &str,
) -> Result<CheckOutcome> {
    let current = git::current_branch(exec).await?;
    if current != branch {
        return Ok(CheckOutcome::Fatal(format!(
            "Must be on branch \"{branch}\". Current branch is \"{current}\""
        )));
    }
    Ok(CheckOutcome::Passed)
}
