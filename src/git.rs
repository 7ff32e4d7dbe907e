use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use regex::Regex;

use crate::exec::CommandExecutor;

/// Run git and return stdout, failing on a non-zero exit.
async fn capture<E: CommandExecutor>(exec: &E, args: &[&str]) -> Result<String> {
    let out = exec.execute("git", args).await?;
    if !out.success() {
        bail!(
            "`git {}` failed with status {}: {}",
            args.join(" "),
            out.status
                .map(|c| c.to_string())
                .unwrap_or_else(|| String::from("<signal>")),
            out.stderr.trim()
        );
    }
    Ok(out.stdout)
}

pub async fn repo_root<E: CommandExecutor>(exec: &E) -> Result<PathBuf> {
    let out = capture(exec, &["rev-parse", "--show-toplevel"])
        .await
        .context("not inside a git work tree")?;
    Ok(PathBuf::from(out.trim()))
}

/// Paths changed between `<remote>/<base>` and `<remote>/<branch>`.
pub async fn changed_files<E: CommandExecutor>(
    exec: &E,
    remote: &str,
    base: &str,
    branch: &str,
) -> Result<Vec<String>> {
    let range = format!("{remote}/{base}..{remote}/{branch}");
    let out = capture(exec, &["diff", "--name-only", &range]).await?;
    let files: Vec<String> = out
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(String::from)
        .collect();
    tracing::debug!("git: {} changed files in {}", files.len(), range);
    Ok(files)
}

/// Head revision of `refs/heads/<branch>` on the remote, `None` if the branch
/// does not exist there.
pub async fn remote_revision<E: CommandExecutor>(
    exec: &E,
    remote: &str,
    branch: &str,
) -> Result<Option<String>> {
    let out = capture(exec, &["ls-remote", "--heads", remote, branch]).await?;
    Ok(parse_ls_remote(&out, branch))
}

fn parse_ls_remote(output: &str, branch: &str) -> Option<String> {
    let wanted = format!("refs/heads/{branch}");
    output.lines().find_map(|line| {
        let (rev, name) = line.split_once('\t')?;
        (name.trim() == wanted).then(|| rev.trim().to_string())
    })
}

pub async fn local_revision<E: CommandExecutor>(exec: &E) -> Result<String> {
    Ok(capture(exec, &["rev-parse", "HEAD"]).await?.trim().to_string())
}

pub async fn current_branch<E: CommandExecutor>(exec: &E) -> Result<String> {
    Ok(capture(exec, &["rev-parse", "--abbrev-ref", "HEAD"])
        .await?
        .trim()
        .to_string())
}

pub async fn fetch<E: CommandExecutor>(exec: &E, remote: &str) -> Result<()> {
    capture(exec, &["fetch", remote])
        .await
        .with_context(|| format!("failed to fetch from {remote} (is your ssh agent loaded?)"))?;
    Ok(())
}

/// Full ref names of every local and remote-tracking branch not merged into HEAD.
pub async fn unmerged_branches<E: CommandExecutor>(exec: &E) -> Result<Vec<String>> {
    // `--no-merged` takes an optional commit, so it must come last with HEAD spelled out.
    let out = capture(
        exec,
        &["branch", "-a", "--format=%(refname)", "--no-merged", "HEAD"],
    )
    .await?;
    Ok(out
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(String::from)
        .collect())
}

/// Matches branch names whose last path segment is exactly the base branch,
/// so `remotes/origin/prod` matches while `production` and
/// `feature/fixed-in-prod` do not.
#[derive(Debug, Clone)]
pub struct BaseBranchMatcher {
    re: Regex,
}

impl BaseBranchMatcher {
    pub fn new(base: &str) -> Result<Self> {
        let re = Regex::new(&format!(r"(?:^|[\s/]){}$", regex::escape(base)))
            .with_context(|| format!("invalid base branch name: {base}"))?;
        Ok(Self { re })
    }

    pub fn is_match(&self, name: &str) -> bool {
        self.re.is_match(name.trim_end())
    }
}
