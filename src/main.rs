mod checks;
mod config;
mod exec;
mod git;
mod preflight;
mod prompt;
mod report;

use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::checks::CheckKind;
use crate::exec::ShellExecutor;
use crate::preflight::{CheckRunner, RunOutcome};
use crate::prompt::TerminalPrompt;

#[derive(Parser, Debug)]
#[command(name = "deploycheck", version, about = "Pre-deployment git sanity checks", long_about = None)]
struct Cli {
    /// Repository to inspect
    #[arg(global = true, long = "repo", default_value = ".")]
    repo: PathBuf,

    /// Answer yes to confirmation prompts
    #[arg(global = true, long = "yes", short = 'y', default_value_t = false)]
    yes: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run every preflight check against a deployment branch
    Run {
        branch: String,
        /// Ask for confirmation when the deployment contains migrations
        #[arg(long = "confirm-migrations", default_value_t = false)]
        confirm_migrations: bool,
    },
    /// Fetch, then list files changed between the base branch and a deployment branch
    Changes { branch: String },
    /// Run a single check
    Check {
        #[arg(value_enum)]
        check: CheckKind,
        branch: String,
    },
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_env("DEPLOYCHECK_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    init_tracing();
    let cli = Cli::parse();

    let executor = ShellExecutor::new(cli.repo.clone());
    let root = git::repo_root(&executor).await?;
    let mut cfg = config::load_config(&root)
        .await
        .context("failed to load configuration")?;

    let branch = match &cli.command {
        Commands::Run {
            branch,
            confirm_migrations,
        } => {
            cfg.confirm_migrations |= *confirm_migrations;
            branch.clone()
        }
        Commands::Changes { branch } | Commands::Check { branch, .. } => branch.clone(),
    };
    tracing::debug!(
        "main: repo={} remote={} base={} branch={}",
        root.display(),
        cfg.remote,
        cfg.base_branch,
        branch
    );

    let runner = CheckRunner::new(cfg, executor, TerminalPrompt::new(cli.yes));
    let mut stdout = io::stdout().lock();

    let outcome = match cli.command {
        Commands::Run { .. } => runner.run_all(&branch, &mut stdout).await?,
        Commands::Check { check, .. } => runner.run_one(check, &branch, &mut stdout).await?,
        Commands::Changes { .. } => {
            let files = runner.changed_files(&branch).await?;
            for file in files {
                writeln!(stdout, "{file}")?;
            }
            RunOutcome::Passed
        }
    };
    stdout.flush()?;

    match outcome {
        RunOutcome::Passed | RunOutcome::Declined => Ok(ExitCode::SUCCESS),
        RunOutcome::Aborted { check, message } => {
            tracing::debug!("main: aborted by {}", check);
            let stderr = io::stderr();
            colored::control::set_override(report::should_colorize(
                stderr.is_terminal(),
                std::env::var_os("NO_COLOR"),
                std::env::var_os("CLICOLOR_FORCE"),
            ));
            report::write_fatal(&mut stderr.lock(), &message)?;
            Ok(ExitCode::FAILURE)
        }
    }
}
