use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

pub const CONFIG_FILE: &str = ".deploycheck.toml";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DeployConfig {
    /// Remote the deployment branch is pushed to.
    pub remote: String,
    /// Branch holding the current production state.
    pub base_branch: String,
    /// Substring marking dependency files.
    pub requirement_marker: String,
    /// Substring marking schema migration files.
    pub migration_marker: String,
    /// Ask before continuing when migrations are part of the deployment.
    pub confirm_migrations: bool,
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            remote: String::from("origin"),
            base_branch: String::from("prod"),
            requirement_marker: String::from("requirements"),
            migration_marker: String::from("migrations"),
            confirm_migrations: false,
        }
    }
}

pub async fn load_config(repo_root: &Path) -> Result<DeployConfig> {
    let path = repo_root.join(CONFIG_FILE);
    if !path.exists() {
        tracing::debug!("config: {} not found, using defaults", path.display());
        return Ok(DeployConfig::default());
    }
    let content = tokio::fs::read_to_string(&path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;
    let cfg: DeployConfig =
        toml::from_str(&content).with_context(|| format!("failed to parse {}", path.display()))?;
    tracing::debug!("config: loaded {}", path.display());
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_file_yields_defaults() {
        let td = tempfile::tempdir().unwrap();
        let cfg = load_config(td.path()).await.unwrap();
        assert_eq!(cfg, DeployConfig::default());
        assert_eq!(cfg.base_branch, "prod");
    }

    #[tokio::test]
    async fn partial_file_keeps_other_defaults() {
        let td = tempfile::tempdir().unwrap();
        std::fs::write(
            td.path().join(CONFIG_FILE),
            "base_branch = \"main\"\nconfirm_migrations = true\n",
        )
        .unwrap();
        let cfg = load_config(td.path()).await.unwrap();
        assert_eq!(cfg.base_branch, "main");
        assert!(cfg.confirm_migrations);
        assert_eq!(cfg.remote, "origin");
        assert_eq!(cfg.migration_marker, "migrations");
    }

    #[tokio::test]
    async fn unknown_keys_are_rejected() {
        let td = tempfile::tempdir().unwrap();
        std::fs::write(td.path().join(CONFIG_FILE), "base = \"main\"\n").unwrap();
        let err = load_config(td.path()).await.unwrap_err();
        assert!(err.to_string().contains("failed to parse"));
    }
}
