//! Configuration loaded from `reviewmeta.toml`
//!
//! Lookup order: an explicit `--config` path, `./reviewmeta.toml`, then
//! `<config dir>/reviewmeta/config.toml`. Missing files fall back to the
//! built-in defaults; every section and key is optional.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::roster::contributor_source_url;

pub const CONFIG_FILE: &str = "reviewmeta.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub github: GitHubConfig,
    #[serde(default)]
    pub contributors: ContributorsConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Where review issues live
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GitHubConfig {
    #[serde(default = "default_org")]
    pub org: String,
    #[serde(default = "default_review_repo")]
    pub review_repo: String,
    /// Issues with any of these labels are processed
    #[serde(default = "default_labels")]
    pub labels: Vec<String>,
    /// Only issues updated on or after this `YYYY-MM-DD` date
    #[serde(default)]
    pub since: Option<String>,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            org: default_org(),
            review_repo: default_review_repo(),
            labels: default_labels(),
            since: None,
        }
    }
}

/// Repositories whose all-contributors files feed the roster
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ContributorsConfig {
    #[serde(default = "default_org")]
    pub org: String,
    #[serde(default = "default_branch")]
    pub branch: String,
    #[serde(default = "default_repos")]
    pub repos: Vec<String>,
}

impl Default for ContributorsConfig {
    fn default() -> Self {
        Self {
            org: default_org(),
            branch: default_branch(),
            repos: default_repos(),
        }
    }
}

impl ContributorsConfig {
    pub fn source_urls(&self) -> Vec<String> {
        self.repos
            .iter()
            .map(|repo| contributor_source_url(&self.org, repo, &self.branch))
            .collect()
    }
}

/// Default output paths
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OutputConfig {
    #[serde(default = "default_packages_path")]
    pub packages: PathBuf,
    #[serde(default = "default_contributors_path")]
    pub contributors: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            packages: default_packages_path(),
            contributors: default_contributors_path(),
        }
    }
}

fn default_org() -> String {
    "pyOpenSci".to_string()
}

fn default_review_repo() -> String {
    "software-submission".to_string()
}

fn default_labels() -> Vec<String> {
    vec!["6/pyOS-approved".to_string(), "9/joss-approved".to_string()]
}

fn default_branch() -> String {
    "main".to_string()
}

fn default_repos() -> Vec<String> {
    [
        "python-package-guide",
        "software-peer-review",
        "pyopensci.github.io",
        "software-review",
        "pyosmeta",
        "handbook",
        "software-submission",
        "metrics",
        "pyosPackage",
        "pyos-sphinx-theme",
        "lessons",
        "pyos-package-template",
    ]
    .iter()
    .map(|r| r.to_string())
    .collect()
}

fn default_packages_path() -> PathBuf {
    PathBuf::from("_data/packages.yml")
}

fn default_contributors_path() -> PathBuf {
    PathBuf::from("_data/contributors.yml")
}

impl Config {
    /// Load configuration, falling back to defaults when no file exists.
    ///
    /// An explicit path must exist.
    pub fn load(explicit: Option<&Path>) -> anyhow::Result<Self> {
        if let Some(path) = explicit {
            return Self::load_file(path);
        }

        let candidates = [
            Some(PathBuf::from(CONFIG_FILE)),
            dirs::config_dir().map(|d| d.join("reviewmeta").join("config.toml")),
        ];
        for path in candidates.into_iter().flatten() {
            if path.exists() {
                return Self::load_file(&path);
            }
        }

        tracing::debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    pub fn load_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }
}
