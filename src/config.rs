use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Default config file looked up in the current directory.
pub const CONFIG_FILE: &str = ".release-me.toml";

pub const DEFAULT_BRANCH: &str = "master";
pub const DEFAULT_RELEASE_LIMIT: usize = 50;
/// Largest page GitHub's GraphQL API accepts for `first`.
pub const MAX_RELEASE_LIMIT: usize = 100;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Top-level configuration loaded from .release-me.toml.
/// All fields are optional; the tool works with zero config.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub github: GitHubConfig,

    #[serde(default)]
    pub generate: GenerateConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GitHubConfig {
    /// GitHub API token. If None, falls back to GITHUB_TOKEN env var.
    pub token: Option<String>,
    /// GraphQL endpoint, for GitHub Enterprise installs
    pub endpoint: Option<String>,
    pub owner: Option<String>,
    pub repo: Option<String>,
    /// Per-request deadline in seconds
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerateConfig {
    pub branch: Option<String>,
    /// Logins whose pull requests never appear in release notes
    #[serde(default)]
    pub ignore_authors: Vec<String>,
    /// Releases whose name matches are not considered previous releases
    pub ignore_release_regex: Option<String>,
    /// How many recent releases are searched for the previous release
    pub release_limit: Option<usize>,
}

impl Config {
    /// Load configuration from .release-me.toml in the current directory.
    /// Returns default config if the file doesn't exist.
    pub fn load() -> Result<Config, ConfigError> {
        let path = Path::new(CONFIG_FILE);
        let mut config = if path.exists() {
            Self::load_from(path)?
        } else {
            Config::default()
        };

        if config.github.token.is_none() {
            if let Ok(token) = std::env::var("GITHUB_TOKEN") {
                config.github.token = Some(token);
            }
        }

        Ok(config)
    }

    /// Load from a specific path.
    pub fn load_from(path: &Path) -> Result<Config, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Resolve the GitHub token: config file value takes precedence,
    /// falls back to GITHUB_TOKEN env var.
    pub fn github_token(&self) -> Option<String> {
        self.github
            .token
            .clone()
            .or_else(|| std::env::var("GITHUB_TOKEN").ok())
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.github.timeout_secs.map(Duration::from_secs)
    }

    pub fn branch(&self) -> &str {
        self.generate.branch.as_deref().unwrap_or(DEFAULT_BRANCH)
    }

    /// Clamped to 1..=100, the range GitHub accepts.
    pub fn release_limit(&self) -> usize {
        self.generate
            .release_limit
            .unwrap_or(DEFAULT_RELEASE_LIMIT)
            .clamp(1, MAX_RELEASE_LIMIT)
    }
}
