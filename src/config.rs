use crate::error::{Error, Result};
use std::env;
use std::path::PathBuf;

pub const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";
pub const DEFAULT_API_URL: &str = "https://api.github.com";
pub const DEFAULT_BATCH_SIZE: usize = 50;

#[derive(Debug, Clone)]
pub struct Config {
    pub github_token: String,
    pub anthropic_api_key: String,
    /// Repository the category lists are published into, as `owner/name`.
    pub target_repo: String,
    pub model: String,
    pub github_api_url: String,
    pub state_dir: PathBuf,
    pub batch_size: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key lookup, so tests don't have to touch
    /// the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| Error::Config(format!("{} environment variable not set", key)))
        };

        let github_token = required("GITHUB_TOKEN")?;
        let anthropic_api_key = required("ANTHROPIC_API_KEY")?;
        let target_repo = required("GITHUB_REPO")?;

        if target_repo.split('/').filter(|part| !part.is_empty()).count() != 2 {
            return Err(Error::Config(format!(
                "GITHUB_REPO must look like owner/name, got '{}'",
                target_repo
            )));
        }

        let model = lookup("ANTHROPIC_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let github_api_url = lookup("GITHUB_API_URL")
            .map(|v| v.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let state_dir = lookup("STATE_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));

        let batch_size = lookup("CLASSIFY_BATCH_SIZE")
            .and_then(|v| v.parse().ok())
            .filter(|&n: &usize| n > 0)
            .unwrap_or(DEFAULT_BATCH_SIZE);

        Ok(Self {
            github_token,
            anthropic_api_key,
            target_repo,
            model,
            github_api_url,
            state_dir,
            batch_size,
        })
    }
}

/// Per-run settings handed to the pipeline.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub output_dir: PathBuf,
    pub verbose: bool,
    pub force_publish: bool,
    pub batch_size: usize,
}

impl RunConfig {
    pub fn new(config: &Config, output_dir: PathBuf, verbose: bool, force_publish: bool) -> Self {
        Self {
            output_dir,
            verbose,
            force_publish,
            batch_size: config.batch_size,
        }
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            verbose: false,
            force_publish: false,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}
