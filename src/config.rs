use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::error::{DeckError, Result};
use crate::github::DEFAULT_API_URL;
use crate::types::RepositoryRef;

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_repositories() -> Vec<String> {
    ["facebook/react", "ratatui/ratatui", "tokio-rs/tokio"]
        .into_iter()
        .map(String::from)
        .collect()
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Repositories offered on the entry screen, as `owner/name`.
    #[serde(default = "default_repositories")]
    pub repositories: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            repositories: default_repositories(),
        }
    }
}

pub fn config_path() -> Option<PathBuf> {
    let config_dir = dirs::config_dir()?;
    Some(config_dir.join("issuedeck").join("config.toml"))
}

impl Config {
    /// Load from the default location, falling back to defaults on any problem.
    pub fn load() -> Self {
        let Some(path) = config_path() else {
            return Config::default();
        };
        Self::load_from(&path).unwrap_or_else(|e| {
            if path.exists() {
                warn!(path = %path.display(), error = %e, "ignoring config file");
            }
            Config::default()
        })
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str::<Config>(content).map_err(|e| DeckError::Config(e.to_string()))
    }

    /// Configured repositories that parse as `owner/name`; the rest are skipped.
    pub fn repository_refs(&self) -> Vec<RepositoryRef> {
        self.repositories
            .iter()
            .filter_map(|raw| match RepositoryRef::parse(raw) {
                Ok(repo) => Some(repo),
                Err(e) => {
                    warn!(error = %e, "skipping configured repository");
                    None
                }
            })
            .collect()
    }
}
