use serde::Deserialize;
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::audit::ScanSettings;
use crate::source::github::MAX_PER_PAGE;

pub const CONFIG_FILE: &str = ".pr-row-audit.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Top-level configuration loaded from .pr-row-audit.toml.
/// All fields are optional; command line flags override them.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub github: GitHubConfig,

    #[serde(default)]
    pub scan: ScanConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GitHubConfig {
    /// GitHub API token. If None, falls back to GITHUB_TOKEN env var.
    pub token: Option<String>,
    /// REST API root, override for GitHub Enterprise
    #[serde(default = "default_api_url")]
    pub api_url: String,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            token: None,
            api_url: default_api_url(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScanConfig {
    /// Repository to scan (`owner/repo`)
    pub repository: Option<String>,
    /// Pull request state to list: open, closed or all
    #[serde(default = "default_state")]
    pub state: String,
    #[serde(default = "default_per_page")]
    pub per_page: u32,
    /// Maximum number of pull requests to scan
    #[serde(default = "default_total")]
    pub total: u32,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            repository: None,
            state: default_state(),
            per_page: default_per_page(),
            total: default_total(),
        }
    }
}

impl ScanConfig {
    /// Listing settings, with `per_page` clamped to what the API accepts.
    pub fn settings(&self) -> ScanSettings {
        ScanSettings {
            per_page: self.per_page.clamp(1, MAX_PER_PAGE),
            total: self.total,
        }
    }
}

fn default_api_url() -> String {
    "https://api.github.com".to_string()
}

fn default_state() -> String {
    "open".to_string()
}

fn default_per_page() -> u32 {
    100
}

fn default_total() -> u32 {
    1000
}

impl Config {
    /// Load configuration from .pr-row-audit.toml in the current directory.
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

    /// Load from a specific path (useful for testing).
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
            .filter(|t| !t.is_empty())
            .or_else(|| std::env::var("GITHUB_TOKEN").ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.github.token.is_none());
        assert_eq!(config.github.api_url, "https://api.github.com");
        assert!(config.scan.repository.is_none());
        assert_eq!(config.scan.state, "open");
        assert_eq!(
            config.scan.settings(),
            ScanSettings {
                per_page: 100,
                total: 1000
            }
        );
    }

    #[test]
    fn test_parse_config_toml() {
        let toml_str = r#"
[github]
api_url = "https://ghe.example.com/api/v3"

[scan]
repository = "rails/rails"
per_page = 50
total = 200
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.github.api_url, "https://ghe.example.com/api/v3");
        assert_eq!(config.scan.repository.as_deref(), Some("rails/rails"));
        assert_eq!(config.scan.state, "open");
        assert_eq!(config.scan.settings().per_page, 50);
        assert_eq!(config.scan.settings().total, 200);
    }

    #[test]
    fn test_per_page_is_clamped() {
        let config: Config = toml::from_str("[scan]\nper_page = 500\n").unwrap();
        assert_eq!(config.scan.settings().per_page, 100);
        let config: Config = toml::from_str("[scan]\nper_page = 0\n").unwrap();
        assert_eq!(config.scan.settings().per_page, 1);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "[scan]\nstate = \"all\"\n").unwrap();
        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.scan.state, "all");

        fs::write(&path, "[scan\n").unwrap();
        assert!(matches!(Config::load_from(&path), Err(ConfigError::Parse(_))));
        assert!(matches!(
            Config::load_from(&dir.path().join("missing.toml")),
            Err(ConfigError::FileRead(_))
        ));
    }
}
