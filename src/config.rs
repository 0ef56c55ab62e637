use serde::Deserialize;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Settings file looked up in the current directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = ".pr-file-extractor.toml";

pub const DEFAULT_BASE_URL: &str = "https://dev.azure.com";
pub const DEFAULT_API_VERSION: &str = "7.1";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Top-level configuration loaded from .pr-file-extractor.toml.
///
/// Every field is optional and the tool works with zero config. Credentials
/// and PR coordinates are never read from here; they are always prompted for.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub azure_devops: AzureDevOpsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AzureDevOpsConfig {
    /// Service root, e.g. `https://dev.azure.com` or an on-prem collection URL.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Value sent as the `api-version` query parameter.
    #[serde(default = "default_api_version")]
    pub api_version: String,
}

impl Default for AzureDevOpsConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_version: default_api_version(),
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_api_version() -> String {
    DEFAULT_API_VERSION.to_string()
}

impl Config {
    /// Load configuration from `path` if given, otherwise from
    /// .pr-file-extractor.toml in the current directory.
    /// A missing default file yields `Config::default()`; a missing explicit
    /// file is an error.
    pub fn load(path: Option<&Path>) -> Result<Config, ConfigError> {
        match path {
            Some(path) => Self::load_from(path),
            None => {
                let path = Path::new(DEFAULT_CONFIG_FILE);
                if path.exists() {
                    Self::load_from(path)
                } else {
                    Ok(Config::default())
                }
            }
        }
    }

    /// Load from a specific path.
    pub fn load_from(path: &Path) -> Result<Config, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let config = toml::from_str(&contents)?;
        Ok(config)
    }
}
