//! Configuration loading and types

use std::path::{Path, PathBuf};

use color_eyre::eyre::{Result, WrapErr};
use dyninv_core::SourceConfig;
use serde::{Deserialize, Serialize};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV: &str = "DYNINV_CONFIG";

/// Top-level configuration for the dyninv CLI
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Log level or filter directive (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Remote source settings
    #[serde(default)]
    pub source: SourceConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            source: SourceConfig::default(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from file
    ///
    /// # Errors
    /// Returns error if file cannot be read or parsed
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("cannot read config file {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .wrap_err_with(|| format!("invalid config file {}", path.display()))?;
        Ok(config)
    }

    /// Find the config file to use, if any
    ///
    /// `DYNINV_CONFIG` wins and is returned even when the file does not
    /// exist, so a typo surfaces as a load error instead of silent defaults.
    #[must_use]
    pub fn locate() -> Option<PathBuf> {
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            return Some(PathBuf::from(path));
        }

        first_existing(default_paths())
    }
}

/// Common config locations, most specific first
fn default_paths() -> Vec<PathBuf> {
    let mut paths = vec![
        PathBuf::from("dyninv.toml"),
        PathBuf::from("/etc/dyninv/dyninv.toml"),
    ];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("dyninv/dyninv.toml"));
    }
    paths
}

fn first_existing(paths: impl IntoIterator<Item = PathBuf>) -> Option<PathBuf> {
    paths.into_iter().find(|p| p.is_file())
}
