use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub reporter: ReporterConfig,
    pub recorder: RecorderConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReporterConfig {
    /// Time between two snapshots (default 5s)
    #[serde(with = "humantime_serde")]
    pub interval: Duration,
    /// Path of the subtree to report; empty reports the whole store
    pub scope: Vec<String>,
    /// Separator used when rendering record names (default "/")
    pub separator: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecorderConfig {
    /// Character splitting `metrics` key names into path segments (default '.')
    pub separator: char,
}

impl Default for ReporterConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
            scope: Vec::new(),
            separator: "/".to_string(),
        }
    }
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self { separator: '.' }
    }
}

impl Config {
    /// Load configuration from file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;

        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).map_err(ConfigError::from)?;
        config.validate()?;
        Ok(config)
    }
}
