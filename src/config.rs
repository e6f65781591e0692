use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::downloader::DEFAULT_USER_AGENT;
use crate::error::{MirrorError, Result};
use crate::localizer::DEFAULT_MAX_CONCURRENT;

/// Settings for a fetch run. Usually built from the command line, optionally
/// seeded from a JSON file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MirrorConfig {
    /// Directory that receives one subdirectory per host
    #[serde(default = "default_output_root")]
    pub output_root: PathBuf,

    /// Maximum concurrent asset downloads per page
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Print the metadata record of every saved page
    #[serde(default)]
    pub show_metadata: bool,

    /// Print metadata as JSON instead of plain text
    #[serde(default)]
    pub json: bool,
}

impl Default for MirrorConfig {
    fn default() -> Self {
        Self {
            output_root: default_output_root(),
            max_concurrent: default_max_concurrent(),
            user_agent: default_user_agent(),
            timeout_secs: default_timeout(),
            show_metadata: false,
            json: false,
        }
    }
}

impl MirrorConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .map_err(|e| MirrorError::Config(format!("cannot read {}: {}", path.display(), e)))?;
        Self::from_json(&contents)
    }

    pub fn from_json(contents: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(contents)
            .map_err(|e| MirrorError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_concurrent == 0 {
            return Err(MirrorError::Config("max_concurrent must be at least 1".to_string()));
        }
        if self.timeout_secs == 0 {
            return Err(MirrorError::Config("timeout_secs must be at least 1".to_string()));
        }
        Ok(())
    }
}

fn default_output_root() -> PathBuf {
    PathBuf::from(".")
}

fn default_max_concurrent() -> usize {
    DEFAULT_MAX_CONCURRENT
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_timeout() -> u64 {
    30
}
