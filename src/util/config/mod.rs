//! midlc configuration
//!
//! Settings for import discovery and logging, layered with merge semantics.
//!
//! # Configuration hierarchy
//!
//! ```text
//! Priority (high → low):
//! 1. CLI arguments
//! 2. Environment variables (MIDL_PATH)
//! 3. Config file (midlc.toml)
//! 4. Default values
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use midlc::util::config::FrontendConfig;
//!
//! let config = FrontendConfig::load(None).unwrap();
//! println!("{:?}", config.search_path);
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::util::logger::LogLevel;

/// Environment variable holding a colon-separated import search path.
pub const SEARCH_PATH_ENV: &str = "MIDL_PATH";

/// Front end configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrontendConfig {
    /// Directories searched for imported files, in order
    #[serde(default)]
    pub search_path: Vec<PathBuf>,
    /// Name prefixes ignored by the fallback import lookup
    #[serde(default = "default_strip_prefixes")]
    pub strip_prefixes: Vec<String>,
    /// Source file extension appended to bare import names
    #[serde(default = "default_extension")]
    pub extension: String,
    /// Log level used by the CLI
    #[serde(default)]
    pub log_level: LogLevel,
}

fn default_strip_prefixes() -> Vec<String> {
    vec!["ms-".to_string(), "mc-".to_string()]
}

fn default_extension() -> String {
    "idl".to_string()
}

impl Default for FrontendConfig {
    fn default() -> Self {
        Self {
            search_path: Vec::new(),
            strip_prefixes: default_strip_prefixes(),
            extension: default_extension(),
            log_level: LogLevel::default(),
        }
    }
}

impl FrontendConfig {
    /// Load configuration: defaults, then `file` (if any), then `MIDL_PATH`.
    pub fn load(file: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match file {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        if let Ok(value) = std::env::var(SEARCH_PATH_ENV) {
            config.append_search_path(&value);
        }
        Ok(config)
    }

    /// Parse a TOML configuration file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(ConfigError::Parse)
    }

    /// Append the entries of a colon-separated path list, skipping empty ones
    pub fn append_search_path(
        &mut self,
        value: &str,
    ) {
        self.search_path.extend(
            value
                .split(':')
                .filter(|entry| !entry.is_empty())
                .map(PathBuf::from),
        );
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read config file '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),
}
