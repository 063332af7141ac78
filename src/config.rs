// Mon Jan 19 2026 - Alex

use crate::structure::types::VirtualAddress;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Preferred load address added to every section-relative symbol.
    pub image_base: u64,
    /// Place methods with no procedure symbol through `S_PUB32` names.
    pub use_publics: bool,
    /// `None` writes the document to stdout.
    pub output_file: Option<PathBuf>,
    pub pretty_print: bool,
    pub enable_progress_bars: bool,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            image_base: VirtualAddress::DEFAULT_IMAGE_BASE,
            use_publics: true,
            output_file: None,
            pretty_print: true,
            enable_progress_bars: true,
            log_level: "warn".to_string(),
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads a JSON config file. Missing keys take their defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Config = serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        log::debug!("loaded config from {}", path.display());
        Ok(config)
    }

    pub fn with_image_base(mut self, image_base: u64) -> Self {
        self.image_base = image_base;
        self
    }

    pub fn with_publics(mut self, use_publics: bool) -> Self {
        self.use_publics = use_publics;
        self
    }

    pub fn with_output_file(mut self, output: PathBuf) -> Self {
        self.output_file = Some(output);
        self
    }

    pub fn with_pretty_print(mut self, pretty: bool) -> Self {
        self.pretty_print = pretty;
        self
    }

    pub fn with_progress_bars(mut self, enabled: bool) -> Self {
        self.enable_progress_bars = enabled;
        self
    }

    pub fn with_log_level(mut self, level: &str) -> Self {
        self.log_level = level.to_string();
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if crate::utils::LoggingUtils::level_from_str(&self.log_level).is_none() {
            return Err(ConfigError::Invalid(format!("unknown log level `{}`", self.log_level)));
        }
        if let Some(output) = &self.output_file {
            if output.as_os_str().is_empty() {
                return Err(ConfigError::Invalid("output_file must not be empty".to_string()));
            }
        }
        Ok(())
    }
}
