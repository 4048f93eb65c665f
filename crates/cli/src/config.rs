//! Optional TOML defaults for the CLI.
//!
//! Resolution order: command-line flags, then the config file, then the
//! built-in defaults below.

use crate::cli::OutputFormat;
use crate::tracing::{LogLevel, TracingFormat};
use orchay_graph_view::{DEFAULT_FOCUS_DEPTH, HierarchyMode};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Config file picked up from the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "orchay-graph.toml";

/// Errors loading a config file.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("Failed to read config file {}: {source}", path.display())]
    Io {
        /// File that failed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
    /// The file is not valid TOML for [`Config`].
    #[error("Invalid config file {}: {source}", path.display())]
    Parse {
        /// File that failed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: toml::de::Error,
    },
}

/// Defaults applied when the matching flag is not given.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct Config {
    /// Path of the task file.
    pub tasks: Option<PathBuf>,
    /// Focus depth used when `--depth` is omitted.
    pub focus_depth: usize,
    /// Grouping used by `view` when `--hierarchy` is omitted.
    pub hierarchy_mode: HierarchyMode,
    /// How results are written.
    pub output: OutputFormat,
    /// Log verbosity.
    pub log_level: LogLevel,
    /// Log format.
    pub log_format: TracingFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tasks: None,
            focus_depth: DEFAULT_FOCUS_DEPTH,
            hierarchy_mode: HierarchyMode::Full,
            output: OutputFormat::default(),
            log_level: LogLevel::default(),
            log_format: TracingFormat::default(),
        }
    }
}

impl Config {
    /// Parse config text.
    ///
    /// # Errors
    ///
    /// Returns the TOML error for malformed text or unknown keys.
    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Load a config file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the file is unreadable or invalid.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "Loaded config file");
        Ok(config)
    }

    /// Load `explicit` if given, else [`DEFAULT_CONFIG_FILE`] in `dir` if it
    /// exists, else the defaults.
    ///
    /// A relative `tasks` path in a file is resolved against that file's
    /// directory.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the chosen file is unreadable or invalid.
    pub fn discover(explicit: Option<&Path>, dir: &Path) -> Result<Self, ConfigError> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let candidate = dir.join(DEFAULT_CONFIG_FILE);
                if !candidate.is_file() {
                    return Ok(Self::default());
                }
                candidate
            }
        };

        let mut config = Self::load(&path)?;
        if let (Some(tasks), Some(base)) = (&config.tasks, path.parent())
            && tasks.is_relative()
        {
            config.tasks = Some(base.join(tasks));
        }
        Ok(config)
    }
}
