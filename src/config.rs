//! Application configuration management.
//!
//! Settings are merged from three layers, later ones winning:
//! built-in defaults, `config.toml` in the platform config directory, and
//! `FQUERY_*` environment variables. Command-line flags are applied on top
//! by the caller.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

/// Output format for listed records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Fixed-width text lines
    #[default]
    Text,
    /// A single JSON document
    Json,
}

/// Errors raised while loading configuration.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// The platform config directory could not be determined.
    #[error("Failed to determine project directories")]
    NoProjectDirs,
    /// A provider produced invalid or mistyped values.
    #[error("Invalid configuration: {0}")]
    Invalid(#[from] Box<figment::Error>),
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Threads used for checksum computation.
    pub io_threads: usize,
    /// Compare names and extensions case-insensitively.
    pub case_insensitive: bool,
    /// Default output format.
    pub output: OutputFormat,
    /// Show a progress bar during checksum computation.
    pub progress: bool,
    /// Move deleted files to the trash instead of unlinking them.
    pub trash: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            io_threads: 4,
            case_insensitive: false,
            output: OutputFormat::Text,
            progress: true,
            trash: false,
        }
    }
}

impl Config {
    /// Load the configuration from the default platform-specific path.
    ///
    /// Falls back to defaults when the file is missing or unreadable.
    pub fn load() -> Self {
        let result = Self::config_path().and_then(|path| Self::load_from(&path));
        match result {
            Ok(config) => config,
            Err(e) => {
                log::debug!("Failed to load config, using defaults: {}", e);
                Self::default()
            }
        }
    }

    /// Load the configuration layering `path` and the environment over the
    /// defaults. A missing file is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if a layer holds a value of the wrong type.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        Self::figment(path)
            .extract()
            .map_err(|e| ConfigError::Invalid(Box::new(e)))
    }

    fn figment(path: &Path) -> Figment {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed("FQUERY_"))
    }

    /// Get the default platform-specific configuration path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NoProjectDirs`] when no home directory is known.
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        let project_dirs =
            ProjectDirs::from("com", "fquery", "fquery").ok_or(ConfigError::NoProjectDirs)?;
        Ok(project_dirs.config_dir().join("config.toml"))
    }
}
