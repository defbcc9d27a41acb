//! Configuration handling for the HBnB console
//!
//! Configuration is read from the first file found among:
//! an explicit `--config` path, `./hbnb.toml`, and
//! `~/.config/hbnb/config.toml` (platform equivalent). Command-line flags
//! and environment variables override file values.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::engine::{Backend, MemoryBackend};
use super::json_file::FileBackend;
use super::sqlite::DbBackend;

/// Name of the config file looked up in the working directory
pub const LOCAL_CONFIG_FILE: &str = "hbnb.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to parse configuration: {0}")]
    Parse(String),
}

/// Storage backend selection
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum StorageKind {
    /// JSON file (default)
    #[default]
    File,
    /// SQLite database
    Db,
    /// Nothing is persisted
    Memory,
}

/// Storage settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Backend to use
    pub backend: StorageKind,

    /// JSON store path for the file backend
    pub file_path: PathBuf,

    /// Database path for the db backend
    pub db_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageKind::File,
            file_path: PathBuf::from("file.json"),
            db_path: PathBuf::from("hbnb.db"),
        }
    }
}

impl StorageConfig {
    /// Builds the backend this configuration selects
    pub fn open_backend(&self) -> Result<Box<dyn Backend>> {
        Ok(match self.backend {
            StorageKind::File => Box::new(FileBackend::new(&self.file_path)),
            StorageKind::Db => Box::new(DbBackend::open(&self.db_path)?),
            StorageKind::Memory => Box::new(MemoryBackend),
        })
    }
}

/// Interactive console settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    /// Prompt shown before each line when stdin is a terminal
    pub prompt: String,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            prompt: "(hbnb) ".to_string(),
        }
    }
}

/// Overrides taken from flags and environment variables
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub backend: Option<StorageKind>,
    pub file_path: Option<PathBuf>,
    pub db_path: Option<PathBuf>,
}

/// Combined configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub storage: StorageConfig,
    pub console: ConsoleConfig,

    /// File the configuration was read from
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

impl Config {
    /// Loads configuration from an explicit path or the default locations
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load_file(path);
        }

        let local = PathBuf::from(LOCAL_CONFIG_FILE);
        if local.is_file() {
            return Self::load_file(&local);
        }

        match Self::global_config_dir() {
            Some(dir) if dir.join("config.toml").is_file() => {
                Self::load_file(&dir.join("config.toml"))
            }
            _ => Ok(Self::default()),
        }
    }

    /// Returns the global config directory
    pub fn global_config_dir() -> Option<PathBuf> {
        ProjectDirs::from("", "", "hbnb").map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Loads configuration from a specific file
    pub fn load_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;

        let mut config: Config = toml::from_str(&content)
            .map_err(|e| ConfigError::Parse(e.to_string()))
            .with_context(|| format!("Failed to parse config: {}", path.display()))?;

        config.validate()?;
        config.source = Some(path.to_path_buf());
        Ok(config)
    }

    /// Applies flag and environment overrides
    pub fn apply(&mut self, overrides: Overrides) {
        if let Some(backend) = overrides.backend {
            self.storage.backend = backend;
        }
        if let Some(file_path) = overrides.file_path {
            self.storage.file_path = file_path;
        }
        if let Some(db_path) = overrides.db_path {
            self.storage.db_path = db_path;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.storage.file_path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("storage.file_path is empty".to_string()));
        }
        if self.storage.db_path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("storage.db_path is empty".to_string()));
        }
        Ok(())
    }
}
