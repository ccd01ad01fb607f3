//! User configuration
//!
//! Stored in ~/.dist-archive/config.toml. Command-line flags take precedence
//! over every value here.

use crate::archive::target::DEFAULT_FILENAME_FORMAT;
use crate::core::error::{DistArchiveError, Result};
use crate::core::types::ArchiveFormat;
use crate::ignore::parser::DEFAULT_IGNORE_FILE;
use directories::UserDirs;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Configuration for dist-archive
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistConfig {
    /// Archive creation defaults
    #[serde(default)]
    pub archive: ArchiveConfig,
    /// Rule file settings
    #[serde(default)]
    pub ignore: IgnoreConfig,
}

/// Archive creation defaults
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveConfig {
    /// Default archive format
    pub format: Option<ArchiveFormat>,
    /// Default file stem template
    pub filename_format: Option<String>,
    /// Create missing target directories
    pub create_target_dir: Option<bool>,
}

/// Rule file settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IgnoreConfig {
    /// Name of the rule file in the source directory
    pub file_name: Option<String>,
}

/// Configuration value types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigValue {
    String(String),
    Boolean(bool),
}

/// Configuration keys
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    ArchiveFormat,
    ArchiveFilenameFormat,
    ArchiveCreateTargetDir,
    IgnoreFileName,
}

impl ConfigKey {
    /// Every key, in listing order
    pub const ALL: [ConfigKey; 4] = [
        ConfigKey::ArchiveFormat,
        ConfigKey::ArchiveFilenameFormat,
        ConfigKey::ArchiveCreateTargetDir,
        ConfigKey::IgnoreFileName,
    ];

    pub fn parse(key: &str) -> Option<Self> {
        match key {
            "archive.format" => Some(ConfigKey::ArchiveFormat),
            "archive.filename_format" => Some(ConfigKey::ArchiveFilenameFormat),
            "archive.create_target_dir" => Some(ConfigKey::ArchiveCreateTargetDir),
            "ignore.file_name" => Some(ConfigKey::IgnoreFileName),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ConfigKey::ArchiveFormat => "archive.format",
            ConfigKey::ArchiveFilenameFormat => "archive.filename_format",
            ConfigKey::ArchiveCreateTargetDir => "archive.create_target_dir",
            ConfigKey::IgnoreFileName => "ignore.file_name",
        }
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ConfigValue {
    /// Parse a command-line value; `true`/`false` become booleans
    pub fn parse(value: &str) -> Self {
        match value {
            "true" => ConfigValue::Boolean(true),
            "false" => ConfigValue::Boolean(false),
            _ => ConfigValue::String(value.to_string()),
        }
    }

    pub fn as_string(&self) -> Option<&str> {
        match self {
            ConfigValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_boolean(&self) -> Option<bool> {
        match self {
            ConfigValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }
}

impl fmt::Display for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigValue::String(s) => f.write_str(s),
            ConfigValue::Boolean(b) => write!(f, "{}", b),
        }
    }
}

impl DistConfig {
    /// Load configuration from the user's home directory
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load configuration from `path`; a missing file yields defaults
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config: DistConfig = toml::from_str(&content).map_err(|e| {
            DistArchiveError::configuration(format!("Failed to parse {}: {}", path.display(), e))
        })?;

        tracing::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Save configuration to the user's home directory
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    /// Save configuration to `path`
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| DistArchiveError::configuration(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Path of the configuration file
    pub fn config_path() -> Result<PathBuf> {
        let user_dirs = UserDirs::new().ok_or(DistArchiveError::HomeDirectoryNotFound)?;
        Ok(user_dirs.home_dir().join(".dist-archive").join("config.toml"))
    }

    /// Get a configuration value
    pub fn get(&self, key: ConfigKey) -> Option<ConfigValue> {
        match key {
            ConfigKey::ArchiveFormat => self
                .archive
                .format
                .map(|format| ConfigValue::String(format.name().to_string())),
            ConfigKey::ArchiveFilenameFormat => self
                .archive
                .filename_format
                .as_ref()
                .map(|s| ConfigValue::String(s.clone())),
            ConfigKey::ArchiveCreateTargetDir => self.archive.create_target_dir.map(ConfigValue::Boolean),
            ConfigKey::IgnoreFileName => self
                .ignore
                .file_name
                .as_ref()
                .map(|s| ConfigValue::String(s.clone())),
        }
    }

    /// Set a configuration value
    pub fn set(&mut self, key: ConfigKey, value: ConfigValue) -> Result<()> {
        match key {
            ConfigKey::ArchiveFormat => {
                let format = value
                    .as_string()
                    .and_then(ArchiveFormat::from_name)
                    .ok_or_else(|| DistArchiveError::configuration("archive.format must be 'zip' or 'targz'"))?;
                self.archive.format = Some(format);
            },
            ConfigKey::ArchiveFilenameFormat => match value {
                ConfigValue::String(template) if !template.is_empty() => {
                    self.archive.filename_format = Some(template);
                },
                _ => {
                    return Err(DistArchiveError::configuration(
                        "archive.filename_format must be a non-empty string",
                    ))
                },
            },
            ConfigKey::ArchiveCreateTargetDir => {
                let enabled = value.as_boolean().ok_or_else(|| {
                    DistArchiveError::configuration("archive.create_target_dir must be a boolean")
                })?;
                self.archive.create_target_dir = Some(enabled);
            },
            ConfigKey::IgnoreFileName => match value {
                ConfigValue::String(name) if !name.is_empty() && !name.contains('/') => {
                    self.ignore.file_name = Some(name);
                },
                _ => {
                    return Err(DistArchiveError::configuration(
                        "ignore.file_name must be a file name without '/'",
                    ))
                },
            },
        }
        Ok(())
    }

    /// Unset a configuration value
    pub fn unset(&mut self, key: ConfigKey) {
        match key {
            ConfigKey::ArchiveFormat => self.archive.format = None,
            ConfigKey::ArchiveFilenameFormat => self.archive.filename_format = None,
            ConfigKey::ArchiveCreateTargetDir => self.archive.create_target_dir = None,
            ConfigKey::IgnoreFileName => self.ignore.file_name = None,
        }
    }

    /// List all set configuration values
    pub fn list(&self) -> Vec<(String, String)> {
        ConfigKey::ALL
            .iter()
            .filter_map(|key| self.get(*key).map(|value| (key.to_string(), value.to_string())))
            .collect()
    }

    /// Archive format with fallback
    pub fn format(&self) -> ArchiveFormat {
        self.archive.format.unwrap_or_default()
    }

    /// File stem template with fallback
    pub fn filename_format(&self) -> &str {
        self.archive
            .filename_format
            .as_deref()
            .unwrap_or(DEFAULT_FILENAME_FORMAT)
    }

    /// Whether missing target directories are created
    pub fn create_target_dir(&self) -> bool {
        self.archive.create_target_dir.unwrap_or(false)
    }

    /// Rule file name with fallback
    pub fn ignore_file_name(&self) -> &str {
        self.ignore.file_name.as_deref().unwrap_or(DEFAULT_IGNORE_FILE)
    }
}
