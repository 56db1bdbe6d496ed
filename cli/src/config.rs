//! Configuration management for sotto.
//!
//! Handles loading, saving, and providing defaults for the application
//! configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sotto_core::ModelId;

/// Main configuration struct.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub model: ModelConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

/// Configuration for the speech recognition model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Model to load when none is given on the command line.
    pub model: ModelId,
    /// Language to recognize. Use "auto" for automatic detection.
    pub language: String,
}

/// Model weight storage configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Where model weights are cached. Defaults to the XDG data directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub models_dir: Option<PathBuf>,
}

/// Logging configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub level: LogLevel,
}

/// Log verbosity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }

    /// Comma-separated tracing directives scoping this level to the sotto
    /// crates, leaving dependencies at their defaults.
    pub fn as_directives(&self) -> String {
        let level = self.as_str();
        format!("sotto={level},sotto_core={level},sotto_engine={level},sotto_cli={level}")
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model: ModelId::default(),
            language: "auto".to_string(),
        }
    }
}

impl Config {
    /// Returns the default config file path.
    /// `~/.config/sotto/config.toml`
    pub fn config_path() -> Result<PathBuf> {
        crate::dirs::config_dir().map(|p| p.join("config.toml"))
    }

    /// Resolve the models cache directory: config override or XDG default.
    pub fn models_dir(&self) -> Result<PathBuf> {
        match &self.storage.models_dir {
            Some(dir) => Ok(dir.clone()),
            None => crate::dirs::models_dir(),
        }
    }

    /// Configured language, `None` for automatic detection.
    pub fn language(&self) -> Option<String> {
        if self.model.language == "auto" {
            None
        } else {
            Some(self.model.language.clone())
        }
    }

    /// Load configuration from the default path.
    /// Returns defaults if the file doesn't exist.
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        Self::load_from(&path)
    }

    /// Load configuration from a specific path.
    /// Returns defaults if the file doesn't exist.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse config file as TOML")
    }

    /// Save configuration to the default path.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        self.save_to(&path)
    }

    /// Save configuration to a specific path.
    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config to TOML")?;

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
