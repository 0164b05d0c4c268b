//! Decoder and loader settings.
//!
//! Settings live in a JSON file in the per-user config directory and can also
//! be loaded from an explicit path. Missing files fall back to defaults.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// What to do when a row fails to decode
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowErrorPolicy {
    /// Drop the row, record the failure in the parse statistics and continue
    #[default]
    Skip,
    /// Stop loading the file at the first bad row
    Abort,
}

/// Settings controlling how log files are decoded
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Settings {
    /// Settings file version for migration support
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub row_errors: RowErrorPolicy,
    /// Treat an unparseable Power SW/BMS/OBC token as a row failure
    #[serde(default)]
    pub strict_booleans: bool,
    /// Decode rows on the rayon thread pool
    #[serde(default = "default_parallel")]
    pub parallel: bool,
}

fn default_version() -> u32 {
    1
}

fn default_parallel() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: default_version(),
            row_errors: RowErrorPolicy::default(),
            strict_booleans: false,
            parallel: default_parallel(),
        }
    }
}

impl Settings {
    /// Get the config directory path for LeafLog
    pub fn get_config_dir() -> Option<PathBuf> {
        #[cfg(target_os = "macos")]
        {
            dirs::data_dir().map(|p| p.join("LeafLog"))
        }
        #[cfg(target_os = "windows")]
        {
            dirs::config_dir().map(|p| p.join("LeafLog"))
        }
        #[cfg(not(any(target_os = "macos", target_os = "windows")))]
        {
            dirs::config_dir().map(|p| p.join("leaflog"))
        }
    }

    /// Get the path to the settings JSON file
    pub fn get_settings_path() -> Option<PathBuf> {
        Self::get_config_dir().map(|p| p.join("settings.json"))
    }

    /// Load settings from the user config directory, using defaults when the
    /// file is absent or unreadable
    pub fn load() -> Self {
        let Some(path) = Self::get_settings_path() else {
            return Self::default();
        };

        if !path.exists() {
            return Self::default();
        }

        match Self::load_from(&path) {
            Ok(settings) => settings,
            Err(e) => {
                tracing::warn!("Ignoring settings file {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Load settings from a specific JSON file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        Self::from_json(&content)
    }

    /// Parse settings from a JSON string
    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Save settings to a specific JSON file, creating parent directories
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|e| Error::io(path, e))?;

        Ok(())
    }

    /// Save settings to the user config directory
    pub fn save(&self) -> Result<()> {
        let path = Self::get_settings_path().ok_or_else(|| {
            Error::io(
                "settings.json",
                std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "could not determine config directory",
                ),
            )
        })?;
        self.save_to(&path)
    }
}
