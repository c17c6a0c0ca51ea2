//! Ambient CLI settings: default encoding level and default output
//! directory, persisted as JSON under `~/.imghide/settings.json`.
//!
//! This has no bearing on the container format itself — PBKDF2 rounds, AES
//! mode, and header layout are fixed format parameters and are never
//! configurable here.

use std::fs;
use std::io;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::image::EncodingLevel;

fn default_level() -> String {
    "low".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_level")]
    pub default_level: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_output_dir: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self { default_level: default_level(), default_output_dir: None }
    }
}

impl Settings {
    /// Returns the config directory path (`~/.imghide`).
    pub fn config_dir() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".imghide"))
    }

    /// Returns the config file path (`~/.imghide/settings.json`).
    pub fn config_path() -> Option<PathBuf> {
        Self::config_dir().map(|d| d.join("settings.json"))
    }

    /// Loads settings from the config file, falling back to defaults if the
    /// file is missing or invalid.
    pub fn load() -> Self {
        Self::load_with_error().unwrap_or_default()
    }

    pub fn load_with_error() -> Result<Self, String> {
        let config_path = Self::config_path().ok_or_else(|| "could not determine config path".to_string())?;
        let content =
            fs::read_to_string(&config_path).map_err(|e| format!("failed to read settings file: {e}"))?;
        serde_json::from_str(&content).map_err(|e| format!("invalid JSON in settings.json: {e}"))
    }

    /// Saves settings to the config file using an atomic write-then-rename.
    pub fn save(&self) -> io::Result<()> {
        let Some(config_dir) = Self::config_dir() else {
            return Err(io::Error::new(io::ErrorKind::NotFound, "could not determine config directory"));
        };
        if !config_dir.exists() {
            fs::create_dir_all(&config_dir)?;
            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                let _ = fs::set_permissions(&config_dir, fs::Permissions::from_mode(0o700));
            }
        }

        let config_path = config_dir.join("settings.json");
        let temp_path = config_dir.join("settings.json.tmp");
        let content = serde_json::to_string_pretty(self)?;

        fs::write(&temp_path, &content)?;
        fs::rename(&temp_path, &config_path)?;
        Ok(())
    }

    /// Parses [`Settings::default_level`] into an [`EncodingLevel`], falling
    /// back to `Low` for any unrecognized value.
    pub fn default_encoding_level(&self) -> EncodingLevel {
        match self.default_level.to_lowercase().as_str() {
            "medium" => EncodingLevel::Medium,
            "high" => EncodingLevel::High,
            _ => EncodingLevel::Low,
        }
    }
}
