// SPDX-License-Identifier: MPL-2.0

use crate::config::{APP_ID, DEFAULT_API_BASE_URL, ENV_API_BASE_URL, ENV_USE_LOCAL_DATA};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    15
}

/// Persistent client settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientSettings {
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    /// Answer reads from the local database before asking the backend
    #[serde(default)]
    pub use_local_data: bool,
    #[serde(default = "default_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Overrides the platform data directory for the cache database
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            use_local_data: false,
            request_timeout_secs: default_timeout_secs(),
            data_dir: None,
        }
    }
}

impl ClientSettings {
    /// Get the settings file path (~/.config/com.example.aianimals/settings.json)
    pub fn settings_path() -> Option<PathBuf> {
        dirs::config_dir().map(|mut p| {
            p.push(APP_ID);
            p.push("settings.json");
            p
        })
    }

    /// Load settings from disk with environment overrides applied
    pub fn load() -> Self {
        let settings = match Self::settings_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        };
        settings.with_env_overrides(|key| std::env::var(key).ok())
    }

    /// Load settings from a specific file, or return defaults if missing or invalid
    pub fn load_from(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(contents) => serde_json::from_str(&contents).unwrap_or_else(|e| {
                tracing::warn!("ignoring invalid settings file {}: {e}", path.display());
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    /// Apply overrides from a variable lookup (the process environment in production)
    pub fn with_env_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_API_BASE_URL).filter(|v| !v.trim().is_empty()) {
            self.api_base_url = url.trim().to_string();
        }
        if let Some(flag) = lookup(ENV_USE_LOCAL_DATA) {
            match flag.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => self.use_local_data = true,
                "0" | "false" | "no" | "off" => self.use_local_data = false,
                other => tracing::warn!("ignoring {ENV_USE_LOCAL_DATA}={other}"),
            }
        }
        self
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Save settings to the default location
    pub fn save(&self) -> Result<(), String> {
        let path = Self::settings_path().ok_or("Could not determine config directory")?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), String> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create config directory: {e}"))?;
        }

        let json = serde_json::to_string_pretty(self)
            .map_err(|e| format!("Failed to serialize settings: {e}"))?;

        std::fs::write(path, json).map_err(|e| format!("Failed to write settings: {e}"))?;

        Ok(())
    }
}
