use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, time::Duration};

pub const DEFAULT_WEATHER_URL: &str = "https://customer-api.open-meteo.com";
pub const DEFAULT_GEOCODING_URL: &str = "https://nominatim.openstreetmap.org";
pub const DEFAULT_USER_AGENT: &str = concat!("weathermap/", env!("CARGO_PKG_VERSION"));

/// Weather endpoint settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WeatherConfig {
    /// Access credential. Every weather fetch fails while this is unset.
    pub api_key: Option<String>,
    pub base_url: Option<String>,
}

/// Nominatim settings; no credential needed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeocodingConfig {
    pub base_url: Option<String>,
    pub user_agent: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Drop fetch results superseded by a newer click instead of applying
    /// whichever resolves last.
    #[serde(default)]
    pub latest_click_wins: bool,
    /// Optional per-request timeout in seconds. Off by default.
    pub request_timeout_secs: Option<u64>,
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// [weather]
/// api_key = "..."
///
/// [session]
/// latest_click_wins = true
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub weather: WeatherConfig,
    #[serde(default)]
    pub geocoding: GeocodingConfig,
    #[serde(default)]
    pub session: SessionConfig,
}

impl Config {
    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        Self::load_from(&path)
    }

    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, return empty.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("Invalid configuration TOML")
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "weathermap", "weathermap-cli")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Set or replace the weather API key. Blank input clears it.
    pub fn set_weather_api_key(&mut self, api_key: String) {
        let trimmed = api_key.trim();
        self.weather.api_key = (!trimmed.is_empty()).then(|| trimmed.to_string());
    }

    pub fn weather_api_key(&self) -> Option<&str> {
        self.weather.api_key.as_deref()
    }

    pub fn is_weather_configured(&self) -> bool {
        self.weather_api_key().is_some()
    }

    pub fn weather_base_url(&self) -> &str {
        self.weather
            .base_url
            .as_deref()
            .unwrap_or(DEFAULT_WEATHER_URL)
    }

    pub fn geocoding_base_url(&self) -> &str {
        self.geocoding
            .base_url
            .as_deref()
            .unwrap_or(DEFAULT_GEOCODING_URL)
    }

    pub fn user_agent(&self) -> &str {
        self.geocoding
            .user_agent
            .as_deref()
            .unwrap_or(DEFAULT_USER_AGENT)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.session.request_timeout_secs.map(Duration::from_secs)
    }
}
