use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{env, fs, path::PathBuf};

use crate::model::Coordinates;

/// Environment variable that overrides the stored API key.
pub const API_KEY_ENV: &str = "OPENWEATHER_API_KEY";

/// The location `show` falls back to when invoked without arguments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultLocation {
    /// Display label, e.g. "Bologna, IT". Optional; coordinates suffice.
    pub label: Option<String>,
    pub lat: f64,
    pub lon: f64,
}

impl DefaultLocation {
    pub fn coords(&self) -> Coordinates {
        Coordinates::new(self.lat, self.lon)
    }
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// api_key = "..."
///
/// [default_location]
/// label = "Bologna, IT"
/// lat = 44.4938203
/// lon = 11.3426327
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    pub api_key: Option<String>,
    pub default_location: Option<DefaultLocation>,
}

impl Config {
    /// API key with the environment variable taking precedence over the
    /// config file. `None` means the user has configured nothing at all.
    pub fn resolved_api_key(&self) -> Option<String> {
        env::var(API_KEY_ENV)
            .ok()
            .filter(|key| !key.is_empty())
            .or_else(|| self.api_key.clone())
    }

    pub fn set_api_key(&mut self, api_key: String) {
        self.api_key = Some(api_key);
    }

    pub fn set_default_location(&mut self, label: Option<String>, coords: Coordinates) {
        self.default_location = Some(DefaultLocation {
            label,
            lat: coords.lat,
            lon: coords.lon,
        });
    }

    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            // First run: no config file, return empty.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
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
        let dirs = ProjectDirs::from("dev", "skycast", "skycast")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stored_key_is_used_when_env_is_absent() {
        let mut cfg = Config::default();
        assert_eq!(cfg.resolved_api_key(), None);

        cfg.set_api_key("STORED".to_string());
        // skip the assertion if the test environment happens to set the var
        if env::var(API_KEY_ENV).is_err() {
            assert_eq!(cfg.resolved_api_key().as_deref(), Some("STORED"));
        }
    }

    #[test]
    fn default_location_round_trips_through_toml() {
        let mut cfg = Config::default();
        cfg.set_api_key("KEY".to_string());
        cfg.set_default_location(
            Some("Bologna, IT".to_string()),
            Coordinates::new(44.4938203, 11.3426327),
        );

        let serialized = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&serialized).unwrap();

        assert_eq!(parsed.api_key.as_deref(), Some("KEY"));
        let home = parsed.default_location.unwrap();
        assert_eq!(home.label.as_deref(), Some("Bologna, IT"));
        assert_eq!(home.coords(), Coordinates::new(44.4938203, 11.3426327));
    }

    #[test]
    fn missing_fields_parse_as_empty_config() {
        let cfg: Config = toml::from_str("").unwrap();
        assert!(cfg.api_key.is_none());
        assert!(cfg.default_location.is_none());
    }
}
