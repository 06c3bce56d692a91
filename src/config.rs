use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use dirs::config_dir;
use serde::{Deserialize, Serialize};

use crate::grading::DEFAULT_PASS_SCORE;

const APP_NAME: &str = "academy";
const CONFIG_FILE: &str = "config.json";

pub const DEFAULT_PORT: u16 = 17020;

/// Service settings.
///
/// Read from `<config dir>/academy/config.json`, then overridden by
/// `ACADEMY_PORT` and `ACADEMY_DB_PATH`. Security settings live in
/// [`crate::api::SecurityConfig`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AcademyConfig {
    /// Port for the HTTP API.
    pub port: u16,
    /// SQLite file. Defaults to the platform data directory.
    pub db_path: Option<PathBuf>,
    /// Auto-grader score needed for a passing suggestion.
    pub pass_score: u8,
}

impl Default for AcademyConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            db_path: None,
            pass_score: DEFAULT_PASS_SCORE,
        }
    }
}

impl AcademyConfig {
    /// Load configuration from the user's config directory and the environment.
    /// Falls back to defaults if the file doesn't exist or fails to parse.
    pub fn load() -> Self {
        let config = match get_config_path().and_then(|p| Self::load_from(&p)) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Failed to load config, using defaults: {:#}", e);
                Self::default()
            }
        };
        config.with_env_overrides(|key| std::env::var(key).ok())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).context("Failed to read config file")?;
        let config = serde_json::from_str(&content).context("Failed to parse config file")?;
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let content = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, content).context("Failed to write config file")?;
        Ok(())
    }

    fn with_env_overrides(mut self, var: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(port) = var("ACADEMY_PORT").and_then(|s| s.parse().ok()) {
            self.port = port;
        }
        if let Some(path) = var("ACADEMY_DB_PATH").filter(|s| !s.is_empty()) {
            self.db_path = Some(PathBuf::from(path));
        }
        self
    }
}

fn get_config_path() -> Result<PathBuf> {
    let mut path =
        config_dir().ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
    path.push(APP_NAME);
    path.push(CONFIG_FILE);
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AcademyConfig::load_from(&dir.path().join("config.json")).unwrap();
        assert_eq!(config, AcademyConfig::default());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "pass_score": 85 }"#).unwrap();

        let config = AcademyConfig::load_from(&path).unwrap();
        assert_eq!(config.pass_score, 85);
        assert_eq!(config.port, DEFAULT_PORT);
    }

    #[test]
    fn save_then_load_preserves_settings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let config = AcademyConfig {
            port: 9000,
            db_path: Some(PathBuf::from("/tmp/academy.db")),
            pass_score: 60,
        };
        config.save_to(&path).unwrap();
        assert_eq!(AcademyConfig::load_from(&path).unwrap(), config);
    }

    #[test]
    fn environment_overrides_file_values() {
        let config = AcademyConfig::default().with_env_overrides(|key| match key {
            "ACADEMY_PORT" => Some("8081".to_string()),
            "ACADEMY_DB_PATH" => Some("/data/academy.db".to_string()),
            _ => None,
        });
        assert_eq!(config.port, 8081);
        assert_eq!(config.db_path, Some(PathBuf::from("/data/academy.db")));
    }

    #[test]
    fn unparseable_port_is_ignored() {
        let config = AcademyConfig::default()
            .with_env_overrides(|key| (key == "ACADEMY_PORT").then(|| "not-a-port".to_string()));
        assert_eq!(config.port, DEFAULT_PORT);
    }
}
