//! Application settings and paths.
//!
//! Settings live in the XDG config directory (`~/.config/portwarden` on Linux).

use crate::error::{ConfigError, ConfigResult, EngineResult};
use crate::scanner::ScanConfig;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Application directory paths following the XDG Base Directory Specification.
#[derive(Debug, Clone)]
pub struct Paths {
    /// Configuration directory (~/.config/portwarden)
    pub config_dir: PathBuf,
}

impl Paths {
    /// Locate the application directories. Nothing is created.
    pub fn resolve() -> ConfigResult<Self> {
        let project = ProjectDirs::from("com", "portwarden", "portwarden")
            .ok_or(ConfigError::DirectoryNotFound)?;

        Ok(Self {
            config_dir: project.config_dir().to_path_buf(),
        })
    }

    /// Get the path to the settings file.
    pub fn settings_file(&self) -> PathBuf {
        self.config_dir.join("settings.json")
    }
}

/// Application-wide settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// Default number of simultaneous probes.
    pub default_concurrency: usize,
    /// Default probe timeout in milliseconds.
    pub default_timeout_ms: u64,
    /// Default output format (plain, json or csv).
    pub default_output_format: String,
    /// Ask before acting on processes that own system ports.
    pub confirm_system_ports: bool,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            default_concurrency: ScanConfig::DEFAULT_CONCURRENCY,
            default_timeout_ms: ScanConfig::DEFAULT_TIMEOUT.as_millis() as u64,
            default_output_format: "plain".to_string(),
            confirm_system_ports: true,
        }
    }
}

impl AppSettings {
    /// Load settings from the default location, or defaults if there is no
    /// settings file yet.
    pub fn load() -> ConfigResult<Self> {
        let file = Paths::resolve()?.settings_file();

        if !file.exists() {
            return Ok(Self::default());
        }

        Self::load_from(&file)
    }

    /// Load settings from a specific file.
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        serde_json::from_str(&content).map_err(|e| ConfigError::InvalidFormat(e.to_string()))
    }

    /// Save settings to a specific file, creating parent directories.
    pub fn save_to(&self, path: &Path) -> ConfigResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content).map_err(|e| ConfigError::WriteFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Build a validated scan configuration, letting explicit values win.
    pub fn scan_config(
        &self,
        timeout_ms: Option<u64>,
        concurrency: Option<usize>,
    ) -> EngineResult<ScanConfig> {
        ScanConfig::new(
            Duration::from_millis(timeout_ms.unwrap_or(self.default_timeout_ms)),
            concurrency.unwrap_or(self.default_concurrency),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ScanError;

    #[test]
    fn test_default_settings() {
        let settings = AppSettings::default();
        assert_eq!(settings.default_concurrency, 100);
        assert_eq!(settings.default_timeout_ms, 500);
        assert!(settings.confirm_system_ports);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let settings: AppSettings = serde_json::from_str(r#"{"default_timeout_ms": 250}"#).unwrap();
        assert_eq!(settings.default_timeout_ms, 250);
        assert_eq!(settings.default_concurrency, 100);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");
        let settings = AppSettings {
            default_concurrency: 8,
            ..AppSettings::default()
        };

        settings.save_to(&path).unwrap();
        assert_eq!(AppSettings::load_from(&path).unwrap(), settings);
    }

    #[test]
    fn test_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "not json").unwrap();
        assert!(matches!(
            AppSettings::load_from(&path),
            Err(ConfigError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_scan_config_overrides() {
        let settings = AppSettings::default();
        let config = settings.scan_config(Some(50), None).unwrap();
        assert_eq!(config.timeout(), Duration::from_millis(50));
        assert_eq!(config.concurrency(), 100);

        assert!(matches!(
            settings.scan_config(None, Some(0)),
            Err(ScanError::InvalidConfig(_))
        ));
    }
}
