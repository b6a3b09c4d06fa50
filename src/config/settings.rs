//! Application settings and paths.
//!
//! Manages XDG-compliant paths and persisted defaults for probe options.

use crate::error::{ConfigError, ConfigResult};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Global paths singleton.
static PATHS: OnceLock<Paths> = OnceLock::new();

/// Application directory paths following the XDG Base Directory Specification.
#[derive(Debug, Clone)]
pub struct Paths {
    /// Configuration directory (~/.config/sounder)
    pub config_dir: PathBuf,
    /// Data directory (~/.local/share/sounder)
    pub data_dir: PathBuf,
}

impl Paths {
    /// Get the global paths instance.
    pub fn get() -> &'static Paths {
        PATHS.get_or_init(|| Self::new().expect("Failed to initialize paths"))
    }

    /// Initialize paths using XDG directories.
    fn new() -> ConfigResult<Self> {
        let project =
            ProjectDirs::from("com", "sounder", "sounder").ok_or(ConfigError::DirectoryNotFound)?;

        let paths = Self {
            config_dir: project.config_dir().to_path_buf(),
            data_dir: project.data_dir().to_path_buf(),
        };

        fs::create_dir_all(&paths.config_dir)?;
        fs::create_dir_all(&paths.data_dir)?;

        Ok(paths)
    }

    /// Get the path to the settings file.
    pub fn settings_file(&self) -> PathBuf {
        self.config_dir.join("settings.json")
    }
}

/// Persisted defaults for probe options.
///
/// Command-line flags always win; these fill in whatever the user leaves
/// unspecified.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// Default probe timeout in seconds.
    pub default_timeout_secs: u64,
    /// Default echo requests per probe.
    pub default_attempts: u32,
    /// Default number of concurrent probes.
    pub default_workers: usize,
    /// Default monitoring interval in seconds.
    pub default_interval_secs: u64,
    /// Default export format.
    pub default_format: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            default_timeout_secs: 3,
            default_attempts: 1,
            default_workers: 50,
            default_interval_secs: 60,
            default_format: "json".to_string(),
        }
    }
}

impl AppSettings {
    /// Load settings from the default location.
    pub fn load() -> ConfigResult<Self> {
        let paths = Paths::get();
        let file = paths.settings_file();

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

    /// Save settings to the default location.
    pub fn save(&self) -> ConfigResult<()> {
        let paths = Paths::get();
        let file = paths.settings_file();

        let content = serde_json::to_string_pretty(self)?;
        fs::write(&file, content).map_err(|e| ConfigError::WriteFailed {
            path: file,
            reason: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_settings() {
        let settings = AppSettings::default();
        assert_eq!(settings.default_timeout_secs, 3);
        assert_eq!(settings.default_workers, 50);
        assert_eq!(settings.default_interval_secs, 60);
    }

    #[test]
    fn test_settings_serialization() {
        let settings = AppSettings::default();
        let json = serde_json::to_string(&settings).unwrap();
        let parsed: AppSettings = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.default_workers, settings.default_workers);
    }

    #[test]
    fn test_load_from_fills_missing_fields() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{\"default_timeout_secs\": 10}}").unwrap();
        file.flush().unwrap();

        let settings = AppSettings::load_from(file.path()).unwrap();
        assert_eq!(settings.default_timeout_secs, 10);
        assert_eq!(settings.default_attempts, 1);
    }

    #[test]
    fn test_load_from_missing_file() {
        let err = AppSettings::load_from(Path::new("/nonexistent/settings.json")).unwrap_err();
        assert!(matches!(err, ConfigError::ReadFailed { .. }));
    }
}
