//! Settings loader
//!
//! Reads `searchdeck.yaml` and applies environment overrides. Every field has
//! a default, so a missing file or a partial file is fine.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use searchdeck_templates::{DestinationTarget, DEFAULT_BASE_URL, DEFAULT_QUERY_PARAM};

use crate::error::SettingsError;

/// Settings file looked up in the working directory
pub const DEFAULT_SETTINGS_FILE: &str = "searchdeck.yaml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub destination: DestinationSettings,
    pub templates: TemplateSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DestinationSettings {
    pub base_url: String,
    pub query_param: String,
}

impl Default for DestinationSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            query_param: DEFAULT_QUERY_PARAM.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateSettings {
    /// Bundled template source
    pub default_path: PathBuf,
    /// User-saved source that overrides the bundled one
    pub custom_path: PathBuf,
}

impl Default for TemplateSettings {
    fn default() -> Self {
        Self {
            default_path: PathBuf::from("templates/queries.json"),
            custom_path: PathBuf::from(".searchdeck/custom-queries.json"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// `EnvFilter` directive used when `RUST_LOG` is unset
    pub filter: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            filter: "warn".to_string(),
        }
    }
}

impl Settings {
    /// Load settings from a YAML file
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let text = std::fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let settings: Settings =
            serde_yaml::from_str(&text).map_err(|source| SettingsError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Resolve settings from the environment.
    ///
    /// Resolution order:
    /// 1. `SEARCHDECK_CONFIG` (explicit path; must exist)
    /// 2. `searchdeck.yaml` in the working directory, if present
    /// 3. Built-in defaults
    ///
    /// `SEARCHDECK_BASE_URL` and `SEARCHDECK_QUERY_PARAM` then override the
    /// destination.
    pub fn from_env() -> Result<Self, SettingsError> {
        let mut settings = match std::env::var("SEARCHDECK_CONFIG") {
            Ok(path) => Self::load(Path::new(&path))?,
            Err(_) if Path::new(DEFAULT_SETTINGS_FILE).exists() => {
                Self::load(Path::new(DEFAULT_SETTINGS_FILE))?
            }
            Err(_) => {
                debug!("No settings file found, using defaults");
                Self::default()
            }
        };
        settings.apply_overrides(|key| std::env::var(key).ok());
        Ok(settings)
    }

    /// Apply overrides from `lookup`, which maps a variable name to its value
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(base_url) = lookup("SEARCHDECK_BASE_URL") {
            self.destination.base_url = base_url;
        }
        if let Some(param) = lookup("SEARCHDECK_QUERY_PARAM") {
            self.destination.query_param = param;
        }
    }

    /// Validated destination target
    pub fn destination_target(&self) -> Result<DestinationTarget, SettingsError> {
        Ok(DestinationTarget::new(
            &self.destination.base_url,
            self.destination.query_param.clone(),
        )?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.destination.base_url, "https://www.youtube.com/results");
        assert_eq!(settings.destination.query_param, "search_query");
        assert_eq!(settings.logging.filter, "warn");
        assert!(settings.destination_target().is_ok());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "destination:\n  base_url: https://example.com/search\nlogging:\n  filter: debug"
        )
        .unwrap();

        let settings = Settings::load(file.path()).unwrap();
        assert_eq!(settings.destination.base_url, "https://example.com/search");
        assert_eq!(settings.destination.query_param, "search_query");
        assert_eq!(settings.logging.filter, "debug");
        assert_eq!(settings.templates, TemplateSettings::default());
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Settings::load(&dir.path().join("absent.yaml")).unwrap_err();
        assert!(matches!(err, SettingsError::Read { .. }));
    }

    #[test]
    fn test_bad_yaml_is_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "destination: [unterminated").unwrap();
        let err = Settings::load(file.path()).unwrap_err();
        assert!(matches!(err, SettingsError::Parse { .. }));
    }

    #[test]
    fn test_overrides() {
        let mut settings = Settings::default();
        settings.apply_overrides(|key| match key {
            "SEARCHDECK_BASE_URL" => Some("https://duckduckgo.com/".to_string()),
            "SEARCHDECK_QUERY_PARAM" => Some("q".to_string()),
            _ => None,
        });
        let target = settings.destination_target().unwrap();
        assert_eq!(target.url_for("cats").as_str(), "https://duckduckgo.com/?q=cats");
    }

    #[test]
    fn test_invalid_base_url() {
        let mut settings = Settings::default();
        settings.destination.base_url = "nowhere".to_string();
        assert!(matches!(
            settings.destination_target(),
            Err(SettingsError::Destination(_))
        ));
    }
}
