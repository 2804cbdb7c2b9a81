//! Configuration management for fieldsurvey.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default configuration directory name.
const CONFIG_DIR_NAME: &str = "fieldsurvey";

/// Prefix for environment overrides. Nested keys use `__`, e.g.
/// `FIELDSURVEY_ARCHIVE__API_KEY`.
const ENV_PREFIX: &str = "FIELDSURVEY_";

/// Caption revealed on the landing screen.
pub const DEFAULT_CAPTION: &str =
    "Preserving the cultural DNA of the Indus through its 74+ living languages.";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `FIELDSURVEY_`)
/// 2. TOML config file at `~/.config/fieldsurvey/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Remote archive and identity service settings.
    pub archive: ArchiveConfig,
    /// Landing screen settings.
    pub landing: LandingConfig,
}

/// Remote archive configuration.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchiveConfig {
    /// Project that owns the document store and the identity pool.
    pub project_id: String,
    /// Database within the project.
    pub database: String,
    /// Collection surveys are appended to.
    pub collection: String,
    /// Web API key. Only required once a remote client is built.
    pub api_key: String,
    /// Base URL of the document store REST API.
    pub firestore_url: String,
    /// Base URL of the identity REST API.
    pub identity_url: String,
    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
}

/// Landing screen configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LandingConfig {
    /// Caption revealed character by character.
    pub caption: String,
    /// Delay between revealed characters in milliseconds.
    pub reveal_interval_ms: u64,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            project_id: "linguistic-portal-45bc9".to_string(),
            database: "(default)".to_string(),
            collection: "surveys".to_string(),
            api_key: String::new(),
            firestore_url: "https://firestore.googleapis.com".to_string(),
            identity_url: "https://identitytoolkit.googleapis.com".to_string(),
            request_timeout_secs: 30,
        }
    }
}

// The key never shows up in logs or `config show`.
impl std::fmt::Debug for ArchiveConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArchiveConfig")
            .field("project_id", &self.project_id)
            .field("database", &self.database)
            .field("collection", &self.collection)
            .field("api_key", &mask(&self.api_key))
            .field("firestore_url", &self.firestore_url)
            .field("identity_url", &self.identity_url)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

impl LandingConfig {
    /// Get the caption reveal interval as a Duration.
    #[must_use]
    pub fn reveal_interval(&self) -> Duration {
        Duration::from_millis(self.reveal_interval_ms)
    }
}

impl Default for LandingConfig {
    fn default() -> Self {
        Self {
            caption: DEFAULT_CAPTION.to_string(),
            reveal_interval_ms: 50,
        }
    }
}

/// Render a secret as set/unset without leaking it.
#[must_use]
pub fn mask(secret: &str) -> &'static str {
    if secret.is_empty() {
        "<unset>"
    } else {
        "<redacted>"
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// A missing file is not an error; defaults and environment still apply.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading, parsing or validation fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed(ENV_PREFIX).split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(CONFIG_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        let archive = &self.archive;

        for (name, value) in [
            ("project_id", &archive.project_id),
            ("database", &archive.database),
            ("collection", &archive.collection),
        ] {
            if value.trim().is_empty() {
                return Err(Error::config_validation(format!(
                    "archive.{name} must not be empty"
                )));
            }
        }

        for (name, value) in [
            ("firestore_url", &archive.firestore_url),
            ("identity_url", &archive.identity_url),
        ] {
            if let Err(e) = reqwest::Url::parse(value) {
                return Err(Error::config_validation(format!(
                    "archive.{name} is not a valid URL ({value}): {e}"
                )));
            }
        }

        if archive.request_timeout_secs == 0 {
            return Err(Error::config_validation(
                "archive.request_timeout_secs must be greater than 0",
            ));
        }

        if self.landing.reveal_interval_ms == 0 {
            return Err(Error::config_validation(
                "landing.reveal_interval_ms must be greater than 0",
            ));
        }

        Ok(())
    }

    /// Return the API key, failing if none was configured.
    ///
    /// # Errors
    ///
    /// Returns a validation error when the key is empty.
    pub fn require_api_key(&self) -> Result<&str> {
        if self.archive.api_key.is_empty() {
            return Err(Error::config_validation(format!(
                "archive.api_key is not set (config file or {ENV_PREFIX}ARCHIVE__API_KEY)"
            )));
        }
        Ok(&self.archive.api_key)
    }

    /// Get the request timeout as a Duration.
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.archive.request_timeout_secs)
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_archive_config() {
        let archive = ArchiveConfig::default();

        assert_eq!(archive.project_id, "linguistic-portal-45bc9");
        assert_eq!(archive.database, "(default)");
        assert_eq!(archive.collection, "surveys");
        assert!(archive.api_key.is_empty());
        assert_eq!(archive.request_timeout_secs, 30);
    }

    #[test]
    fn test_default_landing_config() {
        let landing = LandingConfig::default();

        assert_eq!(landing.caption, DEFAULT_CAPTION);
        assert_eq!(landing.reveal_interval_ms, 50);
    }

    #[test]
    fn test_validate_valid_config() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_validate_empty_collection() {
        let mut config = Config::default();
        config.archive.collection = "  ".to_string();

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("archive.collection"));
    }

    #[test]
    fn test_validate_bad_url() {
        let mut config = Config::default();
        config.archive.identity_url = "not a url".to_string();

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("archive.identity_url"));
    }

    #[test]
    fn test_validate_zero_timeout() {
        let mut config = Config::default();
        config.archive.request_timeout_secs = 0;

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("request_timeout_secs"));
    }

    #[test]
    fn test_validate_zero_reveal_interval() {
        let mut config = Config::default();
        config.landing.reveal_interval_ms = 0;

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("reveal_interval_ms"));
    }

    #[test]
    fn test_require_api_key() {
        let mut config = Config::default();
        assert!(config.require_api_key().is_err());

        config.archive.api_key = "AIza-test".to_string();
        assert_eq!(config.require_api_key().unwrap(), "AIza-test");
    }

    #[test]
    fn test_debug_masks_api_key() {
        let mut config = Config::default();
        config.archive.api_key = "AIza-very-secret".to_string();

        let debug_str = format!("{config:?}");
        assert!(!debug_str.contains("AIza-very-secret"));
        assert!(debug_str.contains("<redacted>"));
    }

    #[test]
    fn test_durations() {
        let config = Config::default();
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert_eq!(config.landing.reveal_interval(), Duration::from_millis(50));
    }

    #[test]
    fn test_default_config_path() {
        let path = Config::default_config_path();
        assert!(path.to_string_lossy().contains("fieldsurvey"));
        assert!(path.to_string_lossy().contains("config.toml"));
    }

    #[test]
    fn test_load_nonexistent_config() {
        let result = Config::load_from(Some(PathBuf::from("/nonexistent/config.toml")));
        assert!(result.is_ok());
    }

    #[test]
    fn test_load_from_toml_and_env() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "fieldsurvey.toml",
                r#"
                [archive]
                collection = "pilot_surveys"

                [landing]
                reveal_interval_ms = 10
                "#,
            )?;
            jail.set_env("FIELDSURVEY_ARCHIVE__API_KEY", "AIza-from-env");

            let config = Config::load_from(Some(PathBuf::from("fieldsurvey.toml")))
                .map_err(|e| e.to_string())?;
            assert_eq!(config.archive.collection, "pilot_surveys");
            assert_eq!(config.archive.api_key, "AIza-from-env");
            assert_eq!(config.landing.reveal_interval_ms, 10);
            assert_eq!(config.landing.caption, DEFAULT_CAPTION);
            Ok(())
        });
    }

    #[test]
    fn test_archive_config_deserialize() {
        let json = r#"{"collection": "dialects", "request_timeout_secs": 5}"#;
        let archive: ArchiveConfig = serde_json::from_str(json).unwrap();
        assert_eq!(archive.collection, "dialects");
        assert_eq!(archive.request_timeout_secs, 5);
        assert_eq!(archive.database, "(default)");
    }
}
