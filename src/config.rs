//! Configuration management for ocr2notion using the prefer crate.
//!
//! The config file is discovered by prefer (`ocr2notion.{toml,yaml,json,...}`
//! in the usual locations) and parsed with serde according to its
//! extension. Secrets may be left out of the file and supplied through the
//! environment instead.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::OcrOptions;
use crate::pipeline::DEFAULT_THUMBNAIL_DOMAIN;
use crate::services::PublishSettings;

/// Environment variable holding the Notion integration token.
pub const NOTION_API_KEY_ENV: &str = "NOTION_API_KEY";

/// Environment variable holding the Google OAuth access token.
pub const DRIVE_TOKEN_ENV: &str = "GOOGLE_DRIVE_TOKEN";

/// Default request timeout in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse {format} config: {message}")]
    Parse {
        format: &'static str,
        message: String,
    },

    #[error("Missing configuration value: {0}")]
    Missing(&'static str),
}

/// Notion destination settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotionConfig {
    /// Integration token. Falls back to `NOTION_API_KEY`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

/// Google Drive settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriveConfig {
    /// OAuth access token. Falls back to `GOOGLE_DRIVE_TOKEN`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub notion: NotionConfig,
    #[serde(default)]
    pub drive: DriveConfig,
    /// Scan folders to watch.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ocr: Vec<OcrOptions>,
    /// Number of pages to keep in the database.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capacity: Option<usize>,
    /// Host allowed for page covers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_domain: Option<String>,
    /// Request timeout in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout: Option<u64>,
    /// Path to the config file this was loaded from (not serialized).
    #[serde(skip)]
    pub source_path: Option<PathBuf>,
}

/// Options controlling where configuration comes from.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Explicit config file, overriding discovery.
    pub config_path: Option<PathBuf>,
}

impl Config {
    /// Discover the config file with prefer and parse it.
    ///
    /// Returns the defaults when no config file exists.
    pub async fn load() -> Result<Self, ConfigError> {
        match prefer::load("ocr2notion").await {
            Ok(discovered) => match discovered.source_path() {
                Some(path) => Self::load_from_path(path).await,
                None => Ok(Self::default()),
            },
            Err(e) => {
                tracing::debug!("No config file discovered: {}", e);
                Ok(Self::default())
            }
        }
    }

    /// Load with an explicit path taking priority over discovery.
    pub async fn load_with_options(options: &LoadOptions) -> Result<Self, ConfigError> {
        match &options.config_path {
            Some(path) => Self::load_from_path(path).await,
            None => Self::load().await,
        }
    }

    /// Load configuration from a specific file path.
    /// Supports TOML, YAML and JSON based on the file extension.
    pub async fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let path = expand_path(&path.to_string_lossy());
        let contents = tokio::fs::read_to_string(&path)
            .await
            .map_err(|source| ConfigError::Read {
                path: path.clone(),
                source,
            })?;

        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("json");
        let mut config = Self::parse(ext, &contents)?;
        config.source_path = Some(path);
        Ok(config)
    }

    /// Parse config text in the format named by `ext`.
    pub fn parse(ext: &str, contents: &str) -> Result<Self, ConfigError> {
        match ext {
            "toml" => toml::from_str(contents).map_err(|e| ConfigError::Parse {
                format: "TOML",
                message: e.to_string(),
            }),
            "yaml" | "yml" => serde_yaml::from_str(contents).map_err(|e| ConfigError::Parse {
                format: "YAML",
                message: e.to_string(),
            }),
            _ => serde_json::from_str(contents).map_err(|e| ConfigError::Parse {
                format: "JSON",
                message: e.to_string(),
            }),
        }
    }

    pub fn notion_api_key(&self) -> Option<String> {
        secret_or_env(self.notion.api_key.as_deref(), NOTION_API_KEY_ENV)
    }

    pub fn drive_token(&self) -> Option<String> {
        secret_or_env(self.drive.access_token.as_deref(), DRIVE_TOKEN_ENV)
    }

    pub fn database_id(&self) -> Result<&str, ConfigError> {
        self.notion
            .database_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .ok_or(ConfigError::Missing("notion.database_id"))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout.unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS))
    }

    pub fn thumbnail_domain(&self) -> &str {
        self.thumbnail_domain
            .as_deref()
            .unwrap_or(DEFAULT_THUMBNAIL_DOMAIN)
    }

    /// Settings for the publisher.
    pub fn publish_settings(&self) -> Result<PublishSettings, ConfigError> {
        if self.ocr.is_empty() {
            return Err(ConfigError::Missing("ocr"));
        }
        Ok(PublishSettings {
            database_id: self.database_id()?.to_string(),
            ocr_options: self.ocr.clone(),
            capacity: self.capacity,
            thumbnail_domain: self.thumbnail_domain().to_string(),
        })
    }
}

/// Expand `~` in a user supplied path.
pub fn expand_path(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).as_ref())
}

/// A configured secret, with `$VAR` references expanded, or else the value of
/// the environment variable `var`.
fn secret_or_env(value: Option<&str>, var: &str) -> Option<String> {
    match value.filter(|v| !v.is_empty()) {
        Some(v) => Some(
            shellexpand::env(v)
                .map(|s| s.into_owned())
                .unwrap_or_else(|_| v.to_string()),
        ),
        None => std::env::var(var).ok().filter(|v| !v.is_empty()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const TOML: &str = r#"
capacity = 500
request_timeout = 10

[notion]
api_key = "secret_abc"
database_id = "db-1"

[[ocr]]
scan_folder_id = "scan"
ocr_folder_id = "ocr"
ocr_language = "ja"
tags = ["receipt"]
"#;

    #[test]
    fn parse_toml() {
        let config = Config::parse("toml", TOML).unwrap();
        assert_eq!(config.capacity, Some(500));
        assert_eq!(config.timeout(), Duration::from_secs(10));
        assert_eq!(config.database_id().unwrap(), "db-1");
        assert_eq!(config.ocr[0].tags, vec!["receipt"]);
        assert!(!config.ocr[0].remove_ocr_file);
        assert_eq!(config.thumbnail_domain(), DEFAULT_THUMBNAIL_DOMAIN);
    }

    #[test]
    fn parse_yaml_with_camel_case_options() {
        let yaml = r#"
notion:
  database_id: db-2
ocr:
  - scanFolderId: scan
    ocrFolderId: ocr
    ocrLanguage: en
    removeOcrFile: true
thumbnail_domain: example.com
"#;
        let config = Config::parse("yaml", yaml).unwrap();
        assert!(config.ocr[0].remove_ocr_file);
        assert_eq!(config.ocr[0].ocr_language, "en");
        assert_eq!(config.thumbnail_domain(), "example.com");
    }

    #[test]
    fn parse_errors_name_the_format() {
        let err = Config::parse("json", "{not json").unwrap_err();
        assert!(err.to_string().contains("JSON"));
    }

    #[test]
    fn publish_settings_require_database_and_folders() {
        let config = Config::default();
        assert!(matches!(
            config.publish_settings(),
            Err(ConfigError::Missing("ocr"))
        ));

        let mut config = Config::parse("toml", TOML).unwrap();
        config.notion.database_id = None;
        assert!(matches!(
            config.publish_settings(),
            Err(ConfigError::Missing("notion.database_id"))
        ));
    }

    #[test]
    fn secrets_fall_back_to_env() {
        std::env::set_var("OCR2NOTION_TEST_SECRET", "from-env");
        assert_eq!(
            secret_or_env(None, "OCR2NOTION_TEST_SECRET").as_deref(),
            Some("from-env")
        );
        assert_eq!(
            secret_or_env(Some(""), "OCR2NOTION_TEST_SECRET").as_deref(),
            Some("from-env")
        );
        assert_eq!(
            secret_or_env(Some("${OCR2NOTION_TEST_SECRET}-x"), "UNUSED").as_deref(),
            Some("from-env-x")
        );
        assert_eq!(
            secret_or_env(Some("inline"), "OCR2NOTION_TEST_SECRET").as_deref(),
            Some("inline")
        );
        assert_eq!(secret_or_env(None, "OCR2NOTION_TEST_UNSET_VAR"), None);
    }

    #[tokio::test]
    async fn load_from_path_by_extension() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(TOML.as_bytes()).unwrap();

        let config = Config::load_from_path(file.path()).await.unwrap();
        assert_eq!(config.source_path.as_deref(), Some(file.path()));
        assert_eq!(config.notion_api_key().as_deref(), Some("secret_abc"));

        let options = LoadOptions {
            config_path: Some(file.path().to_path_buf()),
        };
        let config = Config::load_with_options(&options).await.unwrap();
        assert_eq!(config.capacity, Some(500));
    }

    #[tokio::test]
    async fn missing_file_is_a_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load_from_path(&dir.path().join("absent.toml"))
            .await
            .unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
