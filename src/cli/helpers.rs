//! Shared helper functions for CLI commands.

use std::sync::Arc;

use anyhow::{bail, Context};
use serde_json::Value;

use crate::config::Config;
use crate::drive::{self, DriveError, GoogleDrive};
use crate::notion::{self, NotionClient, NotionError};
use crate::services::Publisher;

/// Notion client from the `notion` config section.
pub fn notion_client(config: &Config) -> anyhow::Result<NotionClient> {
    let api_key = config.notion_api_key().ok_or(NotionError::MissingApiKey)?;
    let base_url = config
        .notion
        .base_url
        .as_deref()
        .unwrap_or(notion::DEFAULT_BASE_URL);
    let version = config
        .notion
        .api_version
        .as_deref()
        .unwrap_or(notion::API_VERSION);
    Ok(NotionClient::with_base_url(
        base_url,
        &api_key,
        version,
        config.timeout(),
    )?)
}

/// Drive client from the `drive` config section.
pub fn drive_client(config: &Config) -> anyhow::Result<GoogleDrive> {
    let token = config.drive_token().ok_or(DriveError::MissingToken)?;
    let base_url = config
        .drive
        .base_url
        .as_deref()
        .unwrap_or(drive::DEFAULT_BASE_URL);
    Ok(GoogleDrive::with_base_url(base_url, &token, config.timeout())?)
}

/// Publisher wired to the real Notion and Drive clients.
pub fn build_publisher(config: &Config) -> anyhow::Result<Publisher> {
    let settings = config.publish_settings()?;
    let notion = Arc::new(notion_client(config)?);
    let drive = Arc::new(drive_client(config)?);
    Ok(Publisher::new(notion, drive.clone(), drive, settings))
}

/// Items of a change list file.
///
/// Accepts a Drive `FileList` or `ChangeList` response (`{"items": [...]}`)
/// or a bare array of files/changes.
pub fn change_items(value: Value) -> anyhow::Result<Vec<Value>> {
    match value {
        Value::Array(items) => Ok(items),
        Value::Object(mut map) => match map.remove("items") {
            Some(Value::Array(items)) => Ok(items),
            Some(_) => bail!("\"items\" is not an array"),
            None => bail!("expected an \"items\" array"),
        },
        _ => bail!("expected a JSON array or an object with \"items\""),
    }
}

/// Read and parse a change list file.
pub async fn read_change_items(path: &std::path::Path) -> anyhow::Result<Vec<Value>> {
    let contents = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let value: Value = serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    change_items(value)
}
