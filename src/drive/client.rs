//! Google Drive v2 REST client.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info};

use super::{DocumentReader, DriveError, FileStore};
use crate::http_client::ApiClient;
use crate::models::DriveFile;

/// Default Drive API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/drive/v2";

/// Page size for folder listings.
const LIST_PAGE_SIZE: &str = "100";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileList {
    #[serde(default)]
    items: Vec<serde_json::Value>,
    #[serde(default)]
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileResource {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    alternate_link: Option<String>,
}

/// Link used when Drive does not report one.
pub fn default_file_link(file_id: &str) -> String {
    format!("https://drive.google.com/file/d/{}/view", file_id)
}

/// Google Drive client authenticated with an OAuth access token.
#[derive(Clone)]
pub struct GoogleDrive {
    api: ApiClient,
}

impl GoogleDrive {
    pub fn new(access_token: &str, timeout: Duration) -> Result<Self, DriveError> {
        Self::with_base_url(DEFAULT_BASE_URL, access_token, timeout)
    }

    pub fn with_base_url(
        base_url: &str,
        access_token: &str,
        timeout: Duration,
    ) -> Result<Self, DriveError> {
        if access_token.is_empty() {
            return Err(DriveError::MissingToken);
        }
        Ok(Self {
            api: ApiClient::new(base_url, access_token, timeout)?,
        })
    }
}

#[async_trait]
impl FileStore for GoogleDrive {
    async fn list_folder(&self, folder_id: &str) -> Result<Vec<serde_json::Value>, DriveError> {
        info!("Listing Google Drive folder: {}", folder_id);

        let q = format!("\"{}\" in parents", folder_id);
        let mut all_items = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut query = vec![
                ("q", q.as_str()),
                ("orderBy", "createdDate desc"),
                ("maxResults", LIST_PAGE_SIZE),
            ];
            if let Some(token) = page_token.as_deref() {
                query.push(("pageToken", token));
            }
            let page: FileList = self.api.get_json("files", &query).await?;
            all_items.extend(page.items);

            match page.next_page_token {
                Some(token) => {
                    debug!("Fetching next page with token");
                    page_token = Some(token);
                }
                None => break,
            }
        }

        info!("Found {} files in folder {}", all_items.len(), folder_id);
        Ok(all_items)
    }

    async fn file_link(&self, file: &DriveFile) -> Result<String, DriveError> {
        if let Some(link) = file.alternate_link.as_deref().filter(|l| !l.is_empty()) {
            return Ok(link.to_string());
        }
        let path = format!("files/{}", urlencoding::encode(&file.id));
        let resource: FileResource = self
            .api
            .get_json(&path, &[("fields", "id,alternateLink")])
            .await?;
        Ok(resource
            .alternate_link
            .unwrap_or_else(|| default_file_link(&file.id)))
    }

    async fn copy_with_ocr(
        &self,
        file: &DriveFile,
        folder_id: &str,
        language: &str,
    ) -> Result<Option<String>, DriveError> {
        debug!("Copying {} into {} with OCR ({})", file.id, folder_id, language);
        let path = format!("files/{}/copy", urlencoding::encode(&file.id));
        let body = json!({
            "title": file.title,
            "parents": [{"id": folder_id}],
        });
        let copied: FileResource = self
            .api
            .post_json(&path, &[("ocr", "true"), ("ocrLanguage", language)], &body)
            .await?;
        Ok(copied.id.filter(|id| !id.is_empty()))
    }

    async fn remove(&self, file_id: &str) -> Result<(), DriveError> {
        debug!("Removing {}", file_id);
        let path = format!("files/{}", urlencoding::encode(file_id));
        Ok(self.api.delete(&path).await?)
    }

    async fn set_description(&self, file_id: &str, description: &str) -> Result<(), DriveError> {
        let path = format!("files/{}", urlencoding::encode(file_id));
        let _: serde_json::Value = self
            .api
            .patch_json(&path, &json!({ "description": description }))
            .await?;
        Ok(())
    }
}

#[async_trait]
impl DocumentReader for GoogleDrive {
    async fn read_text(&self, document_id: &str) -> Result<String, DriveError> {
        let path = format!("files/{}/export", urlencoding::encode(document_id));
        let text = self
            .api
            .get_text(&path, &[("mimeType", "text/plain")])
            .await?;
        Ok(clean_export(&text))
    }
}

/// Drop the byte order mark and CRLF line endings of a text export.
fn clean_export(text: &str) -> String {
    text.trim_start_matches('\u{feff}').replace("\r\n", "\n")
}
