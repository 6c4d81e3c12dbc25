//! Google Drive collaborators.
//!
//! The pipelines only see the [`FileStore`] and [`DocumentReader`] traits, so
//! tests can swap in fakes. [`GoogleDrive`] implements both over the Drive v2
//! REST API, which is the API version that still supports OCR on copy.

mod client;

pub use client::{GoogleDrive, DEFAULT_BASE_URL};

use async_trait::async_trait;
use thiserror::Error;

use crate::http_client::HttpError;
use crate::models::DriveFile;

#[derive(Debug, Error)]
pub enum DriveError {
    #[error("Google Drive API error: {0}")]
    Http(#[from] HttpError),

    #[error("Google Drive access token is not configured")]
    MissingToken,
}

/// File storage operations used by the pipelines and the publisher.
#[async_trait]
pub trait FileStore: Send + Sync {
    /// List the files directly inside a folder, newest first, as raw JSON.
    async fn list_folder(&self, folder_id: &str) -> Result<Vec<serde_json::Value>, DriveError>;

    /// Canonical link for opening a file.
    async fn file_link(&self, file: &DriveFile) -> Result<String, DriveError>;

    /// Copy a file into `folder_id` with OCR enabled.
    ///
    /// Returns the id of the resulting document, or `None` when the copy
    /// produced nothing usable.
    async fn copy_with_ocr(
        &self,
        file: &DriveFile,
        folder_id: &str,
        language: &str,
    ) -> Result<Option<String>, DriveError>;

    /// Permanently delete a file.
    async fn remove(&self, file_id: &str) -> Result<(), DriveError>;

    /// Overwrite a file's description.
    async fn set_description(&self, file_id: &str, description: &str) -> Result<(), DriveError>;
}

/// Reads the plain text of an OCR document.
#[async_trait]
pub trait DocumentReader: Send + Sync {
    /// Full text of the document, possibly empty.
    async fn read_text(&self, document_id: &str) -> Result<String, DriveError>;
}
