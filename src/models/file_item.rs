//! Per-file record carried through the pipelines.

use super::OcrOptions;

/// A file enriched with its link, OCR text and excerpt.
///
/// Built from one [`super::DriveFile`] by the file stages and read by the
/// parameter stages. Lives for a single batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileItem {
    /// Drive file id, the natural key of the published page.
    pub guid: String,
    pub mime_type: String,
    /// Short type tag derived from the MIME type.
    pub file_type: String,
    pub excerpt: String,
    pub description: String,
    pub link: String,
    /// ISO-8601 modification time.
    pub modified: String,
    pub thumbnail_link: Option<String>,
    /// Full OCR text.
    pub text: String,
    pub tags: Vec<String>,
    /// Options of the scan folder the file was matched to.
    pub ocr_options: Option<OcrOptions>,
}
