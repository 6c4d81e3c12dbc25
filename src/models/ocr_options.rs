//! Scan folder to OCR folder bindings.

use serde::{Deserialize, Serialize};

/// Configuration for one scan folder.
///
/// Files found in `scan_folder_id` are copied with OCR into `ocr_folder_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OcrOptions {
    /// Folder that receives scanned files.
    #[serde(alias = "scanFolderId")]
    pub scan_folder_id: String,
    /// Folder that receives the OCR documents.
    #[serde(alias = "ocrFolderId")]
    pub ocr_folder_id: String,
    /// Language hint for OCR (ISO 639-1 code).
    #[serde(alias = "ocrLanguage")]
    pub ocr_language: String,
    /// Tags set on pages created from this folder.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// Remove the OCR document once its text has been read.
    #[serde(default, alias = "removeOcrFile")]
    pub remove_ocr_file: bool,
}

impl OcrOptions {
    pub fn new(
        scan_folder_id: impl Into<String>,
        ocr_folder_id: impl Into<String>,
        ocr_language: impl Into<String>,
    ) -> Self {
        Self {
            scan_folder_id: scan_folder_id.into(),
            ocr_folder_id: ocr_folder_id.into(),
            ocr_language: ocr_language.into(),
            tags: Vec::new(),
            remove_ocr_file: false,
        }
    }

    pub fn with_tags(mut self, tags: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_remove_ocr_file(mut self, remove: bool) -> Self {
        self.remove_ocr_file = remove;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_camel_case_keys() {
        let opts: OcrOptions = serde_json::from_value(serde_json::json!({
            "scanFolderId": "scan",
            "ocrFolderId": "ocr",
            "ocrLanguage": "ja",
            "tags": ["receipt"],
            "removeOcrFile": true,
        }))
        .unwrap();
        assert_eq!(
            opts,
            OcrOptions::new("scan", "ocr", "ja")
                .with_tags(["receipt"])
                .with_remove_ocr_file(true)
        );
    }

    #[test]
    fn optional_fields_default() {
        let opts: OcrOptions = toml::from_str(
            r#"
            scan_folder_id = "scan"
            ocr_folder_id = "ocr"
            ocr_language = "en"
            "#,
        )
        .unwrap();
        assert!(opts.tags.is_empty());
        assert!(!opts.remove_ocr_file);
    }
}
