//! MIME type classification for scanned files.

/// Prefix shared by Google Workspace native types (Docs, Sheets, folders...).
pub const GOOGLE_APPS_PREFIX: &str = "application/vnd.google-apps.";

/// Semantic type reported for plain text files.
const PLAIN_TEXT_TYPE: &str = "text";

/// Map a MIME type to the short type tag stored on the Notion page.
///
/// - `application/vnd.google-apps.document` -> `document`
/// - `text/plain` -> `text`
/// - `image/png` -> `png`
/// - anything without a slash is returned unchanged
pub fn classify_type(mime_type: &str) -> String {
    if let Some(rest) = mime_type.strip_prefix(GOOGLE_APPS_PREFIX) {
        return rest.to_string();
    }
    if mime_type == "text/plain" {
        return PLAIN_TEXT_TYPE.to_string();
    }
    match mime_type.split_once('/') {
        Some((_, subtype)) => subtype.to_string(),
        None => mime_type.to_string(),
    }
}

/// Whether a file with this MIME type can be sent through OCR.
///
/// Only PDFs and images qualify. A missing MIME type never does.
pub fn is_scan_eligible(mime_type: Option<&str>) -> bool {
    match mime_type {
        Some("application/pdf") => true,
        Some(m) => m.split('/').next() == Some("image"),
        None => false,
    }
}
