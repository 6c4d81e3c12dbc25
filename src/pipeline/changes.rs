//! Change-list normalization and the eligibility filter.

use serde_json::Value;
use tracing::debug;

use crate::models::{ChangeRecord, DriveFile, OcrOptions};
use crate::utils::is_scan_eligible;

/// Turn raw listing or change-feed items into change records.
///
/// Items carrying a `file` key are change records already and pass through;
/// anything else is treated as a bare file and wrapped. Applying this to its
/// own serialized output gives the same records back.
pub fn normalize_change_records(items: Vec<Value>) -> Result<Vec<ChangeRecord>, serde_json::Error> {
    items
        .into_iter()
        .map(|item| {
            if item.get("file").is_some() {
                serde_json::from_value(item)
            } else {
                let file: DriveFile = serde_json::from_value(item)?;
                Ok(ChangeRecord::from_file(file))
            }
        })
        .collect()
}

/// Keep records that are waiting for OCR.
///
/// A file qualifies when it is a PDF or image, has no description yet (the
/// description is the processed marker), and sits in one of the configured
/// scan folders. Input order is preserved.
pub fn filter_eligible(options: &[OcrOptions], records: Vec<ChangeRecord>) -> Vec<ChangeRecord> {
    records
        .into_iter()
        .filter(|record| match &record.file {
            Some(file) => is_eligible(options, file),
            None => false,
        })
        .collect()
}

fn is_eligible(options: &[OcrOptions], file: &DriveFile) -> bool {
    if !is_scan_eligible(file.mime_type.as_deref()) {
        return false;
    }
    if file.has_description() {
        debug!("Skipping {}: already has a description", file.id);
        return false;
    }
    options.iter().any(|o| file.has_parent(&o.scan_folder_id))
}
