//! Processed markers written back to source files.

use tracing::debug;

use crate::drive::{DriveError, FileStore};
use crate::utils::truncate_chars;

/// Characters of OCR text copied into the file description.
pub const MARKER_MAX_CHARS: usize = 400;

/// Files that received a page during the batch, with their marker text.
///
/// A non-empty description excludes the file from later batches, so markers
/// are written only once every command of the batch has gone through.
#[derive(Debug, Default)]
pub struct ProcessedMarkers {
    entries: Vec<(String, String)>,
}

impl ProcessedMarkers {
    pub fn add(&mut self, file_id: &str, text: &str) {
        self.entries
            .push((file_id.to_string(), truncate_chars(text, MARKER_MAX_CHARS).to_string()));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Write every marker, stopping at the first failure.
    pub async fn apply(self, store: &dyn FileStore) -> Result<usize, DriveError> {
        let count = self.entries.len();
        for (file_id, marker) in self.entries {
            debug!("Marking {} as processed", file_id);
            store.set_description(&file_id, &marker).await?;
        }
        Ok(count)
    }
}
