//! Google Drive file and change-feed shapes (Drive API v2).

use serde::{Deserialize, Serialize};

/// Reference to a parent folder.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParentRef {
    #[serde(default)]
    pub id: Option<String>,
}

impl ParentRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: Some(id.into()) }
    }
}

/// File labels. Only the trash state matters here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Labels {
    #[serde(default)]
    pub trashed: bool,
}

/// A file as returned by a Drive listing or embedded in a change record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveFile {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub parents: Vec<ParentRef>,
    #[serde(default)]
    pub labels: Labels,
    /// RFC 3339 modification time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alternate_link: Option<String>,
}

impl DriveFile {
    /// Whether the file already carries a description.
    ///
    /// A description is written after publishing, so this doubles as the
    /// "already processed" marker.
    pub fn has_description(&self) -> bool {
        self.description.as_deref().is_some_and(|d| !d.is_empty())
    }

    /// Whether any parent folder has the given id.
    pub fn has_parent(&self, folder_id: &str) -> bool {
        self.parent_ids().any(|p| p == folder_id)
    }

    /// Ids of the parent folders, skipping entries without one.
    pub fn parent_ids(&self) -> impl Iterator<Item = &str> {
        self.parents.iter().filter_map(|p| p.id.as_deref())
    }
}

/// One entry of a change feed, or a listed file wrapped into the same shape.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_id: Option<String>,
    #[serde(default)]
    pub file: Option<DriveFile>,
}

impl ChangeRecord {
    /// Wrap a listed file as a change record.
    pub fn from_file(file: DriveFile) -> Self {
        Self {
            file_id: Some(file.id.clone()),
            file: Some(file),
        }
    }
}
