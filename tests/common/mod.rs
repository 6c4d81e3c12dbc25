//! In-memory collaborators shared by the integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Value};

use ocr2notion::drive::{DocumentReader, DriveError, FileStore};
use ocr2notion::http_client::HttpError;
use ocr2notion::models::DriveFile;
use ocr2notion::notion::{
    CreatePage, DatabaseSchema, Destination, NotionError, PageRef, PropertyKind, QueryRequest,
    QueryResponse, UpdatePage,
};

/// Drive double: OCR copies return `doc-<file id>`, texts are looked up by
/// source file id.
#[derive(Default)]
pub struct FakeDrive {
    pub folders: HashMap<String, Vec<Value>>,
    pub texts: HashMap<String, String>,
    pub copies: Mutex<Vec<String>>,
    pub removed: Mutex<Vec<String>>,
    pub descriptions: Mutex<Vec<(String, String)>>,
}

impl FakeDrive {
    pub fn with_text(mut self, file_id: &str, text: &str) -> Self {
        self.texts.insert(file_id.to_string(), text.to_string());
        self
    }

    pub fn with_folder(mut self, folder_id: &str, items: Vec<Value>) -> Self {
        self.folders.insert(folder_id.to_string(), items);
        self
    }

    pub fn copies(&self) -> Vec<String> {
        self.copies.lock().unwrap().clone()
    }

    pub fn descriptions(&self) -> Vec<(String, String)> {
        self.descriptions.lock().unwrap().clone()
    }
}

#[async_trait]
impl FileStore for FakeDrive {
    async fn list_folder(&self, folder_id: &str) -> Result<Vec<Value>, DriveError> {
        Ok(self.folders.get(folder_id).cloned().unwrap_or_default())
    }

    async fn file_link(&self, file: &DriveFile) -> Result<String, DriveError> {
        Ok(format!("https://drive.google.com/file/d/{}/view", file.id))
    }

    async fn copy_with_ocr(
        &self,
        file: &DriveFile,
        folder_id: &str,
        _language: &str,
    ) -> Result<Option<String>, DriveError> {
        self.copies
            .lock()
            .unwrap()
            .push(format!("{}->{}", file.id, folder_id));
        Ok(Some(format!("doc-{}", file.id)))
    }

    async fn remove(&self, file_id: &str) -> Result<(), DriveError> {
        self.removed.lock().unwrap().push(file_id.to_string());
        Ok(())
    }

    async fn set_description(&self, file_id: &str, description: &str) -> Result<(), DriveError> {
        self.descriptions
            .lock()
            .unwrap()
            .push((file_id.to_string(), description.to_string()));
        Ok(())
    }
}

#[async_trait]
impl DocumentReader for FakeDrive {
    async fn read_text(&self, document_id: &str) -> Result<String, DriveError> {
        let file_id = document_id.trim_start_matches("doc-");
        Ok(self.texts.get(file_id).cloned().unwrap_or_default())
    }
}

/// Notion double holding a schema, existing rows and the created pages.
pub struct FakeNotion {
    pub schema: DatabaseSchema,
    pub rows: Vec<Value>,
    pub fail_create: bool,
    pub created: Mutex<Vec<CreatePage>>,
    pub queries: Mutex<usize>,
}

impl FakeNotion {
    pub fn new(schema: DatabaseSchema) -> Self {
        Self {
            schema,
            rows: Vec::new(),
            fail_create: false,
            created: Mutex::new(Vec::new()),
            queries: Mutex::new(0),
        }
    }

    /// Add an existing row with a `guid` property.
    pub fn with_row(mut self, page_id: &str, guid: &str) -> Self {
        self.rows.push(json!({
            "id": page_id,
            "properties": {
                "guid": {"type": "rich_text", "rich_text": [{"type": "text", "plain_text": guid}]}
            }
        }));
        self
    }

    pub fn failing(mut self) -> Self {
        self.fail_create = true;
        self
    }

    pub fn created(&self) -> Vec<CreatePage> {
        self.created.lock().unwrap().clone()
    }
}

#[async_trait]
impl Destination for FakeNotion {
    async fn create_page(&self, page: &CreatePage) -> Result<PageRef, NotionError> {
        if self.fail_create {
            return Err(NotionError::Http(HttpError::Status {
                status: 400,
                body: r#"{"code":"validation_error"}"#.into(),
            }));
        }
        let mut created = self.created.lock().unwrap();
        created.push(page.clone());
        Ok(PageRef {
            id: format!("page-{}", created.len()),
            url: None,
        })
    }

    async fn update_page(&self, page: &UpdatePage) -> Result<PageRef, NotionError> {
        Ok(PageRef {
            id: page.page_id.clone(),
            url: None,
        })
    }

    async fn retrieve_schema(&self, _database_id: &str) -> Result<DatabaseSchema, NotionError> {
        Ok(self.schema.clone())
    }

    /// Serves the rows two per page, using the row index as cursor.
    async fn query_database(
        &self,
        _database_id: &str,
        query: &QueryRequest,
    ) -> Result<QueryResponse, NotionError> {
        *self.queries.lock().unwrap() += 1;
        let start: usize = query
            .start_cursor
            .as_deref()
            .and_then(|c| c.parse().ok())
            .unwrap_or(0);
        let end = (start + 2).min(self.rows.len());
        let next_cursor = (end < self.rows.len()).then(|| end.to_string());
        let response = json!({
            "results": self.rows[start..end].to_vec(),
            "next_cursor": next_cursor,
            "has_more": next_cursor.is_some(),
        });
        Ok(serde_json::from_value(response).unwrap())
    }
}

/// Schema with every optional column.
pub fn full_schema() -> DatabaseSchema {
    DatabaseSchema::from_kinds([
        ("Name", PropertyKind::Title),
        ("entryUpdated", PropertyKind::Date),
        ("guid", PropertyKind::RichText),
        ("mimeType", PropertyKind::Select),
        ("type", PropertyKind::Select),
        ("tags", PropertyKind::MultiSelect),
        ("タグ", PropertyKind::MultiSelect),
        ("excerpt", PropertyKind::RichText),
        ("description", PropertyKind::RichText),
        ("link", PropertyKind::Url),
        ("modified", PropertyKind::Date),
    ])
}

/// A Drive v2 file as listed by the API.
pub fn drive_file(id: &str, mime: &str, parent: &str) -> Value {
    json!({
        "id": id,
        "title": format!("{}.pdf", id),
        "mimeType": mime,
        "parents": [{"id": parent}],
        "labels": {"trashed": false},
        "modifiedDate": "2024-03-01T09:30:00.000Z"
    })
}
