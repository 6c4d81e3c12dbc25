//! Notion database destination.
//!
//! [`Destination`] is the seam the publisher writes through; [`NotionClient`]
//! implements it against the Notion REST API. [`StoredItems`] tracks which
//! files already have a page.

pub mod stored_items;
pub mod types;

pub use stored_items::StoredItems;
pub use types::{
    Block, Cover, CreatePage, DatabaseSchema, PageObject, PageRef, Parent, PropertyKind,
    PropertyValue, QueryRequest, QueryResponse, RichText, SortDirection, UpdatePage,
};

use std::time::Duration;

use async_stream::stream;
use async_trait::async_trait;
use futures::stream::BoxStream;
use thiserror::Error;
use tracing::debug;

use crate::http_client::{ApiClient, HttpError};

/// Default Notion API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.notion.com/v1";

/// Notion API version sent with every request.
pub const API_VERSION: &str = "2022-02-22";

#[derive(Debug, Error)]
pub enum NotionError {
    #[error("Notion API error: {0}")]
    Http(#[from] HttpError),

    #[error("Notion API key is not configured")]
    MissingApiKey,
}

/// Operations the publisher needs from the destination database.
#[async_trait]
pub trait Destination: Send + Sync {
    /// Create a page in a database.
    async fn create_page(&self, page: &CreatePage) -> Result<PageRef, NotionError>;

    /// Update (or archive) an existing page.
    async fn update_page(&self, page: &UpdatePage) -> Result<PageRef, NotionError>;

    /// Retrieve the columns of a database.
    async fn retrieve_schema(&self, database_id: &str) -> Result<DatabaseSchema, NotionError>;

    /// Fetch one page of query results.
    async fn query_database(
        &self,
        database_id: &str,
        query: &QueryRequest,
    ) -> Result<QueryResponse, NotionError>;
}

/// Stream every row of a database, following `next_cursor` until it is absent.
///
/// Pages are requested lazily as the stream is polled. The first failed
/// request ends the stream with that error.
pub fn query_pages<'a>(
    destination: &'a dyn Destination,
    database_id: &'a str,
    mut query: QueryRequest,
) -> BoxStream<'a, Result<PageObject, NotionError>> {
    Box::pin(stream! {
        loop {
            let response = match destination.query_database(database_id, &query).await {
                Ok(response) => response,
                Err(e) => {
                    yield Err(e);
                    break;
                }
            };
            debug!(
                "Query page for {}: {} results, more: {}",
                database_id,
                response.results.len(),
                response.next_cursor.is_some()
            );
            for page in response.results {
                yield Ok(page);
            }
            match response.next_cursor {
                Some(cursor) => query.start_cursor = Some(cursor),
                None => break,
            }
        }
    })
}

/// Notion REST client.
#[derive(Clone)]
pub struct NotionClient {
    api: ApiClient,
}

impl NotionClient {
    /// Create a client for the public Notion API.
    pub fn new(api_key: &str, timeout: Duration) -> Result<Self, NotionError> {
        Self::with_base_url(DEFAULT_BASE_URL, api_key, API_VERSION, timeout)
    }

    /// Create a client for a custom endpoint and API version.
    pub fn with_base_url(
        base_url: &str,
        api_key: &str,
        api_version: &str,
        timeout: Duration,
    ) -> Result<Self, NotionError> {
        if api_key.is_empty() {
            return Err(NotionError::MissingApiKey);
        }
        let api =
            ApiClient::new(base_url, api_key, timeout)?.with_header("Notion-Version", api_version);
        Ok(Self { api })
    }
}

#[async_trait]
impl Destination for NotionClient {
    async fn create_page(&self, page: &CreatePage) -> Result<PageRef, NotionError> {
        debug!("Creating page in database {}", page.parent.database_id);
        Ok(self.api.post_json("pages", &[], page).await?)
    }

    async fn update_page(&self, page: &UpdatePage) -> Result<PageRef, NotionError> {
        debug!("Updating page {}", page.page_id);
        let path = format!("pages/{}", page.page_id);
        Ok(self.api.patch_json(&path, page).await?)
    }

    async fn retrieve_schema(&self, database_id: &str) -> Result<DatabaseSchema, NotionError> {
        let path = format!("databases/{}", database_id);
        Ok(self.api.get_json(&path, &[]).await?)
    }

    async fn query_database(
        &self,
        database_id: &str,
        query: &QueryRequest,
    ) -> Result<QueryResponse, NotionError> {
        let path = format!("databases/{}/query", database_id);
        Ok(self.api.post_json(&path, &[], query).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::TryStreamExt;
    use serde_json::json;
    use std::collections::BTreeMap;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> NotionClient {
        NotionClient::with_base_url(
            &server.uri(),
            "test-api-key",
            API_VERSION,
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[test]
    fn empty_api_key_is_rejected() {
        assert!(matches!(
            NotionClient::new("", Duration::from_secs(5)),
            Err(NotionError::MissingApiKey)
        ));
    }

    #[tokio::test]
    async fn create_page_posts_payload_with_headers() {
        let server = MockServer::start().await;
        let page = CreatePage {
            parent: Parent {
                database_id: "db-1".into(),
            },
            properties: BTreeMap::from([("title".to_string(), PropertyValue::title("scan"))]),
            children: vec![Block::paragraph("text")],
            cover: None,
        };
        Mock::given(method("POST"))
            .and(path("/pages"))
            .and(header("Authorization", "Bearer test-api-key"))
            .and(header("Notion-Version", "2022-02-22"))
            .and(body_json(serde_json::to_value(&page).unwrap()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "object": "page",
                "id": "page-1",
                "url": "https://www.notion.so/page-1"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let created = client(&server).create_page(&page).await.unwrap();
        assert_eq!(created.id, "page-1");
    }

    #[tokio::test]
    async fn create_page_failure_carries_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/pages"))
            .respond_with(
                ResponseTemplate::new(400).set_body_string(r#"{"code":"validation_error"}"#),
            )
            .mount(&server)
            .await;

        let page = CreatePage {
            parent: Parent {
                database_id: "db-1".into(),
            },
            properties: BTreeMap::new(),
            children: Vec::new(),
            cover: None,
        };
        let err = client(&server).create_page(&page).await.unwrap_err();
        assert!(err.to_string().contains("validation_error"));
    }

    #[tokio::test]
    async fn update_page_patches_by_id() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/pages/page-9"))
            .and(body_json(json!({"archived": true})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "page-9"})))
            .expect(1)
            .mount(&server)
            .await;

        let updated = client(&server)
            .update_page(&UpdatePage::archive("page-9"))
            .await
            .unwrap();
        assert_eq!(updated.id, "page-9");
    }

    #[tokio::test]
    async fn retrieve_schema_reads_properties() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/databases/db-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "object": "database",
                "id": "db-1",
                "properties": {
                    "Name": {"id": "title", "type": "title", "title": {}},
                    "tags": {"id": "x", "type": "multi_select", "multi_select": {"options": []}}
                }
            })))
            .mount(&server)
            .await;

        let schema = client(&server).retrieve_schema("db-1").await.unwrap();
        assert!(schema.has("Name", PropertyKind::Title));
        assert!(schema.has("tags", PropertyKind::MultiSelect));
    }

    #[tokio::test]
    async fn query_pages_follows_cursor() {
        let server = MockServer::start().await;
        let sorts = json!([{"property": "entryUpdated", "direction": "descending"}]);
        Mock::given(method("POST"))
            .and(path("/databases/db-1/query"))
            .and(body_json(json!({"sorts": sorts})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": [{"id": "p1", "properties": {}}, {"id": "p2", "properties": {}}],
                "next_cursor": "c1",
                "has_more": true
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/databases/db-1/query"))
            .and(body_json(json!({"sorts": sorts, "start_cursor": "c1"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": [{"id": "p3", "properties": {}}],
                "next_cursor": null,
                "has_more": false
            })))
            .expect(1)
            .mount(&server)
            .await;

        let notion = client(&server);
        let query = QueryRequest::sorted_by("entryUpdated", SortDirection::Descending);
        let pages: Vec<PageObject> = query_pages(&notion, "db-1", query)
            .try_collect()
            .await
            .unwrap();
        let ids: Vec<&str> = pages.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["p1", "p2", "p3"]);
    }
}
