//! JSON API client with bearer auth and rate-limit retries.
//!
//! Shared by the Notion and Google Drive clients. Every 4xx/5xx response is
//! turned into [`HttpError::Status`] carrying the response body. HTTP 429 is
//! the only status that is retried.

mod response;
mod retry;

pub use response::HttpResponse;
pub use retry::{backoff_delay, parse_retry_after, MAX_RETRIES};

use std::time::Duration;

use reqwest::header::RETRY_AFTER;
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Default base delay for exponential backoff.
const DEFAULT_RETRY_BASE_MS: u64 = 1000;

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Failed to parse response: {message}")]
    Parse { message: String, body: String },
}

impl HttpError {
    /// HTTP status code, if the server answered with an error status.
    pub fn status(&self) -> Option<u16> {
        match self {
            HttpError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Client for a single JSON API rooted at `base_url`.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    token: String,
    headers: Vec<(String, String)>,
    retry_base_ms: u64,
}

impl ApiClient {
    /// Create a client that authenticates with `Authorization: Bearer <token>`.
    pub fn new(
        base_url: impl Into<String>,
        token: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, HttpError> {
        let client = Client::builder()
            .user_agent(concat!("ocr2notion/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .gzip(true)
            .brotli(true)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
            headers: Vec::new(),
            retry_base_ms: DEFAULT_RETRY_BASE_MS,
        })
    }

    /// Add a header sent with every request.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Set the base delay used for exponential backoff on 429 responses.
    pub fn with_retry_base(mut self, base: Duration) -> Self {
        self.retry_base_ms = base.as_millis() as u64;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build an absolute URL for an API path.
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let mut request = self
            .client
            .request(method, self.url(path))
            .bearer_auth(&self.token);
        for (name, value) in &self.headers {
            request = request.header(name.as_str(), value.as_str());
        }
        request
    }

    /// Send a request, retrying on 429 with `Retry-After` or exponential backoff.
    async fn execute<F>(&self, make_request: F) -> Result<HttpResponse, HttpError>
    where
        F: Fn() -> RequestBuilder,
    {
        let mut attempt = 0;
        loop {
            let response = make_request().send().await?;
            let status = response.status();

            if status == StatusCode::TOO_MANY_REQUESTS && attempt < MAX_RETRIES {
                let retry_after = response
                    .headers()
                    .get(RETRY_AFTER)
                    .and_then(|v| v.to_str().ok());
                let wait = parse_retry_after(retry_after)
                    .unwrap_or_else(|| backoff_delay(attempt, self.retry_base_ms));
                warn!(
                    "{} rate limited (attempt {}), waiting {:?}",
                    response.url(),
                    attempt + 1,
                    wait
                );
                tokio::time::sleep(wait).await;
                attempt += 1;
                continue;
            }

            if status.is_client_error() || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                debug!("HTTP {} error body: {}", status.as_u16(), body);
                return Err(HttpError::Status {
                    status: status.as_u16(),
                    body,
                });
            }

            return Ok(HttpResponse::new(response));
        }
    }

    /// GET a JSON resource.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, HttpError> {
        self.execute(|| self.request(Method::GET, path).query(query))
            .await?
            .json()
            .await
    }

    /// GET a resource as text.
    pub async fn get_text(&self, path: &str, query: &[(&str, &str)]) -> Result<String, HttpError> {
        self.execute(|| self.request(Method::GET, path).query(query))
            .await?
            .text()
            .await
    }

    /// POST a JSON body and parse the JSON response.
    pub async fn post_json<B, T>(
        &self,
        path: &str,
        query: &[(&str, &str)],
        body: &B,
    ) -> Result<T, HttpError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.execute(|| self.request(Method::POST, path).query(query).json(body))
            .await?
            .json()
            .await
    }

    /// PATCH a JSON body and parse the JSON response.
    pub async fn patch_json<B, T>(&self, path: &str, body: &B) -> Result<T, HttpError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.execute(|| self.request(Method::PATCH, path).json(body))
            .await?
            .json()
            .await
    }

    /// DELETE a resource, discarding the response body.
    pub async fn delete(&self, path: &str) -> Result<(), HttpError> {
        self.execute(|| self.request(Method::DELETE, path)).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> ApiClient {
        ApiClient::new(server.uri(), "secret", DEFAULT_TIMEOUT)
            .unwrap()
            .with_header("X-Api-Version", "7")
            .with_retry_base(Duration::from_millis(1))
    }

    #[test]
    fn url_joins_base_and_path() {
        let client = ApiClient::new("https://api.example.com/v1/", "t", DEFAULT_TIMEOUT).unwrap();
        assert_eq!(client.base_url(), "https://api.example.com/v1");
        assert_eq!(client.url("/pages"), "https://api.example.com/v1/pages");
        assert_eq!(client.url("pages"), "https://api.example.com/v1/pages");
    }

    #[tokio::test]
    async fn sends_auth_and_default_headers() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/items"))
            .and(query_param("mode", "fast"))
            .and(header("Authorization", "Bearer secret"))
            .and(header("X-Api-Version", "7"))
            .and(body_json(serde_json::json!({"name": "a"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": "1"})))
            .expect(1)
            .mount(&server)
            .await;

        let value: serde_json::Value = client(&server)
            .post_json("items", &[("mode", "fast")], &serde_json::json!({"name": "a"}))
            .await
            .unwrap();
        assert_eq!(value["id"], "1");
    }

    #[tokio::test]
    async fn error_status_carries_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(
                ResponseTemplate::new(404).set_body_string("{\"code\":\"object_not_found\"}"),
            )
            .mount(&server)
            .await;

        let err = client(&server)
            .get_json::<serde_json::Value>("missing", &[])
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(404));
        assert!(err.to_string().contains("object_not_found"));
    }

    #[tokio::test]
    async fn server_error_is_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/items/1"))
            .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
            .expect(1)
            .mount(&server)
            .await;

        let err = client(&server).delete("items/1").await.unwrap_err();
        assert_eq!(err.status(), Some(502));
    }

    #[tokio::test]
    async fn rate_limit_is_retried_until_exhausted() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/busy"))
            .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
            .expect(u64::from(MAX_RETRIES) + 1)
            .mount(&server)
            .await;

        let err = client(&server).get_text("busy", &[]).await.unwrap_err();
        assert_eq!(err.status(), Some(429));
        assert!(err.to_string().contains("slow down"));
    }

    #[tokio::test]
    async fn invalid_json_keeps_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/html"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let err = client(&server)
            .get_json::<serde_json::Value>("html", &[])
            .await
            .unwrap_err();
        match err {
            HttpError::Parse { body, .. } => assert_eq!(body, "<html>"),
            other => panic!("unexpected error: {other}"),
        }
    }
}
