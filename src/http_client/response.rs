//! HTTP response wrapper.

use reqwest::Response;
use serde::de::DeserializeOwned;

use super::HttpError;

/// Successful (non 4xx/5xx) HTTP response.
pub struct HttpResponse {
    response: Response,
}

impl HttpResponse {
    pub(crate) fn new(response: Response) -> Self {
        Self { response }
    }

    /// Get response body as text.
    pub async fn text(self) -> Result<String, HttpError> {
        Ok(self.response.text().await?)
    }

    /// Parse the response body as JSON.
    ///
    /// The raw body is kept in the error so API changes can be diagnosed.
    pub async fn json<T: DeserializeOwned>(self) -> Result<T, HttpError> {
        let body = self.response.text().await?;
        serde_json::from_str(&body).map_err(|e| HttpError::Parse {
            message: e.to_string(),
            body,
        })
    }
}
