//! HTTP transport for the news service.
//!
//! One thin client wraps `reqwest`: every endpoint speaks JSON over GET, so
//! the whole surface is [`ApiClient::fetch_json`]. Bodies are read as a
//! size-capped stream and failures are classified into [`TransportError`]
//! variants so callers can decide which ones are silent.

use futures::StreamExt;
use serde_json::Value;
use std::time::Duration;

/// Hard ceiling on a response body. The service returns short JSON lists;
/// anything past this is a misbehaving endpoint, not news.
const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Per-request deadline, covering connect through body read.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Errors from talking to the news service.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The request did not complete within the deadline.
    #[error("request timed out")]
    Timeout,

    /// Connection-level failure (DNS, refused, TLS, reset mid-body).
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("service returned HTTP {0}")]
    HttpStatus(u16),

    /// The body exceeded the size cap.
    #[error("response too large (over {0} bytes)")]
    ResponseTooLarge(usize),

    /// The body was not valid JSON.
    #[error("malformed response body: {0}")]
    MalformedBody(#[from] serde_json::Error),

    /// The body was valid JSON of the wrong shape.
    #[error("malformed response: {0}")]
    MalformedResponse(&'static str),
}

/// Client for the news service API.
///
/// Cheap to clone via `Arc`; holds a shared `reqwest::Client` and the
/// normalized base URL (always ending in `/api`).
#[derive(Debug)]
pub struct ApiClient {
    http: reqwest::Client,
    base: String,
}

impl ApiClient {
    pub fn new(http: reqwest::Client, base_url: &str) -> Self {
        Self {
            http,
            base: normalize_api_base(base_url),
        }
    }

    /// Normalized base URL, ending in `/api`.
    pub fn base(&self) -> &str {
        &self.base
    }

    /// GET `{base}{path}` with the given query pairs and parse the body as
    /// JSON. `path` must start with `/`.
    pub async fn fetch_json(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<Value, TransportError> {
        let url = format!("{}{}", self.base, path);
        tracing::debug!(%url, "Requesting");

        let mut request = self.http.get(&url);
        if !query.is_empty() {
            request = request.query(query);
        }

        let response = tokio::time::timeout(REQUEST_TIMEOUT, request.send())
            .await
            .map_err(|_| TransportError::Timeout)??;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::HttpStatus(status.as_u16()));
        }

        let body = tokio::time::timeout(REQUEST_TIMEOUT, read_limited_bytes(response))
            .await
            .map_err(|_| TransportError::Timeout)??;

        Ok(serde_json::from_slice(&body)?)
    }
}

/// Read a response body as a stream, bailing out once it exceeds the cap.
async fn read_limited_bytes(response: reqwest::Response) -> Result<Vec<u8>, TransportError> {
    // Content-Length lets oversized bodies be rejected before any read
    if let Some(len) = response.content_length() {
        if len as usize > MAX_BODY_BYTES {
            return Err(TransportError::ResponseTooLarge(MAX_BODY_BYTES));
        }
    }

    let mut body = Vec::new();
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        if body.len().saturating_add(chunk.len()) > MAX_BODY_BYTES {
            return Err(TransportError::ResponseTooLarge(MAX_BODY_BYTES));
        }
        body.extend_from_slice(&chunk);
    }
    Ok(body)
}

/// Ensure the base URL targets the service's `/api` prefix exactly once.
///
/// Accepts `http://host:8000`, `http://host:8000/`, and `http://host:8000/api`
/// interchangeably.
pub fn normalize_api_base(base_url: &str) -> String {
    let trimmed = base_url.trim_end_matches('/');
    if trimmed.ends_with("/api") {
        trimmed.to_string()
    } else {
        format!("{}/api", trimmed)
    }
}
