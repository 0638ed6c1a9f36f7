//! # gridbook-http
//!
//! HTTP client for pulling rows from external APIs.
//!
//! Fetches JSON and flattens it into flat field/value records that the
//! integration executor merges into a worksheet.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// One flat field/value record produced by a fetch.
pub type Record = serde_json::Map<String, JsonValue>;

/// Errors from fetching or decoding an API response.
#[derive(Debug, Error)]
pub enum HttpError {
    #[error("Request failed: {0}")]
    Request(String),

    #[error("HTTP {status} - {reason}")]
    Status { status: u16, reason: String },

    #[error("Failed to parse JSON: {0}")]
    Decode(String),

    #[error("Unsupported response shape: expected an object or array of objects, got {0}")]
    Shape(&'static str),
}

/// HTTP methods supported by integrations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    #[default]
    Get,
    Post,
}

/// A fully described fetch: endpoint, method, headers and optional body.
#[derive(Debug, Clone, Default)]
pub struct ApiRequest {
    pub url: String,
    pub method: HttpMethod,
    pub headers: HashMap<String, String>,
    pub body: Option<String>,
    pub timeout_secs: Option<u64>,
}

/// Source of field/value rows for the integration executor.
///
/// Implementations decode a response into flat records, preserving
/// response order.
#[async_trait]
pub trait RowFetcher {
    async fn fetch_rows(&self, request: &ApiRequest) -> Result<Vec<Record>, HttpError>;
}

/// reqwest-backed fetcher with a 30-second default timeout.
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Construct a fetcher with the default timeout.
    pub fn new() -> Result<Self, HttpError> {
        Self::with_timeout(30)
    }

    /// Construct a fetcher with a custom per-request timeout in seconds.
    pub fn with_timeout(timeout_secs: u64) -> Result<Self, HttpError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .no_proxy()
            .build()
            .map_err(|e| HttpError::Request(e.to_string()))?;

        Ok(Self { client })
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new().expect("Failed to create HTTP client")
    }
}

#[async_trait]
impl RowFetcher for HttpFetcher {
    async fn fetch_rows(&self, request: &ApiRequest) -> Result<Vec<Record>, HttpError> {
        let mut builder = match request.method {
            HttpMethod::Get => self.client.get(&request.url),
            HttpMethod::Post => self.client.post(&request.url),
        };

        for (key, value) in &request.headers {
            builder = builder.header(key, value);
        }

        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        if let Some(timeout) = request.timeout_secs {
            builder = builder.timeout(Duration::from_secs(timeout));
        }

        debug!(url = %request.url, "fetching rows");

        let response = builder
            .send()
            .await
            .map_err(|e| HttpError::Request(e.to_string()))?;

        if !response.status().is_success() {
            return Err(HttpError::Status {
                status: response.status().as_u16(),
                reason: response
                    .status()
                    .canonical_reason()
                    .unwrap_or("Unknown")
                    .to_string(),
            });
        }

        let json: JsonValue = response
            .json()
            .await
            .map_err(|e| HttpError::Decode(e.to_string()))?;

        records_from_json(json)
    }
}

/// Flatten a decoded response: an array of objects becomes one record
/// per element, a single object becomes one record.
pub fn records_from_json(json: JsonValue) -> Result<Vec<Record>, HttpError> {
    match json {
        JsonValue::Array(items) => items
            .into_iter()
            .map(|item| match item {
                JsonValue::Object(record) => Ok(record),
                other => Err(HttpError::Shape(json_kind(&other))),
            })
            .collect(),
        JsonValue::Object(record) => Ok(vec![record]),
        other => Err(HttpError::Shape(json_kind(&other))),
    }
}

fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "a boolean",
        JsonValue::Number(_) => "a number",
        JsonValue::String(_) => "a string",
        JsonValue::Array(_) => "an array",
        JsonValue::Object(_) => "an object",
    }
}
