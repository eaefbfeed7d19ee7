//! Remote policy source: a JSON array of banned URL-or-host strings.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

/// Why a policy fetch produced no usable list. Every variant leaves the
/// store's current list in place.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("policy request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("policy endpoint returned HTTP {0}")]
    Status(u16),

    #[error("policy payload is not valid JSON: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("policy payload is not a JSON array")]
    NotAnArray,
}

/// Anything that can produce the current banned-entry list.
#[async_trait]
pub trait PolicySource: Send + Sync {
    async fn fetch(&self) -> Result<Vec<String>, FetchError>;
}

/// Extract the entry list from a decoded payload.
/// Returns `None` unless the payload is an array; non-string elements are dropped.
pub fn parse_entries(value: Value) -> Option<Vec<String>> {
    match value {
        Value::Array(items) => Some(
            items
                .into_iter()
                .filter_map(|item| match item {
                    Value::String(s) => Some(s),
                    _ => None,
                })
                .collect(),
        ),
        _ => None,
    }
}

/// Decode a raw payload string (remote body or cached blob).
pub fn decode_entries(body: &str) -> Result<Vec<String>, FetchError> {
    let value: Value = serde_json::from_str(body)?;
    parse_entries(value).ok_or(FetchError::NotAnArray)
}

/// HTTP GET against a fixed endpoint.
pub struct HttpPolicySource {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpPolicySource {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl PolicySource for HttpPolicySource {
    async fn fetch(&self) -> Result<Vec<String>, FetchError> {
        let response = self.client.get(&self.endpoint).send().await?;
        if response.status() != StatusCode::OK {
            return Err(FetchError::Status(response.status().as_u16()));
        }
        let body = response.text().await?;
        decode_entries(&body)
    }
}
