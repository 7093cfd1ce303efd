//! HTTP transport and credential seams for the remote resolver
//!
//! The resolver talks to providers through [`DatasetTransport`] and obtains
//! credentials through [`TokenProvider`], so both can be replaced in tests.

use async_trait::async_trait;
use reqwest::{header, Client};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// User-Agent header sent with every request
const USER_AGENT: &str = concat!("student-attendance/", env!("CARGO_PKG_VERSION"));

/// Transport-level failure (connection refused, DNS, reset, ...)
#[derive(Debug, Clone, Error)]
#[error("Network error: {0}")]
pub struct TransportError(pub String);

/// A single GET against a provider
#[derive(Clone)]
pub struct ResourceRequest {
    pub url: String,
    /// Value of the `Accept` header
    pub accept: &'static str,
    /// Full `Authorization` header value, if a credential is configured
    pub authorization: Option<String>,
}

// The authorization header never appears in Debug output.
impl fmt::Debug for ResourceRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceRequest")
            .field("url", &self.url)
            .field("accept", &self.accept)
            .field("authorization", &self.authorization.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Status and body of a completed request
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

impl TransportResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Performs provider requests
#[async_trait]
pub trait DatasetTransport: Send + Sync {
    async fn get(&self, request: &ResourceRequest) -> Result<TransportResponse, TransportError>;
}

/// Supplies the opaque access token attached to provider requests
pub trait TokenProvider: Send + Sync {
    /// Token value, or `None` to send unauthenticated requests
    fn token(&self) -> Option<String>;
}

/// Token assembled from configured prefix and suffix fragments
#[derive(Clone, Default)]
pub struct StaticToken {
    value: Option<String>,
}

impl StaticToken {
    pub fn new(value: impl Into<String>) -> Self {
        let value = value.into();
        Self {
            value: (!value.trim().is_empty()).then_some(value),
        }
    }

    /// Join the two configuration fragments; blank result means no token
    pub fn from_fragments(prefix: Option<&str>, suffix: Option<&str>) -> Self {
        Self::new(format!(
            "{}{}",
            prefix.unwrap_or_default().trim(),
            suffix.unwrap_or_default().trim()
        ))
    }

    pub fn none() -> Self {
        Self { value: None }
    }
}

impl fmt::Debug for StaticToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticToken")
            .field("configured", &self.value.is_some())
            .finish()
    }
}

impl TokenProvider for StaticToken {
    fn token(&self) -> Option<String> {
        self.value.clone()
    }
}

/// reqwest-backed transport
pub struct HttpTransport {
    http_client: Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let http_client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError(e.to_string()))?;

        Ok(Self { http_client })
    }
}

#[async_trait]
impl DatasetTransport for HttpTransport {
    async fn get(&self, request: &ResourceRequest) -> Result<TransportResponse, TransportError> {
        let mut builder = self
            .http_client
            .get(&request.url)
            .header(header::ACCEPT, request.accept);

        if let Some(authorization) = &request.authorization {
            builder = builder.header(header::AUTHORIZATION, authorization);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| TransportError(e.without_url().to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| TransportError(e.without_url().to_string()))?;

        Ok(TransportResponse { status, body })
    }
}
