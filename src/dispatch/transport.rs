//! Network transport abstraction
//!
//! The dispatcher only knows [`Transport`]; production runs use
//! [`HttpTransport`], tests plug in scripted transports.

use super::request::{Endpoint, FormPayload, TransportResponse};
use crate::config::RunConfig;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE, COOKIE, ORIGIN, USER_AGENT};
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Transport-level failure: the request got no HTTP response
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("{0}")]
    Other(String),
}

/// Issues one state-changing form submission per call
///
/// Implementations are shared by every worker and must be safe for concurrent
/// use without external locking.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn submit(
        &self,
        endpoint: &Endpoint,
        payload: &FormPayload,
    ) -> Result<TransportResponse, TransportError>;
}

const DEFAULT_USER_AGENT: &str = concat!("sheetsync/", env!("CARGO_PKG_VERSION"));

/// Shared `reqwest` client authenticated with the configured cookie
pub struct HttpTransport {
    client: Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(base_url: impl Into<String>, auth_cookie: &str, timeout: Duration) -> crate::Result<Self> {
        let base_url = base_url.into();

        let mut headers = HeaderMap::new();
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("application/x-www-form-urlencoded"),
        );
        headers.insert(USER_AGENT, HeaderValue::from_static(DEFAULT_USER_AGENT));
        let mut cookie = HeaderValue::from_str(auth_cookie)
            .map_err(|e| crate::Error::Config(format!("AUTH_COOKIE is not a valid header value: {e}")))?;
        cookie.set_sensitive(true);
        headers.insert(COOKIE, cookie);
        if let Ok(origin) = HeaderValue::from_str(base_url.trim_end_matches('/')) {
            headers.insert(ORIGIN, origin);
        }

        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self { client, base_url })
    }

    pub fn from_config(config: &RunConfig, timeout: Duration) -> crate::Result<Self> {
        Self::new(config.base_url(), config.auth_cookie(), timeout)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn submit(
        &self,
        endpoint: &Endpoint,
        payload: &FormPayload,
    ) -> Result<TransportResponse, TransportError> {
        let url = endpoint.url(&self.base_url);
        debug!("POST {} ({} fields)", url, payload.len());

        let response = self
            .client
            .post(&url)
            .body(payload.encode())
            .send()
            .await
            .map_err(classify_error)?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(classify_error)?;
        Ok(TransportResponse { status, body })
    }
}

fn classify_error(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Other(format!("request timed out: {err}"))
    } else if err.is_connect() {
        TransportError::Connect(err.to_string())
    } else {
        TransportError::Other(err.to_string())
    }
}
