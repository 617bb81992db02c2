//! Generic HTTP endpoint sink.
//!
//! [`EndpointSink`] POSTs the export payload as-is to a configured URL.
//! Any status below 400 counts as accepted. There is no retry: a failed
//! export is re-triggered by the user.

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;

use framemark_core::{RemoteSink, SinkError, SinkReceipt};

use crate::config::EndpointConfig;

/// Sink name reported in receipts and logs.
pub const ENDPOINT_SINK_NAME: &str = "endpoint";

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum EndpointError {
    /// The underlying HTTP request failed (network, DNS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The remote server returned a 4xx/5xx status code.
    #[error("Endpoint returned HTTP {0}")]
    HttpStatus(u16),
}

impl From<EndpointError> for SinkError {
    fn from(err: EndpointError) -> Self {
        match err {
            EndpointError::Request(e) => SinkError::Transport(e.to_string()),
            EndpointError::HttpStatus(code) => SinkError::HttpStatus(code),
        }
    }
}

// ---------------------------------------------------------------------------
// EndpointSink
// ---------------------------------------------------------------------------

pub struct EndpointSink {
    client: reqwest::Client,
    url: String,
}

impl EndpointSink {
    /// Build a sink with a client bounded by the configured timeout.
    pub fn new(config: &EndpointConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;
        Ok(Self {
            client,
            url: config.url.clone(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Execute a single POST request and check the response status.
    async fn post(&self, bytes: Vec<u8>, content_type: &str) -> Result<(), EndpointError> {
        let response = self
            .client
            .post(&self.url)
            .header(CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await?;

        let status = response.status();
        if status.is_client_error() || status.is_server_error() {
            return Err(EndpointError::HttpStatus(status.as_u16()));
        }
        Ok(())
    }
}

#[async_trait]
impl RemoteSink for EndpointSink {
    fn name(&self) -> &str {
        ENDPOINT_SINK_NAME
    }

    async fn send(
        &self,
        bytes: Vec<u8>,
        content_type: &str,
        _desired_name: &str,
    ) -> Result<SinkReceipt, SinkError> {
        let size = bytes.len();
        tracing::debug!(url = %self.url, bytes = size, "Posting annotations");

        self.post(bytes, content_type).await.map_err(|e| {
            tracing::debug!(url = %self.url, error = %e, "Endpoint upload failed");
            SinkError::from(e)
        })?;

        Ok(SinkReceipt {
            sink: ENDPOINT_SINK_NAME.to_string(),
            location: self.url.clone(),
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
