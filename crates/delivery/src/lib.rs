//! Remote sink realizations for framemark exports.
//!
//! - [`EndpointSink`]: HTTP POST of the raw JSON body to a fixed URL.
//! - [`BucketSink`]: S3 `PutObject` under a timestamped key, never
//!   overwriting an existing object.
//!
//! [`build_sink`] picks one of them from a [`SinkConfig`] once, at startup.

use std::sync::Arc;

use framemark_core::RemoteSink;

pub mod bucket;
pub mod config;
pub mod endpoint;

pub use bucket::BucketSink;
pub use config::{BucketConfig, ConfigError, EndpointConfig, SinkConfig, StaticCredentials};
pub use endpoint::EndpointSink;

/// Errors raised while constructing a sink.
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// Construct the sink selected by `config`.
pub async fn build_sink(config: &SinkConfig) -> Result<Arc<dyn RemoteSink>, DeliveryError> {
    match config {
        SinkConfig::Endpoint(endpoint) => {
            tracing::info!(url = %endpoint.url, "Using endpoint sink");
            Ok(Arc::new(EndpointSink::new(endpoint)?))
        }
        SinkConfig::Bucket(bucket) => {
            tracing::info!(bucket = %bucket.bucket, region = %bucket.region, "Using bucket sink");
            Ok(Arc::new(BucketSink::from_config(bucket).await))
        }
    }
}
