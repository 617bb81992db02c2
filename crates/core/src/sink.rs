//! Remote sink contract.
//!
//! The export pipeline only ever sees this trait. Concrete sinks (HTTP
//! endpoint, object-storage bucket) live in `framemark-delivery` and are
//! chosen once at construction time.

use async_trait::async_trait;

/// Where a successfully synced payload ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinkReceipt {
    /// Name of the sink that accepted the payload (e.g. `"endpoint"`).
    pub sink: String,
    /// Endpoint URL or object URI of the stored copy.
    pub location: String,
}

/// Reason a remote sync failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SinkError {
    /// Network, DNS, TLS or timeout failure before a response arrived.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The remote answered with a 4xx/5xx status.
    #[error("Remote returned HTTP {0}")]
    HttpStatus(u16),

    /// The destination object already exists and overwriting is forbidden.
    #[error("Object already exists: {0}")]
    Conflict(String),

    /// Object-storage upload rejected for any other reason.
    #[error("Upload failed: {0}")]
    Upload(String),
}

/// Accepts a serialized payload and reports success or failure.
#[async_trait]
pub trait RemoteSink: Send + Sync {
    /// Short identifier used in logs and receipts.
    fn name(&self) -> &str;

    /// Deliver `bytes` to the remote side.
    ///
    /// `desired_name` is a hint; sinks that need unique names derive their
    /// own from it. Implementations must not retry on their own.
    async fn send(
        &self,
        bytes: Vec<u8>,
        content_type: &str,
        desired_name: &str,
    ) -> Result<SinkReceipt, SinkError>;
}
