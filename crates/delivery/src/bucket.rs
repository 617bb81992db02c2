//! Object-storage sink backed by S3 (or an S3-compatible service).
//!
//! Every export lands under a fresh key `<stem>-<unix-epoch-millis>.<ext>`.
//! The upload carries `If-None-Match: *`, so an existing object is never
//! replaced; the store answers such a collision with a precondition error,
//! which is reported as [`SinkError::Conflict`].

use async_trait::async_trait;
use aws_credential_types::Credentials;
use aws_sdk_s3::config::Region;
use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata};
use aws_sdk_s3::primitives::ByteStream;
use chrono::Utc;

use framemark_core::{RemoteSink, SinkError, SinkReceipt};

use crate::config::BucketConfig;

/// Sink name reported in receipts and logs.
pub const BUCKET_SINK_NAME: &str = "s3";

/// Provider name attached to static credentials from the environment.
const CREDENTIALS_PROVIDER: &str = "framemark-env";

/// Error codes S3 uses when a conditional write hits an existing object.
const CONFLICT_CODES: &[&str] = &["PreconditionFailed", "ConditionalRequestConflict"];

pub struct BucketSink {
    client: aws_sdk_s3::Client,
    bucket: String,
}

impl BucketSink {
    pub fn new(client: aws_sdk_s3::Client, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
        }
    }

    /// Build an S3 client from the shared AWS environment plus `config`.
    ///
    /// Static credentials, when configured, override the default provider
    /// chain. A custom endpoint switches to path-style addressing.
    pub async fn from_config(config: &BucketConfig) -> Self {
        let shared = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .load()
            .await;

        let mut builder = aws_sdk_s3::config::Builder::from(&shared);
        if let Some(endpoint) = &config.endpoint_url {
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }
        if let Some(creds) = &config.credentials {
            builder = builder.credentials_provider(Credentials::new(
                creds.access_key_id.clone(),
                creds.secret_access_key.clone(),
                None,
                None,
                CREDENTIALS_PROVIDER,
            ));
        }

        Self::new(aws_sdk_s3::Client::from_conf(builder.build()), &config.bucket)
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }
}

/// Derive a unique object key from a file name and a millisecond timestamp.
///
/// `annotations.json` at `1700000000000` becomes
/// `annotations-1700000000000.json`.
pub fn object_key(desired_name: &str, epoch_millis: i64) -> String {
    match desired_name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => format!("{stem}-{epoch_millis}.{ext}"),
        _ => format!("{desired_name}-{epoch_millis}"),
    }
}

/// Map an S3 error code (plus rendered detail) to a sink error.
fn classify_upload_error(code: Option<&str>, key: &str, detail: String) -> SinkError {
    match code {
        Some(code) if CONFLICT_CODES.contains(&code) => SinkError::Conflict(key.to_string()),
        _ => SinkError::Upload(detail),
    }
}

#[async_trait]
impl RemoteSink for BucketSink {
    fn name(&self) -> &str {
        BUCKET_SINK_NAME
    }

    async fn send(
        &self,
        bytes: Vec<u8>,
        content_type: &str,
        desired_name: &str,
    ) -> Result<SinkReceipt, SinkError> {
        let key = object_key(desired_name, Utc::now().timestamp_millis());
        tracing::debug!(bucket = %self.bucket, key = %key, bytes = bytes.len(), "Uploading annotations");

        let result = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .content_type(content_type)
            .if_none_match("*")
            .body(ByteStream::from(bytes))
            .send()
            .await;

        match result {
            Ok(_) => Ok(SinkReceipt {
                sink: BUCKET_SINK_NAME.to_string(),
                location: format!("s3://{}/{key}", self.bucket),
            }),
            Err(err) => {
                let detail = DisplayErrorContext(&err).to_string();
                let code = err.as_service_error().and_then(|e| e.code());
                tracing::debug!(bucket = %self.bucket, key = %key, error = %detail, "Bucket upload failed");
                Err(classify_upload_error(code, &key, detail))
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
