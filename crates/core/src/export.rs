//! Dual-sink export: local artifact first, remote sync second.
//!
//! [`ExportPipeline::export`] serializes the store, hands the artifact to the
//! [`LocalEmitter`] synchronously, then awaits the [`RemoteSink`]. The two
//! outcomes are independent: a remote failure never withdraws the local
//! artifact and never touches the store. There is no retry and no
//! serialization of overlapping exports; each call races on its own.

use std::sync::Arc;

use crate::annotation::AnnotationStore;
use crate::error::CoreError;
use crate::sink::{RemoteSink, SinkError, SinkReceipt};

/// File name used for the local artifact and as the remote name hint.
pub const EXPORT_FILE_NAME: &str = "annotations.json";

/// Content type of every export payload.
pub const EXPORT_CONTENT_TYPE: &str = "application/json";

// ---------------------------------------------------------------------------
// Local emission
// ---------------------------------------------------------------------------

/// The serialized annotation set, ready to be written on the user's device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalArtifact {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Produces the local copy of an export.
///
/// Emission is infallible at this level; implementations that can fail
/// (e.g. disk writes) report the failure through logging.
pub trait LocalEmitter: Send + Sync {
    fn emit(&self, artifact: &LocalArtifact);
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteOutcome {
    Synced(SinkReceipt),
    Failed(SinkError),
}

/// Aggregated result of one export.
#[derive(Debug, Clone)]
pub struct ExportReport {
    /// Always present: the local step cannot fail at the core level.
    pub artifact: LocalArtifact,
    pub entry_count: usize,
    pub remote: RemoteOutcome,
}

impl ExportReport {
    /// `true` when the remote copy was confirmed as well.
    pub fn is_fully_synced(&self) -> bool {
        matches!(self.remote, RemoteOutcome::Synced(_))
    }

    pub fn receipt(&self) -> Option<&SinkReceipt> {
        match &self.remote {
            RemoteOutcome::Synced(receipt) => Some(receipt),
            RemoteOutcome::Failed(_) => None,
        }
    }

    pub fn remote_error(&self) -> Option<&SinkError> {
        match &self.remote {
            RemoteOutcome::Synced(_) => None,
            RemoteOutcome::Failed(err) => Some(err),
        }
    }
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

pub struct ExportPipeline {
    sink: Arc<dyn RemoteSink>,
    emitter: Arc<dyn LocalEmitter>,
}

impl ExportPipeline {
    pub fn new(sink: Arc<dyn RemoteSink>, emitter: Arc<dyn LocalEmitter>) -> Self {
        Self { sink, emitter }
    }

    pub fn sink_name(&self) -> &str {
        self.sink.name()
    }

    /// Serialize `store`, emit it locally, then push it to the remote sink.
    ///
    /// Returns `Err` only if serialization fails. A remote failure is
    /// reported inside the [`ExportReport`].
    pub async fn export(&self, store: &AnnotationStore) -> Result<ExportReport, CoreError> {
        let entries = store.list();
        let entry_count = entries.len();
        let bytes = serde_json::to_vec_pretty(&entries)?;

        let artifact = LocalArtifact {
            file_name: EXPORT_FILE_NAME.to_string(),
            content_type: EXPORT_CONTENT_TYPE.to_string(),
            bytes,
        };

        tracing::info!(
            entries = entry_count,
            bytes = artifact.bytes.len(),
            sink = self.sink.name(),
            "Exporting annotations"
        );
        self.emitter.emit(&artifact);

        let remote = match self
            .sink
            .send(artifact.bytes.clone(), EXPORT_CONTENT_TYPE, EXPORT_FILE_NAME)
            .await
        {
            Ok(receipt) => {
                tracing::info!(
                    sink = %receipt.sink,
                    location = %receipt.location,
                    "Remote sync succeeded"
                );
                RemoteOutcome::Synced(receipt)
            }
            Err(e) => {
                tracing::warn!(
                    sink = self.sink.name(),
                    error = %e,
                    "Remote sync failed; local artifact kept"
                );
                RemoteOutcome::Failed(e)
            }
        };

        Ok(ExportReport {
            artifact,
            entry_count,
            remote,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
