//! Framemark annotation core.
//!
//! Frame/time conversion, the keyed frame→label store, and the
//! local-plus-remote export protocol. Nothing in this crate performs I/O
//! directly: the remote side is reached through the [`RemoteSink`] trait and
//! the local side through [`LocalEmitter`], both injected by the caller.

pub mod annotation;
pub mod error;
pub mod export;
pub mod frame_clock;
pub mod session;
pub mod sink;
pub mod types;

pub use annotation::{Annotation, AnnotationStore};
pub use error::CoreError;
pub use export::{ExportPipeline, ExportReport, LocalArtifact, LocalEmitter, RemoteOutcome};
pub use frame_clock::FrameClock;
pub use session::{AnnotationSession, VideoSource};
pub use sink::{RemoteSink, SinkError, SinkReceipt};
