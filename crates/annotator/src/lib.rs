//! `framemark-annotator` library crate.
//!
//! Line-oriented front end for an annotation session: parses commands,
//! drives the [`AnnotationSession`](framemark_core::AnnotationSession), and
//! runs exports in the background. Re-exported for integration testing; the
//! binary entrypoint lives in `main.rs`.

pub mod command;
pub mod config;
pub mod driver;
pub mod emitter;
