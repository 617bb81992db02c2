use std::path::PathBuf;

use framemark_delivery::{ConfigError, SinkConfig};

/// Annotator configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct AnnotatorConfig {
    /// Directory receiving `annotations.json` (default: `.`).
    pub export_dir: PathBuf,
    /// Remote sink selection, see [`SinkConfig::from_env`].
    pub sink: SinkConfig,
}

impl AnnotatorConfig {
    /// | Env Var      | Default |
    /// |--------------|---------|
    /// | `EXPORT_DIR` | `.`     |
    ///
    /// Sink variables are documented on [`SinkConfig::from_env`].
    pub fn from_env() -> Result<Self, ConfigError> {
        let export_dir = std::env::var("EXPORT_DIR")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| ".".into());

        Ok(Self {
            export_dir: PathBuf::from(export_dir),
            sink: SinkConfig::from_env()?,
        })
    }
}
