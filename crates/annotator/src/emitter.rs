//! Local emission of export artifacts to disk.

use std::io::Write;
use std::path::{Path, PathBuf};

use framemark_core::{LocalArtifact, LocalEmitter};

/// Writes each artifact into a fixed directory, replacing the previous file.
///
/// The bytes go to a temporary file in the same directory which is then
/// renamed over the target, so concurrent exports never interleave their
/// contents. A failed write is logged and otherwise ignored; the export
/// report still carries the artifact bytes.
pub struct FileEmitter {
    dir: PathBuf,
}

impl FileEmitter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Full path an artifact named `file_name` is written to.
    pub fn path_for(&self, file_name: &str) -> PathBuf {
        self.dir.join(file_name)
    }
}

fn replace_file(dir: &Path, path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut staged = tempfile::NamedTempFile::new_in(dir)?;
    staged.write_all(bytes)?;
    staged.as_file().sync_all()?;
    staged.persist(path).map_err(|e| e.error)?;
    Ok(())
}

impl LocalEmitter for FileEmitter {
    fn emit(&self, artifact: &LocalArtifact) {
        let path = self.path_for(&artifact.file_name);
        match replace_file(&self.dir, &path, &artifact.bytes) {
            Ok(()) => {
                tracing::info!(path = %path.display(), bytes = artifact.bytes.len(), "Local artifact written");
            }
            Err(e) => {
                tracing::error!(path = %path.display(), error = %e, "Failed to write local artifact");
            }
        }
    }
}
