#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Playback not ready: no video is loaded")]
    PlaybackNotReady,

    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}
