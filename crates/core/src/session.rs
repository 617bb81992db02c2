//! Annotation session: the loaded video, the playhead, and the draft label.
//!
//! The session is the only owner of the [`AnnotationStore`]. It stands in for
//! the playback collaborator (position, duration, position notifications)
//! and refuses every playback-dependent call with
//! [`CoreError::PlaybackNotReady`] until a video has been loaded.

use crate::annotation::{Annotation, AnnotationStore};
use crate::error::CoreError;
use crate::frame_clock::FrameClock;
use crate::types::FrameIndex;

/// A user-selected local video, identified only by name.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoSource {
    pub name: String,
    /// `None` until the media metadata has loaded.
    pub duration_secs: Option<f64>,
}

impl VideoSource {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            duration_secs: None,
        }
    }

    pub fn with_duration(mut self, secs: f64) -> Self {
        self.duration_secs = Some(secs);
        self
    }
}

#[derive(Debug, Default)]
pub struct AnnotationSession {
    clock: FrameClock,
    video: Option<VideoSource>,
    current_frame: FrameIndex,
    draft_label: String,
    store: AnnotationStore,
}

impl AnnotationSession {
    pub fn new(clock: FrameClock) -> Self {
        Self {
            clock,
            ..Default::default()
        }
    }

    /// Load a new video, discarding the previous annotation set.
    ///
    /// There is no merge and no confirmation: the store is cleared, the
    /// playhead returns to frame 0 and the draft label is emptied.
    pub fn load_video(&mut self, source: VideoSource) {
        let discarded = self.store.len();
        self.store.clear();
        self.current_frame = 0;
        self.draft_label.clear();
        tracing::info!(video = %source.name, discarded, "Video loaded");
        self.video = Some(source);
    }

    /// Record the media duration once metadata is available.
    pub fn set_duration(&mut self, secs: f64) -> Result<(), CoreError> {
        let video = self.video.as_mut().ok_or(CoreError::PlaybackNotReady)?;
        video.duration_secs = Some(secs);
        Ok(())
    }

    /// Playback position notification. Moves the playhead only.
    pub fn on_time_update(&mut self, secs: f64) -> Result<FrameIndex, CoreError> {
        self.require_video()?;
        self.current_frame = self.clock.time_to_frame(secs);
        Ok(self.current_frame)
    }

    /// Move the playhead to `frame`; returns the time to apply to the player.
    pub fn seek(&mut self, frame: FrameIndex) -> Result<f64, CoreError> {
        self.require_video()?;
        self.current_frame = frame;
        Ok(self.clock.frame_to_time(frame))
    }

    pub fn set_draft_label(&mut self, text: impl Into<String>) {
        self.draft_label = text.into();
    }

    pub fn draft_label(&self) -> &str {
        &self.draft_label
    }

    /// Attach the draft label to the current frame (insert or replace).
    pub fn save_label(&mut self) -> Result<Annotation, CoreError> {
        self.require_video()?;
        let frame = self.current_frame;
        let replaced = self.store.upsert(frame, self.draft_label.clone());
        tracing::debug!(frame, replaced = replaced.is_some(), "Label saved");
        Ok(Annotation::new(frame, self.draft_label.clone()))
    }

    pub fn current_frame(&self) -> Result<FrameIndex, CoreError> {
        self.require_video()?;
        Ok(self.current_frame)
    }

    /// Advisory scrub bound for the loaded video.
    pub fn frame_bound(&self) -> Result<FrameIndex, CoreError> {
        let video = self.require_video()?;
        Ok(self.clock.frame_bound(video.duration_secs))
    }

    pub fn video(&self) -> Option<&VideoSource> {
        self.video.as_ref()
    }

    pub fn store(&self) -> &AnnotationStore {
        &self.store
    }

    fn require_video(&self) -> Result<&VideoSource, CoreError> {
        self.video.as_ref().ok_or(CoreError::PlaybackNotReady)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn loaded() -> AnnotationSession {
        let mut session = AnnotationSession::new(FrameClock::new());
        session.load_video(VideoSource::new("signs.mp4"));
        session
    }

    // -- PlaybackNotReady --------------------------------------------------

    #[test]
    fn operations_before_load_are_rejected() {
        let mut session = AnnotationSession::new(FrameClock::new());
        assert_matches!(session.current_frame(), Err(CoreError::PlaybackNotReady));
        assert_matches!(session.frame_bound(), Err(CoreError::PlaybackNotReady));
        assert_matches!(session.on_time_update(1.0), Err(CoreError::PlaybackNotReady));
        assert_matches!(session.seek(3), Err(CoreError::PlaybackNotReady));
        assert_matches!(session.set_duration(4.0), Err(CoreError::PlaybackNotReady));
        assert_matches!(session.save_label(), Err(CoreError::PlaybackNotReady));
        assert!(session.store().is_empty());
    }

    // -- Playhead ----------------------------------------------------------

    #[test]
    fn time_update_moves_playhead_without_touching_store() {
        let mut session = loaded();
        assert_eq!(session.on_time_update(2.0).unwrap(), 60);
        assert_eq!(session.current_frame().unwrap(), 60);
        assert!(session.store().is_empty());
    }

    #[test]
    fn seek_returns_player_time() {
        let mut session = loaded();
        assert_eq!(session.seek(45).unwrap(), 1.5);
        assert_eq!(session.current_frame().unwrap(), 45);
    }

    #[test]
    fn frame_bound_follows_duration() {
        let mut session = loaded();
        assert_eq!(session.frame_bound().unwrap(), 300);
        session.set_duration(20.0).unwrap();
        assert_eq!(session.frame_bound().unwrap(), 600);
    }

    // -- Labels ------------------------------------------------------------

    #[test]
    fn save_label_upserts_at_current_frame() {
        let mut session = loaded();
        session.seek(5).unwrap();
        session.set_draft_label("A");
        session.save_label().unwrap();
        session.set_draft_label("C");
        let saved = session.save_label().unwrap();

        assert_eq!(saved, Annotation::new(5, "C"));
        assert_eq!(session.store().len(), 1);
        assert_eq!(session.store().get(5), Some("C"));
    }

    #[test]
    fn save_label_allows_empty_draft() {
        let mut session = loaded();
        let saved = session.save_label().unwrap();
        assert_eq!(saved, Annotation::new(0, ""));
    }

    // -- Reload ------------------------------------------------------------

    #[test]
    fn loading_new_video_clears_everything() {
        let mut session = loaded();
        session.seek(10).unwrap();
        session.set_draft_label("hello");
        session.save_label().unwrap();

        session.load_video(VideoSource::new("next.mp4").with_duration(3.0));

        assert!(session.store().list().is_empty());
        assert_eq!(session.current_frame().unwrap(), 0);
        assert_eq!(session.draft_label(), "");
        assert_eq!(session.frame_bound().unwrap(), 90);
        assert_eq!(session.video().map(|v| v.name.as_str()), Some("next.mp4"));
    }
}
