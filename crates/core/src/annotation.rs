//! Frame → label annotation store.
//!
//! Holds at most one label per frame. Writes go through [`AnnotationStore::upsert`]
//! (last write wins, no history); reads always come back ascending by frame.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::types::FrameIndex;

// ---------------------------------------------------------------------------
// Annotation
// ---------------------------------------------------------------------------

/// A single `(frame, label)` pair as it appears in the export file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Annotation {
    pub frame: FrameIndex,
    pub label: String,
}

impl Annotation {
    pub fn new(frame: FrameIndex, label: impl Into<String>) -> Self {
        Self {
            frame,
            label: label.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// AnnotationStore
// ---------------------------------------------------------------------------

/// Keyed annotation set for the currently loaded video.
#[derive(Debug, Clone, Default)]
pub struct AnnotationStore {
    entries: BTreeMap<FrameIndex, String>,
}

impl AnnotationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a label for `frame`, replacing any existing one.
    ///
    /// Returns the label that was replaced, if there was one. Label content
    /// is not validated; empty strings are stored as-is.
    pub fn upsert(&mut self, frame: FrameIndex, label: impl Into<String>) -> Option<String> {
        self.entries.insert(frame, label.into())
    }

    /// All annotations, ascending by frame.
    pub fn list(&self) -> Vec<Annotation> {
        self.entries
            .iter()
            .map(|(frame, label)| Annotation::new(*frame, label.clone()))
            .collect()
    }

    pub fn get(&self, frame: FrameIndex) -> Option<&str> {
        self.entries.get(&frame).map(String::as_str)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_store_is_empty() {
        let store = AnnotationStore::new();
        assert!(store.is_empty());
        assert!(store.list().is_empty());
    }

    #[test]
    fn list_is_ascending_by_frame() {
        let mut store = AnnotationStore::new();
        store.upsert(5, "A");
        store.upsert(2, "B");

        assert_eq!(
            store.list(),
            vec![Annotation::new(2, "B"), Annotation::new(5, "A")]
        );
    }

    #[test]
    fn upsert_same_frame_replaces_label() {
        let mut store = AnnotationStore::new();
        assert_eq!(store.upsert(5, "A"), None);
        assert_eq!(store.upsert(5, "C"), Some("A".to_string()));

        assert_eq!(store.len(), 1);
        assert_eq!(store.get(5), Some("C"));
    }

    #[test]
    fn last_upsert_per_frame_wins() {
        let calls = [(3, "x"), (1, "y"), (3, "z"), (7, "w"), (1, "v"), (3, "u")];
        let mut store = AnnotationStore::new();
        for (frame, label) in calls {
            store.upsert(frame, label);
        }

        assert_eq!(
            store.list(),
            vec![
                Annotation::new(1, "v"),
                Annotation::new(3, "u"),
                Annotation::new(7, "w"),
            ]
        );
    }

    #[test]
    fn empty_label_is_stored() {
        let mut store = AnnotationStore::new();
        store.upsert(0, "");
        assert_eq!(store.get(0), Some(""));
    }

    #[test]
    fn list_has_no_side_effects() {
        let mut store = AnnotationStore::new();
        store.upsert(4, "a");
        let first = store.list();
        let second = store.list();
        assert_eq!(first, second);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn clear_empties_store() {
        let mut store = AnnotationStore::new();
        store.upsert(1, "a");
        store.upsert(2, "b");
        store.clear();
        assert!(store.is_empty());
        assert_eq!(store.get(1), None);
    }

    #[test]
    fn annotation_serializes_frame_then_label() {
        let json = serde_json::to_string(&Annotation::new(12, "wave")).unwrap();
        assert_eq!(json, r#"{"frame":12,"label":"wave"}"#);
    }
}
