//! In-memory annotation store.
//!
//! Holds per-frame notes and the single global comment for one loaded video.
//! Notes are stored verbatim; there is no per-note deletion, only overwrite
//! and a full [`AnnotationStore::clear`] when the session resets.

use std::collections::BTreeMap;

use crate::export::{ExportRow, RowLabel};
use crate::frame::FrameIndex;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnnotationStore {
    notes: BTreeMap<FrameIndex, String>,
    global_comment: String,
}

impl AnnotationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or silently overwrites the note for `frame`.
    pub fn set_note(&mut self, frame: FrameIndex, text: impl Into<String>) {
        self.notes.insert(frame, text.into());
    }

    /// The note for `frame`, or `""` when none was recorded.
    pub fn note(&self, frame: FrameIndex) -> &str {
        self.notes.get(&frame).map_or("", String::as_str)
    }

    pub fn has_note(&self, frame: FrameIndex) -> bool {
        self.notes.contains_key(&frame)
    }

    pub fn set_global_comment(&mut self, text: impl Into<String>) {
        self.global_comment = text.into();
    }

    pub fn global_comment(&self) -> &str {
        &self.global_comment
    }

    /// Frame notes ascending by index, then exactly one global comment row.
    #[must_use]
    pub fn export_rows(&self) -> Vec<ExportRow> {
        self.notes
            .iter()
            .map(|(frame, text)| ExportRow::new(RowLabel::Frame(*frame), text.clone()))
            .chain(std::iter::once(ExportRow::new(
                RowLabel::GlobalComment,
                self.global_comment.clone(),
            )))
            .collect()
    }

    /// Drops every note and empties the global comment.
    pub fn clear(&mut self) {
        self.notes.clear();
        self.global_comment.clear();
    }

    /// Number of frame notes; the global comment is not counted.
    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// Frame notes in ascending frame order.
    pub fn iter(&self) -> impl Iterator<Item = (FrameIndex, &str)> + '_ {
        self.notes.iter().map(|(frame, text)| (*frame, text.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_note_is_empty() {
        let store = AnnotationStore::new();
        assert_eq!(store.note(FrameIndex(3)), "");
        assert!(!store.has_note(FrameIndex(3)));
    }

    #[test]
    fn notes_are_stored_verbatim_and_last_write_wins() {
        let mut store = AnnotationStore::new();
        store.set_note(FrameIndex(2), "  padded\n");
        assert_eq!(store.note(FrameIndex(2)), "  padded\n");

        store.set_note(FrameIndex(2), "second");
        assert_eq!(store.note(FrameIndex(2)), "second");
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn export_rows_sorted_with_trailing_global_row() {
        let mut store = AnnotationStore::new();
        store.set_note(FrameIndex(5), "five");
        store.set_note(FrameIndex(1), "one");
        store.set_note(FrameIndex(3), "three");
        store.set_global_comment("overall");

        let rows = store.export_rows();
        let labels: Vec<RowLabel> = rows.iter().map(|row| row.label).collect();
        assert_eq!(
            labels,
            vec![
                RowLabel::Frame(FrameIndex(1)),
                RowLabel::Frame(FrameIndex(3)),
                RowLabel::Frame(FrameIndex(5)),
                RowLabel::GlobalComment,
            ]
        );
        assert_eq!(rows[3].text, "overall");
        assert_eq!(rows, store.export_rows());
    }

    #[test]
    fn empty_store_still_exports_global_row() {
        let rows = AnnotationStore::new().export_rows();
        assert_eq!(rows, vec![ExportRow::new(RowLabel::GlobalComment, "")]);
    }

    #[test]
    fn clear_resets_notes_and_global_comment() {
        let mut store = AnnotationStore::new();
        store.set_note(FrameIndex(0), "a");
        store.set_global_comment("b");
        store.clear();
        assert!(store.is_empty());
        assert_eq!(store.global_comment(), "");
    }
}
