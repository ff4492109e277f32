// framenote-core/tests/store_tests.rs

use framenote_core::{AnnotationStore, ExportRow, FrameIndex, RowLabel};

#[test]
fn export_rows_are_sorted_regardless_of_insertion_order() {
    let mut store = AnnotationStore::new();
    for frame in [5_u64, 1, 3] {
        store.set_note(FrameIndex(frame), format!("note {frame}"));
    }
    store.set_global_comment("global");

    let rows = store.export_rows();
    assert_eq!(
        rows,
        vec![
            ExportRow::new(RowLabel::Frame(FrameIndex(1)), "note 1"),
            ExportRow::new(RowLabel::Frame(FrameIndex(3)), "note 3"),
            ExportRow::new(RowLabel::Frame(FrameIndex(5)), "note 5"),
            ExportRow::new(RowLabel::GlobalComment, "global"),
        ]
    );
}

#[test]
fn export_rows_is_idempotent() {
    let mut store = AnnotationStore::new();
    store.set_note(FrameIndex(9), "x");
    store.set_note(FrameIndex(2), "y");
    assert_eq!(store.export_rows(), store.export_rows());
}

#[test]
fn notes_round_trip_exactly() {
    let mut store = AnnotationStore::new();
    let samples = ["", " leading", "trailing ", "multi\nline", "acentuação ✓", "\t"];
    for (frame, text) in samples.iter().enumerate() {
        store.set_note(FrameIndex(frame as u64), *text);
    }
    for (frame, text) in samples.iter().enumerate() {
        assert_eq!(store.note(FrameIndex(frame as u64)), *text);
    }
}

#[test]
fn iteration_is_in_frame_order() {
    let mut store = AnnotationStore::new();
    store.set_note(FrameIndex(10), "b");
    store.set_note(FrameIndex(0), "a");
    let frames: Vec<u64> = store.iter().map(|(frame, _)| frame.get()).collect();
    assert_eq!(frames, vec![0, 10]);
}
