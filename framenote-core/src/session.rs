// ============================================================================
// framenote-core/src/session.rs
// ============================================================================
//
// SESSION: Explicit Annotation Session State
//
// A session is either Empty or Loaded. Every user interaction is an Action
// applied to the current session, producing the next session; there is no
// ambient state.
//
// KEY COMPONENTS:
// - Session: Empty / Loaded lifecycle (load, close, apply)
// - LoadedSession: the open video, its annotations, the current frame and
//   the draft note being edited
// - Action: navigation and editing commands
//
// Invariant: while loaded, 0 <= current_frame < frame_count.

use crate::config::CoreConfig;
use crate::error::{CoreError, CoreResult};
use crate::export::ExportRow;
use crate::frame::FrameIndex;
use crate::media::VideoHandle;
use crate::store::AnnotationStore;

/// A user command applied to a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Jump to a frame; out-of-range requests are clamped
    GoTo(i64),
    /// Move by a signed number of frames, clamped
    Step(i64),
    Next,
    Previous,
    First,
    Last,
    /// Store a note for the current frame, verbatim
    SaveNote(String),
    /// Replace the draft note without storing it
    EditDraft(String),
    SetGlobalComment(String),
}

/// State of an annotation session.
#[derive(Debug, Default)]
pub enum Session {
    #[default]
    Empty,
    Loaded(LoadedSession),
}

/// A session with a video open.
#[derive(Debug)]
pub struct LoadedSession {
    handle: VideoHandle,
    store: AnnotationStore,
    current: FrameIndex,
    draft: String,
    autosave_drafts: bool,
}

impl Session {
    pub fn new() -> Self {
        Session::Empty
    }

    /// Starts a fresh session on `handle` at frame 0 with no annotations.
    ///
    /// Any previous video and its annotations are dropped here, after `handle`
    /// was opened. To release the previous video before opening the next one,
    /// [`close`](Session::close) the session first.
    #[must_use]
    pub fn load(self, handle: VideoHandle, config: &CoreConfig) -> Session {
        if let Session::Loaded(previous) = &self {
            log::info!(
                "Discarding {} notes for {} before loading {}",
                previous.store.len(),
                previous.handle.path().display(),
                handle.path().display()
            );
        }
        drop(self);

        Session::Loaded(LoadedSession {
            handle,
            store: AnnotationStore::new(),
            current: FrameIndex::FIRST,
            draft: String::new(),
            autosave_drafts: config.autosave_drafts,
        })
    }

    /// Ends the session, releasing the video and discarding annotations.
    #[must_use]
    pub fn close(self) -> Session {
        if let Session::Loaded(loaded) = &self {
            log::debug!("Closing session for {}", loaded.handle.path().display());
        }
        Session::Empty
    }

    /// Applies `action` and returns the next session.
    ///
    /// # Errors
    ///
    /// `CoreError::NoVideoLoaded` when the session is empty. Navigation past
    /// either end is clamped, never an error.
    pub fn apply(self, action: Action) -> CoreResult<Session> {
        match self {
            Session::Empty => Err(CoreError::NoVideoLoaded),
            Session::Loaded(mut loaded) => {
                loaded.apply(action);
                Ok(Session::Loaded(loaded))
            }
        }
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self, Session::Loaded(_))
    }

    pub fn loaded(&self) -> Option<&LoadedSession> {
        match self {
            Session::Loaded(loaded) => Some(loaded),
            Session::Empty => None,
        }
    }

    /// The loaded session, or `CoreError::NoVideoLoaded`.
    pub fn require_loaded(&self) -> CoreResult<&LoadedSession> {
        self.loaded().ok_or(CoreError::NoVideoLoaded)
    }
}

impl LoadedSession {
    fn apply(&mut self, action: Action) {
        let total = self.frame_count();
        match action {
            Action::GoTo(raw) => self.navigate(FrameIndex::clamped(raw, total)),
            Action::Step(delta) => self.navigate(self.current.offset(delta, total)),
            Action::Next => self.navigate(self.current.offset(1, total)),
            Action::Previous => self.navigate(self.current.offset(-1, total)),
            Action::First => self.navigate(FrameIndex::FIRST),
            Action::Last => self.navigate(FrameIndex::last(total)),
            Action::SaveNote(text) => {
                self.store.set_note(self.current, text.clone());
                self.draft = text;
            }
            Action::EditDraft(text) => self.draft = text,
            Action::SetGlobalComment(text) => self.store.set_global_comment(text),
        }
    }

    fn navigate(&mut self, target: FrameIndex) {
        if self.autosave_drafts {
            self.commit_draft();
        }
        self.current = target;
        self.draft = self.store.note(target).to_string();
    }

    /// Stores the trimmed draft for the current frame when it is non-empty and changed.
    fn commit_draft(&mut self) {
        let trimmed = self.draft.trim();
        if trimmed.is_empty() || self.draft == self.store.note(self.current) {
            return;
        }
        log::debug!("Autosaving draft note for frame {}", self.current);
        self.store.set_note(self.current, trimmed);
    }

    pub fn handle(&self) -> &VideoHandle {
        &self.handle
    }

    pub fn store(&self) -> &AnnotationStore {
        &self.store
    }

    pub fn current_frame(&self) -> FrameIndex {
        self.current
    }

    pub fn frame_count(&self) -> u64 {
        self.handle.frame_count()
    }

    /// Text currently being edited for the current frame.
    pub fn draft(&self) -> &str {
        &self.draft
    }

    /// Stored note for the current frame, `""` when none.
    pub fn current_note(&self) -> &str {
        self.store.note(self.current)
    }

    pub fn export_rows(&self) -> Vec<ExportRow> {
        self.store.export_rows()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::VideoResource;
    use crate::resolver::ResolvedFrameCount;

    fn handle(frames: u64) -> VideoHandle {
        VideoHandle::new(
            VideoResource::from_path("clip.mp4"),
            ResolvedFrameCount::Trusted(frames),
            None,
            Vec::new(),
        )
        .unwrap()
    }

    fn loaded(frames: u64) -> Session {
        Session::new().load(handle(frames), &CoreConfig::default())
    }

    fn current(session: &Session) -> u64 {
        session.loaded().unwrap().current_frame().get()
    }

    #[test]
    fn empty_session_rejects_actions() {
        let err = Session::new().apply(Action::Next).unwrap_err();
        assert!(matches!(err, CoreError::NoVideoLoaded));
    }

    #[test]
    fn navigation_clamps_at_both_ends() {
        let session = loaded(10).apply(Action::Previous).unwrap();
        assert_eq!(current(&session), 0);

        let session = session.apply(Action::GoTo(25)).unwrap();
        assert_eq!(current(&session), 9);

        let session = session.apply(Action::Next).unwrap();
        assert_eq!(current(&session), 9);

        let session = session.apply(Action::Step(-4)).unwrap();
        assert_eq!(current(&session), 5);

        let session = session.apply(Action::GoTo(-3)).unwrap();
        assert_eq!(current(&session), 0);

        let session = session.apply(Action::Last).unwrap().apply(Action::First).unwrap();
        assert_eq!(current(&session), 0);
    }

    #[test]
    fn save_note_is_verbatim() {
        let session = loaded(5)
            .apply(Action::GoTo(2))
            .unwrap()
            .apply(Action::SaveNote("  spaced  ".into()))
            .unwrap();
        let loaded = session.loaded().unwrap();
        assert_eq!(loaded.store().note(FrameIndex(2)), "  spaced  ");
        assert_eq!(loaded.current_note(), "  spaced  ");
    }

    #[test]
    fn draft_is_autosaved_trimmed_on_navigation() {
        let session = loaded(5)
            .apply(Action::EditDraft("  pending \n".into()))
            .unwrap()
            .apply(Action::Next)
            .unwrap();
        let loaded = session.loaded().unwrap();
        assert_eq!(loaded.store().note(FrameIndex(0)), "pending");
        assert_eq!(loaded.draft(), "");
    }

    #[test]
    fn blank_draft_is_not_saved() {
        let session = loaded(5)
            .apply(Action::EditDraft("   ".into()))
            .unwrap()
            .apply(Action::Next)
            .unwrap();
        assert!(session.loaded().unwrap().store().is_empty());
    }

    #[test]
    fn autosave_can_be_disabled() {
        let config = CoreConfig {
            autosave_drafts: false,
            ..CoreConfig::default()
        };
        let session = Session::new()
            .load(handle(5), &config)
            .apply(Action::EditDraft("lost".into()))
            .unwrap()
            .apply(Action::Next)
            .unwrap();
        assert!(session.loaded().unwrap().store().is_empty());
    }

    #[test]
    fn returning_to_a_frame_restores_its_note_as_draft() {
        let session = loaded(5)
            .apply(Action::SaveNote("kept  ".into()))
            .unwrap()
            .apply(Action::Next)
            .unwrap()
            .apply(Action::Previous)
            .unwrap();
        let loaded = session.loaded().unwrap();
        assert_eq!(loaded.draft(), "kept  ");
        assert_eq!(loaded.store().note(FrameIndex(0)), "kept  ");
    }

    #[test]
    fn reload_discards_annotations() {
        let session = loaded(5)
            .apply(Action::SaveNote("old".into()))
            .unwrap()
            .apply(Action::SetGlobalComment("old global".into()))
            .unwrap()
            .apply(Action::GoTo(3))
            .unwrap();

        let session = session.load(handle(8), &CoreConfig::default());
        let loaded = session.loaded().unwrap();
        assert!(loaded.store().is_empty());
        assert_eq!(loaded.store().global_comment(), "");
        assert_eq!(loaded.current_frame(), FrameIndex(0));
        assert_eq!(loaded.frame_count(), 8);
    }

    #[test]
    fn close_returns_to_empty() {
        let session = loaded(3).close();
        assert!(!session.is_loaded());
        assert!(matches!(session.require_loaded(), Err(CoreError::NoVideoLoaded)));
    }
}
