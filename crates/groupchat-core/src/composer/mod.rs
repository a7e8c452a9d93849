//! Message composer: edit buffer, mention session and picker, staged files
//! and reply target for one conversation.

pub mod draft;
pub mod editor;
pub mod emoji;
pub mod mention;
pub mod picker;
pub mod staging;

pub use draft::{CommittedMention, ComposerDraft, CursorRestore, SendState};
pub use editor::EditBuffer;
pub use emoji::{EmojiPalette, EMOJIS, EMOJI_COLUMNS};
pub use mention::{detect_mention, MentionSession, MENTION_TRIGGER};
pub use picker::{filter_candidates, MentionPicker};
pub use staging::{AttachmentStaging, PreviewHandle, StagedAttachment};

use crate::models::Candidate;

/// Draft plus the picker state that follows it.
///
/// All text changes go through [`Composer::edit`] so the mention session
/// and the filtered candidate list are recomputed on every keystroke.
#[derive(Debug, Clone, Default)]
pub struct Composer {
    draft: ComposerDraft,
    picker: MentionPicker,
    dismissed: bool,
}

impl Composer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn draft(&self) -> &ComposerDraft {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut ComposerDraft {
        &mut self.draft
    }

    pub fn picker(&self) -> &MentionPicker {
        &self.picker
    }

    /// Apply a text mutation. Dismissal of the picker ends once the text
    /// actually changes.
    pub fn edit<F>(&mut self, roster: &[Candidate], f: F)
    where
        F: FnOnce(&mut EditBuffer),
    {
        self.draft.apply_pending_cursor();
        let before_cursor = self.draft.cursor();
        let snapshot = self.draft.text().to_string();

        f(self.draft.buffer_mut());

        let changed = self.draft.text() != snapshot;
        if changed {
            self.dismissed = false;
        }
        if changed || self.draft.cursor() != before_cursor {
            self.sync_picker(roster);
        }
    }

    /// Replace the whole draft (e.g. restoring after a failed send).
    pub fn replace_draft(&mut self, draft: ComposerDraft, roster: &[Candidate]) {
        self.draft = draft;
        self.sync_picker(roster);
    }

    /// True while the dropdown is open and owns Up/Down/Enter/Escape. It stays
    /// open with no matches; commit is then a no-op.
    pub fn picker_visible(&self) -> bool {
        self.draft.mention_session().active && !self.dismissed
    }

    pub fn picker_up(&mut self) {
        self.picker.move_up();
    }

    pub fn picker_down(&mut self) {
        self.picker.move_down();
    }

    pub fn dismiss_picker(&mut self) {
        self.dismissed = true;
    }

    /// Commit the highlighted candidate.
    pub fn commit_selected(&mut self) -> Option<CursorRestore> {
        if !self.picker_visible() {
            return None;
        }
        let candidate = self.picker.selected()?.clone();
        let restore = self.draft.commit_mention(&candidate)?;
        self.picker.clear();
        Some(restore)
    }

    /// Run once the frame containing the new text has been drawn.
    pub fn after_render(&mut self, roster: &[Candidate]) -> bool {
        if self.draft.apply_pending_cursor() {
            self.sync_picker(roster);
            true
        } else {
            false
        }
    }

    /// Roster changed underneath an open session.
    pub fn refresh_candidates(&mut self, roster: &[Candidate]) {
        self.sync_picker(roster);
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    fn sync_picker(&mut self, roster: &[Candidate]) {
        self.draft.recompute_session();
        let session = self.draft.mention_session();
        if session.active {
            let query = session.query.clone();
            self.picker.refresh(&query, roster);
        } else {
            self.picker.clear();
        }
    }
}
