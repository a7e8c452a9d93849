use crate::models::{Candidate, Message, UserId};

use super::editor::EditBuffer;
use super::mention::{detect_mention, MentionSession, MENTION_TRIGGER};
use super::staging::AttachmentStaging;

/// A user picked from the mention list for the message being written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommittedMention {
    pub id: UserId,
    pub name: String,
}

/// Single-flight marker for the send pipeline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SendState {
    #[default]
    Idle,
    Sending,
}

/// Cursor placement scheduled by a mention commit. It must be applied only
/// after the input has been redrawn with the new text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CursorRestore {
    pub offset: usize,
}

/// The in-progress message of one conversation view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComposerDraft {
    buffer: EditBuffer,
    session: MentionSession,
    staged: AttachmentStaging,
    reply_target: Option<Message>,
    committed_mentions: Vec<CommittedMention>,
    send_state: SendState,
    pending_cursor: Option<CursorRestore>,
}

impl ComposerDraft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text(text: impl Into<String>, cursor: usize) -> Self {
        let mut draft = Self {
            buffer: EditBuffer::with_text(text, cursor),
            ..Self::default()
        };
        draft.recompute_session();
        draft
    }

    pub fn text(&self) -> &str {
        self.buffer.text()
    }

    pub fn cursor(&self) -> usize {
        self.buffer.cursor()
    }

    pub fn buffer(&self) -> &EditBuffer {
        &self.buffer
    }

    pub(crate) fn buffer_mut(&mut self) -> &mut EditBuffer {
        &mut self.buffer
    }

    pub fn mention_session(&self) -> &MentionSession {
        &self.session
    }

    /// Re-derive the mention session from text and cursor.
    pub fn recompute_session(&mut self) {
        self.session = detect_mention(self.buffer.text(), self.buffer.cursor());
    }

    pub fn staged(&self) -> &AttachmentStaging {
        &self.staged
    }

    pub fn staged_mut(&mut self) -> &mut AttachmentStaging {
        &mut self.staged
    }

    pub fn reply_target(&self) -> Option<&Message> {
        self.reply_target.as_ref()
    }

    pub fn set_reply_target(&mut self, message: Message) {
        self.reply_target = Some(message);
    }

    pub fn cancel_reply(&mut self) {
        self.reply_target = None;
    }

    pub fn committed_mentions(&self) -> &[CommittedMention] {
        &self.committed_mentions
    }

    pub fn send_state(&self) -> SendState {
        self.send_state
    }

    pub fn is_sending(&self) -> bool {
        self.send_state == SendState::Sending
    }

    pub(crate) fn set_send_state(&mut self, state: SendState) {
        self.send_state = state;
    }

    /// Nothing worth sending: blank text and no staged files.
    pub fn is_blank(&self) -> bool {
        self.buffer.text().trim().is_empty() && self.staged.is_empty()
    }

    /// Replace the mention being typed with `@<name> ` and remember the user.
    ///
    /// The cursor is not moved here; the returned restore is also kept as
    /// pending until [`ComposerDraft::apply_pending_cursor`] runs after the
    /// next render. Returns `None` when no mention session is active.
    pub fn commit_mention(&mut self, candidate: &Candidate) -> Option<CursorRestore> {
        if !self.session.active {
            return None;
        }
        let range = self.session.replace_range(self.buffer.cursor());
        let insertion = format!("{}{} ", MENTION_TRIGGER, candidate.display_name);
        let restore = CursorRestore {
            offset: range.start + insertion.len(),
        };

        self.buffer.replace_range(range.start, range.end, &insertion);
        self.session = MentionSession::inactive();
        if !self.committed_mentions.iter().any(|m| m.id == candidate.id) {
            self.committed_mentions.push(CommittedMention {
                id: candidate.id,
                name: candidate.display_name.clone(),
            });
        }
        self.pending_cursor = Some(restore);
        Some(restore)
    }

    pub fn pending_cursor(&self) -> Option<CursorRestore> {
        self.pending_cursor
    }

    /// Second phase of a mention commit. Returns true if a cursor move was
    /// pending.
    pub fn apply_pending_cursor(&mut self) -> bool {
        match self.pending_cursor.take() {
            Some(restore) => {
                self.buffer.set_cursor(restore.offset);
                self.recompute_session();
                true
            }
            None => false,
        }
    }

    /// Back to the empty initial shape.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
