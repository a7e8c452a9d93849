//! Cursor-anchored `@mention` detection.
//!
//! A mention session is active when the caret sits right after an `@` that
//! starts a word (offset 0 or preceded by whitespace) and nothing but
//! non-whitespace lies between that `@` and the caret. `someone@host` never
//! triggers.

use super::editor::floor_char_boundary;

pub const MENTION_TRIGGER: char = '@';

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MentionSession {
    pub active: bool,
    /// Text typed after the `@`, up to the cursor
    pub query: String,
    /// Byte offset of the `@`
    pub anchor_offset: usize,
}

impl MentionSession {
    pub fn inactive() -> Self {
        Self::default()
    }

    /// Byte range the commit replaces: from the `@` up to the cursor.
    pub fn replace_range(&self, cursor: usize) -> std::ops::Range<usize> {
        self.anchor_offset..cursor.max(self.anchor_offset)
    }
}

pub fn detect_mention(text: &str, cursor: usize) -> MentionSession {
    let cursor = floor_char_boundary(text, cursor);
    let before = &text[..cursor];

    let anchor = match before.rfind(MENTION_TRIGGER) {
        Some(idx) => idx,
        None => return MentionSession::inactive(),
    };

    let tail = &before[anchor + MENTION_TRIGGER.len_utf8()..];
    if tail.chars().any(char::is_whitespace) {
        return MentionSession::inactive();
    }

    let starts_word = before[..anchor]
        .chars()
        .next_back()
        .map_or(true, char::is_whitespace);
    if !starts_word {
        return MentionSession::inactive();
    }

    MentionSession {
        active: true,
        query: tail.to_string(),
        anchor_offset: anchor,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn active(query: &str, anchor: usize) -> MentionSession {
        MentionSession {
            active: true,
            query: query.to_string(),
            anchor_offset: anchor,
        }
    }

    #[test]
    fn test_no_at_sign() {
        assert_eq!(detect_mention("hello", 5), MentionSession::inactive());
        assert_eq!(detect_mention("", 0), MentionSession::inactive());
    }

    #[test]
    fn test_at_start_of_text() {
        assert_eq!(detect_mention("@", 1), active("", 0));
        assert_eq!(detect_mention("@sa", 3), active("sa", 0));
    }

    #[test]
    fn test_after_whitespace() {
        assert_eq!(detect_mention("hi @sam", 7), active("sam", 3));
        assert_eq!(detect_mention("line\n@ops", 9), active("ops", 5));
    }

    #[test]
    fn test_email_does_not_trigger() {
        assert_eq!(detect_mention("mail bob@corp", 13), MentionSession::inactive());
    }

    #[test]
    fn test_finished_word_is_inactive() {
        assert_eq!(detect_mention("hi @sam ", 8), MentionSession::inactive());
        assert_eq!(detect_mention("@sam ok", 7), MentionSession::inactive());
    }

    #[test]
    fn test_cursor_in_middle_of_text() {
        // Only text before the cursor counts
        assert_eq!(detect_mention("hi @sam there", 5), active("s", 3));
        assert_eq!(detect_mention("hi @sam there", 3), MentionSession::inactive());
    }

    #[test]
    fn test_last_at_wins() {
        assert_eq!(detect_mention("@a @b", 5), active("b", 3));
        // Last @ is mid-word, so no session even though an earlier one qualifies
        assert_eq!(detect_mention("@a x@b", 6), MentionSession::inactive());
    }

    #[test]
    fn test_multibyte_text() {
        assert_eq!(detect_mention("héllo @zoë", 12), active("zoë", 7));
        // Cursor inside the 'ë' is clamped to the boundary before it
        assert_eq!(detect_mention("héllo @zoë", 11), active("zo", 7));
    }

    #[test]
    fn test_cursor_past_end_is_clamped() {
        assert_eq!(detect_mention("@x", 50), active("x", 0));
    }

    #[test]
    fn test_idempotent() {
        let first = detect_mention("ping @pri", 9);
        assert_eq!(first, detect_mention("ping @pri", 9));
    }

    #[test]
    fn test_session_invariant_holds() {
        let samples = [
            ("@", 1),
            ("a @b", 4),
            ("a\t@bc", 5),
            ("x@y @z", 6),
            ("@@", 2),
            ("  @ab cd", 5),
        ];
        for (text, cursor) in samples {
            let session = detect_mention(text, cursor);
            if session.active {
                assert_eq!(&text[session.anchor_offset..session.anchor_offset + 1], "@");
                let between = &text[session.anchor_offset + 1..cursor];
                assert!(!between.chars().any(char::is_whitespace), "{text:?}");
                assert_eq!(session.query, between);
            }
        }
    }

    #[test]
    fn test_double_at() {
        // The second '@' is preceded by '@', not whitespace
        assert_eq!(detect_mention("@@", 2), MentionSession::inactive());
    }
}
