/// Multiline text buffer backing the composer.
///
/// Offsets are byte offsets into `text` and are kept on char boundaries.
/// Supports:
/// - Ctrl+A / Ctrl+E line start and end
/// - Ctrl+K / Ctrl+U kill to line end / start
/// - Ctrl+W word delete, Alt+Left/Right word jumps
/// - Undo / redo of text mutations

const UNDO_LIMIT: usize = 100;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditBuffer {
    text: String,
    cursor: usize,
    undo_stack: Vec<(String, usize)>,
    redo_stack: Vec<(String, usize)>,
}

/// Largest char boundary in `text` that is `<= offset`.
pub fn floor_char_boundary(text: &str, offset: usize) -> usize {
    if offset >= text.len() {
        return text.len();
    }
    let mut idx = offset;
    while !text.is_char_boundary(idx) {
        idx -= 1;
    }
    idx
}

impl EditBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text(text: impl Into<String>, cursor: usize) -> Self {
        let text = text.into();
        let cursor = floor_char_boundary(&text, cursor);
        Self {
            text,
            cursor,
            ..Self::default()
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Place the cursor, clamped to the text and snapped to a char boundary.
    pub fn set_cursor(&mut self, offset: usize) {
        self.cursor = floor_char_boundary(&self.text, offset);
    }

    fn push_undo_state(&mut self) {
        self.undo_stack.push((self.text.clone(), self.cursor));
        self.redo_stack.clear();
        if self.undo_stack.len() > UNDO_LIMIT {
            self.undo_stack.remove(0);
        }
    }

    pub fn undo(&mut self) -> bool {
        match self.undo_stack.pop() {
            Some((text, cursor)) => {
                self.redo_stack.push((std::mem::take(&mut self.text), self.cursor));
                self.text = text;
                self.cursor = cursor;
                true
            }
            None => false,
        }
    }

    pub fn redo(&mut self) -> bool {
        match self.redo_stack.pop() {
            Some((text, cursor)) => {
                self.undo_stack.push((std::mem::take(&mut self.text), self.cursor));
                self.text = text;
                self.cursor = cursor;
                true
            }
            None => false,
        }
    }

    pub fn insert_char(&mut self, c: char) {
        self.push_undo_state();
        self.text.insert(self.cursor, c);
        self.cursor += c.len_utf8();
    }

    pub fn insert_newline(&mut self) {
        self.insert_char('\n');
    }

    pub fn insert_str(&mut self, s: &str) {
        if s.is_empty() {
            return;
        }
        self.push_undo_state();
        self.text.insert_str(self.cursor, s);
        self.cursor += s.len();
    }

    /// Replace `start..end` with `replacement` without moving the cursor
    /// (beyond clamping it into the new text). Callers that need the cursor
    /// after the replacement place it themselves.
    pub fn replace_range(&mut self, start: usize, end: usize, replacement: &str) {
        let start = floor_char_boundary(&self.text, start);
        let end = floor_char_boundary(&self.text, end.max(start));
        self.push_undo_state();
        self.text.replace_range(start..end, replacement);
        self.cursor = floor_char_boundary(&self.text, self.cursor);
    }

    /// Backspace
    pub fn delete_char_before(&mut self) {
        if self.cursor == 0 {
            return;
        }
        self.push_undo_state();
        let prev = self.text[..self.cursor]
            .char_indices()
            .last()
            .map(|(i, _)| i)
            .unwrap_or(0);
        self.text.remove(prev);
        self.cursor = prev;
    }

    /// Delete
    pub fn delete_char_at(&mut self) {
        if self.cursor < self.text.len() {
            self.push_undo_state();
            self.text.remove(self.cursor);
        }
    }

    pub fn move_left(&mut self) {
        if self.cursor > 0 {
            self.cursor = self.text[..self.cursor]
                .char_indices()
                .last()
                .map(|(i, _)| i)
                .unwrap_or(0);
        }
    }

    pub fn move_right(&mut self) {
        if self.cursor < self.text.len() {
            self.cursor = self.text[self.cursor..]
                .char_indices()
                .nth(1)
                .map(|(i, _)| self.cursor + i)
                .unwrap_or(self.text.len());
        }
    }

    pub fn move_to_line_start(&mut self) {
        self.cursor = self.text[..self.cursor]
            .rfind('\n')
            .map(|i| i + 1)
            .unwrap_or(0);
    }

    pub fn move_to_line_end(&mut self) {
        self.cursor = self.text[self.cursor..]
            .find('\n')
            .map(|i| self.cursor + i)
            .unwrap_or(self.text.len());
    }

    pub fn kill_to_line_end(&mut self) {
        let end = self.text[self.cursor..]
            .find('\n')
            .map(|i| self.cursor + i)
            .unwrap_or(self.text.len());
        if self.cursor < end {
            self.push_undo_state();
            self.text.drain(self.cursor..end);
        }
    }

    pub fn kill_to_line_start(&mut self) {
        let start = self.text[..self.cursor]
            .rfind('\n')
            .map(|i| i + 1)
            .unwrap_or(0);
        if start < self.cursor {
            self.push_undo_state();
            self.text.drain(start..self.cursor);
            self.cursor = start;
        }
    }

    /// Ctrl+W: delete back to the start of the previous word.
    pub fn delete_word_backward(&mut self) {
        if self.cursor == 0 {
            return;
        }
        let trimmed = self.text[..self.cursor].trim_end();
        let word_start = trimmed
            .rfind(char::is_whitespace)
            .map(|i| i + trimmed[i..].chars().next().map_or(1, char::len_utf8))
            .unwrap_or(0);
        self.push_undo_state();
        self.text.drain(word_start..self.cursor);
        self.cursor = word_start;
    }

    pub fn move_word_left(&mut self) {
        let trimmed = self.text[..self.cursor].trim_end();
        self.cursor = trimmed
            .rfind(char::is_whitespace)
            .map(|i| i + trimmed[i..].chars().next().map_or(1, char::len_utf8))
            .unwrap_or(0);
    }

    pub fn move_word_right(&mut self) {
        let after = &self.text[self.cursor..];
        let word_end = after.find(char::is_whitespace).unwrap_or(after.len());
        let next_word = after[word_end..]
            .find(|c: char| !c.is_whitespace())
            .map(|i| word_end + i)
            .unwrap_or(after.len());
        self.cursor += next_word;
    }

    /// Move up one logical line, keeping the column where possible.
    pub fn move_up(&mut self) {
        let (row, col) = self.cursor_position();
        if row == 0 {
            self.cursor = 0;
            return;
        }
        let lines: Vec<&str> = self.text.split('\n').collect();
        let offset: usize = lines[..row - 1].iter().map(|l| l.len() + 1).sum();
        let target = offset + col.min(lines[row - 1].len());
        self.cursor = floor_char_boundary(&self.text, target);
    }

    /// Move down one logical line, keeping the column where possible.
    pub fn move_down(&mut self) {
        let (row, col) = self.cursor_position();
        let lines: Vec<&str> = self.text.split('\n').collect();
        if row + 1 >= lines.len() {
            self.cursor = self.text.len();
            return;
        }
        let offset: usize = lines[..=row].iter().map(|l| l.len() + 1).sum();
        let target = offset + col.min(lines[row + 1].len());
        self.cursor = floor_char_boundary(&self.text, target);
    }

    /// Reset to an empty buffer, dropping history.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn line_count(&self) -> usize {
        self.text.split('\n').count().max(1)
    }

    /// (row, byte column) of the cursor
    pub fn cursor_position(&self) -> (usize, usize) {
        let before = &self.text[..self.cursor];
        let row = before.matches('\n').count();
        let col = before
            .rfind('\n')
            .map(|i| self.cursor - i - 1)
            .unwrap_or(self.cursor);
        (row, col)
    }
}
