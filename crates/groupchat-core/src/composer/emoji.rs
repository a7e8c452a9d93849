//! Emoji palette opened from the composer. Picking inserts at the caret and
//! leaves the palette open for more.

pub const EMOJIS: &[&str] = &[
    "😀", "😃", "😄", "😁", "😆", "😅", "😂", "🙂",
    "😉", "😊", "😍", "😘", "😎", "🤔", "😐", "😴",
    "😢", "😭", "😡", "😱", "🙏", "👍", "👎", "👌",
    "👏", "🙌", "💪", "👋", "✅", "❌", "⚠️", "🔥",
    "🎉", "❤️", "💯", "⭐", "🚨", "🔒", "🔑", "📌",
    "📎", "📷", "📞", "🕒", "🚗", "🏢", "🧯", "🛠️",
];

/// Emojis per palette row
pub const EMOJI_COLUMNS: usize = 8;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmojiPalette {
    index: usize,
}

impl EmojiPalette {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected_index(&self) -> usize {
        self.index
    }

    pub fn selected(&self) -> &'static str {
        EMOJIS[self.index.min(EMOJIS.len() - 1)]
    }

    pub fn rows() -> usize {
        EMOJIS.len().div_ceil(EMOJI_COLUMNS)
    }

    pub fn move_left(&mut self) {
        self.index = self.index.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        if self.index + 1 < EMOJIS.len() {
            self.index += 1;
        }
    }

    pub fn move_up(&mut self) {
        self.index = self.index.saturating_sub(EMOJI_COLUMNS);
    }

    pub fn move_down(&mut self) {
        if self.index + EMOJI_COLUMNS < EMOJIS.len() {
            self.index += EMOJI_COLUMNS;
        }
    }
}
