// Colors and shared styles for the conversation screen

use ratatui::style::{Color, Modifier, Style};

// Backgrounds
pub const BG_APP: Color = Color::Rgb(0, 0, 0);
pub const BG_CARD: Color = Color::Rgb(18, 18, 18);
pub const BG_SELECTED: Color = Color::Rgb(32, 32, 32);
pub const BG_TAB_ACTIVE: Color = Color::Rgb(28, 28, 32);
pub const BG_INPUT: Color = Color::Rgb(18, 18, 18);
pub const BG_POPUP: Color = Color::Rgb(23, 23, 23);

// Text
pub const TEXT_PRIMARY: Color = Color::Rgb(220, 220, 220);
pub const TEXT_MUTED: Color = Color::Rgb(128, 128, 128);
pub const TEXT_DIM: Color = Color::Rgb(90, 90, 90);

// Accents
pub const ACCENT_PRIMARY: Color = Color::Rgb(86, 156, 214);
pub const ACCENT_SUCCESS: Color = Color::Rgb(106, 153, 85);
pub const ACCENT_WARNING: Color = Color::Rgb(206, 145, 120);
pub const ACCENT_ERROR: Color = Color::Rgb(244, 112, 112);
pub const ACCENT_SPECIAL: Color = Color::Rgb(169, 154, 203);

pub const BORDER_ACTIVE: Color = Color::Rgb(100, 100, 100);
pub const BORDER_INACTIVE: Color = Color::Rgb(60, 60, 60);

/// Author colors, picked deterministically per user
pub const USER_PALETTE: [Color; 8] = [
    Color::Rgb(86, 156, 214),
    Color::Rgb(106, 153, 85),
    Color::Rgb(169, 154, 203),
    Color::Rgb(206, 145, 120),
    Color::Rgb(78, 154, 154),
    Color::Rgb(180, 180, 120),
    Color::Rgb(180, 100, 100),
    Color::Rgb(140, 140, 170),
];

/// Mention highlight colors, cycled per mention within a message
pub const MENTION_PALETTE: [Color; 4] = [
    Color::Rgb(86, 156, 214),
    Color::Rgb(206, 145, 120),
    Color::Rgb(106, 153, 85),
    Color::Rgb(169, 154, 203),
];

pub fn user_color(name: &str) -> Color {
    let hash: usize = name.bytes().map(|b| b as usize).sum();
    USER_PALETTE[hash % USER_PALETTE.len()]
}

pub fn mention_color(ordinal: usize) -> Color {
    MENTION_PALETTE[ordinal % MENTION_PALETTE.len()]
}

pub fn text_primary() -> Style {
    Style::default().fg(TEXT_PRIMARY)
}

pub fn text_muted() -> Style {
    Style::default().fg(TEXT_MUTED)
}

pub fn text_dim() -> Style {
    Style::default().fg(TEXT_DIM)
}

pub fn author(name: &str) -> Style {
    Style::default()
        .fg(user_color(name))
        .add_modifier(Modifier::BOLD)
}

pub fn mention(ordinal: usize) -> Style {
    Style::default()
        .fg(mention_color(ordinal))
        .add_modifier(Modifier::BOLD)
}

pub fn tab_active() -> Style {
    Style::default()
        .fg(ACCENT_PRIMARY)
        .bg(BG_TAB_ACTIVE)
        .add_modifier(Modifier::BOLD)
}

pub fn tab_inactive() -> Style {
    Style::default().fg(TEXT_MUTED)
}

pub fn selected_row() -> Style {
    Style::default().bg(BG_SELECTED)
}

pub fn marker(color: Color) -> Style {
    Style::default().fg(color).add_modifier(Modifier::ITALIC)
}
