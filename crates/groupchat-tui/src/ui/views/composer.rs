use groupchat_core::composer::{Composer, EditBuffer, EmojiPalette, EMOJIS, EMOJI_COLUMNS};
use groupchat_core::constants::{ATTACHMENT_CHIP_CHARS, REPLY_PREVIEW_CHARS};
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::ui::app::{App, InputMode};
use crate::ui::format::{display_width, skip_columns, truncate_with_ellipsis, wrap_spans};
use crate::ui::theme;

const MAX_TEXT_ROWS: u16 = 8;
const POPUP_MAX_ROWS: usize = 6;
const POPUP_WIDTH: u16 = 36;

/// Rows the composer needs at `width`, borders included.
pub fn composer_height(app: &App, width: u16) -> u16 {
    let draft = app.conversation.composer().draft();
    let text_rows = text_lines(draft.text(), inner_width(width)).len() as u16;
    let mut height = text_rows.clamp(1, MAX_TEXT_ROWS) + 2;
    if draft.reply_target().is_some() {
        height += 1;
    }
    if !draft.staged().is_empty() {
        height += 1;
    }
    height
}

fn inner_width(width: u16) -> usize {
    width.saturating_sub(2).max(1) as usize
}

fn text_lines(text: &str, width: usize) -> Vec<Line<'static>> {
    wrap_spans(vec![Span::styled(text.to_string(), theme::text_primary())], width)
}

/// Visual `(row, col)` of the caret after wrapping at `width`.
pub(crate) fn cursor_position(text: &str, cursor: usize, width: usize) -> (usize, usize) {
    let before = &text[..cursor.min(text.len())];
    let lines = wrap_spans(vec![Span::raw(before.to_string())], width);
    let row = lines.len() - 1;
    let col = lines
        .last()
        .map(|l| l.spans.iter().map(|s| display_width(&s.content)).sum())
        .unwrap_or(0);
    if col >= width {
        (row + 1, 0)
    } else {
        (row, col)
    }
}

pub fn render_composer(f: &mut Frame, app: &App, area: Rect) {
    let composer = app.conversation.composer();
    let draft = composer.draft();
    let active = app.input_mode == InputMode::Editing && app.attach_prompt.is_none();

    let title = if draft.is_sending() { " Sending… " } else { " Message " };
    let border = if active { theme::BORDER_ACTIVE } else { theme::BORDER_INACTIVE };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border))
        .title(Span::styled(title, theme::text_muted()))
        .style(Style::default().bg(theme::BG_INPUT));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let width = inner.width.max(1) as usize;
    let mut lines: Vec<Line> = Vec::new();

    if let Some(target) = draft.reply_target() {
        let text = format!(
            "↩ Replying to {}: {}",
            target.author_name,
            target.preview(REPLY_PREVIEW_CHARS)
        );
        lines.push(Line::from(vec![
            Span::styled(
                truncate_with_ellipsis(&text, width.saturating_sub(6)),
                theme::text_muted().add_modifier(Modifier::ITALIC),
            ),
            Span::styled(" (Esc)", theme::text_dim()),
        ]));
    }

    if !draft.staged().is_empty() {
        let mut chips = Vec::new();
        for (index, file) in draft.staged().files().iter().enumerate() {
            let color = if file.is_image() {
                theme::ACCENT_SPECIAL
            } else {
                theme::ACCENT_WARNING
            };
            let mut style = Style::default().fg(color);
            if app.chip_focus == Some(index) {
                style = style.add_modifier(Modifier::REVERSED);
            }
            chips.push(Span::styled(
                format!("[{}]", file.short_name(ATTACHMENT_CHIP_CHARS)),
                style,
            ));
            chips.push(Span::raw(" "));
        }
        let hint = if app.chip_focus.is_some() {
            "←/→ pick · Del remove · Esc done"
        } else {
            "Ctrl+X remove"
        };
        chips.push(Span::styled(hint, theme::text_dim()));
        lines.push(Line::from(chips));
    }

    let header_rows = lines.len();
    let text_area_rows = (inner.height as usize).saturating_sub(header_rows).max(1);
    let (cursor_row, cursor_col) = cursor_position(draft.text(), draft.cursor(), width);
    let scroll = (cursor_row + 1).saturating_sub(text_area_rows);

    if draft.text().is_empty() {
        let placeholder = if active { "Type a message, @ to mention" } else { "" };
        lines.push(Line::from(Span::styled(placeholder, theme::text_dim())));
    } else {
        let text = text_lines(draft.text(), width);
        lines.extend(text.into_iter().skip(scroll).take(text_area_rows));
    }
    f.render_widget(Paragraph::new(lines), inner);

    if active {
        f.set_cursor_position((
            inner.x + cursor_col as u16,
            inner.y + (header_rows + cursor_row - scroll) as u16,
        ));
    }

    if !active {
        return;
    }
    if let Some(palette) = app.emoji_palette.as_ref() {
        render_emoji_palette(f, palette, area);
    } else if composer.picker_visible() {
        render_mention_popup(f, composer, area);
    }
}

/// Emoji grid, drawn just above the composer.
fn render_emoji_palette(f: &mut Frame, palette: &EmojiPalette, composer_area: Rect) {
    let height = (EmojiPalette::rows() as u16 + 2).min(composer_area.y);
    if height < 3 {
        return;
    }
    // Three cells per emoji: a space and a double-width glyph
    let width = ((EMOJI_COLUMNS * 3) as u16 + 3).min(composer_area.width.saturating_sub(1));
    let area = Rect::new(composer_area.x + 1, composer_area.y - height, width, height);

    let lines: Vec<Line> = EMOJIS
        .chunks(EMOJI_COLUMNS)
        .enumerate()
        .map(|(row, chunk)| {
            let spans: Vec<Span> = chunk
                .iter()
                .enumerate()
                .map(|(col, emoji)| {
                    let style = if row * EMOJI_COLUMNS + col == palette.selected_index() {
                        Style::default().bg(theme::ACCENT_PRIMARY)
                    } else {
                        Style::default()
                    };
                    Span::styled(format!(" {}", emoji), style)
                })
                .collect();
            Line::from(spans)
        })
        .collect();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme::BORDER_ACTIVE))
        .title(Span::styled(" Emoji ", theme::text_muted()))
        .style(Style::default().bg(theme::BG_POPUP));
    f.render_widget(Clear, area);
    f.render_widget(Paragraph::new(lines).block(block), area);
}

/// Candidate dropdown, drawn just above the composer.
fn render_mention_popup(f: &mut Frame, composer: &Composer, composer_area: Rect) {
    let picker = composer.picker();
    let candidates = picker.candidates();
    let rows = candidates.len().clamp(1, POPUP_MAX_ROWS);
    let height = (rows as u16 + 2).min(composer_area.y);
    if height < 3 {
        return;
    }
    let width = POPUP_WIDTH.min(composer_area.width);
    let area = Rect::new(
        composer_area.x + 1,
        composer_area.y - height,
        width.saturating_sub(1),
        height,
    );

    // Keep the highlighted row inside the window
    let first = (picker.selected_index() + 1).saturating_sub(rows);
    let inner_width = area.width.saturating_sub(4) as usize;
    let mut lines: Vec<Line> = candidates
        .iter()
        .enumerate()
        .skip(first)
        .take(rows)
        .map(|(index, candidate)| {
            let selected = index == picker.selected_index();
            let row_style = if selected { theme::selected_row() } else { Style::default() };
            let mut spans = vec![
                Span::styled(
                    if selected { "› " } else { "  " },
                    Style::default().fg(theme::ACCENT_PRIMARY),
                ),
                Span::styled(
                    truncate_with_ellipsis(&candidate.display_name, inner_width),
                    theme::author(&candidate.display_name),
                ),
            ];
            if let Some(email) = candidate.email.as_deref() {
                let room = inner_width.saturating_sub(display_width(&candidate.display_name) + 1);
                if room > 4 {
                    let email = format!(" {}", truncate_with_ellipsis(email, room));
                    spans.push(Span::styled(email, theme::text_dim()));
                }
            }
            Line::from(spans).style(row_style)
        })
        .collect();
    if lines.is_empty() {
        lines.push(Line::from(Span::styled("  No matching members", theme::text_dim())));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme::BORDER_ACTIVE))
        .style(Style::default().bg(theme::BG_POPUP));
    f.render_widget(Clear, area);
    f.render_widget(Paragraph::new(lines).block(block), area);
}

/// Path entry opened with Ctrl+O, drawn over the composer.
pub fn render_attach_prompt(f: &mut Frame, prompt: &EditBuffer, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme::ACCENT_PRIMARY))
        .title(Span::styled(" Attach file (Enter to add, Esc to cancel) ", theme::text_muted()))
        .style(Style::default().bg(theme::BG_POPUP));
    let inner = block.inner(area);
    f.render_widget(Clear, area);
    f.render_widget(block, area);

    let width = inner.width.max(1) as usize;
    let text = prompt.text();
    let before = &text[..prompt.cursor().min(text.len())];
    // Show the tail when the path is wider than the box
    let caret = display_width(before);
    let (visible, skipped) = skip_columns(text, caret.saturating_sub(width.saturating_sub(1)));
    f.render_widget(
        Paragraph::new(Span::styled(visible.to_string(), theme::text_primary())),
        inner,
    );
    f.set_cursor_position((inner.x + caret.saturating_sub(skipped) as u16, inner.y));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_position_wraps() {
        assert_eq!(cursor_position("", 0, 10), (0, 0));
        assert_eq!(cursor_position("hello", 5, 10), (0, 5));
        assert_eq!(cursor_position("hello world", 11, 5), (2, 1));
        assert_eq!(cursor_position("abcde", 5, 5), (1, 0));
        assert_eq!(cursor_position("ab\ncd", 4, 10), (1, 1));
        assert_eq!(cursor_position("ab\n", 3, 10), (1, 0));
    }
}
