use groupchat_core::constants::REPLY_PREVIEW_CHARS;
use groupchat_core::ForwardPicker;
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::ui::format::truncate_with_ellipsis;
use crate::ui::theme;

const MAX_WIDTH: u16 = 60;

fn centered(area: Rect) -> Rect {
    let width = MAX_WIDTH.min(area.width.saturating_sub(4));
    let height = (area.height * 7 / 10).max(8).min(area.height);
    Rect::new(
        area.x + (area.width.saturating_sub(width)) / 2,
        area.y + (area.height.saturating_sub(height)) / 2,
        width,
        height,
    )
}

/// Forward dialog: filter line, message preview, target list with checkboxes.
pub fn render_forward(f: &mut Frame, picker: &ForwardPicker, area: Rect) {
    let popup = centered(area);
    let chosen = picker.chosen_count();
    let title = if chosen > 0 {
        format!(" Forward message ({} selected) ", chosen)
    } else {
        " Forward message ".to_string()
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme::ACCENT_PRIMARY))
        .title(Span::styled(title, theme::text_muted()))
        .style(Style::default().bg(theme::BG_POPUP));
    let inner = block.inner(popup);
    f.render_widget(Clear, popup);
    f.render_widget(block, popup);

    let chunks = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .split(inner);
    let width = inner.width as usize;

    let search = if picker.filter().is_empty() {
        Span::styled("Search conversations or groups…", theme::text_dim())
    } else {
        Span::styled(picker.filter().to_string(), theme::text_primary())
    };
    f.render_widget(
        Paragraph::new(Line::from(vec![Span::styled("🔍 ", theme::text_muted()), search])),
        chunks[0],
    );

    let message = picker.message();
    let preview = format!("↪ {}: {}", message.author_name, message.preview(REPLY_PREVIEW_CHARS));
    f.render_widget(
        Paragraph::new(Span::styled(
            truncate_with_ellipsis(&preview, width),
            theme::text_muted().add_modifier(Modifier::ITALIC),
        )),
        chunks[1],
    );

    let list_area = chunks[2];
    let targets = picker.filtered();
    let lines: Vec<Line> = if picker.is_loading() {
        vec![Line::from(Span::styled("Loading chats…", theme::text_muted()))]
    } else if targets.is_empty() {
        vec![Line::from(Span::styled(
            "No conversations or groups found",
            theme::text_muted(),
        ))]
    } else {
        let height = list_area.height.max(1) as usize;
        let first = (picker.selected_index() + 1).saturating_sub(height);
        targets
            .iter()
            .enumerate()
            .skip(first)
            .take(height)
            .map(|(index, target)| {
                let checked = picker.is_chosen(target.destination);
                let (checkbox, checkbox_style) = if checked {
                    ("[✓] ", Style::default().fg(theme::ACCENT_SUCCESS))
                } else {
                    ("[ ] ", theme::text_muted())
                };
                let kind = if target.is_group() { "group  " } else { "direct " };
                let name = if target.name.is_empty() { "Untitled" } else { &target.name };
                let line = Line::from(vec![
                    Span::styled(checkbox, checkbox_style),
                    Span::styled(kind, theme::text_dim()),
                    Span::styled(
                        truncate_with_ellipsis(name, width.saturating_sub(11)),
                        theme::author(name),
                    ),
                ]);
                if index == picker.selected_index() {
                    line.style(theme::selected_row())
                } else {
                    line
                }
            })
            .collect()
    };
    f.render_widget(Paragraph::new(lines), list_area);

    let footer = "Space select · Enter forward · Esc cancel";
    f.render_widget(
        Paragraph::new(Span::styled(truncate_with_ellipsis(footer, width), theme::text_dim())),
        chunks[3],
    );
}
