use groupchat_core::constants::REPLY_PREVIEW_CHARS;
use groupchat_core::models::{split_mentions, BodySegment, Message};
use groupchat_core::MessageList;
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::ui::app::{App, InputMode};
use crate::ui::format::{display_width, format_timestamp, truncate_with_ellipsis, wrap_spans};
use crate::ui::theme;

/// Left gutter of every card: colored bar plus a space
const GUTTER: usize = 2;

pub fn render_chat(f: &mut Frame, app: &App, area: Rect) {
    let messages = app.conversation.messages();
    let pinned = messages.pinned().next();

    let (pinned_area, list_area) = if pinned.is_some() {
        let chunks = Layout::vertical([Constraint::Length(1), Constraint::Min(0)]).split(area);
        (Some(chunks[0]), chunks[1])
    } else {
        (None, area)
    };

    if let (Some(pinned_area), Some(message)) = (pinned_area, pinned) {
        let count = messages.pinned().count();
        f.render_widget(
            Paragraph::new(pinned_line(message, count, pinned_area.width)),
            pinned_area,
        );
    }

    if messages.is_empty() {
        let empty = Paragraph::new(Line::from(Span::styled(
            "No messages yet. Say hello!",
            theme::text_muted(),
        )));
        f.render_widget(empty, list_area);
        return;
    }

    let selected = (app.input_mode == InputMode::Normal).then_some(app.selected_message);
    let (lines, spans) = build_lines(app, messages, list_area.width as usize, selected);
    let selected_span = selected.and_then(|i| spans.get(i).copied());
    let offset = scroll_offset(lines.len(), list_area.height as usize, selected_span);
    let visible: Vec<Line> = lines
        .into_iter()
        .skip(offset)
        .take(list_area.height as usize)
        .collect();
    f.render_widget(Paragraph::new(visible), list_area);
}

fn pinned_line(message: &Message, count: usize, width: u16) -> Line<'static> {
    let suffix = if count > 1 { format!(" (+{})", count - 1) } else { String::new() };
    let label = "📌 ";
    let used = display_width(label) + display_width(&message.author_name) + suffix.len() + 2;
    let budget = (width as usize).saturating_sub(used);
    Line::from(vec![
        Span::styled(label, theme::marker(theme::ACCENT_WARNING)),
        Span::styled(message.author_name.clone(), theme::author(&message.author_name)),
        Span::styled(": ", theme::text_muted()),
        Span::styled(
            truncate_with_ellipsis(&message.preview(REPLY_PREVIEW_CHARS), budget),
            theme::text_primary(),
        ),
        Span::styled(suffix, theme::text_dim()),
    ])
    .style(Style::default().bg(theme::BG_CARD))
}

/// All card lines oldest first, plus the `[start, end)` line range of each
/// message indexed newest first.
fn build_lines(
    app: &App,
    messages: &MessageList,
    width: usize,
    selected: Option<usize>,
) -> (Vec<Line<'static>>, Vec<(usize, usize)>) {
    let mut lines = Vec::new();
    let mut spans = vec![(0, 0); messages.len()];

    for (index, message) in messages.messages().iter().enumerate().rev() {
        let start = lines.len();
        let own = app.conversation.is_own(message);
        let mut card = message_card(message, messages, own, width);
        if selected == Some(index) {
            card = card.into_iter().map(|l| l.patch_style(theme::selected_row())).collect();
        }
        lines.extend(card);
        spans[index] = (start, lines.len());
        lines.push(Line::default());
    }
    (lines, spans)
}

/// Bottom-anchored unless the selected message would fall outside.
fn scroll_offset(total: usize, height: usize, selected: Option<(usize, usize)>) -> usize {
    let mut offset = total.saturating_sub(height);
    if let Some((start, end)) = selected {
        if start < offset {
            offset = start;
        } else if end > offset + height {
            offset = end.saturating_sub(height);
        }
    }
    offset
}

pub(crate) fn message_card(
    message: &Message,
    list: &MessageList,
    own: bool,
    width: usize,
) -> Vec<Line<'static>> {
    let bar_color = theme::user_color(&message.author_name);
    let bar = || Span::styled("▌ ", Style::default().fg(bar_color));
    let mut lines = Vec::new();

    let mut header = vec![
        bar(),
        Span::styled(message.author_name.clone(), theme::author(&message.author_name)),
    ];
    if own {
        header.push(Span::styled(" (you)", theme::text_dim()));
    }
    let local_time = message.created_at.with_timezone(&chrono::Local);
    header.push(Span::styled(format!("  {}", format_timestamp(&local_time)), theme::text_dim()));
    if message.is_forwarded {
        header.push(Span::styled("  Forwarded", theme::marker(theme::ACCENT_SPECIAL)));
    }
    if message.is_pinned {
        header.push(Span::styled("  Pinned", theme::marker(theme::ACCENT_WARNING)));
    }
    lines.push(Line::from(header));

    if let Some(parent_id) = message.parent_id {
        let quoted = match list.find(parent_id) {
            Some(parent) => format!(
                "↳ {}: {}",
                parent.author_name,
                parent.preview(REPLY_PREVIEW_CHARS)
            ),
            None => "↳ reply to an earlier message".to_string(),
        };
        lines.push(Line::from(vec![
            bar(),
            Span::styled(
                truncate_with_ellipsis(&quoted, width.saturating_sub(GUTTER)),
                theme::text_muted().add_modifier(Modifier::ITALIC),
            ),
        ]));
    }

    if !message.body.is_empty() {
        for line in wrap_spans(body_spans(&message.body), width.saturating_sub(GUTTER)) {
            let mut spans = vec![bar()];
            spans.extend(line.spans);
            lines.push(Line::from(spans));
        }
    }

    for attachment in &message.attachments {
        let icon = if attachment.is_image() { "🖼 " } else { "📎 " };
        lines.push(Line::from(vec![
            bar(),
            Span::styled(icon, theme::text_muted()),
            Span::styled(
                truncate_with_ellipsis(attachment.display_name(), width.saturating_sub(GUTTER + 3)),
                Style::default().fg(theme::ACCENT_PRIMARY).add_modifier(Modifier::UNDERLINED),
            ),
        ]));
    }
    lines
}

/// Body text with mentions highlighted, one color per mention in order.
pub(crate) fn body_spans(body: &str) -> Vec<Span<'static>> {
    split_mentions(body)
        .into_iter()
        .map(|segment| match segment {
            BodySegment::Text(text) => Span::styled(text.to_string(), theme::text_primary()),
            BodySegment::Mention { raw, ordinal, .. } => {
                Span::styled(raw.to_string(), theme::mention(ordinal))
            }
        })
        .collect()
}
