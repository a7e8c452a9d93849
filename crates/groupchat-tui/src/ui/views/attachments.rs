use groupchat_core::models::{Message, RemoteAttachment};
use ratatui::{
    layout::Rect,
    style::Modifier,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::ui::app::App;
use crate::ui::format::{format_timestamp, truncate_with_ellipsis};
use crate::ui::theme;

type Entry<'a> = (&'a Message, &'a RemoteAttachment);

/// Images first, then other files, each group newest first.
pub(crate) fn grouped(attachments: Vec<Entry<'_>>) -> (Vec<Entry<'_>>, Vec<Entry<'_>>) {
    attachments.into_iter().partition(|(_, a)| a.is_image())
}

/// Every file shared in the loaded messages. Two rows per file: name, then
/// sender, date and URL.
pub fn render_attachments(f: &mut Frame, app: &App, area: Rect) {
    let all = app.conversation.messages().attachments();
    if all.is_empty() {
        let empty = Paragraph::new(Line::from(Span::styled(
            "No files shared in this conversation yet",
            theme::text_muted(),
        )));
        f.render_widget(empty, area);
        return;
    }

    let total = all.len();
    let selected = app.attachments_scroll.min(total - 1);
    let (images, files) = grouped(all);
    let width = area.width as usize;

    let mut lines = Vec::new();
    let mut selected_range = (0, 0);
    let mut index = 0;
    for (title, group) in [("Images", &images), ("Files", &files)] {
        if group.is_empty() {
            continue;
        }
        lines.push(Line::from(Span::styled(
            format!("{} ({})", title, group.len()),
            theme::text_muted().add_modifier(Modifier::BOLD),
        )));
        for (message, attachment) in group.iter() {
            let start = lines.len();
            let mut rows = attachment_rows(message, attachment, width);
            if index == selected {
                rows = rows
                    .into_iter()
                    .map(|l| l.patch_style(theme::selected_row()))
                    .collect();
            }
            lines.extend(rows);
            if index == selected {
                selected_range = (start, lines.len());
            }
            index += 1;
        }
        lines.push(Line::default());
    }

    let height = area.height as usize;
    let offset = selected_range.1.saturating_sub(height);
    let visible: Vec<Line> = lines.into_iter().skip(offset).take(height).collect();
    f.render_widget(Paragraph::new(visible), area);
}

fn attachment_rows(
    message: &Message,
    attachment: &RemoteAttachment,
    width: usize,
) -> Vec<Line<'static>> {
    let icon = if attachment.is_image() { "🖼 " } else { "📎 " };
    let name = Line::from(vec![
        Span::styled(icon, theme::text_muted()),
        Span::styled(
            truncate_with_ellipsis(attachment.display_name(), width.saturating_sub(3)),
            theme::text_primary(),
        ),
    ]);
    let when = format_timestamp(&message.created_at.with_timezone(&chrono::Local));
    let detail = Line::from(vec![
        Span::raw("   "),
        Span::styled(message.author_name.clone(), theme::author(&message.author_name)),
        Span::styled(format!(" · {} · ", when), theme::text_dim()),
        Span::styled(
            truncate_with_ellipsis(&attachment.url, width.saturating_sub(30)),
            theme::text_dim(),
        ),
    ]);
    vec![name, detail]
}
