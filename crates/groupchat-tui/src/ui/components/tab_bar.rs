use groupchat_core::SubView;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::ui::app::App;
use crate::ui::format::truncate_with_ellipsis;
use crate::ui::theme;

/// Title of the conversation. Falls back to the id until the roster arrives.
pub(crate) fn conversation_title(app: &App) -> String {
    let roster = app.conversation.roster();
    if roster.name.trim().is_empty() {
        format!("Conversation #{}", app.conversation.context().conversation_id)
    } else {
        roster.name.clone()
    }
}

/// Two rows: conversation title, then the sub-view tabs.
pub fn render_header(f: &mut Frame, app: &App, area: Rect) {
    let member_count = app.conversation.roster().users.len();
    let title_color = if app.pending_quit {
        theme::ACCENT_ERROR
    } else {
        theme::ACCENT_PRIMARY
    };
    let mut title = vec![
        Span::raw(" "),
        Span::styled(
            truncate_with_ellipsis(&conversation_title(app), area.width.saturating_sub(20) as usize),
            Style::default().fg(title_color).add_modifier(Modifier::BOLD),
        ),
    ];
    if member_count > 0 {
        title.push(Span::styled(format!("  · {} members", member_count), theme::text_dim()));
    }

    let mut tabs = vec![Span::raw(" ")];
    for view in SubView::ALL {
        let label = format!(" {} {} ", view.index() + 1, view.label());
        let style = if view == app.sub_view() {
            theme::tab_active()
        } else {
            theme::tab_inactive()
        };
        tabs.push(Span::styled(label, style));
        tabs.push(Span::raw(" "));
    }

    let lines = vec![Line::from(title), Line::from(tabs)];
    f.render_widget(Paragraph::new(lines).style(Style::default().bg(theme::BG_APP)), area);
}
