use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::ui::app::App;
use crate::ui::format::truncate_with_ellipsis;
use crate::ui::theme;

pub fn render_members(f: &mut Frame, app: &App, area: Rect) {
    let roster = app.conversation.roster();
    let chunks = Layout::vertical([Constraint::Min(0), Constraint::Length(1)]).split(area);
    let (list_area, footer_area) = (chunks[0], chunks[1]);

    if roster.users.is_empty() {
        let empty = Paragraph::new(Line::from(Span::styled("Loading members…", theme::text_muted())));
        f.render_widget(empty, list_area);
        return;
    }

    let height = list_area.height as usize;
    let first = (app.selected_member + 1).saturating_sub(height.max(1));
    let own_id = app.conversation.context().current_user_id;
    let width = list_area.width as usize;

    let lines: Vec<Line> = roster
        .users
        .iter()
        .enumerate()
        .skip(first)
        .take(height)
        .map(|(index, user)| {
            let mut spans = vec![
                Span::styled(
                    format!(" {} ", user.initial()),
                    Style::default()
                        .fg(theme::BG_APP)
                        .bg(theme::user_color(&user.display_name))
                        .add_modifier(Modifier::BOLD),
                ),
                Span::raw(" "),
                Span::styled(
                    truncate_with_ellipsis(&user.display_name, width.saturating_sub(6)),
                    theme::text_primary(),
                ),
            ];
            if user.id == own_id {
                spans.push(Span::styled(" (you)", theme::text_dim()));
            }
            if let Some(email) = user.email.as_deref() {
                spans.push(Span::styled(format!("  {}", email), theme::text_dim()));
            }
            let line = Line::from(spans);
            if index == app.selected_member {
                line.style(theme::selected_row())
            } else {
                line
            }
        })
        .collect();
    f.render_widget(Paragraph::new(lines), list_area);

    let footer = match app.confirm_remove.and_then(|id| roster.member(id)) {
        Some(user) => Line::from(vec![
            Span::styled(
                format!("Remove {} from the group? ", user.display_name),
                Style::default().fg(theme::ACCENT_ERROR).add_modifier(Modifier::BOLD),
            ),
            Span::styled("y to confirm, any other key to cancel", theme::text_muted()),
        ]),
        None => Line::from(Span::styled(
            format!("{} members · d remove · r reload", roster.users.len()),
            theme::text_dim(),
        )),
    };
    f.render_widget(Paragraph::new(footer), footer_area);
}
