// Bottom row: toast or key hints on the left, sync state on the right

use groupchat_core::{SubView, SyncState};
use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::ui::app::{App, InputMode};
use crate::ui::format::truncate_with_ellipsis;
use crate::ui::notifications::NotificationLevel;
use crate::ui::theme;

const SYNC_COLUMN_WIDTH: u16 = 10;

fn hint(app: &App) -> &'static str {
    match (app.sub_view(), app.input_mode) {
        (SubView::Chat, InputMode::Editing) => {
            "Enter send · Shift+Enter newline · Ctrl+O attach · Alt+E emoji · Esc browse"
        }
        (SubView::Chat, InputMode::Normal) => {
            "j/k select · r reply · f forward · p pin · i write · Tab views · q quit"
        }
        (SubView::Attachments, _) => "j/k scroll · Tab views · q quit",
        (SubView::Members, _) => "j/k select · d remove · r reload · q quit",
    }
}

pub fn render_statusbar(f: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::horizontal([
        Constraint::Min(0),
        Constraint::Length(SYNC_COLUMN_WIDTH),
    ])
    .split(area);
    let width = chunks[0].width.saturating_sub(3) as usize;

    let left = if app.pending_quit {
        Line::from(Span::styled(
            " Press Ctrl+C again to quit",
            Style::default().fg(theme::ACCENT_ERROR),
        ))
    } else if let Some(notification) = app.current_notification() {
        let color = match notification.level {
            NotificationLevel::Info => theme::ACCENT_PRIMARY,
            NotificationLevel::Success => theme::ACCENT_SUCCESS,
            NotificationLevel::Warning => theme::ACCENT_WARNING,
            NotificationLevel::Error => theme::ACCENT_ERROR,
        };
        Line::from(vec![
            Span::styled(format!(" {} ", notification.level.icon()), Style::default().fg(color)),
            Span::styled(
                truncate_with_ellipsis(&notification.message, width),
                Style::default().fg(color),
            ),
        ])
    } else {
        let hint = format!(" {}", truncate_with_ellipsis(hint(app), width));
        Line::from(Span::styled(hint, theme::text_dim()))
    };
    f.render_widget(Paragraph::new(left), chunks[0]);

    let sync = match app.sync_state {
        SyncState::Polling => Span::styled("● live ", Style::default().fg(theme::ACCENT_SUCCESS)),
        SyncState::Idle => Span::styled("○ paused ", theme::text_dim()),
    };
    f.render_widget(
        Paragraph::new(Line::from(sync)).alignment(Alignment::Right),
        chunks[1],
    );
}
