use groupchat_core::SubView;
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::Style,
    widgets::Block,
    Frame,
};

use crate::ui::components::{render_header, render_statusbar};
use crate::ui::{layout, theme, views, App};

pub(crate) fn render(f: &mut Frame, app: &App) {
    let bg_block = Block::default().style(Style::default().bg(theme::BG_APP));
    f.render_widget(bg_block, f.area());

    let area = f.area();
    let composer_height = if app.sub_view() == SubView::Chat {
        views::composer_height(app, area.width)
    } else {
        0
    };

    let chunks = Layout::vertical([
        Constraint::Length(layout::HEADER_HEIGHT),
        Constraint::Min(0),
        Constraint::Length(composer_height),
        Constraint::Length(layout::STATUSBAR_HEIGHT),
    ])
    .split(area);
    let (header_area, body_area, composer_area, status_area) =
        (chunks[0], chunks[1], chunks[2], chunks[3]);

    render_header(f, app, header_area);

    let content = Rect {
        x: body_area.x + layout::CONTENT_PADDING_H,
        width: body_area.width.saturating_sub(layout::CONTENT_PADDING_H * 2),
        ..body_area
    };
    match app.sub_view() {
        SubView::Chat => {
            views::render_chat(f, app, content);
            views::render_composer(f, app, composer_area);
        }
        SubView::Attachments => views::render_attachments(f, app, content),
        SubView::Members => views::render_members(f, app, content),
    }

    if let Some(prompt) = app.attach_prompt.as_ref() {
        let height = layout::ATTACH_PROMPT_HEIGHT.min(body_area.height);
        let prompt_area = Rect {
            y: body_area.bottom().saturating_sub(height),
            height,
            ..body_area
        };
        views::render_attach_prompt(f, prompt, prompt_area);
    }

    if let Some(picker) = app.forward.as_ref() {
        views::render_forward(f, picker, body_area);
    }

    render_statusbar(f, app, status_area);
}
