use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use groupchat_core::SubView;

use crate::ui::app::{App, Command, InputMode};

pub fn handle_key(app: &mut App, key: KeyEvent) -> Option<Command> {
    // Alt+1..3 jumps between tabs from anywhere
    if key.modifiers.contains(KeyModifiers::ALT) {
        if let KeyCode::Char(c @ '1'..='3') = key.code {
            return switch_to_index(app, c);
        }
    }

    if app.attach_prompt.is_some() {
        handle_attach_prompt_key(app, key);
        return None;
    }
    if app.forward.is_some() {
        return handle_forward_key(app, key);
    }

    match (app.sub_view(), app.input_mode) {
        (SubView::Chat, InputMode::Editing) => handle_composer_key(app, key),
        (SubView::Chat, InputMode::Normal) => handle_chat_normal_key(app, key),
        (SubView::Attachments, _) => handle_attachments_key(app, key),
        (SubView::Members, _) => handle_members_key(app, key),
    }
}

/// Bracketed paste. A single existing file path is staged as an attachment;
/// anything else is inserted as text.
pub fn handle_paste(app: &mut App, text: &str) {
    if let Some(prompt) = app.attach_prompt.as_mut() {
        prompt.insert_str(text.trim());
        return;
    }
    if app.sub_view() != SubView::Chat || app.input_mode != InputMode::Editing {
        return;
    }
    if let Some(path) = pasted_file_path(text) {
        app.stage_file(&path);
        return;
    }
    let normalized = text.replace("\r\n", "\n").replace('\r', "\n");
    app.conversation.edit(|buf| buf.insert_str(&normalized));
}

fn switch_to_index(app: &mut App, c: char) -> Option<Command> {
    let index = c.to_digit(10)? as usize;
    let view = *SubView::ALL.get(index.checked_sub(1)?)?;
    app.set_sub_view(view)
}

/// Keys shared by every Normal-mode screen.
fn handle_common_normal_key(app: &mut App, key: KeyEvent) -> Option<Command> {
    match key.code {
        KeyCode::Tab => app.set_sub_view(app.sub_view().next()),
        KeyCode::BackTab => app.set_sub_view(app.sub_view().prev()),
        KeyCode::Char(c @ '1'..='3') => switch_to_index(app, c),
        KeyCode::Char('q') => {
            app.quit();
            None
        }
        KeyCode::Esc => {
            app.dismiss_notification();
            None
        }
        _ => None,
    }
}

fn handle_composer_key(app: &mut App, key: KeyEvent) -> Option<Command> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let alt = key.modifiers.contains(KeyModifiers::ALT);
    let shift = key.modifiers.contains(KeyModifiers::SHIFT);

    if app.chip_focus.is_some() {
        match key.code {
            KeyCode::Left => app.chip_left(),
            KeyCode::Right => app.chip_right(),
            KeyCode::Delete | KeyCode::Backspace => app.remove_focused_chip(),
            KeyCode::Char('x') if ctrl => app.remove_focused_chip(),
            KeyCode::Esc => app.chip_focus = None,
            _ => {
                app.chip_focus = None;
                return handle_composer_key(app, key);
            }
        }
        return None;
    }

    if let Some(palette) = app.emoji_palette.as_mut() {
        match key.code {
            KeyCode::Left => palette.move_left(),
            KeyCode::Right => palette.move_right(),
            KeyCode::Up => palette.move_up(),
            KeyCode::Down => palette.move_down(),
            KeyCode::Enter => app.insert_emoji(),
            KeyCode::Esc => app.emoji_palette = None,
            KeyCode::Char('e') if alt => app.emoji_palette = None,
            _ => {
                app.emoji_palette = None;
                return handle_composer_key(app, key);
            }
        }
        return None;
    }

    // The open candidate list owns navigation, Enter and Escape. With no
    // matches Enter does nothing rather than sending the draft.
    if app.conversation.composer().picker_visible() {
        let composer = app.conversation.composer_mut();
        match key.code {
            KeyCode::Up => {
                composer.picker_up();
                return None;
            }
            KeyCode::Down => {
                composer.picker_down();
                return None;
            }
            KeyCode::Enter | KeyCode::Tab => {
                composer.commit_selected();
                return None;
            }
            KeyCode::Esc => {
                composer.dismiss_picker();
                return None;
            }
            _ => {}
        }
    }

    let conversation = &mut app.conversation;
    match key.code {
        KeyCode::Enter if shift || alt => conversation.edit(|buf| buf.insert_newline()),
        KeyCode::Enter => return app.submit(),
        KeyCode::Esc => {
            if conversation.composer().draft().reply_target().is_some() {
                conversation.composer_mut().draft_mut().cancel_reply();
            } else {
                app.input_mode = InputMode::Normal;
            }
        }
        KeyCode::Tab => return app.set_sub_view(app.sub_view().next()),
        KeyCode::Char('o') if ctrl => app.open_attach_prompt(),
        KeyCode::Char('x') if ctrl => app.focus_or_remove_chip(),
        KeyCode::Char('e') if alt => app.toggle_emoji_palette(),
        KeyCode::Char('z') if ctrl => conversation.edit(|buf| {
            buf.undo();
        }),
        KeyCode::Char('y') if ctrl => conversation.edit(|buf| {
            buf.redo();
        }),
        KeyCode::Char('a') if ctrl => conversation.edit(|buf| buf.move_to_line_start()),
        KeyCode::Char('e') if ctrl => conversation.edit(|buf| buf.move_to_line_end()),
        KeyCode::Char('k') if ctrl => conversation.edit(|buf| buf.kill_to_line_end()),
        KeyCode::Char('u') if ctrl => conversation.edit(|buf| buf.kill_to_line_start()),
        KeyCode::Char('w') if ctrl => conversation.edit(|buf| buf.delete_word_backward()),
        KeyCode::Char('b') if alt => conversation.edit(|buf| buf.move_word_left()),
        KeyCode::Char('f') if alt => conversation.edit(|buf| buf.move_word_right()),
        KeyCode::Char(c) if !ctrl => conversation.edit(|buf| buf.insert_char(c)),
        KeyCode::Backspace if alt => conversation.edit(|buf| buf.delete_word_backward()),
        KeyCode::Backspace => conversation.edit(|buf| buf.delete_char_before()),
        KeyCode::Delete => conversation.edit(|buf| buf.delete_char_at()),
        KeyCode::Left if alt || ctrl => conversation.edit(|buf| buf.move_word_left()),
        KeyCode::Right if alt || ctrl => conversation.edit(|buf| buf.move_word_right()),
        KeyCode::Left => conversation.edit(|buf| buf.move_left()),
        KeyCode::Right => conversation.edit(|buf| buf.move_right()),
        KeyCode::Up => conversation.edit(|buf| buf.move_up()),
        KeyCode::Down => conversation.edit(|buf| buf.move_down()),
        KeyCode::Home => conversation.edit(|buf| buf.move_to_line_start()),
        KeyCode::End => conversation.edit(|buf| buf.move_to_line_end()),
        _ => {}
    }
    None
}

fn handle_chat_normal_key(app: &mut App, key: KeyEvent) -> Option<Command> {
    match key.code {
        KeyCode::Char('k') | KeyCode::Up => app.select_message_up(),
        KeyCode::Char('j') | KeyCode::Down => app.select_message_down(),
        KeyCode::Char('r') => app.reply_to_selected(),
        KeyCode::Char('p') => return app.toggle_pin_selected(),
        KeyCode::Char('f') => return app.open_forward(),
        KeyCode::Char('i') | KeyCode::Enter => app.input_mode = InputMode::Editing,
        _ => return handle_common_normal_key(app, key),
    }
    None
}

fn handle_attachments_key(app: &mut App, key: KeyEvent) -> Option<Command> {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => {
            let len = app.conversation.messages().attachments().len();
            if app.attachments_scroll + 1 < len {
                app.attachments_scroll += 1;
            }
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.attachments_scroll = app.attachments_scroll.saturating_sub(1);
        }
        _ => return handle_common_normal_key(app, key),
    }
    None
}

fn handle_members_key(app: &mut App, key: KeyEvent) -> Option<Command> {
    if app.confirm_remove.is_some() {
        return match key.code {
            KeyCode::Char('y') | KeyCode::Enter => app.confirm_remove(),
            _ => {
                app.confirm_remove = None;
                None
            }
        };
    }
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => app.select_member_down(),
        KeyCode::Char('k') | KeyCode::Up => app.select_member_up(),
        KeyCode::Char('d') | KeyCode::Delete => app.request_remove_selected(),
        KeyCode::Char('r') => return Some(Command::LoadRoster),
        _ => return handle_common_normal_key(app, key),
    }
    None
}

fn handle_forward_key(app: &mut App, key: KeyEvent) -> Option<Command> {
    let picker = app.forward.as_mut()?;
    match key.code {
        KeyCode::Up => picker.move_up(),
        KeyCode::Down => picker.move_down(),
        KeyCode::Char(' ') => picker.toggle_selected(),
        KeyCode::Backspace => picker.pop_filter(),
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => picker.push_filter(c),
        KeyCode::Enter => return app.submit_forward(),
        KeyCode::Esc => app.forward = None,
        _ => {}
    }
    None
}

fn handle_attach_prompt_key(app: &mut App, key: KeyEvent) {
    let Some(prompt) = app.attach_prompt.as_mut() else {
        return;
    };
    match key.code {
        KeyCode::Enter => app.submit_attach_prompt(),
        KeyCode::Esc => app.attach_prompt = None,
        KeyCode::Backspace => prompt.delete_char_before(),
        KeyCode::Delete => prompt.delete_char_at(),
        KeyCode::Left => prompt.move_left(),
        KeyCode::Right => prompt.move_right(),
        KeyCode::Home => prompt.move_to_line_start(),
        KeyCode::End => prompt.move_to_line_end(),
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => prompt.insert_char(c),
        _ => {}
    }
}

/// Interpret pasted text as a path to an existing file. Handles `file://`
/// URLs, surrounding quotes and backslash-escaped spaces from drag and drop.
pub fn pasted_file_path(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() || trimmed.contains('\n') {
        return None;
    }
    let unquoted = trimmed
        .strip_prefix('\'')
        .and_then(|s| s.strip_suffix('\''))
        .or_else(|| trimmed.strip_prefix('"').and_then(|s| s.strip_suffix('"')))
        .unwrap_or(trimmed);
    let path = match unquoted.strip_prefix("file://") {
        Some(rest) => percent_decode(rest),
        None => unquoted.replace("\\ ", " "),
    };
    std::path::Path::new(&path).is_file().then_some(path)
}

fn percent_decode(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = s.get(i + 1..i + 3).and_then(|h| u8::from_str_radix(h, 16).ok());
            if let Some(byte) = hex {
                out.push(byte);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}
