use groupchat_core::composer::{EditBuffer, EmojiPalette};
use groupchat_core::constants::MEMBER_REMOVED_NOTICE;
use groupchat_core::forward::forwarded_notice;
use groupchat_core::models::{MessageId, UserId};
use groupchat_core::send::{self, BeginSend, SendPayload};
use groupchat_core::{
    ChatContext, ChatError, ChatEvent, Conversation, ForwardPicker, SubView, SyncState,
};

use crate::ui::notifications::{Notification, NotificationQueue};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    /// Navigating messages or lists
    Normal,
    /// Typing in the composer
    Editing,
}

/// Work the runtime performs on behalf of the UI.
#[derive(Debug)]
pub enum Command {
    Send(SendPayload),
    LoadRoster,
    RemoveMember(UserId),
    SetPinned { message_id: MessageId, pinned: bool },
    SubViewChanged(SubView),
    LoadForwardTargets,
    Forward(Vec<SendPayload>),
}

pub struct App {
    pub running: bool,
    pub pending_quit: bool,
    pub conversation: Conversation,
    pub input_mode: InputMode,
    /// Index into the newest-first message list, Normal mode on Chat
    pub selected_message: usize,
    pub selected_member: usize,
    pub attachments_scroll: usize,
    /// Path being typed after Ctrl+O
    pub attach_prompt: Option<EditBuffer>,
    /// Member awaiting confirmation before removal
    pub confirm_remove: Option<UserId>,
    /// Emoji grid shown above the composer
    pub emoji_palette: Option<EmojiPalette>,
    /// Staged file chip picked for removal
    pub chip_focus: Option<usize>,
    pub forward: Option<ForwardPicker>,
    pub sync_state: SyncState,
    notifications: NotificationQueue,
}

impl App {
    pub fn new(context: ChatContext) -> Self {
        Self {
            running: true,
            pending_quit: false,
            conversation: Conversation::new(context),
            input_mode: InputMode::Editing,
            selected_message: 0,
            selected_member: 0,
            attachments_scroll: 0,
            attach_prompt: None,
            confirm_remove: None,
            emoji_palette: None,
            chip_focus: None,
            forward: None,
            sync_state: SyncState::Idle,
            notifications: NotificationQueue::new(),
        }
    }

    pub fn quit(&mut self) {
        self.running = false;
    }

    pub fn notify(&mut self, notification: Notification) {
        self.notifications.push(notification);
    }

    pub fn current_notification(&self) -> Option<&Notification> {
        self.notifications.current()
    }

    pub fn dismiss_notification(&mut self) {
        self.notifications.dismiss();
    }

    pub fn tick(&mut self) {
        self.notifications.tick();
    }

    pub fn sub_view(&self) -> SubView {
        self.conversation.sub_view()
    }

    pub fn set_sub_view(&mut self, view: SubView) -> Option<Command> {
        if view == self.sub_view() {
            return None;
        }
        self.conversation.set_sub_view(view);
        self.confirm_remove = None;
        self.attach_prompt = None;
        self.emoji_palette = None;
        self.chip_focus = None;
        self.forward = None;
        self.input_mode = if view == SubView::Chat {
            InputMode::Editing
        } else {
            InputMode::Normal
        };
        Some(Command::SubViewChanged(view))
    }

    /// Members tab opened before the startup roster load succeeded.
    pub fn needs_roster(&self) -> bool {
        self.sub_view() == SubView::Members && self.conversation.roster().users.is_empty()
    }

    /// Validate and start a send. Returns the request to issue, if any.
    pub fn submit(&mut self) -> Option<Command> {
        match send::begin_send(&mut self.conversation) {
            BeginSend::Started(payload) => Some(Command::Send(payload)),
            BeginSend::Blank => None,
            BeginSend::InFlight => {
                self.notify(Notification::warning(ChatError::SendInFlight.to_string()));
                None
            }
        }
    }

    pub fn select_message_up(&mut self) {
        let len = self.conversation.messages().len();
        if len > 0 && self.selected_message + 1 < len {
            self.selected_message += 1;
        }
    }

    pub fn select_message_down(&mut self) {
        self.selected_message = self.selected_message.saturating_sub(1);
    }

    pub fn reply_to_selected(&mut self) {
        if let Some(message) = self.conversation.messages().get(self.selected_message).cloned() {
            self.conversation
                .composer_mut()
                .draft_mut()
                .set_reply_target(message);
            self.input_mode = InputMode::Editing;
        }
    }

    pub fn toggle_pin_selected(&mut self) -> Option<Command> {
        let message = self.conversation.messages().get(self.selected_message)?;
        Some(Command::SetPinned {
            message_id: message.id,
            pinned: !message.is_pinned,
        })
    }

    /// Open the forward dialog for the selected message.
    pub fn open_forward(&mut self) -> Option<Command> {
        let message = self.conversation.messages().get(self.selected_message)?.clone();
        self.forward = Some(ForwardPicker::new(message));
        Some(Command::LoadForwardTargets)
    }

    /// Close the dialog and forward to every chosen chat.
    pub fn submit_forward(&mut self) -> Option<Command> {
        let picker = self.forward.as_ref()?;
        if picker.chosen_count() == 0 {
            self.notify(Notification::warning("Select at least one conversation or group"));
            return None;
        }
        let payloads = picker.payloads();
        self.forward = None;
        Some(Command::Forward(payloads))
    }

    pub fn toggle_emoji_palette(&mut self) {
        self.emoji_palette = match self.emoji_palette {
            Some(_) => None,
            None => Some(EmojiPalette::new()),
        };
    }

    /// Insert the highlighted emoji at the caret.
    pub fn insert_emoji(&mut self) {
        if let Some(emoji) = self.emoji_palette.as_ref().map(|p| p.selected()) {
            self.conversation.edit(|buf| buf.insert_str(emoji));
        }
    }

    pub fn select_member_down(&mut self) {
        let len = self.conversation.roster().users.len();
        if self.selected_member + 1 < len {
            self.selected_member += 1;
        }
    }

    pub fn select_member_up(&mut self) {
        self.selected_member = self.selected_member.saturating_sub(1);
    }

    pub fn request_remove_selected(&mut self) {
        self.confirm_remove = self
            .conversation
            .roster()
            .users
            .get(self.selected_member)
            .map(|u| u.id);
    }

    pub fn confirm_remove(&mut self) -> Option<Command> {
        self.confirm_remove.take().map(Command::RemoveMember)
    }

    pub fn open_attach_prompt(&mut self) {
        self.attach_prompt = Some(EditBuffer::new());
    }

    /// Stage the typed path. The prompt stays open on failure.
    pub fn submit_attach_prompt(&mut self) {
        let Some(prompt) = self.attach_prompt.as_ref() else {
            return;
        };
        let path = prompt.text().trim().to_string();
        if path.is_empty() {
            self.attach_prompt = None;
            return;
        }
        if self.stage_file(&path) {
            self.attach_prompt = None;
        }
    }

    /// Returns true when the file was staged.
    pub fn stage_file(&mut self, path: &str) -> bool {
        let result = self
            .conversation
            .composer_mut()
            .draft_mut()
            .staged_mut()
            .stage(path)
            .map(|staged| staged.file_name.clone());
        match result {
            Ok(name) => {
                self.notify(Notification::info(format!("Attached {}", name)));
                true
            }
            Err(e) => {
                self.notify(Notification::error(e.user_message()));
                false
            }
        }
    }

    /// First Ctrl+X picks the last chip, the next one removes the picked chip.
    pub fn focus_or_remove_chip(&mut self) {
        match self.chip_focus {
            Some(_) => self.remove_focused_chip(),
            None => {
                let len = self.conversation.composer().draft().staged().len();
                self.chip_focus = len.checked_sub(1);
            }
        }
    }

    pub fn chip_left(&mut self) {
        if let Some(index) = self.chip_focus.as_mut() {
            *index = index.saturating_sub(1);
        }
    }

    pub fn chip_right(&mut self) {
        let len = self.conversation.composer().draft().staged().len();
        if let Some(index) = self.chip_focus.as_mut() {
            if *index + 1 < len {
                *index += 1;
            }
        }
    }

    pub fn remove_focused_chip(&mut self) {
        let Some(index) = self.chip_focus else {
            return;
        };
        let staged = self.conversation.composer_mut().draft_mut().staged_mut();
        staged.remove(index);
        self.chip_focus = match staged.len() {
            0 => None,
            len => Some(index.min(len - 1)),
        };
    }

    /// Fold a background result into the state. May ask for follow-up work.
    pub fn handle_event(&mut self, event: ChatEvent) -> Option<Command> {
        match event {
            ChatEvent::MessagesFetched { seq, messages } => {
                if self.conversation.apply_snapshot(seq, messages) {
                    self.clamp_selection();
                }
                None
            }
            ChatEvent::SendFinished(result) => {
                match send::finish_send(&mut self.conversation, result) {
                    Ok(_) => self.selected_message = 0,
                    Err(e) => self.notify(Notification::error(e.user_message())),
                }
                None
            }
            ChatEvent::RosterLoaded(Ok(roster)) => {
                self.conversation.set_roster(roster);
                let len = self.conversation.roster().users.len();
                self.selected_member = self.selected_member.min(len.saturating_sub(1));
                None
            }
            ChatEvent::RosterLoaded(Err(e)) => {
                self.notify(Notification::error(e.user_message()));
                None
            }
            ChatEvent::MemberRemoved { result: Ok(()), .. } => {
                self.notify(Notification::success(MEMBER_REMOVED_NOTICE));
                Some(Command::LoadRoster)
            }
            ChatEvent::MemberRemoved { result: Err(e), .. } => {
                self.notify(Notification::error(e.user_message()));
                None
            }
            ChatEvent::PinUpdated {
                message_id,
                pinned,
                result: Ok(()),
            } => {
                self.conversation.messages_mut().set_pinned(message_id, pinned);
                let text = if pinned { "Message pinned" } else { "Message unpinned" };
                self.notify(Notification::success(text));
                None
            }
            ChatEvent::PinUpdated { result: Err(e), .. } => {
                self.notify(Notification::error(e.user_message()));
                None
            }
            ChatEvent::ForwardTargetsLoaded(Ok(targets)) => {
                if let Some(picker) = self.forward.as_mut() {
                    picker.set_targets(targets);
                }
                None
            }
            ChatEvent::ForwardTargetsLoaded(Err(e)) => {
                self.forward = None;
                self.notify(Notification::error(e.user_message()));
                None
            }
            ChatEvent::Forwarded { count, result: Ok(()) } => {
                self.notify(Notification::success(forwarded_notice(count)));
                None
            }
            ChatEvent::Forwarded { result: Err(_), .. } => {
                self.notify(Notification::error("Failed to forward message"));
                None
            }
        }
    }

    fn clamp_selection(&mut self) {
        let len = self.conversation.messages().len();
        self.selected_message = self.selected_message.min(len.saturating_sub(1));
    }
}
