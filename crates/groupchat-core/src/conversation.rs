//! State of one open group conversation: composer, message list, roster and
//! the selected sub-view. Mutated only by the task that owns it.

use crate::composer::{Composer, EditBuffer};
use crate::config::ChatContext;
use crate::models::{Candidate, Message, MessageId, RemoteAttachment, Roster};
use crate::sync::FetchSequence;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SubView {
    #[default]
    Chat,
    Attachments,
    Members,
}

impl SubView {
    pub const ALL: [SubView; 3] = [SubView::Chat, SubView::Attachments, SubView::Members];

    pub fn label(self) -> &'static str {
        match self {
            SubView::Chat => "Chat",
            SubView::Attachments => "Attachments",
            SubView::Members => "Members",
        }
    }

    pub fn index(self) -> usize {
        match self {
            SubView::Chat => 0,
            SubView::Attachments => 1,
            SubView::Members => 2,
        }
    }

    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }

    pub fn polls(self) -> bool {
        self == SubView::Chat
    }
}

/// Newest-first message list with snapshot ordering.
///
/// Snapshots carry the sequence number of the fetch that produced them and
/// older ones are ignored. A message confirmed by a send is recorded with the
/// last sequence number issued at that moment; snapshots from fetches that
/// started no later than that may predate it, so it is kept at the front
/// until a newer snapshot arrives.
#[derive(Debug, Clone, Default)]
pub struct MessageList {
    messages: Vec<Message>,
    applied_seq: Option<u64>,
    confirmed: Vec<(u64, Message)>,
}

impl MessageList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Message> {
        self.messages.get(index)
    }

    pub fn find(&self, id: MessageId) -> Option<&Message> {
        self.messages.iter().find(|m| m.id == id)
    }

    pub fn applied_seq(&self) -> Option<u64> {
        self.applied_seq
    }

    /// Replace the list wholesale. Returns false for a stale snapshot.
    pub fn apply_snapshot(&mut self, seq: u64, messages: Vec<Message>) -> bool {
        if self.applied_seq.is_some_and(|applied| applied >= seq) {
            return false;
        }
        self.applied_seq = Some(seq);
        self.confirmed.retain(|(watermark, _)| seq <= *watermark);

        self.messages = messages;
        for (_, message) in &self.confirmed {
            if !self.messages.iter().any(|m| m.id == message.id) {
                self.messages.insert(0, message.clone());
            }
        }
        true
    }

    /// Put a server-confirmed message at index 0.
    pub fn prepend_confirmed(&mut self, message: Message, watermark: u64) {
        self.messages.retain(|m| m.id != message.id);
        self.messages.insert(0, message.clone());
        self.confirmed.push((watermark, message));
    }

    /// Update the pin flag after the server accepted the change.
    pub fn set_pinned(&mut self, id: MessageId, pinned: bool) -> bool {
        let mut found = false;
        for message in self.messages.iter_mut().filter(|m| m.id == id) {
            message.is_pinned = pinned;
            found = true;
        }
        for (_, message) in self.confirmed.iter_mut().filter(|(_, m)| m.id == id) {
            message.is_pinned = pinned;
        }
        found
    }

    pub fn pinned(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter().filter(|m| m.is_pinned)
    }

    /// Every server attachment across the loaded messages, newest first.
    pub fn attachments(&self) -> Vec<(&Message, &RemoteAttachment)> {
        self.messages
            .iter()
            .flat_map(|m| m.attachments.iter().map(move |a| (m, a)))
            .collect()
    }
}

pub struct Conversation {
    context: ChatContext,
    composer: Composer,
    messages: MessageList,
    roster: Roster,
    sub_view: SubView,
    sequence: FetchSequence,
}

impl Conversation {
    pub fn new(context: ChatContext) -> Self {
        Self {
            context,
            composer: Composer::new(),
            messages: MessageList::new(),
            roster: Roster::default(),
            sub_view: SubView::Chat,
            sequence: FetchSequence::new(),
        }
    }

    pub fn context(&self) -> &ChatContext {
        &self.context
    }

    pub fn composer(&self) -> &Composer {
        &self.composer
    }

    pub fn composer_mut(&mut self) -> &mut Composer {
        &mut self.composer
    }

    /// Text mutation with the mention picker kept in step.
    pub fn edit<F>(&mut self, f: F)
    where
        F: FnOnce(&mut EditBuffer),
    {
        self.composer.edit(&self.roster.users, f);
    }

    /// Apply a pending mention cursor once the input has been redrawn.
    pub fn after_render(&mut self) -> bool {
        self.composer.after_render(&self.roster.users)
    }

    pub fn messages(&self) -> &MessageList {
        &self.messages
    }

    pub fn messages_mut(&mut self) -> &mut MessageList {
        &mut self.messages
    }

    pub fn apply_snapshot(&mut self, seq: u64, messages: Vec<Message>) -> bool {
        self.messages.apply_snapshot(seq, messages)
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.roster.users
    }

    pub fn set_roster(&mut self, roster: Roster) {
        self.roster = roster;
        self.composer.refresh_candidates(&self.roster.users);
    }

    pub fn sub_view(&self) -> SubView {
        self.sub_view
    }

    pub fn set_sub_view(&mut self, view: SubView) {
        self.sub_view = view;
    }

    /// Shared with the sync loop that tags fetches.
    pub fn sequence(&self) -> &FetchSequence {
        &self.sequence
    }

    pub fn is_own(&self, message: &Message) -> bool {
        message.is_from(self.context.current_user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::testing::message;

    fn ids(list: &MessageList) -> Vec<MessageId> {
        list.messages().iter().map(|m| m.id).collect()
    }

    #[test]
    fn test_snapshot_replaces_wholesale() {
        let mut list = MessageList::new();
        assert!(list.apply_snapshot(1, vec![message(2, "a", "x"), message(1, "a", "y")]));
        assert!(list.apply_snapshot(2, vec![message(3, "a", "z")]));
        assert_eq!(ids(&list), vec![3]);
    }

    #[test]
    fn test_stale_snapshot_is_discarded() {
        let mut list = MessageList::new();
        assert!(list.apply_snapshot(5, vec![message(9, "a", "new")]));
        assert!(!list.apply_snapshot(4, vec![message(1, "a", "old")]));
        assert!(!list.apply_snapshot(5, vec![]));
        assert_eq!(ids(&list), vec![9]);
        assert_eq!(list.applied_seq(), Some(5));
    }

    #[test]
    fn test_confirmed_survives_older_snapshot() {
        let mut list = MessageList::new();
        list.apply_snapshot(1, vec![message(1, "a", "first")]);
        // Fetch 2 started, then a send completed
        list.prepend_confirmed(message(2, "me", "sent"), 2);
        assert_eq!(ids(&list), vec![2, 1]);

        // Fetch 2 did not see the new message
        list.apply_snapshot(2, vec![message(1, "a", "first")]);
        assert_eq!(ids(&list), vec![2, 1]);

        // Fetch 3 started after the send; the server is authoritative again
        list.apply_snapshot(3, vec![message(2, "me", "sent"), message(1, "a", "first")]);
        assert_eq!(ids(&list), vec![2, 1]);
        list.apply_snapshot(4, vec![message(1, "a", "first")]);
        assert_eq!(ids(&list), vec![1]);
    }

    #[test]
    fn test_prepend_dedups() {
        let mut list = MessageList::new();
        list.apply_snapshot(1, vec![message(2, "me", "sent"), message(1, "a", "x")]);
        list.prepend_confirmed(message(2, "me", "sent"), 1);
        assert_eq!(ids(&list), vec![2, 1]);
    }

    #[test]
    fn test_pinning_and_attachments() {
        let mut list = MessageList::new();
        let mut with_file = message(1, "a", "");
        with_file.attachments.push(RemoteAttachment {
            url: "https://files.test/plan.pdf".to_string(),
            content_type: Some("application/pdf".to_string()),
            filename: None,
        });
        list.apply_snapshot(1, vec![message(2, "b", "hi"), with_file]);

        assert!(list.set_pinned(2, true));
        assert!(!list.set_pinned(77, true));
        let pinned: Vec<_> = list.pinned().map(|m| m.id).collect();
        assert_eq!(pinned, vec![2]);

        let attachments = list.attachments();
        assert_eq!(attachments.len(), 1);
        assert_eq!(attachments[0].0.id, 1);
        assert_eq!(attachments[0].1.display_name(), "plan.pdf");
    }

    #[test]
    fn test_sub_view_cycle() {
        assert_eq!(SubView::Chat.next(), SubView::Attachments);
        assert_eq!(SubView::Members.next(), SubView::Chat);
        assert_eq!(SubView::Chat.prev(), SubView::Members);
        assert!(SubView::Chat.polls());
        assert!(!SubView::Members.polls());
    }
}
