use async_trait::async_trait;

use crate::error::Result;
use crate::models::{ConversationId, ForwardTarget, Message, MessageId, Roster, UserId};
use crate::send::SendPayload;

/// Remote collaborator for one chat deployment.
///
/// Implementations must be cheap to share: the sync loop and the send path
/// hold the same `Arc<dyn ChatBackend>`.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Newest-first page of messages for a conversation.
    async fn fetch_messages(
        &self,
        conversation_id: ConversationId,
        page_size: u32,
        page: u32,
    ) -> Result<Vec<Message>>;

    /// Create a message. Exactly one request, no retries.
    async fn send_message(&self, payload: &SendPayload) -> Result<Message>;

    async fn fetch_roster(&self, conversation_id: ConversationId) -> Result<Roster>;

    async fn remove_member(&self, conversation_id: ConversationId, user_id: UserId) -> Result<()>;

    async fn set_pinned(&self, message_id: MessageId, pinned: bool) -> Result<()>;

    /// Chats a message can be forwarded to: direct conversations, then groups.
    async fn fetch_forward_targets(&self) -> Result<Vec<ForwardTarget>>;
}

#[cfg(any(test, feature = "testing"))]
pub mod testing {
    //! In-memory backend with scripted failures and call counters.

    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;
    use chrono::Utc;

    use super::ChatBackend;
    use crate::error::{ChatError, Result};
    use crate::models::{
        Candidate, ConversationId, ForwardTarget, Message, MessageId, RemoteAttachment, Roster,
        UserId,
    };
    use crate::send::SendPayload;

    #[derive(Default)]
    struct Script {
        messages: Vec<Message>,
        roster: Roster,
        targets: Vec<ForwardTarget>,
        author: Option<(UserId, String)>,
        fail_fetches: bool,
        fail_sends: bool,
        fail_member_ops: bool,
        fetch_delay: Option<Duration>,
        sent: Vec<SendPayload>,
        removed: Vec<(ConversationId, UserId)>,
        pins: Vec<(MessageId, bool)>,
        next_id: MessageId,
    }

    #[derive(Default)]
    pub struct ScriptedBackend {
        script: Mutex<Script>,
        fetches: AtomicUsize,
    }

    fn scripted_failure() -> ChatError {
        ChatError::Status {
            status: 500,
            body: "scripted failure".to_string(),
        }
    }

    pub fn message(id: MessageId, author: &str, body: &str) -> Message {
        Message {
            id,
            body: body.to_string(),
            author_name: author.to_string(),
            user_id: None,
            attachments: Vec::new(),
            parent_id: None,
            mentioned_user_ids: Vec::new(),
            created_at: Utc::now(),
            is_pinned: false,
            is_forwarded: false,
        }
    }

    impl ScriptedBackend {
        pub fn new() -> Self {
            let backend = Self::default();
            backend.script.lock().unwrap().next_id = 1000;
            backend
        }

        /// Server-side history, newest first.
        pub fn with_messages(self, messages: Vec<Message>) -> Self {
            self.script.lock().unwrap().messages = messages;
            self
        }

        pub fn with_roster(self, name: &str, users: Vec<Candidate>) -> Self {
            self.script.lock().unwrap().roster = Roster {
                name: name.to_string(),
                users,
            };
            self
        }

        pub fn with_targets(self, targets: Vec<ForwardTarget>) -> Self {
            self.script.lock().unwrap().targets = targets;
            self
        }

        /// Who the server says authored sent messages.
        pub fn with_author(self, user_id: UserId, name: &str) -> Self {
            self.script.lock().unwrap().author = Some((user_id, name.to_string()));
            self
        }

        pub fn fail_fetches(&self, fail: bool) {
            self.script.lock().unwrap().fail_fetches = fail;
        }

        pub fn fail_sends(&self, fail: bool) {
            self.script.lock().unwrap().fail_sends = fail;
        }

        pub fn fail_member_ops(&self, fail: bool) {
            self.script.lock().unwrap().fail_member_ops = fail;
        }

        pub fn set_fetch_delay(&self, delay: Duration) {
            self.script.lock().unwrap().fetch_delay = Some(delay);
        }

        /// Number of `fetch_messages` calls started.
        pub fn fetch_count(&self) -> usize {
            self.fetches.load(Ordering::SeqCst)
        }

        pub fn sent(&self) -> Vec<SendPayload> {
            self.script.lock().unwrap().sent.clone()
        }

        pub fn removed(&self) -> Vec<(ConversationId, UserId)> {
            self.script.lock().unwrap().removed.clone()
        }

        pub fn pins(&self) -> Vec<(MessageId, bool)> {
            self.script.lock().unwrap().pins.clone()
        }
    }

    #[async_trait]
    impl ChatBackend for ScriptedBackend {
        async fn fetch_messages(
            &self,
            _conversation_id: ConversationId,
            page_size: u32,
            page: u32,
        ) -> Result<Vec<Message>> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            let delay = self.script.lock().unwrap().fetch_delay;
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }

            let script = self.script.lock().unwrap();
            if script.fail_fetches {
                return Err(scripted_failure());
            }
            let skip = (page.saturating_sub(1) * page_size) as usize;
            Ok(script
                .messages
                .iter()
                .skip(skip)
                .take(page_size as usize)
                .cloned()
                .collect())
        }

        async fn send_message(&self, payload: &SendPayload) -> Result<Message> {
            let mut script = self.script.lock().unwrap();
            script.sent.push(payload.clone());
            if script.fail_sends {
                return Err(scripted_failure());
            }

            script.next_id += 1;
            let mut created = message(script.next_id, "", &payload.body);
            if let Some((id, name)) = &script.author {
                created.user_id = Some(*id);
                created.author_name = name.clone();
            }
            created.parent_id = payload.parent_id;
            created.is_forwarded = payload.is_forwarded;
            created.mentioned_user_ids = payload.mentioned_user_ids.clone();
            created.attachments = payload
                .attachments
                .iter()
                .map(|a| RemoteAttachment {
                    url: format!("https://files.test/{}", a.file_name),
                    content_type: Some(a.mime_type.clone()),
                    filename: Some(a.file_name.clone()),
                })
                .collect();
            script.messages.insert(0, created.clone());
            Ok(created)
        }

        async fn fetch_roster(&self, _conversation_id: ConversationId) -> Result<Roster> {
            let script = self.script.lock().unwrap();
            if script.fail_member_ops {
                return Err(scripted_failure());
            }
            Ok(script.roster.clone())
        }

        async fn remove_member(&self, conversation_id: ConversationId, user_id: UserId) -> Result<()> {
            let mut script = self.script.lock().unwrap();
            if script.fail_member_ops {
                return Err(scripted_failure());
            }
            script.removed.push((conversation_id, user_id));
            script.roster.users.retain(|u| u.id != user_id);
            Ok(())
        }

        async fn set_pinned(&self, message_id: MessageId, pinned: bool) -> Result<()> {
            let mut script = self.script.lock().unwrap();
            if script.fail_member_ops {
                return Err(scripted_failure());
            }
            script.pins.push((message_id, pinned));
            if let Some(m) = script.messages.iter_mut().find(|m| m.id == message_id) {
                m.is_pinned = pinned;
            }
            Ok(())
        }

        async fn fetch_forward_targets(&self) -> Result<Vec<ForwardTarget>> {
            let script = self.script.lock().unwrap();
            if script.fail_member_ops {
                return Err(scripted_failure());
            }
            Ok(script.targets.clone())
        }
    }
}
