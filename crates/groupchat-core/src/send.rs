//! Single-flight send of the composer draft.
//!
//! The owner of the conversation calls [`begin_send`], performs the request
//! (usually on a spawned task) and hands the result to [`finish_send`].
//! [`send`] does all three inline.

use tracing::{info, warn};

use crate::backend::ChatBackend;
use crate::composer::{ComposerDraft, SendState, StagedAttachment};
use crate::conversation::Conversation;
use crate::error::Result;
use crate::models::{ConversationId, Destination, Message, MessageId, UserId};

/// Request body of a message create.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendPayload {
    pub destination: Destination,
    pub body: String,
    pub parent_id: Option<MessageId>,
    pub mentioned_user_ids: Vec<UserId>,
    pub attachments: Vec<StagedAttachment>,
    /// Server files shared again by a forward
    pub attachment_urls: Vec<String>,
    pub is_forwarded: bool,
}

impl SendPayload {
    /// The draft as typed. Only the blank check ignores surrounding whitespace.
    pub fn from_draft(draft: &ComposerDraft, conversation_id: ConversationId) -> Self {
        Self {
            destination: Destination::Group(conversation_id),
            body: draft.text().to_string(),
            parent_id: draft.reply_target().map(|m| m.id),
            mentioned_user_ids: draft.committed_mentions().iter().map(|m| m.id).collect(),
            attachments: draft.staged().files().to_vec(),
            attachment_urls: Vec::new(),
            is_forwarded: false,
        }
    }

    /// Copy of an existing message for another chat. Files are referenced by
    /// URL, nothing is uploaded again.
    pub fn forward(message: &Message, destination: Destination) -> Self {
        Self {
            destination,
            body: message.body.clone(),
            parent_id: None,
            mentioned_user_ids: Vec::new(),
            attachments: Vec::new(),
            attachment_urls: message
                .attachments
                .iter()
                .filter(|a| !a.url.is_empty())
                .map(|a| a.url.clone())
                .collect(),
            is_forwarded: true,
        }
    }

    /// Text fields in form order. File parts are added by the transport.
    pub fn form_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![("message[body]", self.body.clone()), self.destination.form_field()];
        if self.is_forwarded {
            fields.push(("message[is_forwarded]", "true".to_string()));
        }
        if let Some(parent_id) = self.parent_id {
            fields.push(("message[parent_id]", parent_id.to_string()));
        }
        for id in &self.mentioned_user_ids {
            fields.push(("message[mentioned_user_ids][]", id.to_string()));
        }
        for url in &self.attachment_urls {
            fields.push(("message[attachment_urls][]", url.clone()));
        }
        fields
    }
}

#[derive(Debug)]
pub enum BeginSend {
    /// Request should be issued with this payload
    Started(SendPayload),
    /// Nothing to send; no state changed
    Blank,
    /// Another send is still running; no state changed
    InFlight,
}

#[derive(Debug)]
pub enum SendOutcome {
    Sent(MessageId),
    Blank,
    InFlight,
}

/// Validate the draft and mark it as sending.
pub fn begin_send(conversation: &mut Conversation) -> BeginSend {
    let conversation_id = conversation.context().conversation_id;
    let draft = conversation.composer_mut().draft_mut();
    if draft.is_sending() {
        return BeginSend::InFlight;
    }
    if draft.is_blank() {
        return BeginSend::Blank;
    }
    let payload = SendPayload::from_draft(draft, conversation_id);
    draft.set_send_state(SendState::Sending);
    BeginSend::Started(payload)
}

/// Apply the result of the request started by [`begin_send`].
///
/// On success the returned message goes to the top of the list and the
/// composer is emptied. On failure only the sending flag is cleared so the
/// user can retry with everything they typed.
pub fn finish_send(conversation: &mut Conversation, result: Result<Message>) -> Result<MessageId> {
    match result {
        Ok(message) => {
            let id = message.id;
            let watermark = conversation.sequence().current();
            conversation.messages_mut().prepend_confirmed(message, watermark);
            conversation.composer_mut().reset();
            info!(message_id = id, "Message sent");
            Ok(id)
        }
        Err(e) => {
            conversation
                .composer_mut()
                .draft_mut()
                .set_send_state(SendState::Idle);
            warn!(error = %e, "Failed to send message");
            Err(e)
        }
    }
}

pub async fn send<B>(conversation: &mut Conversation, backend: &B) -> Result<SendOutcome>
where
    B: ChatBackend + ?Sized,
{
    let payload = match begin_send(conversation) {
        BeginSend::Started(payload) => payload,
        BeginSend::Blank => return Ok(SendOutcome::Blank),
        BeginSend::InFlight => return Ok(SendOutcome::InFlight),
    };
    let result = backend.send_message(&payload).await;
    finish_send(conversation, result).map(SendOutcome::Sent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::testing::{message, ScriptedBackend};
    use crate::error::ChatError;
    use crate::config::ChatContext;
    use crate::models::Candidate;

    fn context() -> ChatContext {
        ChatContext {
            base_url: "http://test".to_string(),
            conversation_id: 12,
            current_user_id: 7,
            token: "t".to_string(),
        }
    }

    fn conversation() -> Conversation {
        let mut conversation = Conversation::new(context());
        conversation.set_roster(crate::models::Roster {
            name: "Ops".to_string(),
            users: vec![Candidate::new(5, "Sam"), Candidate::new(9, "Anya")],
        });
        conversation.apply_snapshot(1, vec![message(1, "Anya", "morning")]);
        conversation
    }

    fn type_str(conversation: &mut Conversation, s: &str) {
        for c in s.chars() {
            conversation.edit(|buf| buf.insert_char(c));
        }
    }

    #[tokio::test]
    async fn test_blank_draft_sends_nothing() {
        let backend = ScriptedBackend::new();
        let mut conversation = conversation();
        type_str(&mut conversation, "   ");
        let before = conversation.composer().draft().clone();

        let outcome = send(&mut conversation, &backend).await.unwrap();
        assert!(matches!(outcome, SendOutcome::Blank));
        assert!(backend.sent().is_empty());
        assert_eq!(conversation.composer().draft(), &before);
        assert_eq!(conversation.messages().len(), 1);
    }

    #[tokio::test]
    async fn test_success_prepends_and_clears() {
        let backend = ScriptedBackend::new().with_author(7, "Me");
        let mut conversation = conversation();
        type_str(&mut conversation, "ping @sa");
        conversation.composer_mut().commit_selected().unwrap();
        conversation.after_render();
        type_str(&mut conversation, "please check gate 4");

        let outcome = send(&mut conversation, &backend).await.unwrap();
        let SendOutcome::Sent(id) = outcome else {
            panic!("expected a sent message");
        };

        assert_eq!(conversation.messages().get(0).map(|m| m.id), Some(id));
        assert_eq!(conversation.messages().len(), 2);
        assert_eq!(conversation.composer().draft(), &ComposerDraft::new());

        let sent = backend.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].body, "ping @Sam please check gate 4");
        assert_eq!(sent[0].mentioned_user_ids, vec![5]);
        assert_eq!(sent[0].destination, Destination::Group(12));
    }

    #[tokio::test]
    async fn test_failure_keeps_draft() {
        let backend = ScriptedBackend::new();
        backend.fail_sends(true);
        let mut conversation = conversation();
        type_str(&mut conversation, "hi @an");
        conversation.composer_mut().commit_selected().unwrap();
        conversation.after_render();
        let target = conversation.messages().get(0).cloned().unwrap();
        conversation.composer_mut().draft_mut().set_reply_target(target);
        let before = conversation.composer().draft().clone();

        let err = send(&mut conversation, &backend).await.unwrap_err();
        assert!(matches!(err, ChatError::Status { status: 500, .. }));
        assert_eq!(conversation.composer().draft(), &before);
        assert_eq!(conversation.messages().len(), 1);
        assert_eq!(backend.sent().len(), 1);
    }

    #[tokio::test]
    async fn test_reply_target_becomes_parent_id() {
        let backend = ScriptedBackend::new();
        let mut conversation = conversation();
        let target = conversation.messages().get(0).cloned().unwrap();
        conversation.composer_mut().draft_mut().set_reply_target(target);
        type_str(&mut conversation, "on it");

        send(&mut conversation, &backend).await.unwrap();
        assert_eq!(backend.sent()[0].parent_id, Some(1));
        assert!(conversation.composer().draft().reply_target().is_none());
        assert_eq!(conversation.messages().get(0).unwrap().parent_id, Some(1));
    }

    #[test]
    fn test_second_begin_is_rejected_while_sending() {
        let mut conversation = conversation();
        type_str(&mut conversation, "first");
        assert!(matches!(begin_send(&mut conversation), BeginSend::Started(_)));
        assert!(conversation.composer().draft().is_sending());
        assert!(matches!(begin_send(&mut conversation), BeginSend::InFlight));

        // Edits during the send are allowed and discarded on success
        type_str(&mut conversation, " more");
        finish_send(&mut conversation, Ok(message(50, "Me", "first"))).unwrap();
        assert_eq!(conversation.composer().draft().text(), "");
        assert_eq!(conversation.composer().draft().send_state(), SendState::Idle);
    }

    #[tokio::test]
    async fn test_attachment_only_message_is_sent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("photo.jpg");
        std::fs::write(&path, b"jpeg").unwrap();

        let backend = ScriptedBackend::new();
        let mut conversation = conversation();
        conversation
            .composer_mut()
            .draft_mut()
            .staged_mut()
            .stage(&path)
            .unwrap();

        send(&mut conversation, &backend).await.unwrap();
        let sent = backend.sent();
        assert_eq!(sent[0].body, "");
        assert_eq!(sent[0].attachments.len(), 1);
        assert!(conversation.composer().draft().staged().is_empty());
        let created = conversation.messages().get(0).unwrap();
        assert_eq!(created.attachments[0].content_type.as_deref(), Some("image/jpeg"));
    }

    #[tokio::test]
    async fn test_body_is_sent_as_typed() {
        let backend = ScriptedBackend::new();
        let mut conversation = conversation();
        let typed = "    indented code\n  line two  ";
        conversation.edit(|buf| buf.insert_str(typed));

        send(&mut conversation, &backend).await.unwrap();
        assert_eq!(backend.sent()[0].body, typed);
    }

    #[test]
    fn test_form_fields() {
        let payload = SendPayload {
            destination: Destination::Group(12),
            body: "hi".to_string(),
            parent_id: Some(3),
            mentioned_user_ids: vec![5, 9],
            attachments: Vec::new(),
            attachment_urls: Vec::new(),
            is_forwarded: false,
        };
        let fields = payload.form_fields();
        assert_eq!(
            fields,
            vec![
                ("message[body]", "hi".to_string()),
                ("message[project_space_id]", "12".to_string()),
                ("message[parent_id]", "3".to_string()),
                ("message[mentioned_user_ids][]", "5".to_string()),
                ("message[mentioned_user_ids][]", "9".to_string()),
            ]
        );
    }

    #[test]
    fn test_forward_payload_references_files() {
        let mut original = message(8, "Rosa", "gate 4 camera is down");
        original.parent_id = Some(2);
        original.attachments.push(crate::models::RemoteAttachment {
            url: "https://files.test/cam.jpg".to_string(),
            content_type: Some("image/jpeg".to_string()),
            filename: None,
        });

        let payload = SendPayload::forward(&original, Destination::Direct(4));
        assert_eq!(payload.parent_id, None);
        assert!(payload.attachments.is_empty());
        assert_eq!(
            payload.form_fields(),
            vec![
                ("message[body]", "gate 4 camera is down".to_string()),
                ("message[conversation_id]", "4".to_string()),
                ("message[is_forwarded]", "true".to_string()),
                ("message[attachment_urls][]", "https://files.test/cam.jpg".to_string()),
            ]
        );
    }
}
