use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

pub type MessageId = u64;
pub type UserId = u64;
pub type ConversationId = u64;

/// Attachment already stored by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteAttachment {
    pub url: String,
    #[serde(default)]
    pub content_type: Option<String>,
    #[serde(default)]
    pub filename: Option<String>,
}

impl RemoteAttachment {
    pub fn is_image(&self) -> bool {
        self.content_type
            .as_deref()
            .map(|ct| ct.starts_with("image/"))
            .unwrap_or(false)
    }

    /// Display name: the server filename, else the last URL segment.
    pub fn display_name(&self) -> &str {
        match self.filename.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => self.url.rsplit('/').next().unwrap_or(&self.url),
        }
    }
}

/// A chat message as returned by the server. Never mutated locally except
/// for the pin flag after the server confirmed the change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub body: String,
    #[serde(rename = "user_name", default, deserialize_with = "null_as_default")]
    pub author_name: String,
    #[serde(default)]
    pub user_id: Option<UserId>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub attachments: Vec<RemoteAttachment>,
    #[serde(default)]
    pub parent_id: Option<MessageId>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub mentioned_user_ids: Vec<UserId>,
    pub created_at: DateTime<Utc>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_pinned: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_forwarded: bool,
}

impl Message {
    /// Short preview used by reply banners: the body, or "Attachment" when the
    /// message only carries files.
    pub fn preview(&self, max_chars: usize) -> String {
        if self.body.trim().is_empty() {
            return "Attachment".to_string();
        }
        let flat = self.body.replace('\n', " ");
        if flat.chars().count() > max_chars {
            let truncated: String = flat.chars().take(max_chars).collect();
            format!("{}...", truncated)
        } else {
            flat
        }
    }

    pub fn is_from(&self, user_id: UserId) -> bool {
        self.user_id == Some(user_id)
    }
}

/// Response envelope for `GET /messages.json`.
#[derive(Debug, Clone, Deserialize)]
pub struct MessagePage {
    #[serde(default, deserialize_with = "null_as_default")]
    pub messages: Vec<Message>,
}

/// The server sends `null` for empty bodies and lists; read it as a missing key.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
