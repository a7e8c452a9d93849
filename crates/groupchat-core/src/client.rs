//! REST transport for [`ChatBackend`].

use std::path::Path;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use crate::backend::ChatBackend;
use crate::config::ChatContext;
use crate::error::{ChatError, Result};
use crate::models::{
    ConversationId, DirectSummary, ForwardTarget, GroupSummary, Message, MessageId, MessagePage,
    Roster, UserId,
};
use crate::send::SendPayload;

/// Create responses come back either bare or wrapped in `{"message": ...}`.
#[derive(Deserialize)]
#[serde(untagged)]
enum CreatedMessage {
    Wrapped { message: Message },
    Bare(Message),
}

impl From<CreatedMessage> for Message {
    fn from(created: CreatedMessage) -> Self {
        match created {
            CreatedMessage::Wrapped { message } => message,
            CreatedMessage::Bare(message) => message,
        }
    }
}

/// Index responses come back either bare or under a resource key.
#[derive(Deserialize)]
#[serde(untagged)]
enum Listing<T> {
    Bare(Vec<T>),
    Wrapped {
        #[serde(alias = "conversations", alias = "project_spaces")]
        items: Vec<T>,
    },
}

impl<T> Listing<T> {
    fn into_vec(self) -> Vec<T> {
        match self {
            Listing::Bare(items) | Listing::Wrapped { items } => items,
        }
    }
}

#[derive(Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
    token: String,
}

impl HttpBackend {
    pub fn new(context: &ChatContext) -> Self {
        Self::with_client(Client::new(), context)
    }

    pub fn with_client(client: Client, context: &ChatContext) -> Self {
        Self {
            client,
            base_url: context.base_url.trim_end_matches('/').to_string(),
            token: context.token.clone(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request.bearer_auth(&self.token)
    }

    async fn checked(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(ChatError::Status {
            status: status.as_u16(),
            body,
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self.authorized(self.client.get(self.url(path))).send().await?;
        Self::decode(response).await
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
        let bytes = Self::checked(response).await?.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn file_part(path: &Path, file_name: &str, mime_type: &str) -> Result<Part> {
        let data = tokio::fs::read(path).await.map_err(|source| ChatError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Part::bytes(data)
            .file_name(file_name.to_string())
            .mime_str(mime_type)?)
    }
}

#[async_trait]
impl ChatBackend for HttpBackend {
    async fn fetch_messages(
        &self,
        conversation_id: ConversationId,
        page_size: u32,
        page: u32,
    ) -> Result<Vec<Message>> {
        let response = self
            .authorized(self.client.get(self.url("messages.json")))
            .query(&[
                ("q[project_space_id_eq]", conversation_id.to_string()),
                ("per_page", page_size.to_string()),
                ("page", page.to_string()),
            ])
            .send()
            .await?;
        let page: MessagePage = Self::decode(response).await?;
        debug!(count = page.messages.len(), "Fetched messages");
        Ok(page.messages)
    }

    async fn send_message(&self, payload: &SendPayload) -> Result<Message> {
        let mut form = Form::new();
        for (name, value) in payload.form_fields() {
            form = form.text(name, value);
        }
        for attachment in &payload.attachments {
            let part =
                Self::file_part(&attachment.path, &attachment.file_name, &attachment.mime_type)
                    .await?;
            form = form.part("message[attachments][]", part);
        }

        let response = self
            .authorized(self.client.post(self.url("messages.json")))
            .multipart(form)
            .send()
            .await?;
        let created: CreatedMessage = Self::decode(response).await?;
        Ok(created.into())
    }

    async fn fetch_roster(&self, conversation_id: ConversationId) -> Result<Roster> {
        self.get_json(&format!("project_spaces/{}.json", conversation_id))
            .await
    }

    async fn fetch_forward_targets(&self) -> Result<Vec<ForwardTarget>> {
        let direct: Listing<DirectSummary> = self.get_json("conversations.json").await?;
        let groups: Listing<GroupSummary> = self.get_json("project_spaces.json").await?;
        let targets: Vec<ForwardTarget> = direct
            .into_vec()
            .into_iter()
            .map(ForwardTarget::from)
            .chain(groups.into_vec().into_iter().map(ForwardTarget::from))
            .collect();
        debug!(count = targets.len(), "Fetched forward targets");
        Ok(targets)
    }

    async fn remove_member(&self, conversation_id: ConversationId, user_id: UserId) -> Result<()> {
        debug!(conversation_id, user_id, "Removing member");
        let response = self
            .authorized(
                self.client
                    .delete(self.url(&format!("project_space_users/{}.json", user_id))),
            )
            .send()
            .await?;
        Self::checked(response).await?;
        Ok(())
    }

    async fn set_pinned(&self, message_id: MessageId, pinned: bool) -> Result<()> {
        let response = self
            .authorized(self.client.put(self.url(&format!("messages/{}.json", message_id))))
            .json(&serde_json::json!({ "message": { "is_pinned": pinned } }))
            .send()
            .await?;
        Self::checked(response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use axum::body::Bytes;
    use axum::extract::{RawQuery, State};
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::{delete, get, put};
    use axum::{Json, Router};

    use crate::composer::StagedAttachment;
    use crate::models::Destination;

    #[derive(Clone, Default)]
    struct Seen {
        requests: Arc<Mutex<Vec<(String, Option<String>, String)>>>,
    }

    impl Seen {
        fn record(&self, what: &str, headers: &HeaderMap, body: String) {
            let auth = headers
                .get("authorization")
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);
            self.requests
                .lock()
                .unwrap()
                .push((what.to_string(), auth, body));
        }

        fn all(&self) -> Vec<(String, Option<String>, String)> {
            self.requests.lock().unwrap().clone()
        }
    }

    async fn list(State(seen): State<Seen>, headers: HeaderMap, RawQuery(query): RawQuery) -> Json<serde_json::Value> {
        seen.record("list", &headers, query.unwrap_or_default());
        Json(serde_json::json!({
            "messages": [
                {"id": 2, "body": "second", "user_name": "Rosa", "created_at": "2025-03-01T10:16:00Z"},
                {"id": 1, "body": "first", "user_name": "Sam", "created_at": "2025-03-01T10:15:00Z"}
            ]
        }))
    }

    async fn create(State(seen): State<Seen>, headers: HeaderMap, body: Bytes) -> Json<serde_json::Value> {
        seen.record("create", &headers, String::from_utf8_lossy(&body).into_owned());
        Json(serde_json::json!({
            "message": {"id": 3, "body": "hello", "user_name": "Me", "user_id": 7, "created_at": "2025-03-01T10:17:00Z"}
        }))
    }

    async fn roster(State(seen): State<Seen>, headers: HeaderMap) -> Json<serde_json::Value> {
        seen.record("roster", &headers, String::new());
        Json(serde_json::json!({
            "name": "Night shift",
            "project_space_users": [{"id": 5, "user_name": "Sam"}]
        }))
    }

    async fn conversations(State(seen): State<Seen>, headers: HeaderMap) -> Json<serde_json::Value> {
        seen.record("conversations", &headers, String::new());
        Json(serde_json::json!([
            {"id": 4, "receiver_name": "Rosa", "sender_name": "Me"}
        ]))
    }

    async fn groups(State(seen): State<Seen>, headers: HeaderMap) -> Json<serde_json::Value> {
        seen.record("groups", &headers, String::new());
        Json(serde_json::json!({
            "project_spaces": [{"id": 12, "name": "Night shift"}, {"id": 15, "name": null}]
        }))
    }

    async fn remove(State(seen): State<Seen>, headers: HeaderMap) -> StatusCode {
        seen.record("remove", &headers, String::new());
        StatusCode::NO_CONTENT
    }

    async fn pin(State(seen): State<Seen>, headers: HeaderMap, body: Bytes) -> (StatusCode, &'static str) {
        seen.record("pin", &headers, String::from_utf8_lossy(&body).into_owned());
        (StatusCode::UNPROCESSABLE_ENTITY, "not allowed")
    }

    async fn serve() -> (HttpBackend, Seen) {
        let seen = Seen::default();
        let app = Router::new()
            .route("/api/messages.json", get(list).post(create))
            .route("/api/project_spaces/12.json", get(roster))
            .route("/api/conversations.json", get(conversations))
            .route("/api/project_spaces.json", get(groups))
            .route("/api/project_space_users/5.json", delete(remove))
            .route("/api/messages/2.json", put(pin))
            .with_state(seen.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let context = ChatContext {
            base_url: format!("http://{}/api/", addr),
            conversation_id: 12,
            current_user_id: 7,
            token: "secret-token".to_string(),
        };
        (HttpBackend::new(&context), seen)
    }

    #[tokio::test]
    async fn test_fetch_messages_query_and_auth() {
        let (backend, seen) = serve().await;
        let messages = backend.fetch_messages(12, 50, 1).await.unwrap();
        assert_eq!(messages.iter().map(|m| m.id).collect::<Vec<_>>(), vec![2, 1]);

        let requests = seen.all();
        let (_, auth, query) = &requests[0];
        assert_eq!(auth.as_deref(), Some("Bearer secret-token"));
        assert!(query.contains("q%5Bproject_space_id_eq%5D=12"));
        assert!(query.contains("per_page=50"));
        assert!(query.contains("page=1"));
    }

    #[tokio::test]
    async fn test_send_message_multipart() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, b"shift notes").unwrap();

        let (backend, seen) = serve().await;
        let payload = SendPayload {
            destination: Destination::Group(12),
            body: "hello".to_string(),
            parent_id: Some(1),
            mentioned_user_ids: vec![5],
            attachments: vec![StagedAttachment::from_path(&path).unwrap()],
            attachment_urls: Vec::new(),
            is_forwarded: false,
        };
        let created = backend.send_message(&payload).await.unwrap();
        assert_eq!(created.id, 3);
        assert_eq!(created.user_id, Some(7));

        let requests = seen.all();
        let body = &requests[0].2;
        for field in [
            "name=\"message[body]\"",
            "name=\"message[project_space_id]\"",
            "name=\"message[parent_id]\"",
            "name=\"message[mentioned_user_ids][]\"",
            "name=\"message[attachments][]\"; filename=\"notes.txt\"",
            "shift notes",
        ] {
            assert!(body.contains(field), "missing {field}");
        }
    }

    #[tokio::test]
    async fn test_send_with_missing_file_fails_before_request() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gone.txt");
        std::fs::write(&path, b"x").unwrap();
        let attachment = StagedAttachment::from_path(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        let (backend, seen) = serve().await;
        let payload = SendPayload {
            destination: Destination::Group(12),
            body: String::new(),
            parent_id: None,
            mentioned_user_ids: Vec::new(),
            attachments: vec![attachment],
            attachment_urls: Vec::new(),
            is_forwarded: false,
        };
        let err = backend.send_message(&payload).await.unwrap_err();
        assert!(matches!(err, ChatError::Io { .. }));
        assert!(seen.all().is_empty());
    }

    #[tokio::test]
    async fn test_roster_and_member_removal() {
        let (backend, seen) = serve().await;
        let roster = backend.fetch_roster(12).await.unwrap();
        assert_eq!(roster.name, "Night shift");
        assert_eq!(roster.users[0].display_name, "Sam");

        backend.remove_member(12, 5).await.unwrap();
        assert_eq!(seen.all()[1].0, "remove");
    }

    #[tokio::test]
    async fn test_forward_targets_direct_then_groups() {
        let (backend, seen) = serve().await;
        let targets = backend.fetch_forward_targets().await.unwrap();
        let summary: Vec<(Destination, &str)> = targets
            .iter()
            .map(|t| (t.destination, t.name.as_str()))
            .collect();
        assert_eq!(
            summary,
            vec![
                (Destination::Direct(4), "Rosa"),
                (Destination::Group(12), "Night shift"),
                (Destination::Group(15), ""),
            ]
        );
        let what: Vec<String> = seen.all().into_iter().map(|r| r.0).collect();
        assert_eq!(what, vec!["conversations", "groups"]);
    }

    #[tokio::test]
    async fn test_forwarded_message_fields() {
        let (backend, seen) = serve().await;
        let mut original = crate::backend::testing::message(8, "Rosa", "camera down");
        original.attachments.push(crate::models::RemoteAttachment {
            url: "https://files.test/cam.jpg".to_string(),
            content_type: None,
            filename: None,
        });
        let payload = SendPayload::forward(&original, Destination::Direct(4));
        backend.send_message(&payload).await.unwrap();

        let body = &seen.all()[0].2;
        for field in [
            "name=\"message[conversation_id]\"",
            "name=\"message[is_forwarded]\"",
            "name=\"message[attachment_urls][]\"",
            "https://files.test/cam.jpg",
        ] {
            assert!(body.contains(field), "missing {field}");
        }
        assert!(!body.contains("message[project_space_id]"));
    }

    #[tokio::test]
    async fn test_error_status_carries_body() {
        let (backend, seen) = serve().await;
        let err = backend.set_pinned(2, true).await.unwrap_err();
        match err {
            ChatError::Status { status, body } => {
                assert_eq!(status, 422);
                assert_eq!(body, "not allowed");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(seen.all()[0].2, r#"{"message":{"is_pinned":true}}"#);
    }

    #[tokio::test]
    async fn test_unknown_route_is_status_error() {
        let (backend, _) = serve().await;
        let err = backend.fetch_roster(99).await.unwrap_err();
        assert!(matches!(err, ChatError::Status { status: 404, .. }));
    }
}
