use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{Event, EventStream, KeyCode, KeyEventKind, KeyModifiers};
use futures::StreamExt;
use groupchat_core::models::{ConversationId, MessageId, UserId};
use groupchat_core::send::SendPayload;
use groupchat_core::{ChatBackend, ChatEvent, SyncLoop, SyncSettings};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::input::{handle_key, handle_paste};
use crate::render::render;
use crate::ui::{App, Command, Tui};

const TICK: Duration = Duration::from_millis(250);

/// Issues backend requests off the UI task. Each result comes back as a
/// [`ChatEvent`] on the shared channel.
struct Requests {
    backend: Arc<dyn ChatBackend>,
    conversation_id: ConversationId,
    events: mpsc::UnboundedSender<ChatEvent>,
}

impl Requests {
    fn send(&self, payload: SendPayload) {
        let backend = self.backend.clone();
        let events = self.events.clone();
        tokio::spawn(async move {
            let result = backend.send_message(&payload).await;
            if let Err(e) = &result {
                warn!("Send failed: {}", e);
            }
            let _ = events.send(ChatEvent::SendFinished(result));
        });
    }

    fn load_roster(&self) {
        let backend = self.backend.clone();
        let events = self.events.clone();
        let conversation_id = self.conversation_id;
        tokio::spawn(async move {
            let result = backend.fetch_roster(conversation_id).await;
            let _ = events.send(ChatEvent::RosterLoaded(result));
        });
    }

    fn remove_member(&self, user_id: UserId) {
        let backend = self.backend.clone();
        let events = self.events.clone();
        let conversation_id = self.conversation_id;
        tokio::spawn(async move {
            let result = backend.remove_member(conversation_id, user_id).await;
            let _ = events.send(ChatEvent::MemberRemoved { user_id, result });
        });
    }

    fn set_pinned(&self, message_id: MessageId, pinned: bool) {
        let backend = self.backend.clone();
        let events = self.events.clone();
        tokio::spawn(async move {
            let result = backend.set_pinned(message_id, pinned).await;
            let _ = events.send(ChatEvent::PinUpdated {
                message_id,
                pinned,
                result,
            });
        });
    }

    fn load_forward_targets(&self) {
        let backend = self.backend.clone();
        let events = self.events.clone();
        tokio::spawn(async move {
            let result = backend.fetch_forward_targets().await;
            let _ = events.send(ChatEvent::ForwardTargetsLoaded(result));
        });
    }

    /// One create per destination, all in flight together.
    fn forward(&self, payloads: Vec<SendPayload>) {
        let backend = self.backend.clone();
        let events = self.events.clone();
        tokio::spawn(async move {
            let count = payloads.len();
            let results =
                futures::future::join_all(payloads.iter().map(|p| backend.send_message(p))).await;
            let result = match results.into_iter().find_map(|r| r.err()) {
                Some(e) => {
                    warn!("Forward failed: {}", e);
                    Err(e)
                }
                None => Ok(()),
            };
            let _ = events.send(ChatEvent::Forwarded { count, result });
        });
    }
}

fn dispatch(app: &App, command: Command, sync: &mut SyncLoop, requests: &Requests) {
    match command {
        Command::Send(payload) => {
            debug!(
                attachments = payload.attachments.len(),
                reply = payload.parent_id.is_some(),
                "Sending message"
            );
            requests.send(payload);
        }
        Command::LoadRoster => requests.load_roster(),
        Command::RemoveMember(user_id) => requests.remove_member(user_id),
        Command::SetPinned { message_id, pinned } => requests.set_pinned(message_id, pinned),
        Command::LoadForwardTargets => requests.load_forward_targets(),
        Command::Forward(payloads) => {
            debug!(targets = payloads.len(), "Forwarding message");
            requests.forward(payloads);
        }
        Command::SubViewChanged(view) => {
            sync.set_sub_view(view);
            if app.needs_roster() {
                requests.load_roster();
            }
        }
    }
}

fn handle_terminal_event(app: &mut App, event: Event, sync: &mut SyncLoop, requests: &Requests) {
    match event {
        Event::Key(key) if key.kind == KeyEventKind::Press => {
            if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                if app.pending_quit {
                    app.quit();
                } else {
                    app.pending_quit = true;
                }
                return;
            }
            app.pending_quit = false;
            if let Some(command) = handle_key(app, key) {
                dispatch(app, command, sync, requests);
            }
        }
        Event::Paste(text) => handle_paste(app, &text),
        _ => {}
    }
}

pub(crate) async fn run_app(
    terminal: &mut Tui,
    app: &mut App,
    backend: Arc<dyn ChatBackend>,
    settings: SyncSettings,
) -> Result<()> {
    let mut event_stream = EventStream::new();
    let mut tick_interval = tokio::time::interval(TICK);
    let (events_tx, mut events_rx) = mpsc::unbounded_channel::<ChatEvent>();

    let requests = Requests {
        backend: backend.clone(),
        conversation_id: settings.conversation_id,
        events: events_tx.clone(),
    };
    let mut sync = SyncLoop::new(
        backend,
        settings,
        app.conversation.sequence().clone(),
        events_tx,
    );
    sync.activate(app.sub_view());
    requests.load_roster();
    info!(conversation_id = settings.conversation_id, "Conversation opened");

    while app.running {
        app.sync_state = sync.state();
        terminal.draw(|f| render(f, app))?;
        // A committed mention moves the caret only once its text is on screen
        if app.conversation.after_render() {
            continue;
        }

        tokio::select! {
            maybe_event = event_stream.next() => match maybe_event {
                Some(Ok(event)) => handle_terminal_event(app, event, &mut sync, &requests),
                Some(Err(e)) => warn!("Terminal event error: {}", e),
                None => app.quit(),
            },

            Some(event) = events_rx.recv() => {
                if let Some(command) = app.handle_event(event) {
                    dispatch(app, command, &mut sync, &requests);
                }
            }

            _ = tick_interval.tick() => app.tick(),
        }
    }

    sync.deactivate();
    info!("Conversation closed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use groupchat_core::backend::testing::{message, ScriptedBackend};
    use groupchat_core::models::{Candidate, Destination, ForwardTarget};
    use groupchat_core::ChatContext;

    fn app() -> App {
        App::new(ChatContext {
            base_url: "http://test".to_string(),
            conversation_id: 12,
            current_user_id: 7,
            token: "t".to_string(),
        })
    }

    fn requests(
        backend: Arc<ScriptedBackend>,
    ) -> (Requests, mpsc::UnboundedReceiver<ChatEvent>) {
        let (events, rx) = mpsc::unbounded_channel();
        let requests = Requests {
            backend,
            conversation_id: 12,
            events,
        };
        (requests, rx)
    }

    #[tokio::test]
    async fn test_member_removal_round_trip() {
        let backend = Arc::new(
            ScriptedBackend::new()
                .with_roster("Ops", vec![Candidate::new(5, "Sam"), Candidate::new(9, "Anya")]),
        );
        let (requests, mut rx) = requests(backend.clone());
        let mut app = app();

        requests.load_roster();
        app.handle_event(rx.recv().await.unwrap());
        assert_eq!(app.conversation.roster().users.len(), 2);

        app.selected_member = 1;
        app.request_remove_selected();
        let Some(Command::RemoveMember(user_id)) = app.confirm_remove() else {
            panic!("expected a removal");
        };
        requests.remove_member(user_id);
        let follow_up = app.handle_event(rx.recv().await.unwrap());
        assert_eq!(backend.removed(), vec![(12, 9)]);
        assert!(matches!(follow_up, Some(Command::LoadRoster)));

        requests.load_roster();
        app.handle_event(rx.recv().await.unwrap());
        let names: Vec<&str> = app
            .conversation
            .roster()
            .users
            .iter()
            .map(|u| u.display_name.as_str())
            .collect();
        assert_eq!(names, vec!["Sam"]);
    }

    #[tokio::test]
    async fn test_member_ops_failures_notify() {
        let backend = Arc::new(ScriptedBackend::new());
        backend.fail_member_ops(true);
        let (requests, mut rx) = requests(backend.clone());
        let mut app = app();

        requests.remove_member(5);
        assert!(app.handle_event(rx.recv().await.unwrap()).is_none());
        assert_eq!(app.current_notification().unwrap().message, "Server returned 500: scripted failure");

        requests.set_pinned(3, true);
        app.handle_event(rx.recv().await.unwrap());
        assert!(backend.removed().is_empty());
        assert!(backend.pins().is_empty());
    }

    #[tokio::test]
    async fn test_pin_request_updates_list() {
        let backend = Arc::new(ScriptedBackend::new().with_messages(vec![message(3, "Rosa", "x")]));
        let (requests, mut rx) = requests(backend.clone());
        let mut app = app();
        app.handle_event(ChatEvent::MessagesFetched {
            seq: 1,
            messages: vec![message(3, "Rosa", "x")],
        });

        let Some(Command::SetPinned { message_id, pinned }) = app.toggle_pin_selected() else {
            panic!("expected a pin command");
        };
        requests.set_pinned(message_id, pinned);
        app.handle_event(rx.recv().await.unwrap());
        assert_eq!(backend.pins(), vec![(3, true)]);
        assert!(app.conversation.messages().find(3).unwrap().is_pinned);
    }

    #[tokio::test]
    async fn test_forward_sends_one_message_per_target() {
        let targets = vec![
            ForwardTarget {
                destination: Destination::Direct(4),
                name: "Sam".to_string(),
            },
            ForwardTarget {
                destination: Destination::Group(15),
                name: "Day shift".to_string(),
            },
        ];
        let backend = Arc::new(ScriptedBackend::new().with_targets(targets));
        let (requests, mut rx) = requests(backend.clone());
        let mut app = app();
        app.handle_event(ChatEvent::MessagesFetched {
            seq: 1,
            messages: vec![message(3, "Rosa", "need backup")],
        });

        app.open_forward();
        requests.load_forward_targets();
        app.handle_event(rx.recv().await.unwrap());
        let picker = app.forward.as_mut().unwrap();
        picker.toggle_selected();
        picker.move_down();
        picker.toggle_selected();
        let Some(Command::Forward(payloads)) = app.submit_forward() else {
            panic!("expected a forward command");
        };

        requests.forward(payloads);
        app.handle_event(rx.recv().await.unwrap());
        assert_eq!(app.current_notification().unwrap().message, "Message forwarded to 2 chats");
        let sent = backend.sent();
        assert_eq!(sent.len(), 2);
        assert!(sent.iter().all(|p| p.is_forwarded && p.body == "need backup"));
    }

    #[tokio::test]
    async fn test_forward_failure_is_reported_once() {
        let backend = Arc::new(ScriptedBackend::new());
        backend.fail_sends(true);
        let (requests, mut rx) = requests(backend.clone());
        let original = message(3, "Rosa", "x");
        requests.forward(vec![
            SendPayload::forward(&original, Destination::Direct(4)),
            SendPayload::forward(&original, Destination::Group(15)),
        ]);
        let event = rx.recv().await.unwrap();
        assert!(matches!(event, ChatEvent::Forwarded { count: 2, result: Err(_) }));
        assert_eq!(backend.sent().len(), 2);
    }
}
