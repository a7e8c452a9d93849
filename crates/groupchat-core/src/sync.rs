use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::backend::ChatBackend;
use crate::conversation::SubView;
use crate::events::ChatEvent;
use crate::models::ConversationId;

/// Monotonic fetch counter shared by the sync loop and the conversation.
#[derive(Debug, Clone, Default)]
pub struct FetchSequence(Arc<AtomicU64>);

impl FetchSequence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the next sequence number.
    pub fn next(&self) -> u64 {
        self.0.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Last number handed out, 0 before the first fetch.
    pub fn current(&self) -> u64 {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    Idle,
    Polling,
}

#[derive(Debug, Clone, Copy)]
pub struct SyncSettings {
    pub conversation_id: ConversationId,
    pub page_size: u32,
    pub interval: Duration,
}

struct Running {
    cancel_tx: watch::Sender<bool>,
    handle: JoinHandle<()>,
    polling: bool,
}

/// Keeps the message list fresh while a conversation is open.
///
/// Every activation fetches once right away. While the Chat sub-view is
/// selected the fetch repeats every `interval`, each one awaited before the
/// next sleep starts. Leaving Chat cancels the task, including a fetch that
/// is still in flight. Must be driven from within a tokio runtime.
pub struct SyncLoop {
    backend: Arc<dyn ChatBackend>,
    settings: SyncSettings,
    sequence: FetchSequence,
    events: mpsc::UnboundedSender<ChatEvent>,
    running: Option<Running>,
    active: bool,
}

impl SyncLoop {
    pub fn new(
        backend: Arc<dyn ChatBackend>,
        settings: SyncSettings,
        sequence: FetchSequence,
        events: mpsc::UnboundedSender<ChatEvent>,
    ) -> Self {
        Self {
            backend,
            settings,
            sequence,
            events,
            running: None,
            active: false,
        }
    }

    pub fn activate(&mut self, sub_view: SubView) {
        info!(
            conversation_id = self.settings.conversation_id,
            "Activating conversation sync"
        );
        self.active = true;
        self.start(sub_view.polls());
    }

    /// Follow a sub-view change: only Chat keeps polling.
    pub fn set_sub_view(&mut self, sub_view: SubView) {
        if !self.active {
            return;
        }
        let polling = self.running.as_ref().is_some_and(|r| r.polling);
        match (polling, sub_view.polls()) {
            (true, false) => {
                debug!("Leaving chat, polling stopped");
                self.stop();
            }
            (false, true) => {
                debug!("Back on chat, polling restarted");
                self.start(true);
            }
            _ => {}
        }
    }

    pub fn deactivate(&mut self) {
        if self.active {
            info!(
                conversation_id = self.settings.conversation_id,
                "Deactivating conversation sync"
            );
        }
        self.active = false;
        self.stop();
    }

    pub fn state(&self) -> SyncState {
        match &self.running {
            Some(running) if running.polling && !running.handle.is_finished() => SyncState::Polling,
            _ => SyncState::Idle,
        }
    }

    fn start(&mut self, polling: bool) {
        self.stop();
        let (cancel_tx, cancel_rx) = watch::channel(false);
        let handle = tokio::spawn(run_sync(
            self.backend.clone(),
            self.settings,
            self.sequence.clone(),
            self.events.clone(),
            cancel_rx,
            polling,
        ));
        self.running = Some(Running {
            cancel_tx,
            handle,
            polling,
        });
    }

    fn stop(&mut self) {
        if let Some(running) = self.running.take() {
            let _ = running.cancel_tx.send(true);
        }
    }
}

impl Drop for SyncLoop {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn run_sync(
    backend: Arc<dyn ChatBackend>,
    settings: SyncSettings,
    sequence: FetchSequence,
    events: mpsc::UnboundedSender<ChatEvent>,
    mut cancel_rx: watch::Receiver<bool>,
    repeat: bool,
) {
    loop {
        if *cancel_rx.borrow() {
            break;
        }

        let seq = sequence.next();
        debug!(seq, "Fetching messages");
        tokio::select! {
            res = cancel_rx.changed() => {
                if res.is_err() || *cancel_rx.borrow() {
                    debug!(seq, "Fetch cancelled");
                    break;
                }
            }
            result = backend.fetch_messages(settings.conversation_id, settings.page_size, 1) => {
                match result {
                    Ok(messages) => {
                        if events.send(ChatEvent::MessagesFetched { seq, messages }).is_err() {
                            break;
                        }
                    }
                    Err(e) => warn!(seq, error = %e, "Message poll failed"),
                }
            }
        }

        if !repeat {
            break;
        }

        tokio::select! {
            res = cancel_rx.changed() => {
                if res.is_err() || *cancel_rx.borrow() {
                    break;
                }
            }
            _ = tokio::time::sleep(settings.interval) => {}
        }
    }
    debug!("Sync task stopped");
}
