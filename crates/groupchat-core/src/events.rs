use crate::error::ChatError;
use crate::models::{ForwardTarget, Message, MessageId, Roster, UserId};

/// Results of background work, delivered to the task that owns the
/// conversation state.
#[derive(Debug)]
pub enum ChatEvent {
    /// A poll completed. `seq` orders snapshots; older ones are discarded.
    MessagesFetched { seq: u64, messages: Vec<Message> },
    SendFinished(Result<Message, ChatError>),
    RosterLoaded(Result<Roster, ChatError>),
    MemberRemoved {
        user_id: UserId,
        result: Result<(), ChatError>,
    },
    PinUpdated {
        message_id: MessageId,
        pinned: bool,
        result: Result<(), ChatError>,
    },
    ForwardTargetsLoaded(Result<Vec<ForwardTarget>, ChatError>),
    /// All forward requests finished. `result` is the first failure, if any.
    Forwarded {
        count: usize,
        result: Result<(), ChatError>,
    },
}
