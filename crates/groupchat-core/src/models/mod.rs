pub mod markup;
pub mod message;
pub mod roster;
pub mod target;

pub use markup::{split_mentions, BodySegment};
pub use message::{ConversationId, Message, MessageId, MessagePage, RemoteAttachment, UserId};
pub use roster::{Candidate, Roster};
pub use target::{Destination, DirectSummary, ForwardTarget, GroupSummary};
