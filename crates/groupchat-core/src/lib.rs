pub mod backend;
pub mod client;
pub mod composer;
pub mod config;
pub mod constants;
pub mod conversation;
pub mod error;
pub mod events;
pub mod forward;
pub mod models;
pub mod send;
pub mod sync;
pub mod tracing_setup;

pub use backend::ChatBackend;
pub use client::HttpBackend;
pub use config::{ChatConfig, ChatContext};
pub use conversation::{Conversation, MessageList, SubView};
pub use error::{ChatError, Result};
pub use events::ChatEvent;
pub use forward::ForwardPicker;
pub use sync::{FetchSequence, SyncLoop, SyncSettings, SyncState};
