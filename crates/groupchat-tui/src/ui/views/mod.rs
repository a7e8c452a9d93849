pub mod attachments;
pub mod chat;
pub mod composer;
pub mod forward;
pub mod members;

pub use attachments::render_attachments;
pub use chat::render_chat;
pub use composer::{composer_height, render_attach_prompt, render_composer};
pub use forward::render_forward;
pub use members::render_members;
