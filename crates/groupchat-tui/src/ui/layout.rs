// Layout constants shared by the render pass

/// Conversation name plus tab row
pub const HEADER_HEIGHT: u16 = 2;

pub const STATUSBAR_HEIGHT: u16 = 1;

/// Horizontal padding around the message list
pub const CONTENT_PADDING_H: u16 = 1;

/// Attach-path prompt, borders included
pub const ATTACH_PROMPT_HEIGHT: u16 = 3;
