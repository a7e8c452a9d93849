//! Application-wide constants
//!
//! Defaults shared by the core and the terminal front end.

/// Messages fetched per poll
pub const DEFAULT_PAGE_SIZE: u32 = 50;

/// Chat sub-view poll period in seconds
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;

// Composer limits
pub const REPLY_PREVIEW_CHARS: usize = 80;
pub const ATTACHMENT_CHIP_CHARS: usize = 24;

/// Shown after a successful member removal
pub const MEMBER_REMOVED_NOTICE: &str = "User removed from group";

// Environment variables
pub const ENV_BASE_URL: &str = "GROUPCHAT_BASE_URL";
pub const ENV_TOKEN: &str = "GROUPCHAT_TOKEN";
pub const ENV_LOG_FILE: &str = "GROUPCHAT_LOG_FILE";
pub const ENV_LOG_FILTER: &str = "GROUPCHAT_LOG";

/// Directory under the platform config dir holding `config.json`
pub const CONFIG_DIR_NAME: &str = "groupchat";
