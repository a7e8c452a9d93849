use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::constants::{
    CONFIG_DIR_NAME, DEFAULT_PAGE_SIZE, DEFAULT_POLL_INTERVAL_SECS, ENV_BASE_URL, ENV_TOKEN,
};
use crate::error::ChatError;
use crate::models::{ConversationId, UserId};

/// Client configuration loaded from a JSON file
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChatConfig {
    /// API root, e.g. `https://ops.example.com/api/v1`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Bearer token sent with every request
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_user_id: Option<UserId>,

    /// Conversation opened at startup
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<ConversationId>,

    pub page_size: u32,

    pub poll_interval_secs: u64,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            token: None,
            current_user_id: None,
            conversation_id: None,
            page_size: DEFAULT_PAGE_SIZE,
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
        }
    }
}

/// Everything a conversation needs to talk to the server. Passed explicitly
/// into every constructor; nothing reads credentials from ambient state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatContext {
    pub base_url: String,
    pub conversation_id: ConversationId,
    pub current_user_id: UserId,
    pub token: String,
}

impl ChatConfig {
    /// `$XDG_CONFIG_HOME/groupchat/config.json` or the platform equivalent
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join("config.json"))
    }

    /// Load config from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: ChatConfig = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    /// Load an explicit path, else the default path if it exists, else defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::load(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    /// Apply `GROUPCHAT_BASE_URL` / `GROUPCHAT_TOKEN`.
    pub fn apply_env(&mut self) {
        self.apply_overrides(std::env::var(ENV_BASE_URL).ok(), std::env::var(ENV_TOKEN).ok());
    }

    pub fn apply_overrides(&mut self, base_url: Option<String>, token: Option<String>) {
        if let Some(url) = base_url.filter(|u| !u.trim().is_empty()) {
            self.base_url = Some(url);
        }
        if let Some(token) = token.filter(|t| !t.trim().is_empty()) {
            self.token = Some(token);
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs.max(1))
    }

    /// Validate and build the request context.
    pub fn context(&self) -> std::result::Result<ChatContext, ChatError> {
        let base_url = self
            .base_url
            .as_deref()
            .map(|u| u.trim().trim_end_matches('/'))
            .filter(|u| !u.is_empty())
            .ok_or_else(|| ChatError::Config("baseUrl is not set".to_string()))?;
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ChatError::Config(format!(
                "baseUrl must start with http:// or https://, got {}",
                base_url
            )));
        }
        let token = self
            .token
            .clone()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| ChatError::Config("token is not set".to_string()))?;
        let conversation_id = self
            .conversation_id
            .ok_or_else(|| ChatError::Config("conversationId is not set".to_string()))?;
        let current_user_id = self
            .current_user_id
            .ok_or_else(|| ChatError::Config("currentUserId is not set".to_string()))?;

        Ok(ChatContext {
            base_url: base_url.to_string(),
            conversation_id,
            current_user_id,
            token,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn full() -> ChatConfig {
        serde_json::from_str(
            r#"{
                "baseUrl": "https://ops.example.com/api/v1/",
                "token": "abc123",
                "currentUserId": 7,
                "conversationId": 12
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_parse_config_minimal() {
        let config: ChatConfig = serde_json::from_str("{}").unwrap();
        assert!(config.base_url.is_none());
        assert_eq!(config.page_size, 50);
        assert_eq!(config.poll_interval(), Duration::from_secs(5));
    }

    #[test]
    fn test_context_trims_trailing_slash() {
        let ctx = full().context().unwrap();
        assert_eq!(ctx.base_url, "https://ops.example.com/api/v1");
        assert_eq!(ctx.conversation_id, 12);
        assert_eq!(ctx.current_user_id, 7);
        assert_eq!(ctx.token, "abc123");
    }

    #[test]
    fn test_context_requires_fields() {
        let mut config = full();
        config.token = Some("  ".to_string());
        assert!(matches!(config.context(), Err(ChatError::Config(_))));

        let mut config = full();
        config.conversation_id = None;
        assert!(config.context().is_err());

        let mut config = full();
        config.base_url = Some("ops.example.com".to_string());
        assert!(config.context().is_err());
    }

    #[test]
    fn test_overrides_skip_empty_values() {
        let mut config = full();
        config.apply_overrides(Some("http://localhost:3000".to_string()), Some(String::new()));
        assert_eq!(config.base_url.as_deref(), Some("http://localhost:3000"));
        assert_eq!(config.token.as_deref(), Some("abc123"));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"baseUrl": "http://x", "pollIntervalSecs": 0}}"#).unwrap();
        let config = ChatConfig::load(file.path()).unwrap();
        assert_eq!(config.base_url.as_deref(), Some("http://x"));
        // Zero would spin; clamped to one second
        assert_eq!(config.poll_interval(), Duration::from_secs(1));
    }

    #[test]
    fn test_load_missing_file_has_context() {
        let err = ChatConfig::load(Path::new("/no/such/config.json")).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
