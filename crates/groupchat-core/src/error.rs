use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Server returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Invalid response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("A message is already being sent")]
    SendInFlight,
}

impl ChatError {
    /// Text suitable for a toast. Server bodies can be whole HTML pages, so
    /// they are cut down.
    pub fn user_message(&self) -> String {
        match self {
            ChatError::Status { status, body } => {
                let snippet: String = body.chars().take(120).collect();
                if snippet.trim().is_empty() {
                    format!("Server returned {}", status)
                } else {
                    format!("Server returned {}: {}", status, snippet.trim())
                }
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ChatError>;
