use super::runtime::BoxFuture;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatError {
    MissingApiKey,
    Network(String),
    Status { code: u16, body: String },
    Parse(String),
}

impl fmt::Display for ChatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChatError::MissingApiKey => write!(f, "API key is missing"),
            ChatError::Network(e) => write!(f, "request failed: {e}"),
            ChatError::Status { code, body } => write!(f, "HTTP {code}: {body}"),
            ChatError::Parse(e) => write!(f, "invalid response: {e}"),
        }
    }
}

impl std::error::Error for ChatError {}

/// Hosted language model. One call per user turn; the client keeps its own
/// conversation history.
pub trait ChatClient: Send + Sync {
    /// `Ok(None)` means the model answered without any text.
    fn send<'a>(&'a self, message: &'a str) -> BoxFuture<'a, Result<Option<String>, ChatError>>;
}
