// ABOUTME: Typed errors for the model adapter, the graph store, and a conversation run.
// ABOUTME: Tool failures never appear here; they are folded into tool-result messages.

use std::time::Duration;

/// Failure of the external completion capability.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("model transport error: {0}")]
    Transport(String),

    #[error("model call timed out after {0:?}")]
    Timeout(Duration),

    #[error("model API returned status {status}: {body}")]
    Api { status: u16, body: String },

    #[error("malformed model response: {0}")]
    Malformed(String),

    #[error("no API key found (checked {0})")]
    MissingApiKey(String),
}

impl From<reqwest::Error> for ModelError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ModelError::Malformed(e.to_string())
        } else {
            ModelError::Transport(e.to_string())
        }
    }
}

/// Failure of the graph store's query execution.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    #[error("graph store unreachable: {0}")]
    Connection(String),

    #[error("graph store returned status {status}: {body}")]
    Http { status: u16, body: String },

    #[error("{code}: {message}")]
    Query { code: String, message: String },

    #[error("unexpected graph store response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for GraphError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            GraphError::Decode(e.to_string())
        } else {
            GraphError::Connection(e.to_string())
        }
    }
}

/// A run that could not reach a defined terminal outcome.
///
/// Model failures and budget exhaustion are not errors: they end the run as
/// `Aborted` with a fallback reply. Only contract breaches land here.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("protocol violation: {0}")]
    ProtocolViolation(#[from] ProtocolViolation),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolViolation {
    #[error("tool result '{0}' has no matching request in the preceding assistant message")]
    UnmatchedToolResult(String),

    #[error("tool result '{0}' was already recorded for this turn")]
    DuplicateToolResult(String),

    #[error("model requested unknown tool '{0}'")]
    UnknownTool(String),

    #[error("tool call id '{0}' appears more than once in one assistant turn")]
    DuplicateCallId(String),
}
