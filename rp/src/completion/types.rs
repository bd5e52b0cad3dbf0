//! Completion request/response types

use crate::chat::ChatMessage;

/// Everything needed for one completion call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    /// Persona and task-scope instruction, sent as the leading system message
    pub system_prompt: String,

    /// Bounded conversation window, oldest first
    pub messages: Vec<ChatMessage>,
}

/// Parsed assistant reply
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CompletionReply {
    /// Text of the first completion choice
    pub content: String,

    /// URLs cited by tool calls, in order, without duplicates
    pub citations: Vec<String>,
}
