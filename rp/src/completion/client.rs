//! CompletionClient trait definition

use async_trait::async_trait;

use super::{CompletionError, CompletionReply, CompletionRequest};

/// One request, one reply; conversation state lives in the chat session
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionReply, CompletionError>;
}
