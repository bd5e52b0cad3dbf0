//! Chat session: transcript plus the Idle/AwaitingReply state machine
//!
//! The transcript holds everything the chat pane shows. Only `Message`
//! entries are conversation context; notices are local guidance and the
//! loading entry is a transient placeholder. At most one request is in
//! flight: submissions while awaiting a reply are rejected without touching
//! the conversation.

use thiserror::Error;
use tracing::{debug, info, warn};

use super::{ChatMessage, Role};
use crate::completion::{CompletionError, CompletionReply, CompletionRequest};

/// Default number of most-recent messages sent with each request
pub const DEFAULT_WINDOW_SIZE: usize = 20;

/// What the chat pane shows for a routine request
pub const ROUTINE_DISPLAY_TEXT: &str = "Generate a routine for my selected products.";

/// Text of the loading placeholder
pub const LOADING_TEXT: &str = "Thinking...";

pub const BUSY_NOTICE: &str = "Please wait for the current response to complete.";
pub const EMPTY_SELECTION_NOTICE: &str = "Please select some products first!";

/// Kind of transcript entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// Part of the conversation sent to the endpoint
    Message,
    /// Local guidance or error text, never sent
    Notice,
    /// Transient placeholder while a request is outstanding
    Loading,
}

/// One line item in the chat pane
#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptEntry {
    pub kind: EntryKind,
    pub role: Role,
    /// Text sent to the endpoint (or shown, for notices)
    pub content: String,
    /// Alternate text to show instead of `content`
    pub display: Option<String>,
    /// Source URLs extracted from the reply
    pub citations: Vec<String>,
}

impl TranscriptEntry {
    fn message(role: Role, content: impl Into<String>) -> Self {
        Self {
            kind: EntryKind::Message,
            role,
            content: content.into(),
            display: None,
            citations: Vec::new(),
        }
    }

    fn notice(content: impl Into<String>) -> Self {
        Self {
            kind: EntryKind::Notice,
            role: Role::Assistant,
            content: content.into(),
            display: None,
            citations: Vec::new(),
        }
    }

    fn loading() -> Self {
        Self {
            kind: EntryKind::Loading,
            role: Role::Assistant,
            content: LOADING_TEXT.to_string(),
            display: None,
            citations: Vec::new(),
        }
    }

    /// Text for the chat pane
    pub fn text(&self) -> &str {
        self.display.as_deref().unwrap_or(&self.content)
    }

    /// The conversation message, if this entry is one
    pub fn as_message(&self) -> Option<ChatMessage> {
        (self.kind == EntryKind::Message).then(|| ChatMessage {
            role: self.role,
            content: self.content.clone(),
        })
    }
}

/// What the outstanding request was for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    Chat,
    Routine,
}

/// Session state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Idle,
    AwaitingReply(RequestKind),
}

/// Reasons a submission produced no request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ChatError {
    #[error("a reply is still pending")]
    Busy,

    #[error("message is empty")]
    BlankInput,

    #[error("no products selected")]
    EmptySelection,

    #[error("prompt template could not be rendered")]
    Prompt,
}

/// Ordered transcript with a single-request guard
#[derive(Debug, Clone)]
pub struct ChatSession {
    entries: Vec<TranscriptEntry>,
    state: SessionState,
    window_size: usize,
    system_prompt: String,
}

impl ChatSession {
    pub fn new(system_prompt: impl Into<String>, window_size: usize) -> Self {
        debug!(window_size, "ChatSession::new: called");
        Self {
            entries: Vec::new(),
            state: SessionState::Idle,
            window_size: window_size.max(1),
            system_prompt: system_prompt.into(),
        }
    }

    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_awaiting_reply(&self) -> bool {
        matches!(self.state, SessionState::AwaitingReply(_))
    }

    /// Append a user turn; blank input is ignored and returns false
    pub fn append_user(&mut self, text: &str) -> bool {
        let text = text.trim();
        if text.is_empty() {
            debug!("ChatSession::append_user: blank input ignored");
            return false;
        }
        self.entries.push(TranscriptEntry::message(Role::User, text));
        true
    }

    pub fn append_assistant(&mut self, text: impl Into<String>) {
        self.entries.push(TranscriptEntry::message(Role::Assistant, text));
    }

    /// Show local guidance that is never sent to the endpoint
    pub fn notice(&mut self, text: impl Into<String>) {
        self.entries.push(TranscriptEntry::notice(text));
    }

    /// All conversation messages, oldest first
    pub fn messages(&self) -> Vec<ChatMessage> {
        self.entries.iter().filter_map(TranscriptEntry::as_message).collect()
    }

    /// The system instruction plus the most recent `window_size` messages
    ///
    /// Only the outbound request is bounded; the transcript keeps everything
    /// for display.
    pub fn build_request_window(&self) -> CompletionRequest {
        let messages = self.messages();
        let start = messages.len().saturating_sub(self.window_size);
        debug!(
            total = messages.len(),
            sent = messages.len() - start,
            "ChatSession::build_request_window: called"
        );
        CompletionRequest {
            system_prompt: self.system_prompt.clone(),
            messages: messages[start..].to_vec(),
        }
    }

    /// Reject with a notice when a reply is still pending
    pub fn ensure_idle(&mut self) -> Result<(), ChatError> {
        if self.is_awaiting_reply() {
            warn!("Blocked: reply pending, cannot start new request");
            self.notice(BUSY_NOTICE);
            return Err(ChatError::Busy);
        }
        Ok(())
    }

    /// Submit typed chat input; on success a request must be dispatched
    pub fn submit(&mut self, text: &str) -> Result<CompletionRequest, ChatError> {
        debug!(len = text.len(), "ChatSession::submit: called");
        if text.trim().is_empty() {
            return Err(ChatError::BlankInput);
        }
        self.ensure_idle()?;
        self.append_user(text);
        Ok(self.begin_request(RequestKind::Chat))
    }

    /// Submit a routine prompt; the pane shows a short stand-in text
    pub fn submit_routine(&mut self, prompt: impl Into<String>) -> Result<CompletionRequest, ChatError> {
        debug!("ChatSession::submit_routine: called");
        self.ensure_idle()?;
        let mut entry = TranscriptEntry::message(Role::User, prompt);
        entry.display = Some(ROUTINE_DISPLAY_TEXT.to_string());
        self.entries.push(entry);
        Ok(self.begin_request(RequestKind::Routine))
    }

    fn begin_request(&mut self, kind: RequestKind) -> CompletionRequest {
        let request = self.build_request_window();
        self.entries.push(TranscriptEntry::loading());
        self.state = SessionState::AwaitingReply(kind);
        info!(?kind, messages = request.messages.len(), "Request started");
        request
    }

    /// Apply the outcome of the outstanding request
    ///
    /// Removes the loading placeholder, then appends the reply or a plain
    /// language failure notice. Returns false if no request was outstanding.
    pub fn finish_request(&mut self, outcome: Result<CompletionReply, CompletionError>) -> bool {
        let SessionState::AwaitingReply(kind) = self.state else {
            warn!("finish_request called with no request outstanding");
            return false;
        };

        if let Some(idx) = self.entries.iter().rposition(|e| e.kind == EntryKind::Loading) {
            self.entries.remove(idx);
        }
        self.state = SessionState::Idle;

        match outcome {
            Ok(reply) => {
                info!(len = reply.content.len(), citations = reply.citations.len(), "Reply received");
                let mut entry = TranscriptEntry::message(Role::Assistant, reply.content);
                entry.citations = reply.citations;
                self.entries.push(entry);
            }
            Err(e) => {
                warn!(error = %e, ?kind, "Request failed");
                self.notice(failure_notice(&e, kind));
            }
        }
        true
    }

    /// Drop the transcript; refused while a reply is pending
    pub fn clear(&mut self) -> Result<(), ChatError> {
        self.ensure_idle()?;
        self.entries.clear();
        Ok(())
    }
}

fn failure_notice(error: &CompletionError, kind: RequestKind) -> String {
    if let Some(status) = error.status() {
        return format!("The assistant service returned an error (status {}). Please try again.", status);
    }
    if error.is_connection() {
        return "There was an error connecting to the AI. Please try again.".to_string();
    }
    match kind {
        RequestKind::Chat => "Sorry, I couldn't answer that. Please try again.".to_string(),
        RequestKind::Routine => "Sorry, I couldn't generate a routine. Please try again.".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn session() -> ChatSession {
        ChatSession::new("You are a beauty advisor.", 10)
    }

    fn reply(text: &str) -> CompletionReply {
        CompletionReply {
            content: text.to_string(),
            citations: vec![],
        }
    }

    #[test]
    fn test_blank_input_is_noop() {
        let mut s = session();
        assert_eq!(s.submit("   \n").unwrap_err(), ChatError::BlankInput);
        assert!(s.entries().is_empty());
        assert_eq!(s.state(), SessionState::Idle);
    }

    #[test]
    fn test_submit_appends_user_and_loading() {
        let mut s = session();
        let request = s.submit("  What's a toner?  ").unwrap();

        assert_eq!(request.messages, vec![ChatMessage::user("What's a toner?")]);
        assert_eq!(request.system_prompt, "You are a beauty advisor.");
        assert_eq!(s.entries().len(), 2);
        assert_eq!(s.entries()[1].kind, EntryKind::Loading);
        assert_eq!(s.state(), SessionState::AwaitingReply(RequestKind::Chat));
    }

    #[test]
    fn test_second_submit_while_awaiting_is_rejected() {
        let mut s = session();
        s.submit("first").unwrap();
        assert_eq!(s.submit("second").unwrap_err(), ChatError::Busy);

        let users: Vec<_> = s.messages().into_iter().filter(|m| m.role == Role::User).collect();
        assert_eq!(users.len(), 1);
        assert_eq!(s.entries().last().unwrap().content, BUSY_NOTICE);
    }

    #[test]
    fn test_finish_success_replaces_loading() {
        let mut s = session();
        s.submit("hi").unwrap();
        assert!(s.finish_request(Ok(reply("Hello!"))));

        assert!(s.entries().iter().all(|e| e.kind != EntryKind::Loading));
        assert_eq!(s.messages().last().unwrap(), &ChatMessage::assistant("Hello!"));
        assert_eq!(s.state(), SessionState::Idle);
    }

    #[test]
    fn test_finish_failure_removes_loading_and_adds_notice() {
        let mut s = session();
        s.submit("hi").unwrap();
        s.finish_request(Err(CompletionError::Timeout(Duration::from_secs(30))));

        assert!(s.entries().iter().all(|e| e.kind != EntryKind::Loading));
        let last = s.entries().last().unwrap();
        assert_eq!(last.kind, EntryKind::Notice);
        assert!(last.content.contains("error connecting"));
        // Notices are not conversation context
        assert_eq!(s.messages().len(), 1);
    }

    #[test]
    fn test_loading_found_structurally_after_later_notices() {
        let mut s = session();
        s.submit("hi").unwrap();
        s.notice("Please select some products first!");
        s.submit("again").unwrap_err();

        s.finish_request(Ok(reply("done")));
        let kinds: Vec<EntryKind> = s.entries().iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![
                EntryKind::Message,
                EntryKind::Notice,
                EntryKind::Notice,
                EntryKind::Message
            ]
        );
    }

    #[test]
    fn test_finish_without_request_is_ignored() {
        let mut s = session();
        assert!(!s.finish_request(Ok(reply("stray"))));
        assert!(s.entries().is_empty());
    }

    #[test]
    fn test_window_bounds_request_but_not_transcript() {
        let mut s = session();
        for i in 0..25 {
            if i % 2 == 0 {
                s.append_user(&format!("message {}", i));
            } else {
                s.append_assistant(format!("message {}", i));
            }
        }

        let window = s.build_request_window();
        assert_eq!(window.messages.len(), 10);
        assert_eq!(window.messages.last().unwrap().content, "message 24");
        assert_eq!(window.messages.first().unwrap().content, "message 15");
        assert_eq!(s.entries().len(), 25);
    }

    #[test]
    fn test_routine_shows_stand_in_text_and_sends_prompt() {
        let mut s = session();
        let request = s.submit_routine("I have selected these products:\n1. A (B)").unwrap();

        assert_eq!(s.entries()[0].text(), ROUTINE_DISPLAY_TEXT);
        assert!(request.messages[0].content.contains("1. A (B)"));

        s.finish_request(Err(CompletionError::MalformedResponse("no choices".to_string())));
        assert!(s.entries().last().unwrap().content.contains("couldn't generate a routine"));
    }

    #[test]
    fn test_api_error_notice_mentions_status() {
        let mut s = session();
        s.submit("hi").unwrap();
        s.finish_request(Err(CompletionError::Api {
            status: 503,
            message: "busy".to_string(),
        }));
        assert!(s.entries().last().unwrap().content.contains("503"));
    }

    #[test]
    fn test_malformed_reply_notice_follows_request_kind() {
        let mut s = session();
        s.submit_routine("Build a routine").unwrap();
        s.finish_request(Err(CompletionError::MalformedResponse("no choices".to_string())));
        assert!(s.entries().last().unwrap().content.contains("couldn't generate a routine"));

        s.submit("hi").unwrap();
        s.finish_request(Err(CompletionError::MalformedResponse("no choices".to_string())));
        assert!(s.entries().last().unwrap().content.contains("couldn't answer that"));
    }

    #[test]
    fn test_clear_refused_while_awaiting() {
        let mut s = session();
        s.submit("hi").unwrap();
        assert_eq!(s.clear().unwrap_err(), ChatError::Busy);
        s.finish_request(Ok(reply("ok")));
        s.clear().unwrap();
        assert!(s.entries().is_empty());
    }
}
