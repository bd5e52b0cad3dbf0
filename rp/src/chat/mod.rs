//! Chat transcript and request-window management

mod message;
mod session;

pub use message::{ChatMessage, Role};
pub use session::{
    BUSY_NOTICE, ChatError, ChatSession, DEFAULT_WINDOW_SIZE, EMPTY_SELECTION_NOTICE, EntryKind, LOADING_TEXT,
    ROUTINE_DISPLAY_TEXT, RequestKind, SessionState, TranscriptEntry,
};
