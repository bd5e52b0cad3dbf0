//! Chat pane projection

use crate::chat::{EntryKind, Role, TranscriptEntry};
use crate::completion::{Segment, autolink};

pub const SOURCES_HEADING: &str = "Sources:";

/// One display line, split into plain and link runs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatLine<'a> {
    pub segments: Vec<Segment<'a>>,
}

/// One transcript entry as the chat pane draws it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatBlock<'a> {
    pub role: Role,
    pub kind: EntryKind,
    pub lines: Vec<ChatLine<'a>>,
    /// Citation URLs listed under the reply
    pub sources: Vec<&'a str>,
}

impl ChatBlock<'_> {
    /// Speaker label shown before the block
    pub fn label(&self) -> &'static str {
        match (self.kind, self.role) {
            (EntryKind::Notice, _) => "Notice",
            (_, Role::User) => "You",
            (_, Role::System) => "System",
            (_, Role::Assistant) => "Assistant",
        }
    }
}

/// Project the transcript, oldest first
pub fn render_chat(entries: &[TranscriptEntry]) -> Vec<ChatBlock<'_>> {
    entries
        .iter()
        .map(|entry| ChatBlock {
            role: entry.role,
            kind: entry.kind,
            lines: entry
                .text()
                .lines()
                .map(|line| ChatLine {
                    segments: autolink(line),
                })
                .collect(),
            sources: entry.citations.iter().map(String::as_str).collect(),
        })
        .collect()
}
