//! Completion client for the remote chat endpoint
//!
//! Sends the bounded conversation window and parses the first choice of the
//! reply, plus any URLs cited through tool calls.

mod client;
mod error;
mod format;
mod http;
mod types;

pub use client::CompletionClient;
pub use error::CompletionError;
pub use format::{Segment, autolink};
pub use http::{HttpCompletionClient, parse_reply};
pub use types::{CompletionReply, CompletionRequest};

#[cfg(test)]
pub use client::mock;
