//! routinepicker - product picker with an AI routine assistant
//!
//! Users filter and search a static product catalog, build a persisted
//! selection, and ask a chat-completion endpoint for a usage routine built
//! from exactly the products they picked.
//!
//! # Core Concepts
//!
//! - **Canonical ids**: numeric and string catalog ids are the same id
//! - **Pure projection**: the `view` functions turn state into view models
//!   and can be re-run at any time with the same result
//! - **One request in flight**: the chat session refuses new submissions
//!   until the outstanding reply (or failure) has been applied
//! - **Bounded context**: only the most recent messages are sent
//!
//! # Modules
//!
//! - [`catalog`] - Product model, loading and filtering
//! - [`storage`] - Durable key/value storage
//! - [`selection`] - The persisted set of selected products
//! - [`preference`] - The persisted display direction
//! - [`view`] - Card, panel and chat projections plus hit-testing
//! - [`chat`] - Transcript and request-window state machine
//! - [`prompts`] - Prompt templates
//! - [`completion`] - Completion client trait and HTTP implementation
//! - [`assistant`] - Controller wiring the pieces together
//! - [`tui`] - Terminal front end
//! - [`config`] - Configuration types and loading
//! - [`cli`] - Command-line interface

pub mod assistant;
pub mod catalog;
pub mod chat;
pub mod cli;
pub mod completion;
pub mod config;
pub mod preference;
pub mod prompts;
pub mod selection;
pub mod storage;
pub mod tui;
pub mod view;

pub use assistant::Assistant;
pub use catalog::{Catalog, CatalogError, Product, ProductFilter, ProductId};
pub use chat::{ChatError, ChatSession};
pub use completion::{CompletionClient, CompletionError, CompletionReply, CompletionRequest, HttpCompletionClient};
pub use config::Config;
pub use selection::SelectionStore;
pub use storage::{FileStorage, MemoryStorage, Storage, StorageError};
