//! Prompt Template System
//!
//! Loads and renders `.pmt` (prompt template) files for the assistant.
//!
//! Template loading chain:
//! 1. `{prompts-dir}/{name}.pmt` (user override, from config)
//! 2. `.routinepicker/prompts/{name}.pmt` (project override)
//! 3. Embedded fallback in code
//!
//! Templates use Handlebars syntax for variable substitution.

pub mod embedded;
mod loader;

pub use loader::{PromptLoader, RoutineContext, SystemContext};
