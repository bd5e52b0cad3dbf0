//! Embedded prompts
//!
//! These are compiled into the binary from .pmt files at build time.

use tracing::debug;

/// Assistant persona and task scope
pub const SYSTEM: &str = include_str!("../../prompts/system.pmt");

/// Routine request listing the selected products
pub const ROUTINE: &str = include_str!("../../prompts/routine.pmt");

/// Get the embedded prompt by name
pub fn get_embedded(name: &str) -> Option<&'static str> {
    debug!(%name, "get_embedded: called");
    match name {
        "system" => Some(SYSTEM),
        "routine" => Some(ROUTINE),
        _ => {
            debug!("get_embedded: no match found");
            None
        }
    }
}
