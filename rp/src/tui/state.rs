//! TUI application state
//!
//! Pure data for the front end. The domain state (catalog, selection,
//! transcript) lives in the `Assistant`; this only tracks focus, cursors,
//! input buffers and what the last frame drew where.

use ratatui::layout::Rect;

use crate::catalog::{ProductFilter, ProductId};
use crate::view::{CardLayout, DetailsState, Region};

/// Interaction mode (modal)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum InteractionMode {
    /// Navigation keys
    #[default]
    Normal,
    /// Typing a search term (/ key)
    Search,
    /// Typing a chat message
    ChatInput,
    /// Help overlay
    Help,
}

/// Work for the runner to apply against the assistant
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingAction {
    ToggleProduct(ProductId),
    RemoveProduct(ProductId),
    ClearSelection,
    SubmitChat(String),
    GenerateRoutine,
    ToggleDirection,
    ClearChat,
}

/// Cursor over a list
#[derive(Debug, Default, Clone)]
pub struct Cursor {
    pub index: usize,
}

impl Cursor {
    pub fn next(&mut self, len: usize) {
        if len > 0 && self.index < len - 1 {
            self.index += 1;
        }
    }

    pub fn prev(&mut self) {
        self.index = self.index.saturating_sub(1);
    }

    /// Keep the cursor inside a list that may have shrunk
    pub fn clamp(&mut self, len: usize) {
        if len == 0 {
            self.index = 0;
        } else if self.index >= len {
            self.index = len - 1;
        }
    }
}

/// Main TUI application state
#[derive(Debug, Default)]
pub struct AppState {
    pub focus: Region,
    pub interaction_mode: InteractionMode,
    pub should_quit: bool,

    // === Product filtering ===
    /// Index into the catalog's category list (None = no category chosen)
    pub category_index: Option<usize>,
    pub filter: ProductFilter,
    pub details: DetailsState,

    // === Cursors ===
    pub product_cursor: Cursor,
    /// First card drawn in the products region
    pub product_scroll: usize,
    pub selected_cursor: Cursor,
    /// Lines scrolled up from the bottom of the chat pane
    pub chat_scroll: usize,

    // === Chat input ===
    pub chat_input: String,

    // === Pending work ===
    pub pending_actions: Vec<PendingAction>,

    // === Geometry from the last frame (for mouse hit-testing) ===
    pub card_layouts: Vec<CardLayout>,
    pub regions: Vec<(Region, Rect)>,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Select a category by index and rebuild the filter
    pub fn set_category(&mut self, index: Option<usize>, categories: &[&str]) {
        self.category_index = index.filter(|i| *i < categories.len());
        let category = self.category_index.map(|i| categories[i].to_string());
        self.filter = ProductFilter::new(category, self.filter.search.clone());
        self.details.clear();
        self.reset_product_cursor();
    }

    /// Cycle None -> first -> ... -> last -> None
    pub fn cycle_category(&mut self, categories: &[&str]) {
        let next = match self.category_index {
            None if !categories.is_empty() => Some(0),
            Some(i) if i + 1 < categories.len() => Some(i + 1),
            _ => None,
        };
        self.set_category(next, categories);
    }

    pub fn set_search(&mut self, search: String) {
        self.filter.search = search;
        self.reset_product_cursor();
    }

    fn reset_product_cursor(&mut self) {
        self.product_cursor = Cursor::default();
        self.product_scroll = 0;
    }

    pub fn push_action(&mut self, action: PendingAction) {
        self.pending_actions.push(action);
    }

    pub fn take_actions(&mut self) -> Vec<PendingAction> {
        std::mem::take(&mut self.pending_actions)
    }

    /// Region under a screen position, from the last frame
    pub fn region_at(&self, col: u16, row: u16) -> Option<Region> {
        self.regions
            .iter()
            .find(|(_, r)| col >= r.x && col < r.x + r.width && row >= r.y && row < r.y + r.height)
            .map(|(region, _)| *region)
    }
}
