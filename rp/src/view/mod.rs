//! View projection
//!
//! Pure functions from (catalog subset, selection, details flags, transcript)
//! to view models. Nothing here touches the terminal; the TUI draws whatever
//! these functions return, so re-running them on unchanged state gives the
//! same output.

mod cards;
mod chat;
mod layout;
mod panel;

pub use cards::{
    CATEGORY_PLACEHOLDER, DetailsState, NO_MATCHES, ProductCard, ProductsView, render_cards, render_products,
};
pub use chat::{ChatBlock, ChatLine, SOURCES_HEADING, render_chat};
pub use layout::{
    CLOSE_LABEL, CardAction, CardHit, CardLayout, CardZone, DETAILS_LABEL, card_height, hit_test, layout_cards,
};
pub use panel::{SELECTED_PLACEHOLDER, SelectedItem, SelectedPanel, render_selected};

/// Named screen regions owned by the renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Region {
    #[default]
    Products,
    Selected,
    Chat,
}

impl Region {
    /// Focus order for Tab
    pub fn next(self) -> Self {
        match self {
            Self::Products => Self::Selected,
            Self::Selected => Self::Chat,
            Self::Chat => Self::Products,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::Products => "Products",
            Self::Selected => "Selected Products",
            Self::Chat => "Chat",
        }
    }
}
