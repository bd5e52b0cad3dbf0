//! Card geometry and hit-testing
//!
//! Each card has three interaction zones: the body toggles selection, the
//! details button toggles the description overlay, and the overlay (with its
//! close button) sits on top of the body. Hit-testing resolves the innermost
//! zone so a click on the details button or inside the overlay never reaches
//! the body.

use ratatui::layout::Rect;

use super::ProductCard;
use crate::catalog::ProductId;
use crate::preference::DisplayDirection;

pub const DETAILS_LABEL: &str = "[details]";
pub const CLOSE_LABEL: &str = "[close]";

const COLLAPSED_HEIGHT: u16 = 4;
const EXPANDED_HEIGHT: u16 = 8;
const DESCRIPTION_ROWS: u16 = 4;

/// Rows a card occupies, borders included
pub fn card_height(details_open: bool) -> u16 {
    if details_open { EXPANDED_HEIGHT } else { COLLAPSED_HEIGHT }
}

/// Interaction zone within a card
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardZone {
    Body,
    DetailsToggle,
    Description,
    CloseDescription,
}

/// What a click on a card zone does
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CardAction {
    ToggleSelection(ProductId),
    ToggleDetails(ProductId),
    CloseDetails(ProductId),
}

/// Innermost zone under a point
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardHit {
    pub id: ProductId,
    pub zone: CardZone,
}

impl CardHit {
    /// Clicks inside the description overlay do nothing
    pub fn action(&self) -> Option<CardAction> {
        match self.zone {
            CardZone::Body => Some(CardAction::ToggleSelection(self.id.clone())),
            CardZone::DetailsToggle => Some(CardAction::ToggleDetails(self.id.clone())),
            CardZone::CloseDescription => Some(CardAction::CloseDetails(self.id.clone())),
            CardZone::Description => None,
        }
    }
}

/// Screen rectangles of one card
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardLayout {
    pub id: ProductId,
    pub body: Rect,
    pub details_button: Rect,
    pub description: Option<Rect>,
    pub close_button: Option<Rect>,
}

/// Stack cards top to bottom inside `area`, starting at card `scroll`
///
/// Only cards that fit completely are laid out. RTL mirrors the buttons to
/// the left edge.
pub fn layout_cards(
    area: Rect,
    cards: &[ProductCard<'_>],
    scroll: usize,
    direction: DisplayDirection,
) -> Vec<CardLayout> {
    let mut layouts = Vec::new();
    if area.width < 3 {
        return layouts;
    }

    let inner_width = area.width - 2;
    let bottom = area.y.saturating_add(area.height);
    let mut y = area.y;

    for card in cards.iter().skip(scroll) {
        let height = card_height(card.details_open);
        if y.saturating_add(height) > bottom {
            break;
        }

        let body = Rect::new(area.x, y, area.width, height);
        let details_button = button(area.x + 1, inner_width, y + 2, DETAILS_LABEL, direction);
        let (description, close_button) = if card.details_open {
            (
                Some(Rect::new(area.x + 1, y + 3, inner_width, DESCRIPTION_ROWS)),
                Some(button(area.x + 1, inner_width, y + 6, CLOSE_LABEL, direction)),
            )
        } else {
            (None, None)
        };

        layouts.push(CardLayout {
            id: card.product.id.clone(),
            body,
            details_button,
            description,
            close_button,
        });
        y += height;
    }

    layouts
}

fn button(inner_x: u16, inner_width: u16, row: u16, label: &str, direction: DisplayDirection) -> Rect {
    let width = (label.len() as u16).min(inner_width);
    let x = if direction.is_rtl() {
        inner_x
    } else {
        inner_x + inner_width - width
    };
    Rect::new(x, row, width, 1)
}

fn contains(rect: Rect, col: u16, row: u16) -> bool {
    col >= rect.x
        && col < rect.x.saturating_add(rect.width)
        && row >= rect.y
        && row < rect.y.saturating_add(rect.height)
}

/// Resolve the innermost zone under (col, row)
pub fn hit_test(layouts: &[CardLayout], col: u16, row: u16) -> Option<CardHit> {
    let layout = layouts.iter().find(|l| contains(l.body, col, row))?;

    let zone = if layout.close_button.is_some_and(|r| contains(r, col, row)) {
        CardZone::CloseDescription
    } else if layout.description.is_some_and(|r| contains(r, col, row)) {
        CardZone::Description
    } else if contains(layout.details_button, col, row) {
        CardZone::DetailsToggle
    } else {
        CardZone::Body
    };

    Some(CardHit {
        id: layout.id.clone(),
        zone,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Product;

    fn product(id: &str) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("Product {}", id),
            brand: "Brand".to_string(),
            category: "skincare".to_string(),
            description: "Gentle formula".to_string(),
            image: String::new(),
            price: None,
        }
    }

    fn card(product: &Product, details_open: bool) -> ProductCard<'_> {
        ProductCard {
            product,
            selected: false,
            details_open,
        }
    }

    #[test]
    fn test_cards_stack_vertically() {
        let (a, b) = (product("1"), product("2"));
        let cards = [card(&a, true), card(&b, false)];
        let layouts = layout_cards(Rect::new(0, 0, 40, 20), &cards, 0, DisplayDirection::Ltr);

        assert_eq!(layouts.len(), 2);
        assert_eq!(layouts[0].body, Rect::new(0, 0, 40, 8));
        assert_eq!(layouts[1].body, Rect::new(0, 8, 40, 4));
        assert!(layouts[1].description.is_none());
    }

    #[test]
    fn test_cards_that_do_not_fit_are_skipped() {
        let (a, b, c) = (product("1"), product("2"), product("3"));
        let cards = [card(&a, false), card(&b, false), card(&c, false)];
        let layouts = layout_cards(Rect::new(0, 0, 40, 10), &cards, 1, DisplayDirection::Ltr);

        let ids: Vec<&str> = layouts.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, vec!["2", "3"]);
    }

    #[test]
    fn test_details_button_never_toggles_selection() {
        let a = product("1");
        let cards = [card(&a, false)];
        let layouts = layout_cards(Rect::new(0, 0, 40, 10), &cards, 0, DisplayDirection::Ltr);
        let button = layouts[0].details_button;

        for col in button.x..button.x + button.width {
            let hit = hit_test(&layouts, col, button.y).unwrap();
            assert_eq!(hit.zone, CardZone::DetailsToggle);
            assert_eq!(hit.action(), Some(CardAction::ToggleDetails(ProductId::new("1"))));
        }
    }

    #[test]
    fn test_overlay_zones() {
        let a = product("1");
        let cards = [card(&a, true)];
        let layouts = layout_cards(Rect::new(0, 0, 40, 10), &cards, 0, DisplayDirection::Ltr);

        let inside = hit_test(&layouts, 2, 4).unwrap();
        assert_eq!(inside.zone, CardZone::Description);
        assert_eq!(inside.action(), None);

        let close = layouts[0].close_button.unwrap();
        let hit = hit_test(&layouts, close.x, close.y).unwrap();
        assert_eq!(hit.action(), Some(CardAction::CloseDetails(ProductId::new("1"))));

        let body = hit_test(&layouts, 2, 1).unwrap();
        assert_eq!(body.action(), Some(CardAction::ToggleSelection(ProductId::new("1"))));
    }

    #[test]
    fn test_rtl_mirrors_buttons() {
        let a = product("1");
        let cards = [card(&a, false)];
        let ltr = layout_cards(Rect::new(0, 0, 40, 10), &cards, 0, DisplayDirection::Ltr);
        let rtl = layout_cards(Rect::new(0, 0, 40, 10), &cards, 0, DisplayDirection::Rtl);

        assert_eq!(ltr[0].details_button.x, 39 - DETAILS_LABEL.len() as u16);
        assert_eq!(rtl[0].details_button.x, 1);
    }

    #[test]
    fn test_miss_outside_cards() {
        let a = product("1");
        let cards = [card(&a, false)];
        let layouts = layout_cards(Rect::new(0, 0, 40, 10), &cards, 0, DisplayDirection::Ltr);
        assert!(hit_test(&layouts, 5, 9).is_none());
    }
}
