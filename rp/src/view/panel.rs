//! Selected-products panel projection

use crate::catalog::{Catalog, ProductId};
use crate::selection::SelectionStore;

pub const SELECTED_PLACEHOLDER: &str = "No products selected.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedItem {
    pub id: ProductId,
    pub name: String,
    pub brand: String,
}

/// The selected-items panel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedPanel {
    /// Resolved items in selection order
    pub items: Vec<SelectedItem>,
    /// Text shown instead of items when nothing is selected
    pub placeholder: Option<&'static str>,
    pub clear_all_visible: bool,
}

/// Project the selection against the catalog
///
/// Stale ids are skipped; the placeholder only appears when nothing is
/// selected at all.
pub fn render_selected(catalog: &Catalog, selection: &SelectionStore) -> SelectedPanel {
    if selection.is_empty() {
        return SelectedPanel {
            items: Vec::new(),
            placeholder: Some(SELECTED_PLACEHOLDER),
            clear_all_visible: false,
        };
    }

    let items = selection
        .resolve(catalog)
        .into_iter()
        .map(|p| SelectedItem {
            id: p.id.clone(),
            name: p.name.clone(),
            brand: p.brand.clone(),
        })
        .collect();

    SelectedPanel {
        items,
        placeholder: None,
        clear_all_visible: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Product;
    use crate::storage::MemoryStorage;
    use std::sync::Arc;

    fn catalog() -> Catalog {
        let product = |id: &str, name: &str| Product {
            id: ProductId::new(id),
            name: name.to_string(),
            brand: "Brand".to_string(),
            category: "skincare".to_string(),
            description: String::new(),
            image: String::new(),
            price: None,
        };
        Catalog::new(vec![product("1", "Cleanser"), product("2", "Toner"), product("3", "Serum")])
    }

    #[test]
    fn test_empty_selection_shows_placeholder() {
        let selection = SelectionStore::new(Arc::new(MemoryStorage::new()));
        let panel = render_selected(&catalog(), &selection);
        assert!(panel.items.is_empty());
        assert_eq!(panel.placeholder, Some(SELECTED_PLACEHOLDER));
        assert!(!panel.clear_all_visible);
    }

    #[test]
    fn test_items_in_selection_order_and_stale_skipped() {
        let mut selection = SelectionStore::new(Arc::new(MemoryStorage::new()));
        for raw in ["3", "99", "1"] {
            selection.toggle(&ProductId::new(raw));
        }

        let panel = render_selected(&catalog(), &selection);
        let names: Vec<&str> = panel.items.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["Serum", "Cleanser"]);
        assert!(panel.placeholder.is_none());
        assert!(panel.clear_all_visible);
    }
}
