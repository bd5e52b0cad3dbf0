//! Product card projection

use std::collections::HashSet;

use tracing::debug;

use crate::catalog::{Catalog, Product, ProductFilter, ProductId};
use crate::selection::SelectionStore;

/// Shown until a category or search term narrows the catalog
pub const CATEGORY_PLACEHOLDER: &str = "Select a category to view products";

/// Shown when the filter matches nothing
pub const NO_MATCHES: &str = "No products match your search.";

/// One card in the products grid
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProductCard<'a> {
    pub product: &'a Product,
    pub selected: bool,
    pub details_open: bool,
}

/// Per-card "show description" flags
///
/// Local UI state only: never persisted and independent of selection.
#[derive(Debug, Clone, Default)]
pub struct DetailsState {
    open: HashSet<ProductId>,
}

impl DetailsState {
    pub fn is_open(&self, id: &ProductId) -> bool {
        self.open.contains(id)
    }

    /// Flip the flag; returns true when the description is now open
    pub fn toggle(&mut self, id: &ProductId) -> bool {
        if self.open.remove(id) {
            false
        } else {
            self.open.insert(id.clone());
            true
        }
    }

    pub fn close(&mut self, id: &ProductId) {
        self.open.remove(id);
    }

    pub fn clear(&mut self) {
        self.open.clear();
    }
}

/// What the products region shows
#[derive(Debug, Clone, PartialEq)]
pub enum ProductsView<'a> {
    Placeholder(&'static str),
    Cards(Vec<ProductCard<'a>>),
}

impl<'a> ProductsView<'a> {
    pub fn cards(&self) -> &[ProductCard<'a>] {
        match self {
            Self::Cards(cards) => cards,
            Self::Placeholder(_) => &[],
        }
    }
}

/// Project a product subset into cards
pub fn render_cards<'a>(
    subset: &[&'a Product],
    selection: &SelectionStore,
    details: &DetailsState,
) -> Vec<ProductCard<'a>> {
    subset
        .iter()
        .map(|&product| ProductCard {
            product,
            selected: selection.contains(&product.id),
            details_open: details.is_open(&product.id),
        })
        .collect()
}

/// Filter the catalog and project the result for the products region
pub fn render_products<'a>(
    catalog: &'a Catalog,
    filter: &ProductFilter,
    selection: &SelectionStore,
    details: &DetailsState,
) -> ProductsView<'a> {
    debug!(?filter, "render_products: called");
    if filter.is_unset() {
        return ProductsView::Placeholder(CATEGORY_PLACEHOLDER);
    }

    let subset = filter.apply(catalog);
    if subset.is_empty() {
        return ProductsView::Placeholder(NO_MATCHES);
    }
    ProductsView::Cards(render_cards(&subset, selection, details))
}
