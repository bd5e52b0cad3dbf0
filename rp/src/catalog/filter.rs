//! Category and search filtering over the catalog

use tracing::debug;

use super::{Catalog, Product};

/// Composed product filter: category first, then substring search
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductFilter {
    /// Selected category (None = all categories)
    pub category: Option<String>,
    /// Free-text search over name, brand and description
    pub search: String,
}

impl ProductFilter {
    pub fn new(category: Option<String>, search: impl Into<String>) -> Self {
        Self {
            category: category.filter(|c| !c.trim().is_empty()),
            search: search.into(),
        }
    }

    /// True when neither a category nor a search term is set
    pub fn is_unset(&self) -> bool {
        self.category.is_none() && self.search.trim().is_empty()
    }

    /// Check a single product against both predicates
    pub fn matches(&self, product: &Product) -> bool {
        if let Some(category) = &self.category
            && !product.category.eq_ignore_ascii_case(category)
        {
            return false;
        }

        let needle = self.search.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }

        product.name.to_lowercase().contains(&needle)
            || product.brand.to_lowercase().contains(&needle)
            || product.description.to_lowercase().contains(&needle)
    }

    /// Apply the filter, preserving catalog order
    pub fn apply<'a>(&self, catalog: &'a Catalog) -> Vec<&'a Product> {
        debug!(category = ?self.category, search = %self.search, "ProductFilter::apply: called");
        catalog.products().iter().filter(|p| self.matches(p)).collect()
    }
}
