//! Product records and the loaded catalog

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use tracing::{debug, warn};

/// Canonical product identifier
///
/// Catalog documents encode ids as JSON numbers or strings. Both are
/// converted here, once, to a trimmed string so `1` and `"1"` compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ProductId(String);

impl ProductId {
    /// Create an id from any string-like value
    pub fn new(raw: impl AsRef<str>) -> Self {
        Self(raw.as_ref().trim().to_string())
    }

    /// Get the canonical string form
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProductId {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<String> for ProductId {
    fn from(raw: String) -> Self {
        Self::new(raw)
    }
}

impl From<u64> for ProductId {
    fn from(raw: u64) -> Self {
        Self(raw.to_string())
    }
}

impl<'de> Deserialize<'de> for ProductId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Text(String),
            Unsigned(u64),
            Signed(i64),
            Float(f64),
        }

        let id = match RawId::deserialize(deserializer)? {
            RawId::Text(s) => ProductId::new(s),
            RawId::Unsigned(n) => ProductId(n.to_string()),
            RawId::Signed(n) => ProductId(n.to_string()),
            // 7.0 and 7 name the same product
            RawId::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => ProductId((f as i64).to_string()),
            RawId::Float(f) => ProductId(f.to_string()),
        };
        Ok(id)
    }
}

/// A purchasable item from the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub brand: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub price: Option<f64>,
}

impl Product {
    /// "Name (Brand)" label, or just the name when the brand is blank
    pub fn label(&self) -> String {
        if self.brand.trim().is_empty() {
            self.name.clone()
        } else {
            format!("{} ({})", self.name, self.brand)
        }
    }
}

/// The immutable product collection for one load
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    products: Vec<Product>,
    index: HashMap<ProductId, usize>,
}

impl Catalog {
    /// Build a catalog, keeping the first record for any duplicated id
    pub fn new(products: Vec<Product>) -> Self {
        debug!(count = products.len(), "Catalog::new: called");
        let mut kept = Vec::with_capacity(products.len());
        let mut index = HashMap::with_capacity(products.len());

        for product in products {
            if index.contains_key(&product.id) {
                warn!(id = %product.id, name = %product.name, "Duplicate product id in catalog, skipping");
                continue;
            }
            index.insert(product.id.clone(), kept.len());
            kept.push(product);
        }

        Self { products: kept, index }
    }

    /// An empty catalog (used when loading fails)
    pub fn empty() -> Self {
        Self::default()
    }

    /// Look up a product by id
    pub fn get(&self, id: &ProductId) -> Option<&Product> {
        self.index.get(id).map(|&i| &self.products[i])
    }

    /// All products in document order
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Distinct non-blank categories in first-seen order
    pub fn categories(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for product in &self.products {
            let category = product.category.as_str();
            if !category.trim().is_empty() && !seen.contains(&category) {
                seen.push(category);
            }
        }
        seen
    }
}
