//! Product catalog: records, loading and filtering
//!
//! The catalog is read once per load and never mutated afterwards. Ids are
//! canonicalized at deserialization so every later comparison is a plain
//! string comparison.

mod error;
mod filter;
mod loader;
mod product;

pub use error::CatalogError;
pub use filter::ProductFilter;
pub use loader::{CatalogLoader, CatalogSource, parse_catalog};
pub use product::{Catalog, Product, ProductId};
