//! Catalog loading from a local file or an HTTP URL

use std::path::PathBuf;
use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info};

use super::{Catalog, CatalogError, Product};

/// Where the catalog document lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogSource {
    File(PathBuf),
    Url(String),
}

impl CatalogSource {
    /// Interpret a config string: `http(s)://` is a URL, anything else a path
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.starts_with("http://") || raw.starts_with("https://") {
            Self::Url(raw.to_string())
        } else {
            Self::File(PathBuf::from(raw))
        }
    }
}

impl std::fmt::Display for CatalogSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Url(url) => f.write_str(url),
        }
    }
}

/// Accepted catalog document shapes
#[derive(Deserialize)]
#[serde(untagged)]
enum CatalogDocument {
    Wrapped { products: Vec<Product> },
    Bare(Vec<Product>),
}

/// Parse a catalog document
pub fn parse_catalog(text: &str) -> Result<Catalog, CatalogError> {
    debug!(len = text.len(), "parse_catalog: called");
    let products = match serde_json::from_str::<CatalogDocument>(text)? {
        CatalogDocument::Wrapped { products } => products,
        CatalogDocument::Bare(products) => products,
    };
    Ok(Catalog::new(products))
}

/// Reads the catalog once per load; never mutates it
pub struct CatalogLoader {
    source: CatalogSource,
    http: Client,
}

impl CatalogLoader {
    pub fn new(source: CatalogSource, timeout: Duration) -> Result<Self, CatalogError> {
        debug!(%source, ?timeout, "CatalogLoader::new: called");
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self { source, http })
    }

    pub fn source(&self) -> &CatalogSource {
        &self.source
    }

    /// Fetch and parse the catalog
    pub async fn load(&self) -> Result<Catalog, CatalogError> {
        debug!(source = %self.source, "CatalogLoader::load: called");
        let text = match &self.source {
            CatalogSource::File(path) => {
                tokio::fs::read_to_string(path)
                    .await
                    .map_err(|source| CatalogError::Io {
                        path: path.clone(),
                        source,
                    })?
            }
            CatalogSource::Url(url) => {
                let response = self.http.get(url).send().await?;
                let status = response.status();
                if !status.is_success() {
                    return Err(CatalogError::Status(status.as_u16()));
                }
                response.text().await?
            }
        };

        let catalog = parse_catalog(&text)?;
        info!("Loaded {} products from {}", catalog.len(), self.source);
        Ok(catalog)
    }
}
