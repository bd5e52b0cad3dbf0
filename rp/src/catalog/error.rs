//! Catalog error types

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading the product catalog
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Failed to read catalog {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to fetch catalog: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Catalog request returned status {0}")]
    Status(u16),

    #[error("Failed to parse catalog: {0}")]
    Parse(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_display() {
        let err = CatalogError::Status(404);
        assert_eq!(err.to_string(), "Catalog request returned status 404");
    }

    #[test]
    fn test_parse_from_serde() {
        let serde_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: CatalogError = serde_err.into();
        assert!(matches!(err, CatalogError::Parse(_)));
    }
}
