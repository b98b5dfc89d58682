//! Catalog reader port - Read-only access to curated catalog data.
//!
//! The persistence collaborator owns brands, products and ingredients. The
//! engine only pulls full snapshots for the rule graph and individual
//! products for decomposition.

use async_trait::async_trait;

use crate::domain::catalog::{CatalogSnapshot, ProductRecord};
use crate::domain::foundation::ProductId;

/// Port for reading catalog data.
#[async_trait]
pub trait CatalogReader: Send + Sync {
    /// Full pull of ingredients, conflict rules and skin sensitivities.
    async fn load_snapshot(&self) -> Result<CatalogSnapshot, CatalogError>;

    /// A product with its ingredient entries, active or not.
    ///
    /// Returns `None` if the id is unknown.
    async fn find_product(&self, id: ProductId) -> Result<Option<ProductRecord>, CatalogError>;
}

/// Errors from the catalog collaborator.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// Backend cannot be reached.
    #[error("catalog unavailable: {0}")]
    Unavailable(String),

    /// Query or read failed.
    #[error("catalog query failed: {0}")]
    Query(String),

    /// Stored data violates the catalog model.
    #[error("invalid catalog data: {0}")]
    InvalidData(String),
}
