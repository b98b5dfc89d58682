//! ProductDecomposer - Resolves requested products to their ingredient lists.

use std::sync::Arc;

use crate::domain::analysis::{DecomposedProduct, RequestedProduct};
use crate::domain::foundation::{ErrorCode, IngredientId, ProductId};
use crate::domain::rule_graph::RuleGraph;
use crate::ports::{CatalogError, CatalogReader};

/// A decomposed product plus the entries that had to be dropped.
#[derive(Debug, Clone)]
pub struct Decomposition {
    pub product: DecomposedProduct,
    /// Ingredient ids the rule graph does not know.
    pub skipped: Vec<IngredientId>,
}

#[derive(Debug, thiserror::Error)]
pub enum DecomposeError {
    /// Unknown or inactive product.
    #[error("product {0} not found")]
    NotFound(ProductId),

    /// No ingredient of the product could be resolved. Carries the product
    /// with no entries so it can still be scheduled.
    #[error("product {} has no resolvable ingredients", .0.id())]
    IncompleteData(Box<DecomposedProduct>),

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// Resolves product ids against the catalog and the current rule graph.
pub struct ProductDecomposer {
    catalog: Arc<dyn CatalogReader>,
}

impl ProductDecomposer {
    pub fn new(catalog: Arc<dyn CatalogReader>) -> Self {
        Self { catalog }
    }

    /// Decomposes one requested product.
    ///
    /// Entries whose ingredient is unknown to `graph` are skipped and
    /// reported. A product left without entries is `IncompleteData`; it
    /// contributes no findings but keeps its place in the routine.
    pub async fn decompose(
        &self,
        graph: &RuleGraph,
        requested: &RequestedProduct,
    ) -> Result<Decomposition, DecomposeError> {
        let record = self
            .catalog
            .find_product(requested.product_id)
            .await?
            .filter(|record| record.product.is_active)
            .ok_or(DecomposeError::NotFound(requested.product_id))?;

        let (known, unknown): (Vec<_>, Vec<_>) = record
            .entries
            .into_iter()
            .partition(|entry| graph.contains_ingredient(entry.ingredient_id));

        let skipped: Vec<IngredientId> = unknown.iter().map(|entry| entry.ingredient_id).collect();
        if !skipped.is_empty() {
            tracing::warn!(
                code = %ErrorCode::IncompleteData,
                product_id = %requested.product_id,
                skipped = skipped.len(),
                "product references ingredients missing from the rule graph"
            );
        }

        if known.is_empty() {
            tracing::warn!(
                code = %ErrorCode::IncompleteData,
                product_id = %requested.product_id,
                "product has no resolvable ingredients"
            );
            let product = DecomposedProduct::new(record.product, requested.time_of_day, Vec::new());
            return Err(DecomposeError::IncompleteData(Box::new(product)));
        }

        let photosensitive = known.iter().any(|entry| {
            graph
                .ingredient(entry.ingredient_id)
                .is_some_and(|ingredient| ingredient.is_photosensitive)
        });

        let product = DecomposedProduct::new(record.product, requested.time_of_day, known)
            .with_photosensitive(photosensitive);

        Ok(Decomposition { product, skipped })
    }
}
