//! In-memory catalog backed by a YAML document.
//!
//! Used by the CLI, for development and in tests. The document lists
//! ingredients, rules, sensitivities and products with their ingredients:
//!
//! ```yaml
//! ingredients:
//!   - { id: 1, name: Retinol, is_photosensitive: true }
//! rules:
//!   - { ingredient1: 1, ingredient2: 2, severity: medium, conflict_type: effectiveness,
//!       separation_hours: 12, evidence_level: moderate }
//! products:
//!   - id: 10
//!     name: Retinol Night Serum
//!     category: serum
//!     ingredients:
//!       - { ingredient_id: 1, concentration_pct: 0.3 }
//! ```

use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

use crate::domain::catalog::{
    CatalogSnapshot, ConflictRule, Ingredient, Product, ProductCategory, ProductIngredientEntry, ProductRecord,
    SkinSensitivity,
};
use crate::domain::foundation::{IngredientId, ProductId};
use crate::ports::{CatalogError, CatalogReader};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CatalogDocument {
    #[serde(default)]
    ingredients: Vec<Ingredient>,
    #[serde(default)]
    rules: Vec<ConflictRule>,
    #[serde(default)]
    sensitivities: Vec<SkinSensitivity>,
    #[serde(default)]
    products: Vec<ProductDocument>,
}

#[derive(Debug, Deserialize)]
struct ProductDocument {
    id: ProductId,
    name: String,
    #[serde(default)]
    brand: Option<String>,
    /// Explicit category, or derived from `product_type`.
    #[serde(default)]
    category: Option<ProductCategory>,
    #[serde(default)]
    product_type: Option<String>,
    #[serde(default = "default_active")]
    is_active: bool,
    #[serde(default)]
    ingredients: Vec<EntryDocument>,
}

#[derive(Debug, Deserialize)]
struct EntryDocument {
    ingredient_id: IngredientId,
    #[serde(default)]
    concentration_pct: Option<f64>,
    /// Defaults to the position in the list.
    #[serde(default)]
    order_rank: Option<u32>,
}

fn default_active() -> bool {
    true
}

impl ProductDocument {
    fn into_record(self) -> ProductRecord {
        let category = self.category.unwrap_or_else(|| {
            self.product_type
                .as_deref()
                .map(ProductCategory::classify)
                .unwrap_or(ProductCategory::Serum)
        });
        let product_id = self.id;
        let entries = self
            .ingredients
            .into_iter()
            .enumerate()
            .map(|(position, entry)| ProductIngredientEntry {
                product_id,
                ingredient_id: entry.ingredient_id,
                concentration_pct: entry.concentration_pct,
                order_rank: entry.order_rank.unwrap_or(position as u32 + 1),
            })
            .collect();
        ProductRecord {
            product: Product {
                id: product_id,
                name: self.name,
                brand: self.brand,
                category,
                is_active: self.is_active,
            },
            entries,
        }
    }
}

/// Catalog held entirely in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    snapshot: CatalogSnapshot,
    products: HashMap<ProductId, ProductRecord>,
}

impl InMemoryCatalog {
    pub fn new(snapshot: CatalogSnapshot) -> Self {
        Self {
            snapshot,
            products: HashMap::new(),
        }
    }

    pub fn with_product(mut self, record: ProductRecord) -> Self {
        self.products.insert(record.product.id, record);
        self
    }

    /// Parses a YAML catalog document.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, CatalogError> {
        let document: CatalogDocument =
            serde_yaml::from_str(yaml).map_err(|e| CatalogError::InvalidData(e.to_string()))?;

        let mut products = HashMap::with_capacity(document.products.len());
        for product in document.products {
            let record = product.into_record();
            let id = record.product.id;
            if products.insert(id, record).is_some() {
                return Err(CatalogError::InvalidData(format!("product {} defined twice", id)));
            }
        }

        Ok(Self {
            snapshot: CatalogSnapshot {
                ingredients: document.ingredients,
                rules: document.rules,
                sensitivities: document.sensitivities,
            },
            products,
        })
    }

    /// Reads and parses a YAML catalog file.
    pub async fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| CatalogError::Unavailable(format!("{}: {}", path.display(), e)))?;
        Self::from_yaml_str(&contents)
    }

    pub fn product_count(&self) -> usize {
        self.products.len()
    }
}

#[async_trait]
impl CatalogReader for InMemoryCatalog {
    async fn load_snapshot(&self) -> Result<CatalogSnapshot, CatalogError> {
        Ok(self.snapshot.clone())
    }

    async fn find_product(&self, id: ProductId) -> Result<Option<ProductRecord>, CatalogError> {
        Ok(self.products.get(&id).cloned())
    }
}
