use serde::{Deserialize, Serialize};

use crate::domain::catalog::{Product, ProductIngredientEntry};
use crate::domain::foundation::{IngredientId, ProductId, TimeOfDay};

/// A requested product resolved to its ingredient list.
///
/// Entries are sorted by ascending order rank and only contain ingredients
/// known to the current rule graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecomposedProduct {
    pub product: Product,
    pub time_of_day: TimeOfDay,
    pub entries: Vec<ProductIngredientEntry>,
    /// Contains at least one photosensitive ingredient.
    pub photosensitive: bool,
}

impl DecomposedProduct {
    pub fn new(product: Product, time_of_day: TimeOfDay, mut entries: Vec<ProductIngredientEntry>) -> Self {
        entries.sort_by_key(|e| (e.order_rank, e.ingredient_id));
        Self {
            product,
            time_of_day,
            entries,
            photosensitive: false,
        }
    }

    pub fn with_photosensitive(mut self, photosensitive: bool) -> Self {
        self.photosensitive = photosensitive;
        self
    }

    pub fn id(&self) -> ProductId {
        self.product.id
    }

    pub fn ingredient_ids(&self) -> impl Iterator<Item = IngredientId> + '_ {
        self.entries.iter().map(|e| e.ingredient_id)
    }

    pub fn contains(&self, ingredient: IngredientId) -> bool {
        self.entries.iter().any(|e| e.ingredient_id == ingredient)
    }

    /// Disclosed concentration, `None` when unknown or absent.
    pub fn concentration_of(&self, ingredient: IngredientId) -> Option<f64> {
        self.entries
            .iter()
            .find(|e| e.ingredient_id == ingredient)
            .and_then(|e| e.concentration_pct)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::ProductCategory;

    #[test]
    fn entries_are_sorted_by_rank() {
        let pid = ProductId::new(1).unwrap();
        let entry = |ing: i64, rank: u32| ProductIngredientEntry {
            product_id: pid,
            ingredient_id: IngredientId::new(ing).unwrap(),
            concentration_pct: if ing == 2 { Some(1.0) } else { None },
            order_rank: rank,
        };
        let product = Product {
            id: pid,
            name: "Serum".into(),
            brand: None,
            category: ProductCategory::Serum,
            is_active: true,
        };
        let decomposed = DecomposedProduct::new(product, TimeOfDay::Evening, vec![entry(3, 2), entry(2, 1)]);
        let ids: Vec<i64> = decomposed.ingredient_ids().map(|i| i.value()).collect();
        assert_eq!(ids, vec![2, 3]);
        assert_eq!(decomposed.concentration_of(IngredientId::new(2).unwrap()), Some(1.0));
        assert_eq!(decomposed.concentration_of(IngredientId::new(3).unwrap()), None);
    }
}
