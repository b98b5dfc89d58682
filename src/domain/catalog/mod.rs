//! Catalog module - Read-only reference data.
//!
//! Ingredients, products, curated conflict rules and skin sensitivities as
//! supplied by the persistence collaborator. The engine never mutates them.

mod ingredient;
mod product;
mod rule;
mod sensitivity;
mod snapshot;

pub use ingredient::{ConcentrationRange, Ingredient, PhRange};
pub use product::{Product, ProductCategory, ProductIngredientEntry, ProductRecord};
pub use rule::{CanonicalPair, ConflictRule, ConflictType, EvidenceLevel, Separation};
pub use sensitivity::{SensitivityLevel, SkinSensitivity};
pub use snapshot::CatalogSnapshot;
