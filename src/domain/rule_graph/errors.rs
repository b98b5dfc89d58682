use crate::domain::catalog::CanonicalPair;
use crate::domain::foundation::IngredientId;
use crate::domain::profile::SkinType;

/// Reasons a catalog snapshot cannot become a rule graph.
#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum RuleGraphError {
    #[error("Rule pairs ingredient {0} with itself")]
    SelfConflict(IngredientId),

    #[error("More than one active rule for pair {0}")]
    DuplicateRule(CanonicalPair),

    #[error("Ingredient {0} appears more than once")]
    DuplicateIngredient(IngredientId),

    #[error("More than one sensitivity row for ingredient {ingredient} and skin type {skin_type}")]
    DuplicateSensitivity {
        ingredient: IngredientId,
        skin_type: SkinType,
    },

    #[error("Reference to unknown ingredient {0}")]
    UnknownIngredient(IngredientId),

    #[error("Snapshot could not be hashed: {0}")]
    Fingerprint(String),
}
