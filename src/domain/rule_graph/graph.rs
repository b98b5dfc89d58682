//! Immutable rule index built from one catalog snapshot.

use sha2::{Digest, Sha256};
use std::collections::HashMap;

use super::RuleGraphError;
use crate::domain::catalog::{CanonicalPair, CatalogSnapshot, ConflictRule, Ingredient, SkinSensitivity};
use crate::domain::foundation::{IngredientId, Timestamp};
use crate::domain::profile::SkinType;

/// Read-only index over conflict rules and skin sensitivities.
///
/// Never mutated after `build`; a refresh builds a new graph and publishes it
/// through [`super::RuleGraphHandle`].
#[derive(Debug)]
pub struct RuleGraph {
    version: String,
    built_at: Timestamp,
    ingredients: HashMap<IngredientId, Ingredient>,
    rules: HashMap<CanonicalPair, ConflictRule>,
    sensitivities: HashMap<(IngredientId, SkinType), SkinSensitivity>,
}

impl RuleGraph {
    /// Builds a graph from a full snapshot.
    ///
    /// Inactive rules are skipped. The build fails on self-pair rules,
    /// duplicate canonical pairs, duplicate sensitivity rows and references to
    /// ingredients the snapshot does not contain.
    pub fn build(snapshot: CatalogSnapshot) -> Result<Self, RuleGraphError> {
        let version = Self::content_version(&snapshot)?;

        let mut ingredients = HashMap::with_capacity(snapshot.ingredients.len());
        for ingredient in snapshot.ingredients {
            let id = ingredient.id;
            if ingredients.insert(id, ingredient).is_some() {
                return Err(RuleGraphError::DuplicateIngredient(id));
            }
        }

        let mut rules = HashMap::new();
        for rule in snapshot.rules.into_iter().filter(|r| r.is_active) {
            let pair = rule
                .pair()
                .map_err(|_| RuleGraphError::SelfConflict(rule.ingredient1))?;
            for id in [pair.low(), pair.high()] {
                if !ingredients.contains_key(&id) {
                    return Err(RuleGraphError::UnknownIngredient(id));
                }
            }
            if rules.insert(pair, rule).is_some() {
                return Err(RuleGraphError::DuplicateRule(pair));
            }
        }

        let mut sensitivities = HashMap::new();
        for row in snapshot.sensitivities {
            if !ingredients.contains_key(&row.ingredient_id) {
                return Err(RuleGraphError::UnknownIngredient(row.ingredient_id));
            }
            let key = (row.ingredient_id, row.skin_type);
            if sensitivities.insert(key, row).is_some() {
                return Err(RuleGraphError::DuplicateSensitivity {
                    ingredient: key.0,
                    skin_type: key.1,
                });
            }
        }

        Ok(Self {
            version,
            built_at: Timestamp::now(),
            ingredients,
            rules,
            sensitivities,
        })
    }

    /// Content hash of the snapshot. Identical data yields the same version
    /// in every process.
    fn content_version(snapshot: &CatalogSnapshot) -> Result<String, RuleGraphError> {
        let bytes = serde_json::to_vec(snapshot)
            .map_err(|e| RuleGraphError::Fingerprint(e.to_string()))?;
        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        let digest = format!("{:x}", hasher.finalize());
        Ok(digest[..16].to_string())
    }

    /// Rule for two ingredients in either order. `None` for a self-pair.
    pub fn rule(&self, a: IngredientId, b: IngredientId) -> Option<&ConflictRule> {
        let pair = CanonicalPair::new(a, b).ok()?;
        self.rules.get(&pair)
    }

    pub fn rule_for_pair(&self, pair: &CanonicalPair) -> Option<&ConflictRule> {
        self.rules.get(pair)
    }

    pub fn sensitivity(&self, ingredient: IngredientId, skin_type: SkinType) -> Option<&SkinSensitivity> {
        self.sensitivities.get(&(ingredient, skin_type))
    }

    pub fn ingredient(&self, id: IngredientId) -> Option<&Ingredient> {
        self.ingredients.get(&id)
    }

    pub fn contains_ingredient(&self, id: IngredientId) -> bool {
        self.ingredients.contains_key(&id)
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn built_at(&self) -> Timestamp {
        self.built_at
    }

    pub fn ingredient_count(&self) -> usize {
        self.ingredients.len()
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    pub fn sensitivity_count(&self) -> usize {
        self.sensitivities.len()
    }
}
