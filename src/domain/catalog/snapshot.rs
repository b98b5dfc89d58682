use serde::{Deserialize, Serialize};

use super::{ConflictRule, Ingredient, SkinSensitivity};

/// Full pull of the reference data a rule graph is built from.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogSnapshot {
    #[serde(default)]
    pub ingredients: Vec<Ingredient>,
    #[serde(default)]
    pub rules: Vec<ConflictRule>,
    #[serde(default)]
    pub sensitivities: Vec<SkinSensitivity>,
}

impl CatalogSnapshot {
    pub fn is_empty(&self) -> bool {
        self.ingredients.is_empty() && self.rules.is_empty() && self.sensitivities.is_empty()
    }
}
