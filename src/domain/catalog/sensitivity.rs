use serde::{Deserialize, Serialize};

use crate::domain::foundation::IngredientId;
use crate::domain::profile::SkinType;

/// How strongly a skin type reacts to an ingredient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensitivityLevel {
    Low,
    Medium,
    High,
    Avoid,
}

impl SensitivityLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            SensitivityLevel::Low => "low",
            SensitivityLevel::Medium => "medium",
            SensitivityLevel::High => "high",
            SensitivityLevel::Avoid => "avoid",
        }
    }
}

/// Per skin type sensitivity override for an ingredient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkinSensitivity {
    pub ingredient_id: IngredientId,
    pub skin_type: SkinType,
    pub level: SensitivityLevel,
    #[serde(default)]
    pub recommended_max_concentration: Option<f64>,
    #[serde(default)]
    pub patch_test_required: bool,
    #[serde(default)]
    pub description: Option<String>,
}
