//! Profile module - The user's skin profile.
//!
//! An explicit, closed set of recognized fields. Unknown attributes are
//! rejected at deserialization.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::{IngredientId, ValidationError};

/// Skin type, one per profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkinType {
    Dry,
    Oily,
    Combination,
    Sensitive,
    Normal,
}

impl SkinType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SkinType::Dry => "dry",
            SkinType::Oily => "oily",
            SkinType::Combination => "combination",
            SkinType::Sensitive => "sensitive",
            SkinType::Normal => "normal",
        }
    }
}

impl fmt::Display for SkinType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SkinType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dry" => Ok(SkinType::Dry),
            "oily" => Ok(SkinType::Oily),
            "combination" => Ok(SkinType::Combination),
            "sensitive" => Ok(SkinType::Sensitive),
            "normal" => Ok(SkinType::Normal),
            other => Err(ValidationError::invalid_format(
                "skin_type",
                format!("unknown skin type '{}'", other),
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkinConcern {
    Acne,
    Aging,
    Hyperpigmentation,
    Dryness,
    Redness,
    Pores,
    Dullness,
}

/// How reactive the user reports their skin to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SensitivityTier {
    Low,
    #[default]
    Moderate,
    High,
}

/// The user's skin profile.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UserProfile {
    pub skin_type: SkinType,
    #[serde(default)]
    pub concerns: BTreeSet<SkinConcern>,
    #[serde(default)]
    pub allergens: BTreeSet<IngredientId>,
    #[serde(default)]
    pub sensitivity_tier: SensitivityTier,
}

impl UserProfile {
    pub fn new(skin_type: SkinType) -> Self {
        Self {
            skin_type,
            concerns: BTreeSet::new(),
            allergens: BTreeSet::new(),
            sensitivity_tier: SensitivityTier::default(),
        }
    }

    pub fn with_concern(mut self, concern: SkinConcern) -> Self {
        self.concerns.insert(concern);
        self
    }

    pub fn with_allergen(mut self, ingredient: IngredientId) -> Self {
        self.allergens.insert(ingredient);
        self
    }

    pub fn with_tier(mut self, tier: SensitivityTier) -> Self {
        self.sensitivity_tier = tier;
        self
    }

    pub fn is_allergic_to(&self, ingredient: IngredientId) -> bool {
        self.allergens.contains(&ingredient)
    }

    /// Sensitive skin or a high reported tier.
    pub fn is_sensitive(&self) -> bool {
        self.skin_type == SkinType::Sensitive || self.sensitivity_tier == SensitivityTier::High
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_unknown_fields() {
        let json = r#"{"skin_type": "oily", "favourite_colour": "blue"}"#;
        assert!(serde_json::from_str::<UserProfile>(json).is_err());
    }

    #[test]
    fn defaults_optional_fields() {
        let profile: UserProfile = serde_json::from_str(r#"{"skin_type": "dry"}"#).unwrap();
        assert_eq!(profile.skin_type, SkinType::Dry);
        assert!(profile.concerns.is_empty());
        assert!(profile.allergens.is_empty());
        assert_eq!(profile.sensitivity_tier, SensitivityTier::Moderate);
    }

    #[test]
    fn duplicate_allergens_collapse() {
        let json = r#"{"skin_type": "normal", "allergens": [4, 2, 4]}"#;
        let profile: UserProfile = serde_json::from_str(json).unwrap();
        assert_eq!(profile.allergens.len(), 2);
        assert!(profile.is_allergic_to(IngredientId::new(4).unwrap()));
    }

    #[test]
    fn rejects_non_positive_allergen_ids() {
        let json = r#"{"skin_type": "normal", "allergens": [0]}"#;
        assert!(serde_json::from_str::<UserProfile>(json).is_err());
    }

    #[test]
    fn sensitive_when_skin_type_or_tier_says_so() {
        assert!(UserProfile::new(SkinType::Sensitive).is_sensitive());
        assert!(UserProfile::new(SkinType::Oily)
            .with_tier(SensitivityTier::High)
            .is_sensitive());
        assert!(!UserProfile::new(SkinType::Oily).is_sensitive());
    }

    #[test]
    fn parses_skin_type() {
        assert_eq!("Combination".parse::<SkinType>().unwrap(), SkinType::Combination);
        assert!("scaly".parse::<SkinType>().is_err());
    }
}
