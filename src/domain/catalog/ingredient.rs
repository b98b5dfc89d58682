//! Ingredient reference data.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{IngredientId, ValidationError};

/// Inclusive pH interval in which an ingredient is stable and effective.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhRange {
    min: f64,
    max: f64,
}

impl PhRange {
    /// Creates a pH range. Both bounds must lie in 0..=14 and `min <= max`.
    pub fn new(min: f64, max: f64) -> Result<Self, ValidationError> {
        if !(0.0..=14.0).contains(&min) {
            return Err(ValidationError::out_of_range("ph_min", 0, 14, min));
        }
        if !(0.0..=14.0).contains(&max) {
            return Err(ValidationError::out_of_range("ph_max", 0, 14, max));
        }
        if min > max {
            return Err(ValidationError::invalid_format(
                "ph_range",
                format!("min {} exceeds max {}", min, max),
            ));
        }
        Ok(Self { min, max })
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    /// True when some pH satisfies both ranges.
    pub fn overlaps(&self, other: &PhRange) -> bool {
        self.min <= other.max && other.min <= self.max
    }
}

/// Recommended concentration window, in percent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConcentrationRange {
    pub min_pct: f64,
    pub max_pct: f64,
}

impl ConcentrationRange {
    pub fn contains(&self, pct: f64) -> bool {
        pct >= self.min_pct && pct <= self.max_pct
    }
}

/// An ingredient as curated in the catalog. Immutable reference data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    pub id: IngredientId,
    pub name: String,
    #[serde(default)]
    pub inci_name: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub functional_class: Option<String>,
    #[serde(default)]
    pub ph_range: Option<PhRange>,
    #[serde(default)]
    pub recommended_concentration: Option<ConcentrationRange>,
    /// Increases sun sensitivity (retinoids, AHAs, BHAs, hydroquinone).
    #[serde(default)]
    pub is_photosensitive: bool,
}

impl Ingredient {
    /// Minimal ingredient with only identity and name.
    pub fn new(id: IngredientId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            inci_name: None,
            category: None,
            functional_class: None,
            ph_range: None,
            recommended_concentration: None,
            is_photosensitive: false,
        }
    }

    pub fn with_ph_range(mut self, range: PhRange) -> Self {
        self.ph_range = Some(range);
        self
    }

    pub fn photosensitive(mut self) -> Self {
        self.is_photosensitive = true;
        self
    }

    /// Name used in explanations: INCI name when the common name is empty.
    pub fn display_name(&self) -> &str {
        if self.name.trim().is_empty() {
            self.inci_name.as_deref().unwrap_or("unnamed ingredient")
        } else {
            &self.name
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(v: i64) -> IngredientId {
        IngredientId::new(v).unwrap()
    }

    #[test]
    fn ph_range_rejects_inverted_bounds() {
        assert!(PhRange::new(5.0, 3.0).is_err());
        assert!(PhRange::new(-1.0, 3.0).is_err());
        assert!(PhRange::new(3.0, 15.0).is_err());
    }

    #[test]
    fn ph_ranges_overlap_at_boundary() {
        let acidic = PhRange::new(2.5, 3.5).unwrap();
        let neutral = PhRange::new(3.5, 7.0).unwrap();
        let basic = PhRange::new(5.5, 7.5).unwrap();
        assert!(acidic.overlaps(&neutral));
        assert!(!acidic.overlaps(&basic));
        assert!(!basic.overlaps(&acidic));
    }

    #[test]
    fn concentration_range_is_inclusive() {
        let range = ConcentrationRange { min_pct: 0.1, max_pct: 1.0 };
        assert!(range.contains(1.0));
        assert!(!range.contains(1.5));
    }

    #[test]
    fn display_name_falls_back_to_inci() {
        let mut ing = Ingredient::new(id(1), "");
        ing.inci_name = Some("Ascorbic Acid".into());
        assert_eq!(ing.display_name(), "Ascorbic Acid");
        assert_eq!(Ingredient::new(id(2), "Retinol").display_name(), "Retinol");
    }

    #[test]
    fn deserializes_with_optional_fields_missing() {
        let yaml = "id: 4\nname: Niacinamide\n";
        let ing: Ingredient = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(ing.id, id(4));
        assert!(ing.ph_range.is_none());
        assert!(!ing.is_photosensitive);
    }
}
