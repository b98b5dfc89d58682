//! Curated pairwise conflict rules.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::{Confidence, IngredientId, Severity, ValidationError};

/// Unordered ingredient pair stored as `(min, max)`.
///
/// Every rule lookup goes through this type, so `(a, b)` and `(b, a)`
/// always resolve to the same key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CanonicalPair {
    low: IngredientId,
    high: IngredientId,
}

impl CanonicalPair {
    /// Canonicalizes a pair. Fails for a self-pair.
    pub fn new(a: IngredientId, b: IngredientId) -> Result<Self, ValidationError> {
        if a == b {
            return Err(ValidationError::invalid_format(
                "ingredient_pair",
                format!("ingredient {} cannot conflict with itself", a),
            ));
        }
        Ok(if a < b {
            Self { low: a, high: b }
        } else {
            Self { low: b, high: a }
        })
    }

    pub fn low(&self) -> IngredientId {
        self.low
    }

    pub fn high(&self) -> IngredientId {
        self.high
    }

    pub fn contains(&self, id: IngredientId) -> bool {
        self.low == id || self.high == id
    }
}

impl fmt::Display for CanonicalPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.low, self.high)
    }
}

/// Nature of the interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictType {
    Chemical,
    Physical,
    Effectiveness,
}

impl ConflictType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConflictType::Chemical => "chemical",
            ConflictType::Physical => "physical",
            ConflictType::Effectiveness => "effectiveness",
        }
    }
}

/// Strength of the evidence behind a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceLevel {
    Low,
    Moderate,
    High,
    Proven,
}

impl EvidenceLevel {
    /// Starting confidence for a finding backed by this evidence.
    pub fn base_confidence(&self) -> Confidence {
        Confidence::new(match self {
            EvidenceLevel::Low => 0.4,
            EvidenceLevel::Moderate => 0.6,
            EvidenceLevel::High => 0.8,
            EvidenceLevel::Proven => 0.95,
        })
    }
}

/// Minimum gap between applying two ingredients.
///
/// Variant order makes `Never` compare greater than any hour count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Separation {
    Hours(u32),
    Never,
}

impl Separation {
    /// Maps a nullable hour count: `None` means never combine.
    pub fn from_hours(hours: Option<u32>) -> Self {
        match hours {
            Some(h) => Separation::Hours(h),
            None => Separation::Never,
        }
    }

    /// Wait in minutes, `None` when the pair must never share a slot.
    pub fn minutes(&self) -> Option<u32> {
        match self {
            Separation::Hours(h) => Some(h.saturating_mul(60)),
            Separation::Never => None,
        }
    }

    /// True unless the separation is zero hours.
    pub fn requires_gap(&self) -> bool {
        !matches!(self, Separation::Hours(0))
    }

    pub fn is_never(&self) -> bool {
        matches!(self, Separation::Never)
    }
}

impl fmt::Display for Separation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Separation::Hours(h) => write!(f, "{}h", h),
            Separation::Never => write!(f, "never combine"),
        }
    }
}

/// A curated conflict between two ingredients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConflictRule {
    pub ingredient1: IngredientId,
    pub ingredient2: IngredientId,
    pub severity: Severity,
    pub conflict_type: ConflictType,
    #[serde(default)]
    pub ph_dependent: bool,
    #[serde(default)]
    pub concentration_dependent: bool,
    /// Null means never combine.
    pub separation_hours: Option<u32>,
    pub evidence_level: EvidenceLevel,
    #[serde(default)]
    pub rationale: String,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl ConflictRule {
    pub fn pair(&self) -> Result<CanonicalPair, ValidationError> {
        CanonicalPair::new(self.ingredient1, self.ingredient2)
    }

    pub fn separation(&self) -> Separation {
        Separation::from_hours(self.separation_hours)
    }
}
