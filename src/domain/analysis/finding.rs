//! Conflict findings and skin warnings.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeSet;

use crate::domain::catalog::{CanonicalPair, ConflictType, SensitivityLevel, Separation};
use crate::domain::foundation::{Confidence, IngredientId, ProductId, Severity};

/// What a finding is about.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FindingSubject {
    Pair { pair: CanonicalPair },
    Ingredient { ingredient_id: IngredientId },
    Group { ingredient_ids: Vec<IngredientId> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeuristicKind {
    PhIncompatibility,
    CumulativePhotosensitivity,
}

/// Where a finding came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum FindingKind {
    Rule { conflict_type: ConflictType },
    SkinSensitivity,
    Allergen,
    Heuristic { heuristic: HeuristicKind },
}

/// Data-quality flag attached to a finding whose confidence was reduced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingCaveat {
    ConcentrationUnknown,
    PhDataUnavailable,
}

/// One detected conflict or profile-driven issue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConflictFinding {
    pub subject: FindingSubject,
    pub kind: FindingKind,
    /// Short label, e.g. "Retinol + Vitamin C".
    pub title: String,
    pub products: BTreeSet<ProductId>,
    /// Product pairs the scheduler must keep apart, each as `(lower, higher)`.
    pub product_links: BTreeSet<(ProductId, ProductId)>,
    pub severity: Severity,
    pub confidence: Confidence,
    pub separation: Separation,
    pub explanation: String,
    #[serde(default)]
    pub caveats: BTreeSet<FindingCaveat>,
    #[serde(default)]
    pub supplementary_explanation: Option<String>,
}

impl ConflictFinding {
    /// The canonical pair for pairwise findings.
    pub fn pair(&self) -> Option<CanonicalPair> {
        match &self.subject {
            FindingSubject::Pair { pair } => Some(*pair),
            _ => None,
        }
    }

    pub fn links(&self, a: ProductId, b: ProductId) -> bool {
        self.product_links.contains(&link(a, b))
    }

    /// Folds another finding for the same subject into this one: union of
    /// products and links, worst severity, strictest separation. Caveats
    /// follow whichever side supplies the higher confidence.
    pub fn merge(&mut self, other: ConflictFinding) {
        self.products.extend(other.products);
        self.product_links.extend(other.product_links);
        if other.severity > self.severity {
            self.severity = other.severity;
            self.kind = other.kind;
            self.explanation = other.explanation;
        }
        if other.confidence > self.confidence {
            self.confidence = other.confidence;
            self.caveats = other.caveats;
        }
        self.separation = self.separation.max(other.separation);
    }

    /// Presentation order: severity desc, confidence desc, subject asc.
    pub fn presentation_order(a: &ConflictFinding, b: &ConflictFinding) -> Ordering {
        b.severity
            .cmp(&a.severity)
            .then_with(|| {
                b.confidence
                    .partial_cmp(&a.confidence)
                    .unwrap_or(Ordering::Equal)
            })
            .then_with(|| a.subject.cmp(&b.subject))
    }
}

/// Orders a product pair as `(lower, higher)`.
pub fn link(a: ProductId, b: ProductId) -> (ProductId, ProductId) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Non-blocking note about an ingredient the user's skin type reacts to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkinWarning {
    pub ingredient_id: IngredientId,
    pub ingredient_name: String,
    pub level: SensitivityLevel,
    pub products: BTreeSet<ProductId>,
    pub recommended_max_concentration: Option<f64>,
    /// A product discloses a concentration above the recommended maximum.
    pub exceeds_max_concentration: bool,
    pub patch_test_required: bool,
    pub description: Option<String>,
}

/// Cross-product ingredient pair that was checked and matched nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SafeCombination {
    pub pair: CanonicalPair,
    pub title: String,
    pub products: BTreeSet<ProductId>,
}
