//! Conflict Engine - Pairwise rule matching and profile-driven findings.

use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet};

use super::finding::link;
use super::{
    AnalysisPolicy, ConflictFinding, DecomposedProduct, FindingCaveat, FindingKind, FindingSubject,
    HeuristicKind, SafeCombination, SkinWarning,
};
use crate::domain::catalog::{CanonicalPair, ConflictRule, SensitivityLevel, Separation, SkinSensitivity};
use crate::domain::foundation::{Confidence, IngredientId, ProductId, Severity};
use crate::domain::profile::{SensitivityTier, UserProfile};
use crate::domain::rule_graph::RuleGraph;

const SENSITIVITY_CONFIDENCE: f64 = 0.8;
const PH_HEURISTIC_CONFIDENCE: f64 = 0.7;
const PHOTOSENSITIVITY_CONFIDENCE: f64 = 0.8;
const PHOTOSENSITIVITY_MIN_INGREDIENTS: usize = 3;
const PHOTOSENSITIVITY_MIN_PRODUCTS: usize = 2;

/// Everything the engine found for one set of products.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Detection {
    /// Sorted worst first.
    pub findings: Vec<ConflictFinding>,
    /// Sorted by ingredient id.
    pub skin_warnings: Vec<SkinWarning>,
    /// Pairs checked across products that matched no rule or heuristic,
    /// sorted by pair.
    pub safe_combinations: Vec<SafeCombination>,
}

/// Stateless detector over one rule graph snapshot.
pub struct ConflictEngine<'a> {
    graph: &'a RuleGraph,
    policy: &'a AnalysisPolicy,
}

impl<'a> ConflictEngine<'a> {
    pub fn new(graph: &'a RuleGraph, policy: &'a AnalysisPolicy) -> Self {
        Self { graph, policy }
    }

    /// Detects conflicts among `products` for `profile`.
    ///
    /// Only ingredients from different products are paired; a product's own
    /// formulation is never flagged. Findings for the same canonical pair are
    /// merged.
    pub fn detect(&self, products: &[DecomposedProduct], profile: &UserProfile) -> Detection {
        let mut ordered: Vec<&DecomposedProduct> = products.iter().collect();
        ordered.sort_by_key(|p| p.id());

        let (merged, safe_combinations) = self.pairwise(&ordered);
        let mut findings: Vec<ConflictFinding> = merged.into_values().collect();

        let provenance = Self::provenance(&ordered);
        let by_id: BTreeMap<ProductId, &DecomposedProduct> = ordered.iter().map(|p| (p.id(), *p)).collect();
        let mut skin_warnings = Vec::new();

        for (ingredient, holders) in &provenance {
            if profile.is_allergic_to(*ingredient) {
                findings.push(self.allergen_finding(*ingredient, holders));
            }
            let Some(row) = self.graph.sensitivity(*ingredient, profile.skin_type) else {
                continue;
            };
            match row.level {
                SensitivityLevel::Avoid => {
                    findings.push(self.sensitivity_finding(row, holders, Severity::High));
                }
                level => {
                    if level == SensitivityLevel::High && profile.sensitivity_tier == SensitivityTier::High {
                        findings.push(self.sensitivity_finding(row, holders, Severity::Medium));
                    }
                    skin_warnings.push(self.skin_warning(row, holders, &by_id));
                }
            }
        }

        if self.policy.heuristics_enabled {
            if let Some(finding) = self.photosensitivity_finding(&provenance) {
                findings.push(finding);
            }
        }

        findings.sort_by(ConflictFinding::presentation_order);
        Detection {
            findings,
            skin_warnings,
            safe_combinations,
        }
    }

    fn pairwise(
        &self,
        ordered: &[&DecomposedProduct],
    ) -> (BTreeMap<CanonicalPair, ConflictFinding>, Vec<SafeCombination>) {
        let mut merged: BTreeMap<CanonicalPair, ConflictFinding> = BTreeMap::new();
        let mut clear: BTreeMap<CanonicalPair, BTreeSet<ProductId>> = BTreeMap::new();
        for (i, left) in ordered.iter().enumerate() {
            for right in &ordered[i + 1..] {
                for a in left.ingredient_ids() {
                    for b in right.ingredient_ids() {
                        let Ok(pair) = CanonicalPair::new(a, b) else {
                            continue;
                        };
                        let candidate = match self.graph.rule_for_pair(&pair) {
                            Some(rule) => Some(self.rule_finding(rule, pair, (*left, a), (*right, b))),
                            None if self.policy.heuristics_enabled => self.ph_finding(pair, left.id(), right.id()),
                            None => None,
                        };
                        let Some(finding) = candidate else {
                            let holders = clear.entry(pair).or_default();
                            holders.insert(left.id());
                            holders.insert(right.id());
                            continue;
                        };
                        match merged.entry(pair) {
                            Entry::Occupied(mut existing) => existing.get_mut().merge(finding),
                            Entry::Vacant(slot) => {
                                slot.insert(finding);
                            }
                        }
                    }
                }
            }
        }
        let safe = clear
            .into_iter()
            .filter(|(pair, _)| !merged.contains_key(pair))
            .map(|(pair, products)| SafeCombination {
                pair,
                title: self.pair_title(pair),
                products,
            })
            .collect();
        (merged, safe)
    }

    fn rule_finding(
        &self,
        rule: &ConflictRule,
        pair: CanonicalPair,
        (left, a): (&DecomposedProduct, IngredientId),
        (right, b): (&DecomposedProduct, IngredientId),
    ) -> ConflictFinding {
        let mut confidence = rule.evidence_level.base_confidence();
        let mut caveats = BTreeSet::new();

        if rule.concentration_dependent
            && (left.concentration_of(a).is_none() || right.concentration_of(b).is_none())
        {
            confidence = confidence.penalize(self.policy.concentration_unknown_penalty);
            caveats.insert(FindingCaveat::ConcentrationUnknown);
        }
        if rule.ph_dependent && (!self.has_ph(a) || !self.has_ph(b)) {
            confidence = confidence.penalize(self.policy.ph_unknown_penalty);
            caveats.insert(FindingCaveat::PhDataUnavailable);
        }

        let title = self.pair_title(pair);
        let separation = rule.separation();
        let mut explanation = match separation {
            Separation::Never => format!(
                "{}: {} {} conflict, never use together.",
                title,
                rule.severity,
                rule.conflict_type.as_str()
            ),
            Separation::Hours(0) => format!(
                "{}: {} {} interaction, can be combined with care.",
                title,
                rule.severity,
                rule.conflict_type.as_str()
            ),
            Separation::Hours(h) => format!(
                "{}: {} {} conflict, keep at least {} hours apart.",
                title,
                rule.severity,
                rule.conflict_type.as_str(),
                h
            ),
        };
        if !rule.rationale.trim().is_empty() {
            explanation.push(' ');
            explanation.push_str(rule.rationale.trim());
        }

        ConflictFinding {
            subject: FindingSubject::Pair { pair },
            kind: FindingKind::Rule {
                conflict_type: rule.conflict_type,
            },
            title,
            products: [left.id(), right.id()].into_iter().collect(),
            product_links: [link(left.id(), right.id())].into_iter().collect(),
            severity: rule.severity,
            confidence,
            separation,
            explanation,
            caveats,
            supplementary_explanation: None,
        }
    }

    /// Known, non-overlapping pH ranges with no curated rule.
    fn ph_finding(&self, pair: CanonicalPair, left: ProductId, right: ProductId) -> Option<ConflictFinding> {
        let low = self.graph.ingredient(pair.low())?.ph_range?;
        let high = self.graph.ingredient(pair.high())?.ph_range?;
        if low.overlaps(&high) {
            return None;
        }
        let title = self.pair_title(pair);
        Some(ConflictFinding {
            subject: FindingSubject::Pair { pair },
            kind: FindingKind::Heuristic {
                heuristic: HeuristicKind::PhIncompatibility,
            },
            explanation: format!(
                "{}: working pH ranges {:.1}-{:.1} and {:.1}-{:.1} do not overlap; layering may reduce effectiveness.",
                title,
                low.min(),
                low.max(),
                high.min(),
                high.max()
            ),
            title,
            products: [left, right].into_iter().collect(),
            product_links: [link(left, right)].into_iter().collect(),
            severity: Severity::Low,
            confidence: Confidence::new(PH_HEURISTIC_CONFIDENCE),
            separation: Separation::Hours(0),
            caveats: BTreeSet::new(),
            supplementary_explanation: None,
        })
    }

    fn allergen_finding(&self, ingredient: IngredientId, holders: &BTreeSet<ProductId>) -> ConflictFinding {
        let name = self.name_of(ingredient);
        ConflictFinding {
            subject: FindingSubject::Ingredient {
                ingredient_id: ingredient,
            },
            kind: FindingKind::Allergen,
            explanation: format!("{} is listed in your allergies; do not use products containing it.", name),
            title: name,
            products: holders.clone(),
            product_links: BTreeSet::new(),
            severity: Severity::Critical,
            confidence: Confidence::CERTAIN,
            separation: Separation::Never,
            caveats: BTreeSet::new(),
            supplementary_explanation: None,
        }
    }

    fn sensitivity_finding(
        &self,
        row: &SkinSensitivity,
        holders: &BTreeSet<ProductId>,
        severity: Severity,
    ) -> ConflictFinding {
        let name = self.name_of(row.ingredient_id);
        let mut explanation = match row.level {
            SensitivityLevel::Avoid => format!("{} should be avoided for {} skin.", name, row.skin_type),
            _ => format!(
                "{} is poorly tolerated by {} skin and your profile reports high sensitivity.",
                name, row.skin_type
            ),
        };
        if let Some(description) = row.description.as_deref() {
            explanation.push(' ');
            explanation.push_str(description);
        }
        ConflictFinding {
            subject: FindingSubject::Ingredient {
                ingredient_id: row.ingredient_id,
            },
            kind: FindingKind::SkinSensitivity,
            title: name,
            products: holders.clone(),
            product_links: BTreeSet::new(),
            severity,
            confidence: Confidence::new(SENSITIVITY_CONFIDENCE),
            separation: Separation::Hours(0),
            explanation,
            caveats: BTreeSet::new(),
            supplementary_explanation: None,
        }
    }

    fn skin_warning(
        &self,
        row: &SkinSensitivity,
        holders: &BTreeSet<ProductId>,
        by_id: &BTreeMap<ProductId, &DecomposedProduct>,
    ) -> SkinWarning {
        let exceeds_max_concentration = row.recommended_max_concentration.map_or(false, |max| {
            holders
                .iter()
                .filter_map(|id| by_id.get(id))
                .filter_map(|p| p.concentration_of(row.ingredient_id))
                .any(|pct| pct > max)
        });
        SkinWarning {
            ingredient_id: row.ingredient_id,
            ingredient_name: self.name_of(row.ingredient_id),
            level: row.level,
            products: holders.clone(),
            recommended_max_concentration: row.recommended_max_concentration,
            exceeds_max_concentration,
            patch_test_required: row.patch_test_required,
            description: row.description.clone(),
        }
    }

    /// Several photosensitisers spread over more than one product.
    fn photosensitivity_finding(
        &self,
        provenance: &BTreeMap<IngredientId, BTreeSet<ProductId>>,
    ) -> Option<ConflictFinding> {
        let photosensitive: Vec<(IngredientId, &BTreeSet<ProductId>)> = provenance
            .iter()
            .filter(|(id, _)| {
                self.graph
                    .ingredient(**id)
                    .map(|i| i.is_photosensitive)
                    .unwrap_or(false)
            })
            .map(|(id, holders)| (*id, holders))
            .collect();
        if photosensitive.len() < PHOTOSENSITIVITY_MIN_INGREDIENTS {
            return None;
        }
        let products: BTreeSet<ProductId> = photosensitive
            .iter()
            .flat_map(|(_, holders)| holders.iter().copied())
            .collect();
        if products.len() < PHOTOSENSITIVITY_MIN_PRODUCTS {
            return None;
        }
        let ingredient_ids: Vec<IngredientId> = photosensitive.iter().map(|(id, _)| *id).collect();
        let names: Vec<String> = ingredient_ids.iter().map(|id| self.name_of(*id)).collect();
        Some(ConflictFinding {
            subject: FindingSubject::Group { ingredient_ids },
            kind: FindingKind::Heuristic {
                heuristic: HeuristicKind::CumulativePhotosensitivity,
            },
            title: "Cumulative photosensitivity".into(),
            explanation: format!(
                "{} photosensitising ingredients across your routine ({}) raise the risk of irritation and sun damage.",
                names.len(),
                names.join(", ")
            ),
            products,
            product_links: BTreeSet::new(),
            severity: Severity::High,
            confidence: Confidence::new(PHOTOSENSITIVITY_CONFIDENCE),
            separation: Separation::Hours(0),
            caveats: BTreeSet::new(),
            supplementary_explanation: None,
        })
    }

    fn provenance(ordered: &[&DecomposedProduct]) -> BTreeMap<IngredientId, BTreeSet<ProductId>> {
        let mut provenance: BTreeMap<IngredientId, BTreeSet<ProductId>> = BTreeMap::new();
        for product in ordered {
            for ingredient in product.ingredient_ids() {
                provenance.entry(ingredient).or_default().insert(product.id());
            }
        }
        provenance
    }

    fn has_ph(&self, id: IngredientId) -> bool {
        self.graph
            .ingredient(id)
            .map(|i| i.ph_range.is_some())
            .unwrap_or(false)
    }

    fn name_of(&self, id: IngredientId) -> String {
        self.graph
            .ingredient(id)
            .map(|i| i.display_name().to_string())
            .unwrap_or_else(|| format!("ingredient {}", id))
    }

    fn pair_title(&self, pair: CanonicalPair) -> String {
        format!("{} + {}", self.name_of(pair.low()), self.name_of(pair.high()))
    }
}
