//! Advisor - Plain-language guidance derived from an analysis.

use serde::{Deserialize, Serialize};

use super::{ConflictFinding, DecomposedProduct, FindingKind, Schedule};
use crate::domain::catalog::Separation;
use crate::domain::foundation::Severity;
use crate::domain::profile::UserProfile;
use crate::domain::rule_graph::RuleGraph;

pub const NO_MAJOR_CONFLICTS: &str = "No major conflicts detected in your routine.";

/// Period, expectation and name keywords, checked in order. An ingredient
/// counts toward the first group it matches.
const MILESTONES: &[(&str, &str, &[&str])] = &[
    (
        "1-2 weeks",
        "Improved hydration and skin texture",
        &["hyaluronic acid", "glycerin", "niacinamide"],
    ),
    (
        "4-6 weeks",
        "Reduced blemishes and improved skin tone",
        &["vitamin c", "salicylic acid", "glycolic acid"],
    ),
    (
        "3-6 months",
        "Significant anti-aging and skin renewal benefits",
        &["retinol", "tretinoin"],
    ),
];

const GENERAL_MILESTONE: (&str, &str) = ("4-8 weeks", "Results typically visible with consistent use");

/// When the routine's actives are expected to show results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultsMilestone {
    pub period: String,
    pub expectation: String,
}

impl ResultsMilestone {
    fn new((period, expectation): (&str, &str)) -> Self {
        Self {
            period: period.to_string(),
            expectation: expectation.to_string(),
        }
    }
}

/// Produces ordered, de-duplicated recommendations.
pub struct Advisor;

impl Advisor {
    pub fn recommendations(
        findings: &[ConflictFinding],
        schedule: &Schedule,
        products: &[DecomposedProduct],
        profile: &UserProfile,
    ) -> Vec<String> {
        let mut advice: Vec<String> = Vec::new();

        for finding in findings {
            match (finding.kind, finding.separation) {
                (FindingKind::Allergen, _) => advice.push(format!(
                    "Stop using products containing {}: it is listed in your allergies.",
                    finding.title
                )),
                (FindingKind::SkinSensitivity, _) if finding.severity >= Severity::High => advice.push(format!(
                    "Avoid {} with {} skin.",
                    finding.title, profile.skin_type
                )),
                (FindingKind::Rule { .. }, Separation::Never) => {
                    advice.push(format!("Never use {} in the same routine.", finding.title))
                }
                (FindingKind::Rule { .. }, Separation::Hours(h)) if h > 0 && finding.severity.is_serious() => {
                    advice.push(format!("Use {} at least {} hours apart.", finding.title, h))
                }
                _ => {}
            }
        }

        for conflict in &schedule.unresolved {
            advice.push(format!("Review your {} routine: {}.", conflict.slot, conflict.reason));
        }

        let mut morning_photosensitive: Vec<&str> = products
            .iter()
            .filter(|p| p.photosensitive && schedule.morning.contains(p.id()))
            .map(|p| p.product.name.as_str())
            .collect();
        morning_photosensitive.sort_unstable();
        if !morning_photosensitive.is_empty() {
            advice.push(format!(
                "Apply a broad-spectrum sunscreen in the morning: {} increases sun sensitivity.",
                morning_photosensitive.join(", ")
            ));
        }

        if profile.is_sensitive() && !products.is_empty() {
            advice.push("Patch test new products on a small area for 24-48 hours before full use.".to_string());
        }

        let quiet = findings.iter().all(|f| f.severity < Severity::Medium) && schedule.unresolved.is_empty();
        if quiet {
            advice.push(NO_MAJOR_CONFLICTS.to_string());
        }

        let mut seen = std::collections::HashSet::new();
        advice.retain(|line| seen.insert(line.clone()));
        advice
    }

    /// Expected results timeline, shortest period first. Falls back to one
    /// general milestone when no recognised active is present.
    pub fn timeline(products: &[DecomposedProduct], graph: &RuleGraph) -> Vec<ResultsMilestone> {
        let mut reached = [false; MILESTONES.len()];
        for id in products.iter().flat_map(|p| p.ingredient_ids()) {
            let Some(ingredient) = graph.ingredient(id) else {
                continue;
            };
            let name = ingredient.name.to_lowercase();
            if let Some(group) = MILESTONES
                .iter()
                .position(|(_, _, keywords)| keywords.iter().any(|k| name.contains(k)))
            {
                reached[group] = true;
            }
        }

        let milestones: Vec<ResultsMilestone> = MILESTONES
            .iter()
            .zip(reached)
            .filter(|(_, hit)| *hit)
            .map(|((period, expectation, _), _)| ResultsMilestone::new((*period, *expectation)))
            .collect();
        if milestones.is_empty() {
            return vec![ResultsMilestone::new(GENERAL_MILESTONE)];
        }
        milestones
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::analysis::test_support::*;
    use crate::domain::analysis::{AnalysisPolicy, ConflictEngine, RoutineScheduler, SlotBudgets};
    use crate::domain::foundation::TimeOfDay;
    use crate::domain::profile::{SensitivityTier, SkinType};

    fn advise(products: &[DecomposedProduct], profile: &UserProfile) -> Vec<String> {
        let graph = graph();
        let policy = AnalysisPolicy::default();
        let findings = ConflictEngine::new(&graph, &policy).detect(products, profile).findings;
        let schedule = RoutineScheduler::new(&policy).schedule(
            products,
            &findings,
            &SlotBudgets::default(),
            profile.sensitivity_tier,
        );
        Advisor::recommendations(&findings, &schedule, products, profile)
    }

    #[test]
    fn empty_routine_has_no_major_conflicts() {
        let advice = advise(&[], &UserProfile::new(SkinType::Normal));
        assert_eq!(advice, vec![NO_MAJOR_CONFLICTS.to_string()]);
    }

    #[test]
    fn never_combine_rule_is_called_out() {
        let products = [retinol_serum(TimeOfDay::Evening), glycolic_toner(TimeOfDay::Morning)];
        let advice = advise(&products, &UserProfile::new(SkinType::Normal));
        assert!(advice.iter().any(|a| a == "Never use Retinol + Glycolic Acid in the same routine."));
        assert!(!advice.iter().any(|a| a == NO_MAJOR_CONFLICTS));
    }

    #[test]
    fn serious_separation_is_advised() {
        let products = [retinol_serum(TimeOfDay::Evening), bha_toner(TimeOfDay::Morning)];
        let advice = advise(&products, &UserProfile::new(SkinType::Normal));
        assert!(advice.iter().any(|a| a.contains("at least 24 hours apart")));
    }

    #[test]
    fn morning_photosensitiser_needs_sunscreen() {
        let advice = advise(&[bha_toner(TimeOfDay::Morning)], &UserProfile::new(SkinType::Normal));
        assert!(advice.iter().any(|a| a.contains("sunscreen") && a.contains("BHA Toner")));

        let evening = advise(&[bha_toner(TimeOfDay::Evening)], &UserProfile::new(SkinType::Normal));
        assert!(!evening.iter().any(|a| a.contains("sunscreen")));
    }

    #[test]
    fn sensitive_profiles_get_patch_test_advice() {
        let profile = UserProfile::new(SkinType::Oily).with_tier(SensitivityTier::High);
        let advice = advise(&[niacinamide_cream(TimeOfDay::Morning)], &profile);
        assert!(advice.iter().any(|a| a.starts_with("Patch test")));
    }

    fn periods(products: &[DecomposedProduct]) -> Vec<String> {
        Advisor::timeline(products, &graph())
            .into_iter()
            .map(|m| m.period)
            .collect()
    }

    #[test]
    fn timeline_lists_each_reached_period_once_in_order() {
        let products = [
            retinol_serum(TimeOfDay::Evening),
            niacinamide_cream(TimeOfDay::Morning),
            vitamin_c_serum(TimeOfDay::Morning),
            bha_toner(TimeOfDay::Evening),
        ];
        assert_eq!(periods(&products), vec!["1-2 weeks", "4-6 weeks", "3-6 months"]);
    }

    #[test]
    fn timeline_only_includes_matching_actives() {
        let timeline = Advisor::timeline(&[retinol_serum(TimeOfDay::Evening)], &graph());
        assert_eq!(timeline.len(), 1);
        assert_eq!(timeline[0].period, "3-6 months");
        assert!(timeline[0].expectation.contains("anti-aging"));
    }

    #[test]
    fn timeline_without_known_actives_is_general() {
        let products = [bakuchiol_oil(TimeOfDay::Evening)];
        assert_eq!(periods(&products), vec!["4-8 weeks"]);
        assert_eq!(periods(&[]), vec!["4-8 weeks"]);
    }

    #[test]
    fn unresolved_conflicts_are_listed() {
        let products = [retinol_serum(TimeOfDay::Evening), vitamin_c_serum(TimeOfDay::Evening)];
        let advice = advise(&products, &UserProfile::new(SkinType::Normal));
        assert!(advice.iter().any(|a| a.starts_with("Review your evening routine")));
    }
}
