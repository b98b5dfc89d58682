//! Risk Aggregator - Collapses findings into one overall verdict.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{AnalysisPolicy, ConflictFinding};
use crate::domain::foundation::{Confidence, Severity};

/// Overall risk of a routine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub overall: Severity,
    pub confidence: Confidence,
    /// True when compounding findings raised the overall tier above the
    /// worst single finding.
    pub escalated: bool,
}

pub struct RiskAggregator {
    escalation_threshold: usize,
    empty_confidence: Confidence,
}

impl RiskAggregator {
    /// Thresholds below two are raised to two; a single finding never
    /// escalates past its own tier.
    pub fn new(escalation_threshold: usize, empty_confidence: Confidence) -> Self {
        Self {
            escalation_threshold: escalation_threshold.max(2),
            empty_confidence,
        }
    }

    pub fn from_policy(policy: &AnalysisPolicy) -> Self {
        Self::new(policy.escalation_threshold, policy.empty_analysis_confidence)
    }

    /// Computes the overall risk.
    ///
    /// # Algorithm
    /// - Start from the worst severity present.
    /// - Every tier holding at least `escalation_threshold` findings proposes
    ///   that tier escalated one step; the overall risk is the highest proposal.
    /// - Confidence is the highest confidence among the findings that drive the
    ///   overall tier (those at it, plus those of a tier that escalated into it).
    ///
    /// # Edge Cases
    /// - No findings: `Low` with the configured empty confidence
    /// - Critical never escalates further
    pub fn aggregate(&self, findings: &[ConflictFinding]) -> RiskAssessment {
        let Some(worst) = findings.iter().map(|f| f.severity).max() else {
            return RiskAssessment {
                overall: Severity::Low,
                confidence: self.empty_confidence,
                escalated: false,
            };
        };

        let mut counts: BTreeMap<Severity, usize> = BTreeMap::new();
        for finding in findings {
            *counts.entry(finding.severity).or_default() += 1;
        }

        let compounding: Vec<Severity> = counts
            .iter()
            .filter(|(_, count)| **count >= self.escalation_threshold)
            .map(|(tier, _)| *tier)
            .collect();

        let overall = compounding
            .iter()
            .map(|tier| tier.escalate())
            .fold(worst, Severity::max);

        let drives = |severity: Severity| {
            severity == overall
                || (compounding.contains(&severity) && severity.escalate() == overall)
        };
        let confidence = findings
            .iter()
            .filter(|f| drives(f.severity))
            .map(|f| f.confidence)
            .fold(Confidence::ZERO, Confidence::max);

        RiskAssessment {
            overall,
            confidence,
            escalated: overall > worst,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::analysis::{FindingKind, FindingSubject};
    use crate::domain::catalog::Separation;
    use crate::domain::foundation::IngredientId;
    use proptest::prelude::*;
    use std::collections::BTreeSet;

    fn finding(n: i64, severity: Severity, confidence: f64) -> ConflictFinding {
        ConflictFinding {
            subject: FindingSubject::Ingredient {
                ingredient_id: IngredientId::new(n).unwrap(),
            },
            kind: FindingKind::SkinSensitivity,
            title: format!("finding {}", n),
            products: BTreeSet::new(),
            product_links: BTreeSet::new(),
            severity,
            confidence: Confidence::new(confidence),
            separation: Separation::Hours(0),
            explanation: String::new(),
            caveats: BTreeSet::new(),
            supplementary_explanation: None,
        }
    }

    fn aggregator() -> RiskAggregator {
        RiskAggregator::from_policy(&AnalysisPolicy::default())
    }

    #[test]
    fn empty_findings_are_low_with_default_confidence() {
        let risk = aggregator().aggregate(&[]);
        assert_eq!(risk.overall, Severity::Low);
        assert_eq!(risk.confidence.value(), 0.8);
        assert!(!risk.escalated);
    }

    #[test]
    fn overall_is_worst_severity() {
        let risk = aggregator().aggregate(&[
            finding(1, Severity::Low, 0.9),
            finding(2, Severity::High, 0.6),
        ]);
        assert_eq!(risk.overall, Severity::High);
        assert_eq!(risk.confidence.value(), 0.6);
    }

    #[test]
    fn three_medium_findings_escalate_to_high() {
        let risk = aggregator().aggregate(&[
            finding(1, Severity::Medium, 0.4),
            finding(2, Severity::Medium, 0.7),
            finding(3, Severity::Medium, 0.5),
        ]);
        assert_eq!(risk.overall, Severity::High);
        assert!(risk.escalated);
        assert_eq!(risk.confidence.value(), 0.7);
    }

    #[test]
    fn two_medium_findings_do_not_escalate() {
        let risk = aggregator().aggregate(&[
            finding(1, Severity::Medium, 0.4),
            finding(2, Severity::Medium, 0.7),
        ]);
        assert_eq!(risk.overall, Severity::Medium);
        assert!(!risk.escalated);
    }

    #[test]
    fn threshold_below_two_is_raised_to_two() {
        for threshold in [0, 1] {
            let aggregator = RiskAggregator::new(threshold, Confidence::new(0.8));

            let single = aggregator.aggregate(&[finding(1, Severity::Medium, 0.7)]);
            assert_eq!(single.overall, Severity::Medium);
            assert!(!single.escalated);

            let pair = aggregator.aggregate(&[
                finding(1, Severity::Medium, 0.7),
                finding(2, Severity::Medium, 0.5),
            ]);
            assert_eq!(pair.overall, Severity::High);
            assert!(pair.escalated);
        }
    }

    #[test]
    fn escalated_tier_shares_drivers_with_existing_findings() {
        let risk = aggregator().aggregate(&[
            finding(1, Severity::Medium, 0.9),
            finding(2, Severity::Medium, 0.5),
            finding(3, Severity::Medium, 0.5),
            finding(4, Severity::High, 0.6),
        ]);
        assert_eq!(risk.overall, Severity::High);
        assert_eq!(risk.confidence.value(), 0.9);
        assert!(!risk.escalated);
    }

    #[test]
    fn critical_is_the_ceiling() {
        let risk = aggregator().aggregate(&[
            finding(1, Severity::Critical, 1.0),
            finding(2, Severity::Critical, 1.0),
            finding(3, Severity::Critical, 1.0),
        ]);
        assert_eq!(risk.overall, Severity::Critical);
        assert!(!risk.escalated);
    }

    #[test]
    fn low_confidence_findings_do_not_dilute_a_strong_one() {
        let mut findings = vec![finding(1, Severity::Critical, 0.95)];
        findings.extend((2..10).map(|n| finding(n, Severity::Critical, 0.1)));
        assert_eq!(aggregator().aggregate(&findings).confidence.value(), 0.95);
    }

    fn severity_strategy() -> impl Strategy<Value = Severity> {
        prop_oneof![
            Just(Severity::Low),
            Just(Severity::Medium),
            Just(Severity::High),
            Just(Severity::Critical),
        ]
    }

    proptest! {
        #[test]
        fn adding_a_lesser_finding_never_lowers_risk(
            severities in proptest::collection::vec(severity_strategy(), 1..12),
            extra in severity_strategy(),
            confidence in 0.0f64..=1.0,
        ) {
            let findings: Vec<_> = severities
                .iter()
                .enumerate()
                .map(|(i, s)| finding(i as i64 + 1, *s, confidence))
                .collect();
            let before = aggregator().aggregate(&findings).overall;
            let max_present = severities.iter().copied().max().unwrap();
            prop_assume!(extra <= max_present);

            let mut extended = findings.clone();
            extended.push(finding(100, extra, confidence));
            let after = aggregator().aggregate(&extended).overall;
            prop_assert!(after >= before);
        }
    }
}
