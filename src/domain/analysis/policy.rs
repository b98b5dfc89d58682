use crate::domain::foundation::Confidence;

/// Tunable parameters of the analysis. Built from the `engine` config section.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisPolicy {
    /// Fraction removed from a concentration-dependent finding's confidence
    /// when either concentration is undisclosed.
    pub concentration_unknown_penalty: f64,
    /// Fraction removed from a pH-dependent finding's confidence when either
    /// ingredient lacks pH data.
    pub ph_unknown_penalty: f64,
    /// Distinct findings in one tier needed to escalate the overall risk.
    pub escalation_threshold: usize,
    pub default_absorption_wait_minutes: u32,
    /// Slot budget used when the request gives none.
    pub default_slot_budget_minutes: u32,
    /// Confidence reported for an analysis with no findings.
    pub empty_analysis_confidence: Confidence,
    pub heuristics_enabled: bool,
}

impl Default for AnalysisPolicy {
    fn default() -> Self {
        Self {
            concentration_unknown_penalty: 0.15,
            ph_unknown_penalty: 0.10,
            escalation_threshold: 3,
            default_absorption_wait_minutes: 1,
            default_slot_budget_minutes: 60,
            empty_analysis_confidence: Confidence::new(0.8),
            heuristics_enabled: true,
        }
    }
}
