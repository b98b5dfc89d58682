//! Analysis engine tunables

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use crate::domain::analysis::AnalysisPolicy;
use crate::domain::foundation::Confidence;

const MAX_SLOT_BUDGET_MINUTES: u32 = 1440;

/// Engine configuration. Converted into an [`AnalysisPolicy`].
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    #[serde(default = "default_concentration_penalty")]
    pub concentration_unknown_penalty: f64,

    #[serde(default = "default_ph_penalty")]
    pub ph_unknown_penalty: f64,

    /// Findings in one tier needed to escalate the overall risk
    #[serde(default = "default_escalation_threshold")]
    pub escalation_threshold: usize,

    #[serde(default = "default_absorption_wait")]
    pub default_absorption_wait_minutes: u32,

    #[serde(default = "default_slot_budget")]
    pub default_slot_budget_minutes: u32,

    #[serde(default = "default_empty_confidence")]
    pub empty_analysis_confidence: f64,

    #[serde(default = "default_true")]
    pub heuristics_enabled: bool,

    /// Bound on one analysis computation
    #[serde(default = "default_request_timeout")]
    pub request_timeout_ms: u64,

    /// How long duplicate requests wait for the in-flight one
    #[serde(default = "default_single_flight_wait")]
    pub single_flight_wait_ms: u64,
}

impl EngineConfig {
    pub fn policy(&self) -> AnalysisPolicy {
        AnalysisPolicy {
            concentration_unknown_penalty: self.concentration_unknown_penalty,
            ph_unknown_penalty: self.ph_unknown_penalty,
            escalation_threshold: self.escalation_threshold,
            default_absorption_wait_minutes: self.default_absorption_wait_minutes,
            default_slot_budget_minutes: self.default_slot_budget_minutes,
            empty_analysis_confidence: Confidence::new(self.empty_analysis_confidence),
            heuristics_enabled: self.heuristics_enabled,
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn single_flight_wait(&self) -> Duration {
        Duration::from_millis(self.single_flight_wait_ms)
    }

    /// Validate engine configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !(0.0..1.0).contains(&self.concentration_unknown_penalty) {
            return Err(ValidationError::InvalidPenalty("concentration_unknown_penalty"));
        }
        if !(0.0..1.0).contains(&self.ph_unknown_penalty) {
            return Err(ValidationError::InvalidPenalty("ph_unknown_penalty"));
        }
        if Confidence::try_new(self.empty_analysis_confidence).is_err() {
            return Err(ValidationError::InvalidConfidence);
        }
        if self.escalation_threshold < 2 {
            return Err(ValidationError::InvalidEscalationThreshold);
        }
        if self.default_slot_budget_minutes == 0 || self.default_slot_budget_minutes > MAX_SLOT_BUDGET_MINUTES {
            return Err(ValidationError::InvalidSlotBudget);
        }
        if self.request_timeout_ms == 0 {
            return Err(ValidationError::InvalidTimeout("request_timeout_ms"));
        }
        if self.single_flight_wait_ms == 0 {
            return Err(ValidationError::InvalidTimeout("single_flight_wait_ms"));
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            concentration_unknown_penalty: default_concentration_penalty(),
            ph_unknown_penalty: default_ph_penalty(),
            escalation_threshold: default_escalation_threshold(),
            default_absorption_wait_minutes: default_absorption_wait(),
            default_slot_budget_minutes: default_slot_budget(),
            empty_analysis_confidence: default_empty_confidence(),
            heuristics_enabled: true,
            request_timeout_ms: default_request_timeout(),
            single_flight_wait_ms: default_single_flight_wait(),
        }
    }
}

fn default_concentration_penalty() -> f64 {
    0.15
}

fn default_ph_penalty() -> f64 {
    0.10
}

fn default_escalation_threshold() -> usize {
    3
}

fn default_absorption_wait() -> u32 {
    1
}

fn default_slot_budget() -> u32 {
    60
}

fn default_empty_confidence() -> f64 {
    0.8
}

fn default_true() -> bool {
    true
}

fn default_request_timeout() -> u64 {
    5000
}

fn default_single_flight_wait() -> u64 {
    3000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_default_policy() {
        let policy = EngineConfig::default().policy();
        let expected = AnalysisPolicy::default();
        assert_eq!(policy.concentration_unknown_penalty, expected.concentration_unknown_penalty);
        assert_eq!(policy.ph_unknown_penalty, expected.ph_unknown_penalty);
        assert_eq!(policy.escalation_threshold, expected.escalation_threshold);
        assert_eq!(policy.default_absorption_wait_minutes, expected.default_absorption_wait_minutes);
        assert_eq!(policy.empty_analysis_confidence, expected.empty_analysis_confidence);
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn timeouts_as_durations() {
        let config = EngineConfig::default();
        assert_eq!(config.request_timeout(), Duration::from_secs(5));
        assert_eq!(config.single_flight_wait(), Duration::from_secs(3));
    }

    #[test]
    fn rejects_full_penalty() {
        let config = EngineConfig {
            ph_unknown_penalty: 1.0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidPenalty("ph_unknown_penalty")));
    }

    #[test]
    fn rejects_threshold_below_two() {
        let config = EngineConfig {
            escalation_threshold: 1,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidEscalationThreshold));
    }

    #[test]
    fn rejects_zero_timeouts_and_budgets() {
        let config = EngineConfig {
            request_timeout_ms: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = EngineConfig {
            default_slot_budget_minutes: 0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidSlotBudget));
    }

    #[test]
    fn rejects_confidence_outside_unit_interval() {
        let config = EngineConfig {
            empty_analysis_confidence: 1.5,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidConfidence));
    }
}
