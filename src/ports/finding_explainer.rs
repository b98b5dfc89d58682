//! Finding explainer port - Natural-language elaboration of findings.
//!
//! Backed by the external explanation/chat service. Its absence degrades
//! explanation quality only; analysis never depends on it.

use async_trait::async_trait;

use crate::domain::analysis::ConflictFinding;

/// Port for augmenting a finding with supplementary text.
#[async_trait]
pub trait FindingExplainer: Send + Sync {
    /// Supplementary explanation for one finding.
    async fn explain(&self, finding: &ConflictFinding) -> Result<String, ExplainerError>;

    /// False when the explainer should not be called at all.
    fn is_enabled(&self) -> bool {
        true
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ExplainerError {
    #[error("explainer unavailable: {0}")]
    Unavailable(String),

    #[error("explainer returned an invalid response: {0}")]
    InvalidResponse(String),

    #[error("explainer is disabled")]
    Disabled,
}
