//! Explainer used when no explanation service is configured.

use async_trait::async_trait;

use crate::domain::analysis::ConflictFinding;
use crate::ports::{ExplainerError, FindingExplainer};

/// Never called by the pipeline; `explain` fails if invoked directly.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledExplainer;

#[async_trait]
impl FindingExplainer for DisabledExplainer {
    async fn explain(&self, _finding: &ConflictFinding) -> Result<String, ExplainerError> {
        Err(ExplainerError::Disabled)
    }

    fn is_enabled(&self) -> bool {
        false
    }
}
