use serde::{Deserialize, Serialize};

use super::{
    ConflictFinding, Fingerprint, Relocation, ResultsMilestone, SafeCombination, SkinWarning, SlotSchedule,
    UnresolvedConflict,
};
use crate::domain::foundation::{AnalysisId, Confidence, IngredientId, ProductId, Severity, Timestamp};

/// Data-quality note attached to a result instead of failing the request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AnalysisCaveat {
    /// The product has no resolvable ingredients and contributes no findings.
    IncompleteProductData { product_id: ProductId },
    /// Ingredient entries the rule graph does not know were skipped.
    SkippedIngredients {
        product_id: ProductId,
        ingredient_ids: Vec<IngredientId>,
    },
}

/// Complete outcome of one routine analysis. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub id: AnalysisId,
    pub fingerprint: Fingerprint,
    pub overall_risk: Severity,
    pub confidence: Confidence,
    pub escalated: bool,
    pub findings: Vec<ConflictFinding>,
    pub morning: SlotSchedule,
    pub evening: SlotSchedule,
    pub unresolved_conflicts: Vec<UnresolvedConflict>,
    pub relocations: Vec<Relocation>,
    pub skin_warnings: Vec<SkinWarning>,
    #[serde(default)]
    pub safe_combinations: Vec<SafeCombination>,
    pub recommendations: Vec<String>,
    #[serde(default)]
    pub results_timeline: Vec<ResultsMilestone>,
    pub caveats: Vec<AnalysisCaveat>,
    /// Version of the rule graph the result was computed against.
    pub rule_graph_version: String,
    pub computed_at: Timestamp,
}

impl AnalysisResult {
    /// True when no finding and no scheduling conflict was produced.
    pub fn is_clean(&self) -> bool {
        self.findings.is_empty() && self.unresolved_conflicts.is_empty()
    }

    pub fn requires_override(&self) -> bool {
        !self.unresolved_conflicts.is_empty()
    }
}
