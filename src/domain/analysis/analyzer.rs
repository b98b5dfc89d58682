//! Runs the pure analysis stages over already decomposed products.

use super::{
    Advisor, AnalysisCaveat, AnalysisPolicy, AnalysisResult, ConflictEngine, DecomposedProduct, Fingerprint,
    RiskAggregator, RoutineRequest, RoutineScheduler,
};
use crate::domain::foundation::{AnalysisId, Timestamp};
use crate::domain::rule_graph::RuleGraph;

/// Conflict detection, risk aggregation, scheduling and advice against one
/// rule graph snapshot.
pub struct RoutineAnalyzer<'a> {
    graph: &'a RuleGraph,
    policy: &'a AnalysisPolicy,
}

impl<'a> RoutineAnalyzer<'a> {
    pub fn new(graph: &'a RuleGraph, policy: &'a AnalysisPolicy) -> Self {
        Self { graph, policy }
    }

    pub fn analyze(
        &self,
        request: &RoutineRequest,
        fingerprint: Fingerprint,
        products: &[DecomposedProduct],
        caveats: Vec<AnalysisCaveat>,
    ) -> AnalysisResult {
        let detection = ConflictEngine::new(self.graph, self.policy).detect(products, &request.profile);
        let risk = RiskAggregator::from_policy(self.policy).aggregate(&detection.findings);
        let schedule = RoutineScheduler::new(self.policy).schedule(
            products,
            &detection.findings,
            &request.time_budget,
            request.profile.sensitivity_tier,
        );
        let recommendations = Advisor::recommendations(&detection.findings, &schedule, products, &request.profile);
        let results_timeline = Advisor::timeline(products, self.graph);

        AnalysisResult {
            id: AnalysisId::new(),
            fingerprint,
            overall_risk: risk.overall,
            confidence: risk.confidence,
            escalated: risk.escalated,
            findings: detection.findings,
            morning: schedule.morning,
            evening: schedule.evening,
            unresolved_conflicts: schedule.unresolved,
            relocations: schedule.relocations,
            skin_warnings: detection.skin_warnings,
            safe_combinations: detection.safe_combinations,
            recommendations,
            results_timeline,
            caveats,
            rule_graph_version: self.graph.version().to_string(),
            computed_at: Timestamp::now(),
        }
    }
}
