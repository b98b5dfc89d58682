//! Analysis Module - Pure domain services for routine analysis.
//!
//! # Components
//!
//! - `ConflictEngine` - Pairwise rule matching, sensitivities, allergens, heuristics
//! - `RiskAggregator` - Overall severity and confidence (worst case, with escalation)
//! - `RoutineScheduler` - Morning/evening step ordering with waits and slot conflicts
//! - `Advisor` - Recommendations derived from findings and schedule
//! - `RoutineAnalyzer` - Runs the stages above against one rule graph snapshot
//!
//! All services are stateless and perform no I/O. Resolving products and
//! caching results belong to the application layer.

mod advisor;
mod analyzer;
mod conflict_engine;
mod decomposed;
mod finding;
mod policy;
mod request;
mod result;
mod risk_aggregator;
mod scheduler;

#[cfg(test)]
pub(crate) mod test_support;

pub use advisor::{Advisor, ResultsMilestone, NO_MAJOR_CONFLICTS};
pub use analyzer::RoutineAnalyzer;
pub use conflict_engine::{ConflictEngine, Detection};
pub use decomposed::DecomposedProduct;
pub use finding::{ConflictFinding, FindingCaveat, FindingKind, FindingSubject, HeuristicKind, SafeCombination, SkinWarning};
pub use policy::AnalysisPolicy;
pub use request::{Fingerprint, RequestedProduct, RoutineRequest, SlotBudgets};
pub use result::{AnalysisCaveat, AnalysisResult};
pub use risk_aggregator::{RiskAggregator, RiskAssessment};
pub use scheduler::{Frequency, Relocation, RoutineScheduler, RoutineStep, Schedule, SlotSchedule, UnresolvedConflict};
