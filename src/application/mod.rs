//! Application layer - Orchestrates domain services and ports.
//!
//! - `ProductDecomposer` - Product ids to ingredient lists via the catalog
//! - `RuleGraphRefresher` - Periodic full-snapshot rule graph rebuilds
//! - `SingleFlight` - Collapses concurrent identical computations
//! - `AnalyzeRoutineHandler` - The analysis request pipeline

pub mod decomposer;
pub mod handlers;
pub mod rule_graph_refresher;
pub mod single_flight;

pub use decomposer::{DecomposeError, Decomposition, ProductDecomposer};
pub use handlers::{AnalysisError, AnalyzeRoutineHandler, AnalyzeRoutineResult, AnalyzeRoutineSettings, ResultSource};
pub use rule_graph_refresher::{RefreshError, RuleGraphRefresher};
pub use single_flight::{Flight, Follower, LeaderGuard, SingleFlight};
