//! Rule graph module - Indexed conflict rules and sensitivities.

mod errors;
mod graph;
mod handle;

pub use errors::RuleGraphError;
pub use graph::RuleGraph;
pub use handle::RuleGraphHandle;
