//! Finding explainer adapters.

mod disabled;
mod http;

pub use disabled::DisabledExplainer;
pub use http::{HttpExplainerConfig, HttpFindingExplainer};
