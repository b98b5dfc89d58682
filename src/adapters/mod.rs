//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the engine to external systems:
//! - `catalog` - Catalog readers (YAML documents, PostgreSQL)
//! - `cache` - Analysis caches (in-memory, Redis)
//! - `explainer` - Finding explainers (HTTP service, disabled)

pub mod cache;
pub mod catalog;
pub mod explainer;

pub use cache::{InMemoryAnalysisCache, RedisAnalysisCache};
pub use catalog::{InMemoryCatalog, PostgresCatalogReader};
pub use explainer::{DisabledExplainer, HttpExplainerConfig, HttpFindingExplainer};
