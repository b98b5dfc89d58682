//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `CatalogReader` - Catalog snapshots and product lookups
//! - `AnalysisCache` - Fingerprint-keyed result cache
//! - `FindingExplainer` - Optional explanation augmentation

mod analysis_cache;
mod catalog_reader;
mod finding_explainer;

pub use analysis_cache::{AnalysisCache, CacheError};
pub use catalog_reader::{CatalogError, CatalogReader};
pub use finding_explainer::{ExplainerError, FindingExplainer};
