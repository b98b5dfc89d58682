//! Catalog adapters - Implementations of the CatalogReader port.
//!
//! - `InMemoryCatalog` - YAML documents, development and tests
//! - `PostgresCatalogReader` - Curated catalog tables

mod in_memory;
mod postgres;

pub use in_memory::InMemoryCatalog;
pub use postgres::PostgresCatalogReader;
