//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (value objects, IDs, enums, errors)
//! - `catalog` - Read-only ingredient, product, rule and sensitivity data
//! - `profile` - The user's validated skin profile
//! - `rule_graph` - Immutable rule index and its atomically swapped handle
//! - `analysis` - Conflict detection, risk aggregation, scheduling and advice

pub mod analysis;
pub mod catalog;
pub mod foundation;
pub mod profile;
pub mod rule_graph;
