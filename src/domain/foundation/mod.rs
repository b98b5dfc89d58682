//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers, enums, and error types
//! that form the vocabulary of the routine engine.

mod confidence;
mod errors;
mod ids;
mod severity;
mod time_of_day;
mod timestamp;

pub use confidence::Confidence;
pub use errors::{ErrorCode, ValidationError};
pub use ids::{AnalysisId, IngredientId, ProductId};
pub use severity::Severity;
pub use time_of_day::{Slot, TimeOfDay};
pub use timestamp::Timestamp;
