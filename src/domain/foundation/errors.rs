//! Error types for the domain layer.

use std::fmt;
use thiserror::Error;

/// Errors that occur during value object construction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Field '{field}' must be between {min} and {max}, got {actual}")]
    OutOfRange {
        field: String,
        min: String,
        max: String,
        actual: String,
    },

    #[error("Field '{field}' has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    #[error("Field '{field}' contains duplicate value {value}")]
    Duplicate { field: String, value: String },
}

impl ValidationError {
    /// Creates an out of range validation error.
    pub fn out_of_range(
        field: impl Into<String>,
        min: impl fmt::Display,
        max: impl fmt::Display,
        actual: impl fmt::Display,
    ) -> Self {
        ValidationError::OutOfRange {
            field: field.into(),
            min: min.to_string(),
            max: max.to_string(),
            actual: actual.to_string(),
        }
    }

    /// Creates an invalid format validation error.
    pub fn invalid_format(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::InvalidFormat {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Creates a duplicate value validation error.
    pub fn duplicate(field: impl Into<String>, value: impl fmt::Display) -> Self {
        ValidationError::Duplicate {
            field: field.into(),
            value: value.to_string(),
        }
    }
}

/// Error codes organized by category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Validation errors
    ValidationFailed,

    // Not found errors
    ProductNotFound,
    IngredientNotFound,

    // Data quality
    IncompleteData,

    // Availability
    RuleGraphUnavailable,
    RuleGraphStale,
    Timeout,

    // Infrastructure errors
    CatalogError,
    CacheUnavailable,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCode::ValidationFailed => "VALIDATION_FAILED",
            ErrorCode::ProductNotFound => "PRODUCT_NOT_FOUND",
            ErrorCode::IngredientNotFound => "INGREDIENT_NOT_FOUND",
            ErrorCode::IncompleteData => "INCOMPLETE_DATA",
            ErrorCode::RuleGraphUnavailable => "RULE_GRAPH_UNAVAILABLE",
            ErrorCode::RuleGraphStale => "RULE_GRAPH_STALE",
            ErrorCode::Timeout => "TIMEOUT",
            ErrorCode::CatalogError => "CATALOG_ERROR",
            ErrorCode::CacheUnavailable => "CACHE_UNAVAILABLE",
        };
        write!(f, "{}", s)
    }
}
