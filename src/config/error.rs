//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Penalty {0} must be within [0, 1)")]
    InvalidPenalty(&'static str),

    #[error("Empty analysis confidence must be within [0, 1]")]
    InvalidConfidence,

    #[error("Escalation threshold must be at least 2")]
    InvalidEscalationThreshold,

    #[error("Slot budget must be between 1 and 1440 minutes")]
    InvalidSlotBudget,

    #[error("Invalid timeout: {0}")]
    InvalidTimeout(&'static str),

    #[error("Invalid interval: {0}")]
    InvalidInterval(&'static str),

    #[error("Invalid database URL format")]
    InvalidDatabaseUrl,

    #[error("Invalid Redis URL format")]
    InvalidRedisUrl,

    #[error("Pool size must be between 1 and 100")]
    InvalidPoolSize,

    #[error("Explainer base URL must use http or https")]
    InvalidExplainerUrl,
}
