//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),

    #[error("Tier catalog could not be loaded: {0}")]
    TierCatalog(String),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid port number")]
    InvalidPort,

    #[error("Invalid request timeout")]
    InvalidTimeout,

    #[error("Invalid socket address: {0}")]
    InvalidSocketAddr(String),

    #[error("Invalid database URL format")]
    InvalidDatabaseUrl,

    #[error("Pool min_connections exceeds max_connections")]
    InvalidPoolSize,

    #[error("Pool size exceeds maximum allowed (100)")]
    PoolSizeTooLarge,

    #[error("Commission rate {field} must be at most 10000 basis points, got {actual}")]
    InvalidCommissionRate { field: &'static str, actual: u32 },

    #[error("Usage alert threshold must be between 1 and 100 percent, got {0}")]
    InvalidAlertThreshold(u8),

    #[error("Live class participant bounds are invalid: min {min}, max {max}")]
    InvalidParticipantBounds { min: u32, max: u32 },

    #[error("Live class time bounds must be positive")]
    InvalidLiveClassDuration,

    #[error("Quota reset day must be between 1 and 28, got {0}")]
    InvalidResetDay(u32),

    #[error("Fallback period must be at least one day")]
    InvalidFallbackPeriod,
}
