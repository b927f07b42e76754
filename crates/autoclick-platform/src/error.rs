//! Common error types for autoclick-platform.

use thiserror::Error;

/// Platform-level errors.
#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("input backend unavailable: {0}")]
    Unavailable(String),
    #[error("injection failed: {0}")]
    InjectionFailed(String),
}

/// Result type for platform operations.
pub type PlatformResult<T> = Result<T, PlatformError>;
