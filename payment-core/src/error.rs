//! Error types for the payment core

use thiserror::Error;

/// Payment core error
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid input shape or range
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Business-rule violation on refund
    #[error("Refund rejected: {0}")]
    Refund(String),

    /// Disallowed status transition
    #[error("Invalid status transition: {0}")]
    InvalidTransition(String),
}

/// Result type
pub type Result<T> = std::result::Result<T, Error>;
