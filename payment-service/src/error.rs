//! Error types for the payment service
//!
//! The service-level taxonomy the callers see: validation, fraud block,
//! refund rejection, unknown payment, simulated transient failure, and
//! optimistic-lock conflict.

use thiserror::Error;
use uuid::Uuid;

/// Payment service error
#[derive(Debug, Error)]
pub enum Error {
    /// Bad input shape or range
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Fraud score at or above the block threshold; terminal for the attempt
    #[error("Transaction blocked: {0}")]
    FraudBlocked(String),

    /// Business-rule violation on refund
    #[error("Refund rejected: {0}")]
    Refund(String),

    /// Unknown payment id
    #[error("Payment not found: {0}")]
    NotFound(Uuid),

    /// Simulated network/gateway failure; retryable by resubmission
    #[error("Gateway unavailable: {0}")]
    Transient(String),

    /// Optimistic-lock version mismatch
    #[error("Concurrent modification: {0}")]
    Conflict(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl From<payment_core::Error> for Error {
    fn from(err: payment_core::Error) -> Self {
        match err {
            payment_core::Error::Validation(msg) => Error::Validation(msg),
            payment_core::Error::Refund(msg) => Error::Refund(msg),
            payment_core::Error::InvalidTransition(msg) => Error::Validation(msg),
        }
    }
}

impl From<risk_engine::Error> for Error {
    fn from(err: risk_engine::Error) -> Self {
        match err {
            risk_engine::Error::InvalidConfig(msg) => Error::Config(msg),
        }
    }
}

/// Result type
pub type Result<T> = std::result::Result<T, Error>;
