//! HTTP API for the ClinPay payment engine
//!
//! Thin REST surface over the payment processor: the same request and
//! response shapes as the service layer, JSON bodies, money as decimal
//! strings.

#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod models;

pub use config::ApiConfig;
pub use error::ApiError;
