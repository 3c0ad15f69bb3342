//! Payment service for ClinPay
//!
//! Orchestrates the payment core behind trait seams for persistence and
//! gateway access, so the in-memory repository and the mock gateway can be
//! swapped for real ones without touching calling code.

#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod gateway;
pub mod processor;
pub mod repository;
pub mod stats;

pub use config::ServiceConfig;
pub use error::{Error, Result};
pub use gateway::{GatewayConfig, MockGateway, PaymentGateway};
pub use processor::{PaymentProcessor, RefundOutcome};
pub use repository::{InMemoryPaymentRepository, PaymentRepository};
pub use stats::AggregateStats;
