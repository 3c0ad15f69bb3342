//! Risk Engine for ClinPay
//!
//! Fraud scoring for clinic payment transactions

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod random;
pub mod scoring;
pub mod types;

pub use error::{Error, Result};
pub use random::{RandomSource, ThreadRngSource};
pub use scoring::{RiskScorer, ScoringConfig, TransactionContext};
pub use types::*;
