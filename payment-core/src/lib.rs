//! Payment core for ClinPay
//!
//! Domain model and business rules for clinic payment processing:
//! transaction building, the payment status lifecycle, refunds, and
//! installment plans.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod builder;
pub mod clock;
pub mod error;
pub mod installment;
pub mod refund;
pub mod status;
pub mod types;

pub use builder::{BuilderConfig, PaymentBuilder, PaymentRequest};
pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{Error, Result};
pub use installment::{InstallmentPlanner, PlanRequest, PlannerConfig};
pub use refund::{RefundCalculator, RefundConfig, RefundRequest};
pub use status::StatusResolver;
pub use types::*;
