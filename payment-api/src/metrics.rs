//! Prometheus metrics for the payment API

use lazy_static::lazy_static;
use prometheus::{register_counter_vec, CounterVec};
use std::time::Instant;

lazy_static! {
    /// Payment processing attempts by outcome
    pub static ref PAYMENTS_TOTAL: CounterVec = register_counter_vec!(
        "clinpay_payments_total",
        "Payment processing attempts by outcome",
        &["outcome"]
    )
    .unwrap();

    /// Refund attempts by outcome
    pub static ref REFUNDS_TOTAL: CounterVec = register_counter_vec!(
        "clinpay_refunds_total",
        "Refund attempts by outcome",
        &["outcome"]
    )
    .unwrap();

    /// Process start, for the health uptime field
    pub static ref STARTED_AT: Instant = Instant::now();
}
