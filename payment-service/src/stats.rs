//! Aggregate payment statistics
//!
//! Derived, read-only view over the stored payments. Computing it twice
//! over the same payments yields identical values.

use payment_core::{Payment, PaymentStatus};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Aggregate counters and totals over all payments
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateStats {
    /// Total payments recorded
    pub total_payments: usize,

    /// Captured payments
    pub captured: usize,

    /// Payments held for manual review
    pub processing: usize,

    /// Failed payments (including fraud blocks)
    pub failed: usize,

    /// Settled payments
    pub settled: usize,

    /// Fully refunded payments
    pub refunded: usize,

    /// Partially refunded payments
    pub partially_refunded: usize,

    /// Cancelled payments
    pub cancelled: usize,

    /// Sum of totals across successfully charged payments
    pub total_collected: Decimal,

    /// Sum of completed refund amounts
    pub total_refunded: Decimal,

    /// Mean fraud score across all payments
    pub average_fraud_score: f64,

    /// Fraction of payments that were successfully charged
    pub capture_rate: f64,

    /// Fraction of charged payments with at least one refund
    pub refund_rate: f64,
}

impl AggregateStats {
    /// Compute statistics from a snapshot of payments
    pub fn from_payments(payments: &[Payment]) -> Self {
        let mut stats = AggregateStats {
            total_payments: payments.len(),
            captured: 0,
            processing: 0,
            failed: 0,
            settled: 0,
            refunded: 0,
            partially_refunded: 0,
            cancelled: 0,
            total_collected: Decimal::ZERO,
            total_refunded: Decimal::ZERO,
            average_fraud_score: 0.0,
            capture_rate: 0.0,
            refund_rate: 0.0,
        };

        let mut charged = 0usize;
        let mut with_refunds = 0usize;
        let mut score_sum = 0u64;

        for payment in payments {
            score_sum += u64::from(payment.fraud_score);

            match payment.status {
                PaymentStatus::Captured => stats.captured += 1,
                PaymentStatus::Processing => stats.processing += 1,
                PaymentStatus::Failed => stats.failed += 1,
                PaymentStatus::Settled => stats.settled += 1,
                PaymentStatus::Refunded => stats.refunded += 1,
                PaymentStatus::PartiallyRefunded => stats.partially_refunded += 1,
                PaymentStatus::Cancelled => stats.cancelled += 1,
                PaymentStatus::Pending | PaymentStatus::Disputed | PaymentStatus::Expired => {}
            }

            if matches!(
                payment.status,
                PaymentStatus::Captured
                    | PaymentStatus::Settled
                    | PaymentStatus::Disputed
                    | PaymentStatus::Refunded
                    | PaymentStatus::PartiallyRefunded
            ) {
                charged += 1;
                stats.total_collected += payment.amount.total;
                if !payment.refunds.is_empty() {
                    with_refunds += 1;
                }
            }

            stats.total_refunded += payment.refunded_total();
        }

        if !payments.is_empty() {
            stats.average_fraud_score = score_sum as f64 / payments.len() as f64;
            stats.capture_rate = charged as f64 / payments.len() as f64;
        }
        if charged > 0 {
            stats.refund_rate = with_refunds as f64 / charged as f64;
        }

        stats
    }
}
