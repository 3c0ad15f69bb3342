//! Refund calculator
//!
//! Computes refund amounts net of the flat refund fee and applies accepted
//! refunds to the payment. The refundable amount starts at the payment
//! total and decreases by the gross refund amount (not the net), so the fee
//! is withheld from the payer rather than from the refundable pool.

use crate::{
    Error, Payment, PaymentStatus, Refund, RefundReason, RefundStatus, RefundType, Result,
};
use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Refund configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefundConfig {
    /// Flat fee rate withheld from every refund
    pub fee_rate: Decimal,
}

impl Default for RefundConfig {
    fn default() -> Self {
        Self {
            fee_rate: Decimal::new(2, 2), // 2%
        }
    }
}

impl RefundConfig {
    /// Check internal consistency
    pub fn validate(&self) -> Result<()> {
        if self.fee_rate < Decimal::ZERO || self.fee_rate >= Decimal::ONE {
            return Err(Error::Validation(format!(
                "refund fee rate {} outside [0, 1)",
                self.fee_rate
            )));
        }
        Ok(())
    }
}

/// Refund request input
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefundRequest {
    /// Amount to return, gross of the fee
    pub amount: Decimal,

    /// Reason code
    pub reason: RefundReason,
}

/// Refund calculator
pub struct RefundCalculator {
    config: RefundConfig,
}

impl RefundCalculator {
    /// Create a calculator with the given fee rate
    pub fn new(config: RefundConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Evaluate a refund request against the payment's current state
    ///
    /// Produces a `pending` refund record; nothing on the payment changes
    /// until [`apply`](Self::apply).
    pub fn evaluate(
        &self,
        payment: &Payment,
        request: &RefundRequest,
        now: DateTime<Utc>,
    ) -> Result<Refund> {
        if !payment.status.is_refundable() {
            return Err(Error::Refund(format!(
                "payment {} in status {} cannot be refunded",
                payment.payment_number, payment.status
            )));
        }

        if request.amount <= Decimal::ZERO {
            return Err(Error::Refund(format!(
                "refund amount must be positive (got {})",
                request.amount
            )));
        }

        if request.amount > payment.refundable_amount {
            return Err(Error::Refund(format!(
                "refund amount {} exceeds refundable amount {}",
                request.amount, payment.refundable_amount
            )));
        }

        let fee = round_cents(request.amount * self.config.fee_rate);
        let refund_type = if request.amount == payment.refundable_amount {
            RefundType::Full
        } else {
            RefundType::Partial
        };

        Ok(Refund {
            id: Uuid::new_v4(),
            payment_id: payment.id,
            amount: request.amount,
            fee,
            net_amount: request.amount - fee,
            reason: request.reason,
            refund_type,
            status: RefundStatus::Pending,
            transaction_id: None,
            requested_at: now,
            processed_at: None,
        })
    }

    /// Apply a processed refund to the payment
    ///
    /// Appends the record, decrements the refundable amount by the gross
    /// refund amount, and moves the payment to `refunded` or
    /// `partially_refunded`.
    pub fn apply(
        &self,
        payment: &mut Payment,
        mut refund: Refund,
        transaction_id: String,
        now: DateTime<Utc>,
    ) -> Result<Refund> {
        if refund.amount > payment.refundable_amount {
            return Err(Error::Refund(format!(
                "refund amount {} exceeds refundable amount {}",
                refund.amount, payment.refundable_amount
            )));
        }

        let next = match refund.refund_type {
            RefundType::Full => PaymentStatus::Refunded,
            RefundType::Partial => PaymentStatus::PartiallyRefunded,
        };
        payment.transition_to(next)?;

        refund.status = RefundStatus::Completed;
        refund.transaction_id = Some(transaction_id);
        refund.processed_at = Some(now);

        payment.refundable_amount -= refund.amount;
        payment.refunds.push(refund.clone());

        Ok(refund)
    }
}

fn round_cents(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}
