//! Payment status lifecycle
//!
//! # Design
//!
//! The status graph:
//!
//! ```text
//! pending ──> processing ──> captured ──> settled | disputed
//!    │             │             │
//!    │             │             └──> partially_refunded ──> refunded
//!    │             │             └──> refunded
//!    └─────────────┴──> failed | cancelled | expired
//! ```
//!
//! Resolution after scoring is synchronous: a fraud score at or above the
//! block threshold fails the payment before any gateway call; a score at or
//! above the review threshold authorizes but parks the payment in
//! `processing` for manual review; anything lower captures directly.

use crate::{Error, Payment, PaymentStatus, Result};
use risk_engine::RiskScore;

impl PaymentStatus {
    /// Check whether `next` is a legal successor of this status
    pub fn can_transition_to(&self, next: PaymentStatus) -> bool {
        use PaymentStatus::*;
        matches!(
            (self, next),
            (Pending, Processing)
                | (Pending, Captured)
                | (Pending, Failed)
                | (Pending, Cancelled)
                | (Pending, Expired)
                | (Processing, Captured)
                | (Processing, Failed)
                | (Processing, Cancelled)
                | (Processing, Expired)
                | (Captured, Settled)
                | (Captured, Disputed)
                | (Captured, Refunded)
                | (Captured, PartiallyRefunded)
                | (Settled, Disputed)
                | (Settled, Refunded)
                | (Settled, PartiallyRefunded)
                | (PartiallyRefunded, PartiallyRefunded)
                | (PartiallyRefunded, Refunded)
        )
    }
}

impl Payment {
    /// Move the payment to `next`, rejecting illegal transitions
    pub fn transition_to(&mut self, next: PaymentStatus) -> Result<()> {
        if !self.status.can_transition_to(next) {
            return Err(Error::InvalidTransition(format!(
                "{} -> {} on payment {}",
                self.status, next, self.payment_number
            )));
        }
        self.status = next;
        Ok(())
    }
}

/// Maps a fraud score to the payment's post-authorization status
#[derive(Debug, Clone, Copy)]
pub struct StatusResolver {
    review_threshold: u8,
    block_threshold: u8,
}

impl StatusResolver {
    /// Create a resolver with explicit thresholds
    pub fn new(review_threshold: u8, block_threshold: u8) -> Self {
        Self {
            review_threshold,
            block_threshold,
        }
    }

    /// Check whether the score blocks the transaction outright
    pub fn is_blocked(&self, score: RiskScore) -> bool {
        score.score() >= self.block_threshold
    }

    /// Resolve the status for a scored payment
    pub fn resolve(&self, score: RiskScore) -> PaymentStatus {
        if self.is_blocked(score) {
            PaymentStatus::Failed
        } else if score.score() >= self.review_threshold {
            PaymentStatus::Processing
        } else {
            PaymentStatus::Captured
        }
    }
}

impl Default for StatusResolver {
    fn default() -> Self {
        Self::new(60, 85)
    }
}
