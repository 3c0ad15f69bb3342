//! Risk scoring engine
//!
//! Assigns a pseudo-random fraud score to a transaction context and
//! classifies it. The stochastic part comes entirely from the injected
//! [`RandomSource`], so tests can pin the score.

use crate::{
    Error, PaymentMethodKind, RandomSource, Recommendation, Result, RiskAssessment, RiskLevel,
    RiskScore,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// Scoring configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Exclusive upper bound of the uniform base score
    pub base_score_cap: u8,

    /// Amount above which the high-value penalty applies
    pub high_value_threshold: Decimal,

    /// Penalty for amounts above the high-value threshold
    pub high_value_penalty: u8,

    /// Penalty for credit card payments without a saved payment method
    pub unsaved_card_penalty: u8,

    /// Score at or above which a transaction goes to manual review
    pub review_threshold: u8,

    /// Score at or above which a transaction is blocked outright
    pub block_threshold: u8,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            base_score_cap: 30,
            high_value_threshold: Decimal::from(1_000),
            high_value_penalty: 20,
            unsaved_card_penalty: 10,
            review_threshold: 60,
            block_threshold: 85,
        }
    }
}

impl ScoringConfig {
    /// Check internal consistency
    pub fn validate(&self) -> Result<()> {
        if self.base_score_cap == 0 || self.base_score_cap > 100 {
            return Err(Error::InvalidConfig(format!(
                "base_score_cap {} outside 1-100",
                self.base_score_cap
            )));
        }
        if self.review_threshold >= self.block_threshold {
            return Err(Error::InvalidConfig(format!(
                "review_threshold {} must be below block_threshold {}",
                self.review_threshold, self.block_threshold
            )));
        }
        if self.block_threshold > 100 {
            return Err(Error::InvalidConfig(format!(
                "block_threshold {} outside 0-100",
                self.block_threshold
            )));
        }
        Ok(())
    }
}

/// Transaction facts the scorer looks at
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionContext {
    /// Payment ID, if the transaction already exists
    pub payment_id: Option<Uuid>,

    /// Transaction amount
    pub amount: Decimal,

    /// Payment method category
    pub method: PaymentMethodKind,

    /// Whether the payer opted to save the payment method
    pub save_payment_method: bool,
}

/// Risk scorer
pub struct RiskScorer {
    config: ScoringConfig,
    random: Arc<dyn RandomSource>,
}

impl RiskScorer {
    /// Create new risk scorer
    pub fn new(config: ScoringConfig, random: Arc<dyn RandomSource>) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, random })
    }

    /// Assess transaction risk
    pub fn assess(&self, ctx: &TransactionContext) -> RiskAssessment {
        let mut risk_factors = Vec::new();

        let base = (self.random.next_f64() * f64::from(self.config.base_score_cap)) as u8;
        let mut score = base;

        if ctx.amount > self.config.high_value_threshold {
            score = score.saturating_add(self.config.high_value_penalty);
            risk_factors.push("High value transaction".to_string());
        }

        if ctx.method == PaymentMethodKind::CreditCard && !ctx.save_payment_method {
            score = score.saturating_add(self.config.unsaved_card_penalty);
            risk_factors.push("One-off credit card".to_string());
        }

        let risk_score = RiskScore::new(score);
        let risk_level = RiskLevel::from(risk_score);
        let recommendation = self.recommend(risk_score);

        if recommendation == Recommendation::Block {
            tracing::warn!(
                "Transaction blocked by risk scoring: score {} ({} factors)",
                risk_score,
                risk_factors.len()
            );
        }

        RiskAssessment {
            payment_id: ctx.payment_id,
            risk_score,
            risk_level,
            risk_factors,
            recommendation,
            assessed_at: chrono::Utc::now(),
        }
    }

    /// Map a score to a recommendation
    pub fn recommend(&self, score: RiskScore) -> Recommendation {
        if score.score() >= self.config.block_threshold {
            Recommendation::Block
        } else if score.score() >= self.config.review_threshold {
            Recommendation::Review
        } else {
            Recommendation::Approve
        }
    }

    /// Scoring configuration in effect
    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }
}
