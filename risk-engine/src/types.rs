//! Core types for risk engine

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Risk score (0-100)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RiskScore(u8);

impl RiskScore {
    /// Create new risk score, clamped to 0-100
    pub fn new(score: u8) -> Self {
        Self(score.min(100))
    }

    /// Get raw score
    pub fn score(&self) -> u8 {
        self.0
    }

    /// Check if high risk (>= 60)
    pub fn is_high_risk(&self) -> bool {
        self.0 >= 60
    }

    /// Check if medium risk (30-59)
    pub fn is_medium_risk(&self) -> bool {
        (30..60).contains(&self.0)
    }

    /// Check if low risk (< 30)
    pub fn is_low_risk(&self) -> bool {
        self.0 < 30
    }
}

impl fmt::Display for RiskScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Risk level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    /// Low risk
    Low,
    /// Medium risk
    Medium,
    /// High risk
    High,
}

impl From<RiskScore> for RiskLevel {
    fn from(score: RiskScore) -> Self {
        if score.is_high_risk() {
            RiskLevel::High
        } else if score.is_medium_risk() {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskLevel::Low => write!(f, "low"),
            RiskLevel::Medium => write!(f, "medium"),
            RiskLevel::High => write!(f, "high"),
        }
    }
}

/// Payment method category, as far as scoring cares about it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethodKind {
    /// Credit card
    CreditCard,
    /// Debit card
    DebitCard,
    /// Bank transfer
    BankTransfer,
    /// Cash at the front desk
    Cash,
}

impl fmt::Display for PaymentMethodKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentMethodKind::CreditCard => write!(f, "credit_card"),
            PaymentMethodKind::DebitCard => write!(f, "debit_card"),
            PaymentMethodKind::BankTransfer => write!(f, "bank_transfer"),
            PaymentMethodKind::Cash => write!(f, "cash"),
        }
    }
}

/// Scoring outcome recommendation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Recommendation {
    /// Proceed with authorization
    Approve,
    /// Authorize but hold for manual review
    Review,
    /// Reject before any gateway call
    Block,
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Recommendation::Approve => write!(f, "approve"),
            Recommendation::Review => write!(f, "review"),
            Recommendation::Block => write!(f, "block"),
        }
    }
}

/// Risk assessment result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskAssessment {
    /// Payment ID, if the transaction already exists
    pub payment_id: Option<Uuid>,

    /// Risk score
    pub risk_score: RiskScore,

    /// Risk level
    pub risk_level: RiskLevel,

    /// Risk factors detected
    pub risk_factors: Vec<String>,

    /// Recommendation
    pub recommendation: Recommendation,

    /// Assessment timestamp
    pub assessed_at: DateTime<Utc>,
}
