//! Core types for the payment domain
//!
//! All money is exact decimal arithmetic (`rust_decimal::Decimal`); no
//! floats touch an amount.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

pub use risk_engine::PaymentMethodKind;

/// Risk level of a payment, derived from its fraud score
pub type RiskLevel = risk_engine::RiskLevel;

/// ISO 4217 currency code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
pub enum Currency {
    /// US Dollar
    USD,
    /// Euro
    EUR,
    /// British Pound
    GBP,
}

impl Currency {
    /// ISO 4217 code
    pub fn code(&self) -> &'static str {
        match self {
            Currency::USD => "USD",
            Currency::EUR => "EUR",
            Currency::GBP => "GBP",
        }
    }

    /// Parse from string
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "USD" => Some(Currency::USD),
            "EUR" => Some(Currency::EUR),
            "GBP" => Some(Currency::GBP),
            _ => None,
        }
    }
}

impl Default for Currency {
    fn default() -> Self {
        Currency::USD
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Amount breakdown of a payment
///
/// Invariants: `total = subtotal + taxes - discounts + fees` and
/// `patient_responsibility = total - insurance_covered >= 0`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmountBreakdown {
    /// Charges before adjustments
    pub subtotal: Decimal,

    /// Taxes added
    pub taxes: Decimal,

    /// Discounts subtracted
    pub discounts: Decimal,

    /// Processing fees added
    pub fees: Decimal,

    /// Total charged
    pub total: Decimal,

    /// Portion covered by insurance
    pub insurance_covered: Decimal,

    /// Portion owed by the patient
    pub patient_responsibility: Decimal,

    /// Currency
    pub currency: Currency,
}

impl AmountBreakdown {
    /// Compute a breakdown from its components, enforcing the invariants
    pub fn compute(
        subtotal: Decimal,
        taxes: Decimal,
        discounts: Decimal,
        fees: Decimal,
        insurance_covered: Decimal,
        currency: Currency,
    ) -> crate::Result<Self> {
        for (name, value) in [
            ("subtotal", subtotal),
            ("taxes", taxes),
            ("discounts", discounts),
            ("fees", fees),
            ("insurance_covered", insurance_covered),
        ] {
            if value < Decimal::ZERO {
                return Err(crate::Error::Validation(format!(
                    "{} must not be negative (got {})",
                    name, value
                )));
            }
        }

        let total = subtotal + taxes - discounts + fees;
        if total < Decimal::ZERO {
            return Err(crate::Error::Validation(format!(
                "discounts {} exceed charges (total {})",
                discounts, total
            )));
        }

        let patient_responsibility = total - insurance_covered;
        if patient_responsibility < Decimal::ZERO {
            return Err(crate::Error::Validation(format!(
                "insurance covered {} exceeds total {}",
                insurance_covered, total
            )));
        }

        Ok(Self {
            subtotal,
            taxes,
            discounts,
            fees,
            total,
            insurance_covered,
            patient_responsibility,
            currency,
        })
    }
}

/// Payment method descriptor with masked details
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Credit card
    CreditCard {
        /// Card brand (visa, mastercard, ...)
        brand: String,
        /// Last four digits of the card number
        last_four: String,
    },
    /// Debit card
    DebitCard {
        /// Card brand
        brand: String,
        /// Last four digits of the card number
        last_four: String,
    },
    /// Bank transfer
    BankTransfer {
        /// Routing/bank code
        bank_code: String,
    },
    /// Cash at the front desk
    Cash,
}

impl PaymentMethod {
    /// Method category for risk scoring
    pub fn kind(&self) -> PaymentMethodKind {
        match self {
            PaymentMethod::CreditCard { .. } => PaymentMethodKind::CreditCard,
            PaymentMethod::DebitCard { .. } => PaymentMethodKind::DebitCard,
            PaymentMethod::BankTransfer { .. } => PaymentMethodKind::BankTransfer,
            PaymentMethod::Cash => PaymentMethodKind::Cash,
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentMethod::CreditCard { last_four, .. } => {
                write!(f, "credit_card ****{}", last_four)
            }
            PaymentMethod::DebitCard { last_four, .. } => write!(f, "debit_card ****{}", last_four),
            PaymentMethod::BankTransfer { bank_code } => write!(f, "bank_transfer {}", bank_code),
            PaymentMethod::Cash => write!(f, "cash"),
        }
    }
}

/// Gateway metadata attached after authorization
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayDetails {
    /// Gateway provider name
    pub provider: String,

    /// Gateway transaction reference
    pub transaction_id: String,

    /// Authorization code
    pub authorization_code: String,
}

/// Payment status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// Created, not yet scored
    Pending,
    /// Authorized, held for manual review
    Processing,
    /// Successfully charged
    Captured,
    /// Rejected or gateway failure
    Failed,
    /// Funds cleared to the clinic account
    Settled,
    /// Charge contested by the payer
    Disputed,
    /// Fully refunded
    Refunded,
    /// Partially refunded, remainder still refundable
    PartiallyRefunded,
    /// Cancelled before capture
    Cancelled,
    /// Expired before capture
    Expired,
}

impl PaymentStatus {
    /// Check whether refunds are accepted in this status
    pub fn is_refundable(&self) -> bool {
        matches!(
            self,
            PaymentStatus::Captured | PaymentStatus::Settled | PaymentStatus::PartiallyRefunded
        )
    }

    /// Check whether this status has no outgoing transitions
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            PaymentStatus::Failed
                | PaymentStatus::Disputed
                | PaymentStatus::Refunded
                | PaymentStatus::Cancelled
                | PaymentStatus::Expired
        )
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Processing => "processing",
            PaymentStatus::Captured => "captured",
            PaymentStatus::Failed => "failed",
            PaymentStatus::Settled => "settled",
            PaymentStatus::Disputed => "disputed",
            PaymentStatus::Refunded => "refunded",
            PaymentStatus::PartiallyRefunded => "partially_refunded",
            PaymentStatus::Cancelled => "cancelled",
            PaymentStatus::Expired => "expired",
        };
        write!(f, "{}", s)
    }
}

/// Refund reason
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefundReason {
    /// Patient asked for their money back
    CustomerRequest,
    /// Same charge was submitted twice
    DuplicateCharge,
    /// Treatment was cancelled
    TreatmentCancelled,
    /// Billing mistake
    BillingError,
    /// Anything else
    Other,
}

/// Refund type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RefundType {
    /// Refund of the entire remaining refundable amount
    Full,
    /// Refund of part of the remaining refundable amount
    Partial,
}

/// Refund status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RefundStatus {
    /// Accepted, not yet sent to the gateway
    Pending,
    /// Processed by the gateway
    Completed,
    /// Rejected by the gateway
    Failed,
}

/// Refund record appended to a payment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Refund {
    /// Refund ID
    pub id: Uuid,

    /// Payment this refund belongs to
    pub payment_id: Uuid,

    /// Amount returned to the payer, gross of the refund fee
    pub amount: Decimal,

    /// Flat refund fee withheld
    pub fee: Decimal,

    /// Amount net of the fee
    pub net_amount: Decimal,

    /// Reason code
    pub reason: RefundReason,

    /// Full or partial
    pub refund_type: RefundType,

    /// Refund status
    pub status: RefundStatus,

    /// Gateway refund transaction reference
    pub transaction_id: Option<String>,

    /// Requested timestamp
    pub requested_at: DateTime<Utc>,

    /// Processed timestamp
    pub processed_at: Option<DateTime<Utc>>,
}

/// Status of a single installment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstallmentStatus {
    /// Not yet due
    Scheduled,
    /// Paid
    Paid,
    /// Past due
    Overdue,
}

/// One scheduled installment payment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstallmentPayment {
    /// 1-based position in the schedule
    pub sequence: u32,

    /// Due date
    pub due_date: DateTime<Utc>,

    /// Amount due
    pub amount: Decimal,

    /// Principal portion
    pub principal: Decimal,

    /// Interest portion
    pub interest: Decimal,

    /// Installment status
    pub status: InstallmentStatus,
}

/// Installment plan amortizing a total into monthly payments
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstallmentPlan {
    /// Plan ID
    pub id: Uuid,

    /// Payment this plan is attached to, if any
    pub payment_id: Option<Uuid>,

    /// Total amount amortized
    pub total_amount: Decimal,

    /// Number of monthly payments
    pub number_of_payments: u32,

    /// Annual interest rate as a fraction (0.12 = 12% APR)
    pub annual_interest_rate: Decimal,

    /// Regular monthly payment amount
    pub monthly_payment: Decimal,

    /// Generated schedule
    pub payments: Vec<InstallmentPayment>,

    /// Created timestamp
    pub created_at: DateTime<Utc>,
}

/// A clinic payment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    /// Payment ID
    pub id: Uuid,

    /// Human-readable payment number
    pub payment_number: String,

    /// Owning patient, if known
    pub patient_id: Option<Uuid>,

    /// Amount breakdown
    pub amount: AmountBreakdown,

    /// Payment method descriptor
    pub method: PaymentMethod,

    /// Whether the payer opted to save the payment method
    pub save_payment_method: bool,

    /// Gateway metadata, present once authorized
    pub gateway: Option<GatewayDetails>,

    /// Payment status
    pub status: PaymentStatus,

    /// Fraud score (0-100)
    pub fraud_score: u8,

    /// Risk level derived from the fraud score
    pub risk_level: RiskLevel,

    /// Portion of the total not yet returned via refunds
    pub refundable_amount: Decimal,

    /// Refund records, in request order
    pub refunds: Vec<Refund>,

    /// Attached installment plan, if any
    pub installment_plan: Option<InstallmentPlan>,

    /// Client-supplied idempotency key
    pub idempotency_key: Option<String>,

    /// Optimistic-locking version, bumped on every update
    pub version: u64,

    /// Created timestamp
    pub created_at: DateTime<Utc>,

    /// Processed (captured) timestamp
    pub processed_at: Option<DateTime<Utc>>,
}

impl Payment {
    /// Total amount returned across completed refunds
    pub fn refunded_total(&self) -> Decimal {
        self.refunds
            .iter()
            .filter(|r| r.status == RefundStatus::Completed)
            .map(|r| r.amount)
            .sum()
    }
}
