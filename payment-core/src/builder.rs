//! Transaction builder
//!
//! Assembles a pre-scored [`Payment`] from raw form input, enforcing amount
//! bounds and method-specific required fields.

use crate::{
    AmountBreakdown, Currency, Error, Payment, PaymentMethod, PaymentStatus, Result, RiskLevel,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Builder configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuilderConfig {
    /// Smallest accepted amount
    pub min_amount: Decimal,

    /// Largest accepted amount
    pub max_amount: Decimal,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            min_amount: Decimal::new(100, 2),        // 1.00
            max_amount: Decimal::new(5_000_000, 2),  // 50,000.00
        }
    }
}

impl BuilderConfig {
    /// Check internal consistency
    pub fn validate(&self) -> Result<()> {
        if self.min_amount <= Decimal::ZERO || self.min_amount >= self.max_amount {
            return Err(Error::Validation(format!(
                "amount bounds {}..{} are not a valid range",
                self.min_amount, self.max_amount
            )));
        }
        Ok(())
    }
}

/// Raw form input for a new payment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentRequest {
    /// Charge amount before taxes, discounts, and fees
    pub amount: Decimal,

    /// Currency, defaults to USD
    #[serde(default)]
    pub currency: Currency,

    /// Taxes added
    #[serde(default)]
    pub taxes: Decimal,

    /// Discounts subtracted
    #[serde(default)]
    pub discounts: Decimal,

    /// Processing fees added
    #[serde(default)]
    pub fees: Decimal,

    /// Portion covered by insurance
    #[serde(default)]
    pub insurance_covered: Decimal,

    /// Payment method descriptor
    pub method: PaymentMethod,

    /// Whether the payer opted to save the payment method
    #[serde(default)]
    pub save_payment_method: bool,

    /// Terms-of-payment acceptance flag
    pub accepted_terms: bool,

    /// Owning patient, if known
    #[serde(default)]
    pub patient_id: Option<Uuid>,

    /// Client-supplied idempotency key
    #[serde(default)]
    pub idempotency_key: Option<String>,
}

/// Payment builder
pub struct PaymentBuilder {
    config: BuilderConfig,
}

impl PaymentBuilder {
    /// Create a builder with the given bounds
    pub fn new(config: BuilderConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Assemble a payment in `pending` state from form input
    pub fn build(&self, request: &PaymentRequest, now: DateTime<Utc>) -> Result<Payment> {
        if !request.accepted_terms {
            return Err(Error::Validation(
                "payment terms must be accepted".to_string(),
            ));
        }

        if request.amount < self.config.min_amount || request.amount > self.config.max_amount {
            return Err(Error::Validation(format!(
                "amount {} outside allowed range {}..{}",
                request.amount, self.config.min_amount, self.config.max_amount
            )));
        }

        validate_method(&request.method)?;

        let amount = AmountBreakdown::compute(
            request.amount,
            request.taxes,
            request.discounts,
            request.fees,
            request.insurance_covered,
            request.currency,
        )?;

        let id = Uuid::new_v4();
        let refundable_amount = amount.total;

        Ok(Payment {
            id,
            payment_number: payment_number(id, now),
            patient_id: request.patient_id,
            amount,
            method: request.method.clone(),
            save_payment_method: request.save_payment_method,
            gateway: None,
            status: PaymentStatus::Pending,
            fraud_score: 0,
            risk_level: RiskLevel::Low,
            refundable_amount,
            refunds: Vec::new(),
            installment_plan: None,
            idempotency_key: request.idempotency_key.clone(),
            version: 1,
            created_at: now,
            processed_at: None,
        })
    }
}

/// Check method-specific required fields
fn validate_method(method: &PaymentMethod) -> Result<()> {
    match method {
        PaymentMethod::CreditCard { brand, last_four }
        | PaymentMethod::DebitCard { brand, last_four } => {
            if brand.trim().is_empty() {
                return Err(Error::Validation("card brand is required".to_string()));
            }
            if last_four.len() != 4 || !last_four.chars().all(|c| c.is_ascii_digit()) {
                return Err(Error::Validation(format!(
                    "card last four must be 4 digits (got {:?})",
                    last_four
                )));
            }
        }
        PaymentMethod::BankTransfer { bank_code } => {
            if bank_code.trim().is_empty() {
                return Err(Error::Validation("bank code is required".to_string()));
            }
        }
        PaymentMethod::Cash => {}
    }
    Ok(())
}

/// Human-readable payment number, e.g. `PAY-20260315-1A2B3C`
fn payment_number(id: Uuid, now: DateTime<Utc>) -> String {
    let short = id.simple().to_string()[..6].to_uppercase();
    format!("PAY-{}-{}", now.format("%Y%m%d"), short)
}
