//! Payment processor
//!
//! Orchestrates the full payment lifecycle: build from form input, score,
//! block or authorize, resolve the status, persist; plus the refund
//! pipeline, installment plans, statistics, and standalone fraud checks.
//!
//! Resolution is synchronous: a blocked payment never reaches the gateway,
//! and an authorized one lands in `captured` or `processing` before the
//! call returns.

use crate::{
    gateway::PaymentGateway, repository::PaymentRepository, stats::AggregateStats, Error, Result,
    ServiceConfig,
};
use payment_core::{
    Clock, InstallmentPlan, InstallmentPlanner, Payment, PaymentBuilder, PaymentRequest,
    PaymentStatus, PlanRequest, Refund, RefundCalculator, RefundRequest, StatusResolver,
};
use risk_engine::{RandomSource, RiskAssessment, RiskScorer, TransactionContext};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

/// Result of a successful refund
#[derive(Debug, Clone, Serialize)]
pub struct RefundOutcome {
    /// The payment after the refund was applied
    pub payment: Payment,

    /// The completed refund record
    pub refund: Refund,
}

/// Payment processor
pub struct PaymentProcessor {
    builder: PaymentBuilder,
    scorer: RiskScorer,
    resolver: StatusResolver,
    refunds: RefundCalculator,
    planner: InstallmentPlanner,
    repository: Arc<dyn PaymentRepository>,
    gateway: Arc<dyn PaymentGateway>,
    clock: Arc<dyn Clock>,
}

impl PaymentProcessor {
    /// Create a processor from configuration and its collaborators
    pub fn new(
        config: &ServiceConfig,
        repository: Arc<dyn PaymentRepository>,
        gateway: Arc<dyn PaymentGateway>,
        random: Arc<dyn RandomSource>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        Ok(Self {
            builder: PaymentBuilder::new(config.limits.clone())?,
            scorer: RiskScorer::new(config.risk.clone(), random)?,
            resolver: StatusResolver::new(
                config.risk.review_threshold,
                config.risk.block_threshold,
            ),
            refunds: RefundCalculator::new(config.refund.clone())?,
            planner: InstallmentPlanner::new(config.installments.clone()),
            repository,
            gateway,
            clock,
        })
    }

    /// Process a payment end to end
    ///
    /// Replaying a known idempotency key returns the original payment
    /// without creating a duplicate charge.
    pub async fn process_payment(&self, request: &PaymentRequest) -> Result<Payment> {
        if let Some(key) = &request.idempotency_key {
            if let Some(existing) = self.repository.find_by_idempotency_key(key).await? {
                // a blocked charge stays blocked on resubmission
                if existing.status == PaymentStatus::Failed {
                    return Err(Error::FraudBlocked(format!(
                        "payment {} blocked with fraud score {}",
                        existing.payment_number, existing.fraud_score
                    )));
                }
                info!(
                    "Idempotent replay of payment {} (key {})",
                    existing.payment_number, key
                );
                return Ok(existing);
            }
        }

        let now = self.clock.now();
        let mut payment = self.builder.build(request, now)?;

        // Step 1: score before anything touches the gateway
        let assessment = self.scorer.assess(&TransactionContext {
            payment_id: Some(payment.id),
            amount: payment.amount.total,
            method: payment.method.kind(),
            save_payment_method: payment.save_payment_method,
        });
        payment.fraud_score = assessment.risk_score.score();
        payment.risk_level = assessment.risk_level;

        // Step 2: fraud block is terminal and skips the gateway entirely
        if self.resolver.is_blocked(assessment.risk_score) {
            payment.transition_to(PaymentStatus::Failed)?;
            warn!(
                "Payment {} blocked: fraud score {}",
                payment.payment_number, payment.fraud_score
            );
            let message = format!(
                "payment {} blocked with fraud score {}",
                payment.payment_number, payment.fraud_score
            );
            self.repository.insert(payment).await?;
            return Err(Error::FraudBlocked(message));
        }

        // Step 3: authorize with the gateway
        let details = self.gateway.authorize(&payment).await?;
        payment.gateway = Some(details);

        // Step 4: resolve the post-authorization status
        let resolved = self.resolver.resolve(assessment.risk_score);
        payment.transition_to(resolved)?;
        if payment.status == PaymentStatus::Captured {
            payment.processed_at = Some(self.clock.now());
        }

        info!(
            "Payment {} {} ({} {}, fraud score {})",
            payment.payment_number,
            payment.status,
            payment.amount.total,
            payment.amount.currency,
            payment.fraud_score
        );

        self.repository.insert(payment.clone()).await?;
        Ok(payment)
    }

    /// Refund part or all of a captured payment
    pub async fn refund_payment(
        &self,
        payment_id: Uuid,
        request: &RefundRequest,
    ) -> Result<RefundOutcome> {
        let mut payment = self.repository.get(payment_id).await?;
        let expected_version = payment.version;

        let refund = self
            .refunds
            .evaluate(&payment, request, self.clock.now())?;
        let reference = self.gateway.refund(&payment, refund.amount).await?;
        let refund = self
            .refunds
            .apply(&mut payment, refund, reference, self.clock.now())?;

        let payment = self.repository.update(payment, expected_version).await?;
        info!(
            "Refunded {} on payment {} ({} left refundable)",
            refund.amount, payment.payment_number, payment.refundable_amount
        );

        Ok(RefundOutcome { payment, refund })
    }

    /// Create an installment plan, attaching it when a payment is named
    pub async fn create_installment_plan(&self, request: &PlanRequest) -> Result<InstallmentPlan> {
        let plan = self.planner.build(request, self.clock.now())?;

        if let Some(payment_id) = request.payment_id {
            let mut payment = self.repository.get(payment_id).await?;
            let expected_version = payment.version;
            payment.installment_plan = Some(plan.clone());
            self.repository.update(payment, expected_version).await?;
            info!(
                "Attached {}-payment plan to payment {}",
                plan.number_of_payments, payment_id
            );
        }

        Ok(plan)
    }

    /// Aggregate statistics over all payments (read-only)
    pub async fn get_payment_stats(&self) -> Result<AggregateStats> {
        let payments = self.repository.list().await?;
        Ok(AggregateStats::from_payments(&payments))
    }

    /// Standalone risk analysis, usable before authorization
    pub fn detect_fraud(&self, ctx: &TransactionContext) -> RiskAssessment {
        self.scorer.assess(ctx)
    }

    /// Fetch a payment by id
    pub async fn get_payment(&self, payment_id: Uuid) -> Result<Payment> {
        self.repository.get(payment_id).await
    }

    /// All payments, oldest first
    pub async fn list_payments(&self) -> Result<Vec<Payment>> {
        self.repository.list().await
    }

    /// Cancel a payment that has not been captured yet
    pub async fn cancel_payment(&self, payment_id: Uuid) -> Result<Payment> {
        let mut payment = self.repository.get(payment_id).await?;
        let expected_version = payment.version;
        payment.transition_to(PaymentStatus::Cancelled)?;
        let payment = self.repository.update(payment, expected_version).await?;
        info!("Payment {} cancelled", payment.payment_number);
        Ok(payment)
    }

    /// Mark captured funds as settled to the clinic account
    pub async fn settle_payment(&self, payment_id: Uuid) -> Result<Payment> {
        let mut payment = self.repository.get(payment_id).await?;
        let expected_version = payment.version;
        payment.transition_to(PaymentStatus::Settled)?;
        let payment = self.repository.update(payment, expected_version).await?;
        info!("Payment {} settled", payment.payment_number);
        Ok(payment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::{GatewayConfig, MockGateway};
    use crate::repository::InMemoryPaymentRepository;
    use chrono::Utc;
    use payment_core::{Currency, FixedClock, PaymentMethod, RefundReason, RefundType, SystemClock};
    use risk_engine::random::FixedRandomSource;
    use risk_engine::{PaymentMethodKind, Recommendation, RiskLevel, ScoringConfig};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    /// Processor with a pinned risk roll, no gateway latency, and the given
    /// gateway failure rate
    fn build_processor(risk_roll: f64, failure_rate: f64, risk: ScoringConfig) -> PaymentProcessor {
        let mut config = ServiceConfig::default();
        config.risk = risk;
        config.gateway = GatewayConfig {
            provider: "mockpay".to_string(),
            latency_ms: 0,
            failure_rate,
        };

        let repository = Arc::new(InMemoryPaymentRepository::new());
        let gateway = Arc::new(MockGateway::new(
            config.gateway.clone(),
            Arc::new(FixedRandomSource::new(0.5)),
        ));
        PaymentProcessor::new(
            &config,
            repository,
            gateway,
            Arc::new(FixedRandomSource::new(risk_roll)),
            Arc::new(SystemClock),
        )
        .unwrap()
    }

    fn card_request(amount: Decimal, idempotency_key: Option<&str>) -> PaymentRequest {
        PaymentRequest {
            amount,
            currency: Currency::USD,
            taxes: Decimal::ZERO,
            discounts: Decimal::ZERO,
            fees: Decimal::ZERO,
            insurance_covered: Decimal::ZERO,
            method: PaymentMethod::CreditCard {
                brand: "visa".to_string(),
                last_four: "4242".to_string(),
            },
            save_payment_method: true,
            accepted_terms: true,
            patient_id: None,
            idempotency_key: idempotency_key.map(str::to_string),
        }
    }

    /// Scoring config whose base roll spans the whole 0-100 range, so a
    /// fixed roll can push payments into any band
    fn wide_risk() -> ScoringConfig {
        ScoringConfig {
            base_score_cap: 100,
            ..ScoringConfig::default()
        }
    }

    #[tokio::test]
    async fn test_low_risk_payment_captured() {
        // roll 0.5 over cap 30 = score 15
        let processor = build_processor(0.5, 0.0, ScoringConfig::default());
        let payment = processor
            .process_payment(&card_request(dec!(182.25), None))
            .await
            .unwrap();

        assert_eq!(payment.status, PaymentStatus::Captured);
        assert_eq!(payment.fraud_score, 15);
        assert_eq!(payment.risk_level, RiskLevel::Low);
        assert_eq!(payment.amount.total, dec!(182.25));
        assert!(payment.gateway.is_some());
        assert!(payment.processed_at.is_some());
    }

    #[tokio::test]
    async fn test_review_band_lands_in_processing() {
        // roll 0.7 over cap 100 = score 70
        let processor = build_processor(0.7, 0.0, wide_risk());
        let payment = processor
            .process_payment(&card_request(dec!(50.00), None))
            .await
            .unwrap();

        assert_eq!(payment.status, PaymentStatus::Processing);
        assert!(payment.processed_at.is_none());
        assert!(payment.gateway.is_some());
    }

    #[tokio::test]
    async fn test_blocked_payment_persisted_as_failed() {
        // roll 0.9 over cap 100 = score 90, above the block threshold
        let processor = build_processor(0.9, 0.0, wide_risk());
        let result = processor
            .process_payment(&card_request(dec!(50.00), None))
            .await;
        assert!(matches!(result, Err(Error::FraudBlocked(_))));

        let payments = processor.list_payments().await.unwrap();
        assert_eq!(payments.len(), 1);
        assert_eq!(payments[0].status, PaymentStatus::Failed);
        // the gateway was never called
        assert!(payments[0].gateway.is_none());
    }

    #[tokio::test]
    async fn test_transient_gateway_failure_persists_nothing() {
        let processor = build_processor(0.5, 1.0, ScoringConfig::default());
        let result = processor
            .process_payment(&card_request(dec!(50.00), None))
            .await;

        assert!(matches!(result, Err(Error::Transient(_))));
        assert!(processor.list_payments().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_blocked_payment_replay_stays_blocked() {
        let processor = build_processor(0.9, 0.0, wide_risk());
        let request = card_request(dec!(50.00), Some("retry-blocked"));

        assert!(matches!(
            processor.process_payment(&request).await,
            Err(Error::FraudBlocked(_))
        ));
        // resubmitting the same key reports the same terminal outcome
        assert!(matches!(
            processor.process_payment(&request).await,
            Err(Error::FraudBlocked(_))
        ));
        assert_eq!(processor.list_payments().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_idempotent_replay_returns_same_payment() {
        let processor = build_processor(0.5, 0.0, ScoringConfig::default());
        let request = card_request(dec!(99.00), Some("retry-1"));

        let first = processor.process_payment(&request).await.unwrap();
        let second = processor.process_payment(&request).await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(processor.list_payments().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_full_refund_end_to_end() {
        let processor = build_processor(0.5, 0.0, ScoringConfig::default());
        let payment = processor
            .process_payment(&card_request(dec!(182.25), None))
            .await
            .unwrap();

        let outcome = processor
            .refund_payment(
                payment.id,
                &RefundRequest {
                    amount: dec!(182.25),
                    reason: RefundReason::CustomerRequest,
                },
            )
            .await
            .unwrap();

        assert_eq!(outcome.refund.refund_type, RefundType::Full);
        assert_eq!(outcome.payment.status, PaymentStatus::Refunded);
        assert_eq!(outcome.payment.refundable_amount, Decimal::ZERO);
        assert!(outcome
            .refund
            .transaction_id
            .as_deref()
            .unwrap()
            .starts_with("RFD-"));

        // the stored copy reflects the refund
        let stored = processor.get_payment(payment.id).await.unwrap();
        assert_eq!(stored.status, PaymentStatus::Refunded);
        assert_eq!(stored.refunds.len(), 1);
        assert_eq!(stored.version, 2);
    }

    #[tokio::test]
    async fn test_refund_over_refundable_rejected() {
        let processor = build_processor(0.5, 0.0, ScoringConfig::default());
        let payment = processor
            .process_payment(&card_request(dec!(100.00), None))
            .await
            .unwrap();

        let result = processor
            .refund_payment(
                payment.id,
                &RefundRequest {
                    amount: dec!(100.01),
                    reason: RefundReason::CustomerRequest,
                },
            )
            .await;
        assert!(matches!(result, Err(Error::Refund(_))));
    }

    #[tokio::test]
    async fn test_refund_unknown_payment() {
        let processor = build_processor(0.5, 0.0, ScoringConfig::default());
        let result = processor
            .refund_payment(
                Uuid::new_v4(),
                &RefundRequest {
                    amount: dec!(10.00),
                    reason: RefundReason::Other,
                },
            )
            .await;
        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[tokio::test]
    async fn test_plan_attached_to_payment() {
        let processor = build_processor(0.5, 0.0, ScoringConfig::default());
        let payment = processor
            .process_payment(&card_request(dec!(972.00), None))
            .await
            .unwrap();

        let plan = processor
            .create_installment_plan(&PlanRequest {
                payment_id: Some(payment.id),
                total_amount: dec!(972.00),
                number_of_payments: 6,
                annual_interest_rate: Decimal::ZERO,
                start_date: Utc::now(),
            })
            .await
            .unwrap();

        let sum: Decimal = plan.payments.iter().map(|p| p.amount).sum();
        assert_eq!(sum, dec!(972.00));

        let stored = processor.get_payment(payment.id).await.unwrap();
        assert_eq!(stored.installment_plan.as_ref().map(|p| p.id), Some(plan.id));
    }

    #[tokio::test]
    async fn test_stats_read_is_idempotent() {
        let processor = build_processor(0.5, 0.0, ScoringConfig::default());
        processor
            .process_payment(&card_request(dec!(40.00), None))
            .await
            .unwrap();
        processor
            .process_payment(&card_request(dec!(60.00), None))
            .await
            .unwrap();

        let first = processor.get_payment_stats().await.unwrap();
        let second = processor.get_payment_stats().await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first.total_payments, 2);
        assert_eq!(first.total_collected, dec!(100.00));
        assert_eq!(first.capture_rate, 1.0);
    }

    #[tokio::test]
    async fn test_detect_fraud_standalone() {
        let processor = build_processor(0.5, 0.0, ScoringConfig::default());
        let assessment = processor.detect_fraud(&TransactionContext {
            payment_id: None,
            amount: dec!(1500.00),
            method: PaymentMethodKind::CreditCard,
            save_payment_method: false,
        });

        // base 15 + 20 high value + 10 unsaved card
        assert_eq!(assessment.risk_score.score(), 45);
        assert_eq!(assessment.recommendation, Recommendation::Approve);
        assert_eq!(assessment.risk_factors.len(), 2);
    }

    #[tokio::test]
    async fn test_cancel_only_before_capture() {
        // processing payment can be cancelled
        let processor = build_processor(0.7, 0.0, wide_risk());
        let payment = processor
            .process_payment(&card_request(dec!(50.00), None))
            .await
            .unwrap();
        assert_eq!(payment.status, PaymentStatus::Processing);

        let cancelled = processor.cancel_payment(payment.id).await.unwrap();
        assert_eq!(cancelled.status, PaymentStatus::Cancelled);

        // a captured payment cannot
        let processor = build_processor(0.5, 0.0, ScoringConfig::default());
        let payment = processor
            .process_payment(&card_request(dec!(50.00), None))
            .await
            .unwrap();
        assert!(processor.cancel_payment(payment.id).await.is_err());
    }

    #[tokio::test]
    async fn test_settle_then_refund() {
        let processor = build_processor(0.5, 0.0, ScoringConfig::default());
        let payment = processor
            .process_payment(&card_request(dec!(80.00), None))
            .await
            .unwrap();

        let settled = processor.settle_payment(payment.id).await.unwrap();
        assert_eq!(settled.status, PaymentStatus::Settled);

        let outcome = processor
            .refund_payment(
                payment.id,
                &RefundRequest {
                    amount: dec!(80.00),
                    reason: RefundReason::TreatmentCancelled,
                },
            )
            .await
            .unwrap();
        assert_eq!(outcome.payment.status, PaymentStatus::Refunded);
    }

    #[tokio::test]
    async fn test_injected_clock_pins_timestamps() {
        let instant = "2026-03-15T09:30:00Z".parse().unwrap();
        let config = ServiceConfig {
            gateway: GatewayConfig {
                provider: "mockpay".to_string(),
                latency_ms: 0,
                failure_rate: 0.0,
            },
            ..ServiceConfig::default()
        };
        let processor = PaymentProcessor::new(
            &config,
            Arc::new(InMemoryPaymentRepository::new()),
            Arc::new(MockGateway::new(
                config.gateway.clone(),
                Arc::new(FixedRandomSource::new(0.5)),
            )),
            Arc::new(FixedRandomSource::new(0.5)),
            Arc::new(FixedClock::at(instant)),
        )
        .unwrap();

        let payment = processor
            .process_payment(&card_request(dec!(25.00), None))
            .await
            .unwrap();
        assert_eq!(payment.created_at, instant);
        assert_eq!(payment.processed_at, Some(instant));
    }
}
