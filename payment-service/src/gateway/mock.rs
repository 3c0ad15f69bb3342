//! Mock payment gateway

use super::{GatewayConfig, PaymentGateway};
use crate::{Error, Result};
use async_trait::async_trait;
use payment_core::{GatewayDetails, Payment};
use risk_engine::RandomSource;
use rust_decimal::Decimal;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use uuid::Uuid;

/// Gateway simulator: sleeps for the configured latency, then fails a
/// configured fraction of calls
pub struct MockGateway {
    config: GatewayConfig,
    random: Arc<dyn RandomSource>,
}

impl MockGateway {
    /// Create a mock gateway
    pub fn new(config: GatewayConfig, random: Arc<dyn RandomSource>) -> Self {
        Self { config, random }
    }

    fn should_fail(&self) -> bool {
        self.random.next_f64() < self.config.failure_rate
    }

    async fn simulate_latency(&self) {
        if self.config.latency_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.config.latency_ms)).await;
        }
    }
}

#[async_trait]
impl PaymentGateway for MockGateway {
    async fn authorize(&self, payment: &Payment) -> Result<GatewayDetails> {
        info!(
            "Mock gateway: authorizing {} {} for {}",
            payment.amount.total, payment.amount.currency, payment.payment_number
        );

        self.simulate_latency().await;

        if self.should_fail() {
            warn!("Mock gateway: simulated authorization failure");
            return Err(Error::Transient(
                "simulated gateway failure during authorization".to_string(),
            ));
        }

        Ok(GatewayDetails {
            provider: self.config.provider.clone(),
            transaction_id: format!("TXN-{}", Uuid::new_v4()),
            authorization_code: format!(
                "AUTH-{}",
                Uuid::new_v4().simple().to_string()[..6].to_uppercase()
            ),
        })
    }

    async fn refund(&self, payment: &Payment, amount: Decimal) -> Result<String> {
        info!(
            "Mock gateway: refunding {} of {} on {}",
            amount, payment.amount.total, payment.payment_number
        );

        self.simulate_latency().await;

        if self.should_fail() {
            warn!("Mock gateway: simulated refund failure");
            return Err(Error::Transient(
                "simulated gateway failure during refund".to_string(),
            ));
        }

        Ok(format!("RFD-{}", Uuid::new_v4()))
    }
}
