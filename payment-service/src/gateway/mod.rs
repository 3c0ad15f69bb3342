//! Payment gateway seam
//!
//! The processor charges and refunds through [`PaymentGateway`]; the only
//! implementation here is the mock, which simulates latency and random
//! transient failures the way the front-desk prototype did.

pub mod mock;

use crate::Result;
use async_trait::async_trait;
use payment_core::{GatewayDetails, Payment};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub use mock::MockGateway;

/// Gateway configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Provider name recorded on authorized payments
    pub provider: String,

    /// Simulated round-trip latency in milliseconds
    pub latency_ms: u64,

    /// Probability of a simulated transient failure per call (0.0 - 1.0)
    pub failure_rate: f64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            provider: "mockpay".to_string(),
            latency_ms: 150,
            failure_rate: 0.03,
        }
    }
}

/// Charge and refund operations against the gateway
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Authorize and capture funds for a payment
    async fn authorize(&self, payment: &Payment) -> Result<GatewayDetails>;

    /// Return funds to the payer; returns the gateway refund reference
    async fn refund(&self, payment: &Payment, amount: Decimal) -> Result<String>;
}
