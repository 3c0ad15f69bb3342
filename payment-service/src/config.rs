//! Configuration for the payment service

use crate::gateway::GatewayConfig;
use crate::{Error, Result};
use payment_core::{BuilderConfig, PlannerConfig, RefundConfig};
use risk_engine::ScoringConfig;
use serde::{Deserialize, Serialize};

/// Payment service configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ServiceConfig {
    /// Amount bounds for new payments
    pub limits: BuilderConfig,

    /// Risk scoring thresholds and penalties
    pub risk: ScoringConfig,

    /// Refund fee configuration
    pub refund: RefundConfig,

    /// Installment planner configuration
    pub installments: PlannerConfig,

    /// Mock gateway configuration
    pub gateway: GatewayConfig,
}

impl ServiceConfig {
    /// Load from a TOML file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read config: {}", e)))?;
        let config: ServiceConfig = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))?;
        Ok(config)
    }

    /// Defaults with environment variable overrides
    pub fn from_env() -> Result<Self> {
        let mut config = ServiceConfig::default();

        if let Ok(provider) = std::env::var("CLINPAY_GATEWAY_PROVIDER") {
            config.gateway.provider = provider;
        }

        if let Ok(latency) = std::env::var("CLINPAY_GATEWAY_LATENCY_MS") {
            config.gateway.latency_ms = latency
                .parse()
                .map_err(|_| Error::Config(format!("bad CLINPAY_GATEWAY_LATENCY_MS: {}", latency)))?;
        }

        if let Ok(rate) = std::env::var("CLINPAY_GATEWAY_FAILURE_RATE") {
            config.gateway.failure_rate = rate
                .parse()
                .map_err(|_| Error::Config(format!("bad CLINPAY_GATEWAY_FAILURE_RATE: {}", rate)))?;
        }

        Ok(config)
    }
}
