//! Configuration for the API server

use std::env;

/// Listen address configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Bind host
    pub host: String,

    /// Bind port
    pub port: u16,
}

impl ApiConfig {
    /// Read from environment variables, with defaults
    pub fn from_env() -> Self {
        let host = env::var("CLINPAY_API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env::var("CLINPAY_API_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(8084);
        Self { host, port }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8084,
        }
    }
}
