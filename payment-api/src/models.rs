//! Response models specific to the HTTP layer
//!
//! Domain requests and responses (payments, refunds, plans, assessments)
//! are serialized straight from the service types; only the surface-level
//! extras live here.

use serde::{Deserialize, Serialize};

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,

    /// Crate version
    pub version: String,

    /// Seconds since the process started
    pub uptime_seconds: u64,
}
