//! Data Transfer Objects
//!
//! Response types for the endpoints that are not the summary itself.

use serde::Serialize;

/// Full health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// "healthy", or "degraded" when WMATA has no API key
    pub status: String,
    pub uptime_seconds: u64,
    pub version: String,
    pub wmata_configured: bool,
    pub bike_share_enabled: bool,
}
