/// API response type definitions

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Simple health check response
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
    pub uptime_seconds: u64,
}

/// Confirmation for writes without a richer payload
#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderCreatedResponse {
    pub message: String,
    #[serde(rename = "SalesOrderID")]
    pub sales_order_id: i64,
}
