//! Domain model for PIN attempts
//!
//! Only the outcome is kept. The digits that were typed are never stored.

use chrono::Utc;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PinAttempt {
    pub id: i64,
    /// When the attempt was made (RFC 3339 timestamp)
    pub timestamp: String,
    pub success: bool,
}

impl PinAttempt {
    pub fn new(id: i64, timestamp: String, success: bool) -> Self {
        Self {
            id,
            timestamp,
            success,
        }
    }

    /// Generate a new timestamp for the current moment
    pub fn generate_current_timestamp() -> String {
        Utc::now().format("%Y-%m-%dT%H:%M:%S%.fZ").to_string()
    }
}
