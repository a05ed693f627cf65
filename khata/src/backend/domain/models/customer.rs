//! khata/src/backend/domain/models/customer.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Domain model representing a customer who drinks on credit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub id: String,
    pub name: String,
    pub price_per_cup: Option<f64>,
    pub created_at: DateTime<Utc>,
}

impl Customer {
    /// Generate a unique ID for a customer
    pub fn generate_id(timestamp_millis: u64) -> String {
        shared::Customer::generate_id(timestamp_millis)
    }

    /// Price used for this customer's cups, falling back to the shop default
    pub fn effective_price(&self, default_price: f64) -> f64 {
        self.price_per_cup.unwrap_or(default_price)
    }
}
