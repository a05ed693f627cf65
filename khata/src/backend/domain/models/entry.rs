//! Domain model for a ledger entry.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    Sale,
    Settlement,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub id: String,
    pub customer_id: String,
    pub qty: u32,
    pub note: Option<String>,
    pub entry_type: EntryType,
    pub timestamp: DateTime<Utc>,
}

impl Entry {
    /// Generate a unique entry ID from the current timestamp.
    /// Format: entry::<timestamp_ms>::<random_suffix>
    /// Example: entry::1625846400123::af3c
    pub fn generate_id(timestamp_ms: u64) -> String {
        shared::Entry::generate_id(timestamp_ms, &Self::generate_random_suffix(4))
    }

    pub fn is_sale(&self) -> bool {
        self.entry_type == EntryType::Sale
    }

    pub fn is_settlement(&self) -> bool {
        self.entry_type == EntryType::Settlement
    }

    /// Generate a random hex suffix for entry IDs.
    fn generate_random_suffix(len: usize) -> String {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or_default();
        format!("{:0width$x}", now % (16_u128.pow(len as u32)), width = len)
    }
}
